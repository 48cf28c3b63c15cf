//! Encoding: function tree to grammar string plus literal queue.

use std::collections::VecDeque;

use geodag_funcs::{ScalarFn, TransformFn};
use geodag_math::RigidTransform;

use crate::record::PersistedFunction;

/// Flatten a transform function to its persisted record.
pub fn encode_transform(f: &TransformFn) -> PersistedFunction {
    let mut enc = Encoder::new();
    enc.transform_fn(f);
    enc.finish()
}

/// Flatten a scalar function to its persisted record.
pub fn encode_scalar(f: &ScalarFn) -> PersistedFunction {
    let mut enc = Encoder::new();
    enc.scalar_fn(f);
    enc.finish()
}

/// Accumulates the expression text and the literal queue.
///
/// Dispatch is an exhaustive match over the closed function enums — the
/// type-keyed recorder table, with the compiler checking that no kind
/// goes unregistered.
struct Encoder {
    expression: String,
    literals: VecDeque<f64>,
}

impl Encoder {
    fn new() -> Self {
        Self {
            expression: String::new(),
            literals: VecDeque::new(),
        }
    }

    fn finish(self) -> PersistedFunction {
        PersistedFunction {
            expression: self.expression,
            literals: self.literals,
        }
    }

    fn transform_fn(&mut self, f: &TransformFn) {
        match f {
            TransformFn::Pow {
                transform,
                exponent,
            } => {
                self.expression.push_str("Pow(");
                self.rigid(transform);
                self.expression.push(',');
                self.scalar_fn(exponent);
                self.expression.push(')');
            }
            TransformFn::PreMult { fixed, operand } => {
                self.expression.push_str("PreMult(");
                self.rigid(fixed);
                self.expression.push(',');
                self.transform_fn(operand);
                self.expression.push(')');
            }
            TransformFn::PostMult { operand, fixed } => {
                self.expression.push_str("PostMult(");
                self.transform_fn(operand);
                self.expression.push(',');
                self.rigid(fixed);
                self.expression.push(')');
            }
            TransformFn::Product(a, b) => {
                self.expression.push_str("Product(");
                self.transform_fn(a);
                self.expression.push(',');
                self.transform_fn(b);
                self.expression.push(')');
            }
        }
    }

    fn scalar_fn(&mut self, f: &ScalarFn) {
        match f {
            ScalarFn::Variable => self.expression.push_str("Variable"),
            ScalarFn::Constant(c) => {
                self.expression.push_str("Constant(");
                self.literal(*c);
                self.expression.push(')');
            }
            ScalarFn::Sum(a, b) => self.scalar_pair("Sum", a, b),
            ScalarFn::Difference(a, b) => self.scalar_pair("Difference", a, b),
            ScalarFn::Product(a, b) => self.scalar_pair("Product", a, b),
            ScalarFn::Mod { operand, period } => {
                self.expression.push_str("Mod(");
                self.scalar_fn(operand);
                self.expression.push(',');
                self.literal(*period);
                self.expression.push(')');
            }
        }
    }

    fn scalar_pair(&mut self, keyword: &str, a: &ScalarFn, b: &ScalarFn) {
        self.expression.push_str(keyword);
        self.expression.push('(');
        self.scalar_fn(a);
        self.expression.push(',');
        self.scalar_fn(b);
        self.expression.push(')');
    }

    /// Twelve placeholders: rotation block row-major, then translation.
    fn rigid(&mut self, t: &RigidTransform) {
        let rows = t.rotation_rows();
        for (i, r) in rows.iter().enumerate() {
            if i > 0 {
                self.expression.push(',');
            }
            self.literal(*r);
        }
        let v = t.translation_vec();
        for c in [v.x, v.y, v.z] {
            self.expression.push(',');
            self.literal(c);
        }
    }

    fn literal(&mut self, value: f64) {
        self.expression.push('#');
        self.literals.push_back(value);
    }
}
