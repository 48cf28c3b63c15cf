//! Scalar functions of one real parameter.

use std::ops::{Add, Mul, Sub};

/// A scalar function of one real parameter.
///
/// The closed set of combinators keeps every function one-dimensional by
/// construction; these are the exponents and phases fed to the transform
/// combinators.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarFn {
    /// The parameter itself: `f(x) = x`.
    Variable,
    /// A constant: `f(x) = c`.
    Constant(f64),
    /// Pointwise sum of two functions.
    Sum(Box<ScalarFn>, Box<ScalarFn>),
    /// Pointwise difference of two functions.
    Difference(Box<ScalarFn>, Box<ScalarFn>),
    /// Pointwise product of two functions.
    Product(Box<ScalarFn>, Box<ScalarFn>),
    /// Periodic wrap of the operand into `[0, period)`.
    Mod {
        /// The wrapped operand.
        operand: Box<ScalarFn>,
        /// The wrap period.
        period: f64,
    },
}

impl ScalarFn {
    /// Wrap a function into `[0, period)`.
    pub fn modulo(operand: ScalarFn, period: f64) -> Self {
        ScalarFn::Mod {
            operand: Box::new(operand),
            period,
        }
    }

    /// Evaluate at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            ScalarFn::Variable => x,
            ScalarFn::Constant(c) => *c,
            ScalarFn::Sum(a, b) => a.evaluate(x) + b.evaluate(x),
            ScalarFn::Difference(a, b) => a.evaluate(x) - b.evaluate(x),
            ScalarFn::Product(a, b) => a.evaluate(x) * b.evaluate(x),
            ScalarFn::Mod { operand, period } => operand.evaluate(x).rem_euclid(*period),
        }
    }
}

impl Add for ScalarFn {
    type Output = ScalarFn;

    fn add(self, rhs: ScalarFn) -> ScalarFn {
        ScalarFn::Sum(Box::new(self), Box::new(rhs))
    }
}

impl Sub for ScalarFn {
    type Output = ScalarFn;

    fn sub(self, rhs: ScalarFn) -> ScalarFn {
        ScalarFn::Difference(Box::new(self), Box::new(rhs))
    }
}

impl Mul for ScalarFn {
    type Output = ScalarFn;

    fn mul(self, rhs: ScalarFn) -> ScalarFn {
        ScalarFn::Product(Box::new(self), Box::new(rhs))
    }
}

impl Mul<f64> for ScalarFn {
    type Output = ScalarFn;

    fn mul(self, rhs: f64) -> ScalarFn {
        self * ScalarFn::Constant(rhs)
    }
}

impl Add<f64> for ScalarFn {
    type Output = ScalarFn;

    fn add(self, rhs: f64) -> ScalarFn {
        self + ScalarFn::Constant(rhs)
    }
}

impl Sub<f64> for ScalarFn {
    type Output = ScalarFn;

    fn sub(self, rhs: f64) -> ScalarFn {
        self - ScalarFn::Constant(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_and_constant() {
        assert_eq!(ScalarFn::Variable.evaluate(3.5), 3.5);
        assert_eq!(ScalarFn::Constant(2.0).evaluate(100.0), 2.0);
    }

    #[test]
    fn operator_sugar_builds_the_tree() {
        // f(x) = 2x + 1
        let f = ScalarFn::Variable * 2.0 + 1.0;
        assert_eq!(f.evaluate(0.0), 1.0);
        assert_eq!(f.evaluate(3.0), 7.0);
    }

    #[test]
    fn difference_and_product() {
        let f = (ScalarFn::Variable - 1.0) * ScalarFn::Variable;
        assert_eq!(f.evaluate(4.0), 12.0);
    }

    #[test]
    fn modulo_wraps_into_period() {
        let f = ScalarFn::modulo(ScalarFn::Variable, 3.0);
        assert_eq!(f.evaluate(7.0), 1.0);
        assert_eq!(f.evaluate(-1.0), 2.0);
    }

    #[test]
    fn clone_is_deep() {
        let f = ScalarFn::Variable * 2.0;
        let g = f.clone();
        assert_eq!(f, g);
        drop(f);
        assert_eq!(g.evaluate(1.0), 2.0);
    }
}
