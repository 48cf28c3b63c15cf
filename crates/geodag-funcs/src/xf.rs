//! Transform-valued functions of one real parameter.

use geodag_math::RigidTransform;

use crate::scalar::ScalarFn;

/// A one-parameter function returning a rigid transform.
///
/// The combinators compose pointwise:
///
/// - `Product(a, b)(x) = a(x) · b(x)`
/// - `PreMult(T, b)(x) = T · b(x)`
/// - `PostMult(a, T)(x) = a(x) · T`
/// - `Pow(T, f)(x) = T^{f(x)}` — `T` decomposed into a translation and a
///   rotation angle about a fixed axis, both scaled by `f(x)` and
///   recomposed.
///
/// Cloning deep-clones the whole tree: composition has value semantics
/// even though the transforms placed in the geometry graph are shared.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformFn {
    /// Fractional application of a fixed step transform.
    Pow {
        /// The step transform.
        transform: RigidTransform,
        /// The scalar exponent function.
        exponent: ScalarFn,
    },
    /// A fixed transform applied before the operand's value.
    PreMult {
        /// The fixed left factor.
        fixed: RigidTransform,
        /// The varying right factor.
        operand: Box<TransformFn>,
    },
    /// A fixed transform applied after the operand's value.
    PostMult {
        /// The varying left factor.
        operand: Box<TransformFn>,
        /// The fixed right factor.
        fixed: RigidTransform,
    },
    /// Pointwise product of two transform functions.
    Product(Box<TransformFn>, Box<TransformFn>),
}

impl TransformFn {
    /// Fractional application of `transform`, driven by `exponent`.
    pub fn pow(transform: RigidTransform, exponent: ScalarFn) -> Self {
        TransformFn::Pow {
            transform,
            exponent,
        }
    }

    /// `fixed · operand(x)`.
    pub fn pre_mult(fixed: RigidTransform, operand: TransformFn) -> Self {
        TransformFn::PreMult {
            fixed,
            operand: Box::new(operand),
        }
    }

    /// `operand(x) · fixed`.
    pub fn post_mult(operand: TransformFn, fixed: RigidTransform) -> Self {
        TransformFn::PostMult {
            operand: Box::new(operand),
            fixed,
        }
    }

    /// `a(x) · b(x)`.
    pub fn product(a: TransformFn, b: TransformFn) -> Self {
        TransformFn::Product(Box::new(a), Box::new(b))
    }

    /// Evaluate at `x`.
    pub fn evaluate(&self, x: f64) -> RigidTransform {
        match self {
            TransformFn::Pow {
                transform,
                exponent,
            } => transform.pow(exponent.evaluate(x)),
            TransformFn::PreMult { fixed, operand } => fixed.then(&operand.evaluate(x)),
            TransformFn::PostMult { operand, fixed } => operand.evaluate(x).then(fixed),
            TransformFn::Product(a, b) => a.evaluate(x).then(&b.evaluate(x)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodag_math::{Dir3, Point3, Vec3};
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn pow_of_a_translation_step_generates_copies() {
        let f = TransformFn::pow(
            RigidTransform::translation(1.0, 0.0, 0.0),
            ScalarFn::Variable,
        );
        for k in 0..4 {
            let t = f.evaluate(k as f64);
            let v = t.translation_vec();
            assert!((v.x - k as f64).abs() < 1e-12);
            assert!(v.y.abs() < 1e-12);
            assert!(v.z.abs() < 1e-12);
        }
    }

    #[test]
    fn pow_scales_rotation_angle() {
        let step = RigidTransform::rotation_z(PI / 6.0);
        let f = TransformFn::pow(step, ScalarFn::Variable);
        // three steps of 30° rotate (1,0,0) to (0,1,0)
        let t = f.evaluate(3.0);
        let p = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pre_mult_applies_the_fixed_factor_first() {
        let f = TransformFn::pre_mult(
            RigidTransform::rotation_z(PI / 2.0),
            TransformFn::pow(
                RigidTransform::translation(1.0, 0.0, 0.0),
                ScalarFn::Variable,
            ),
        );
        // at x=1: rotate(translate(origin)) = (0, 1, 0)
        let p = f.evaluate(1.0).apply_point(&Point3::origin());
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn post_mult_applies_the_fixed_factor_last() {
        let f = TransformFn::post_mult(
            TransformFn::pow(
                RigidTransform::rotation_z(PI / 2.0),
                ScalarFn::Variable,
            ),
            RigidTransform::translation(1.0, 0.0, 0.0),
        );
        // at x=1: rotate(translate(origin)) = (0, 1, 0)
        let p = f.evaluate(1.0).apply_point(&Point3::origin());
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn product_multiplies_pointwise() {
        let f = TransformFn::product(
            TransformFn::pow(
                RigidTransform::translation(1.0, 0.0, 0.0),
                ScalarFn::Variable,
            ),
            TransformFn::pow(
                RigidTransform::translation(0.0, 2.0, 0.0),
                ScalarFn::Variable,
            ),
        );
        let v = f.evaluate(2.0).translation_vec();
        assert!((v.x - 2.0).abs() < 1e-12);
        assert!((v.y - 4.0).abs() < 1e-12);
    }

    #[test]
    fn pow_about_an_axis_keeps_the_axis() {
        let axis = Dir3::new_normalize(Vec3::new(1.0, 1.0, 1.0));
        let step = RigidTransform::rotation_about_axis(&axis, 0.3);
        let f = TransformFn::pow(step, ScalarFn::Variable * 0.5);
        let (got_axis, angle) = f.evaluate(1.0).axis_angle().unwrap();
        assert!((angle - 0.15).abs() < 1e-12);
        assert!((got_axis.as_ref() - axis.as_ref()).norm() < 1e-9);
    }

    proptest! {
        #[test]
        fn pow_scales_translation_linearly(
            dx in -10.0f64..10.0,
            dy in -10.0f64..10.0,
            angle in -1.0f64..1.0,
            // keep |angle| * x below pi so the recovered angle never wraps
            x in 0.0f64..3.0,
        ) {
            let step = RigidTransform::rotation_z(angle)
                .then(&RigidTransform::translation(dx, dy, 0.0));
            let f = TransformFn::pow(step.clone(), ScalarFn::Variable);
            let t = f.evaluate(x);
            let v = t.translation_vec();
            let sv = step.translation_vec();
            prop_assert!((v.x - sv.x * x).abs() < 1e-9);
            prop_assert!((v.y - sv.y * x).abs() < 1e-9);
            if let Some((_, a)) = t.axis_angle() {
                prop_assert!((a - (angle * x).abs()).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let f = TransformFn::product(
            TransformFn::pow(
                RigidTransform::translation(1.0, 0.0, 0.0),
                ScalarFn::Variable,
            ),
            TransformFn::pre_mult(
                RigidTransform::rotation_z(0.5),
                TransformFn::pow(RigidTransform::rotation_z(0.1), ScalarFn::Constant(2.0)),
            ),
        );
        let g = f.clone();
        assert_eq!(f, g);
        assert_eq!(f.evaluate(1.5), g.evaluate(1.5));
    }
}
