#![warn(missing_docs)]

//! Math types for the geodag geometry description graph.
//!
//! Thin wrappers around nalgebra providing domain-specific types for
//! detector geometry: points, vectors, rigid-body transforms, and the
//! tolerance machinery used by structural canonicalization.

use std::cmp::Ordering;
use std::f64::consts::PI;

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A rigid-body transform: a proper rotation followed by a translation.
///
/// Unlike a general affine matrix this is always invertible, never scales
/// or shears, and decomposes exactly into (axis, angle, translation) — the
/// decomposition the transform-function algebra relies on.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidTransform {
    rotation: Rotation3<f64>,
    translation: Vector3<f64>,
}

impl RigidTransform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            rotation: Rotation3::identity(),
            translation: Vector3::new(dx, dy, dz),
        }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self::rotation_about_axis(&Vector3::x_axis(), angle)
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        Self::rotation_about_axis(&Vector3::y_axis(), angle)
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::rotation_about_axis(&Vector3::z_axis(), angle)
    }

    /// Rotation about an arbitrary axis through the origin by `angle` radians.
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        Self {
            rotation: Rotation3::from_axis_angle(axis, angle),
            translation: Vector3::zeros(),
        }
    }

    /// Build a transform from an explicit rotation and translation.
    pub fn from_parts(rotation: Rotation3<f64>, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Rebuild a transform from a row-major rotation block and a translation.
    ///
    /// The rows must describe a proper rotation; no orthonormalization is
    /// performed, so a round trip through [`RigidTransform::rotation_rows`]
    /// is bit-exact.
    pub fn from_rows(rows: [f64; 9], translation: Vec3) -> Self {
        let m = Matrix3::new(
            rows[0], rows[1], rows[2], rows[3], rows[4], rows[5], rows[6], rows[7], rows[8],
        );
        Self {
            rotation: Rotation3::from_matrix_unchecked(m),
            translation,
        }
    }

    /// Compose with `other`: the result applies `other` first, then `self`.
    pub fn then(&self, other: &RigidTransform) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.rotation * p + self.translation
    }

    /// Transform a direction vector (rotation only).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.rotation * v
    }

    /// Exact inverse: transpose the rotation, rotate and negate the translation.
    pub fn inverse(&self) -> Self {
        let inv_rot = self.rotation.transpose();
        Self {
            translation: -(inv_rot * self.translation),
            rotation: inv_rot,
        }
    }

    /// The rotation part.
    pub fn rotation(&self) -> &Rotation3<f64> {
        &self.rotation
    }

    /// The translation part.
    pub fn translation_vec(&self) -> Vec3 {
        self.translation
    }

    /// The rotation block in row-major order.
    pub fn rotation_rows(&self) -> [f64; 9] {
        let m = self.rotation.matrix();
        [
            m[(0, 0)],
            m[(0, 1)],
            m[(0, 2)],
            m[(1, 0)],
            m[(1, 1)],
            m[(1, 2)],
            m[(2, 0)],
            m[(2, 1)],
            m[(2, 2)],
        ]
    }

    /// Euler angles `(roll, pitch, yaw)` of the rotation part, in radians.
    pub fn euler_angles(&self) -> (f64, f64, f64) {
        self.rotation.euler_angles()
    }

    /// Axis-angle decomposition of the rotation part.
    ///
    /// Returns `None` for the identity rotation, which has no defined axis.
    pub fn axis_angle(&self) -> Option<(Dir3, f64)> {
        self.rotation.axis_angle()
    }

    /// Fractional application: scale the rotation angle and the translation
    /// by `s` and recompose.
    ///
    /// `t.pow(0.0)` is the identity, `t.pow(1.0)` is `t`, and integer powers
    /// of a pure step transform generate copy 0, 1, 2, … of a replicated
    /// placement.
    pub fn pow(&self, s: f64) -> Self {
        let rotation = match self.rotation.axis_angle() {
            Some((axis, angle)) => Rotation3::from_axis_angle(&axis, angle * s),
            None => Rotation3::identity(),
        };
        Self {
            rotation,
            translation: self.translation * s,
        }
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Normalize an angle into the half-open interval `(-pi, pi]`.
pub fn normalize_angle(a: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let mut r = a % two_pi;
    if r <= -PI {
        r += two_pi;
    } else if r > PI {
        r -= two_pi;
    }
    r
}

/// Three-way compare of two scalars quantized to a tolerance grid.
///
/// Values are rounded to the nearest multiple of `tol` and the resulting
/// cells compared exactly, so the order is total and transitive. Two values
/// within `tol` of each other almost always land in the same cell; a pair
/// straddling a cell boundary compares unequal, which for canonicalization
/// only costs a missed deduplication.
pub fn cmp_quantized(a: f64, b: f64, tol: f64) -> Ordering {
    cell(a, tol).cmp(&cell(b, tol))
}

fn cell(v: f64, tol: f64) -> i64 {
    (v / tol).round() as i64
}

/// Tolerance constants for structural comparisons.
///
/// These feed canonicalization only, never geometric correctness: a missed
/// match wastes a little sharing, a spurious match is prevented by the
/// grid-compare discipline in [`cmp_quantized`].
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances: 0.1 µm linear, 0.01° angular.
    pub const DEFAULT: Self = Self {
        linear: 1e-4,
        angular: 1.745e-4,
    };

    /// Three-way compare of two lengths on the linear tolerance grid.
    pub fn cmp_length(&self, a: f64, b: f64) -> Ordering {
        cmp_quantized(a, b, self.linear)
    }

    /// Three-way compare of two angles on the angular tolerance grid.
    ///
    /// Both angles are normalized into `(-pi, pi]` first, so full-turn
    /// aliases of the same rotation compare equal. The seam at ±pi remains:
    /// angles just below +pi and just above -pi land in distant cells and
    /// fail to deduplicate, which is a missed sharing, never an error.
    pub fn cmp_angle(&self, a: f64, b: f64) -> Ordering {
        cmp_quantized(normalize_angle(a), normalize_angle(b), self.angular)
    }

    /// Check if two lengths fall in the same tolerance cell.
    pub fn lengths_equal(&self, a: f64, b: f64) -> bool {
        self.cmp_length(a, b) == Ordering::Equal
    }

    /// Check if two angles fall in the same tolerance cell.
    pub fn angles_equal(&self, a: f64, b: f64) -> bool {
        self.cmp_angle(a, b) == Ordering::Equal
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_transform() {
        let t = RigidTransform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!((t.apply_point(&p) - p).norm() < 1e-12);
    }

    #[test]
    fn translation() {
        let t = RigidTransform::translation(10.0, 20.0, 30.0);
        let p = Point3::new(1.0, 2.0, 3.0);
        let r = t.apply_point(&p);
        assert!((r.x - 11.0).abs() < 1e-12);
        assert!((r.y - 22.0).abs() < 1e-12);
        assert!((r.z - 33.0).abs() < 1e-12);
    }

    #[test]
    fn rotation_z_90() {
        let t = RigidTransform::rotation_z(PI / 2.0);
        let r = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(r.x.abs() < 1e-12);
        assert!((r.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn compose_applies_other_first() {
        // translate then rotate: (1,0,0) -> (2,0,0) -> (0,2,0)
        let translate = RigidTransform::translation(1.0, 0.0, 0.0);
        let rotate = RigidTransform::rotation_z(PI / 2.0);
        let composed = rotate.then(&translate);
        let r = composed.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(r.x.abs() < 1e-12);
        assert!((r.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn inverse_is_exact() {
        let t = RigidTransform::rotation_z(0.3).then(&RigidTransform::translation(1.0, 2.0, 3.0));
        let round = t.then(&t.inverse());
        let p = Point3::new(5.0, 6.0, 7.0);
        assert!((round.apply_point(&p) - p).norm() < 1e-12);
    }

    #[test]
    fn row_round_trip_is_bit_exact() {
        let t = RigidTransform::rotation_about_axis(
            &Dir3::new_normalize(Vec3::new(1.0, 2.0, -0.5)),
            0.7,
        )
        .then(&RigidTransform::translation(4.0, -1.0, 0.25));
        let rebuilt = RigidTransform::from_rows(t.rotation_rows(), t.translation_vec());
        assert_eq!(t, rebuilt);
    }

    #[test]
    fn pow_scales_translation_and_angle() {
        let step = RigidTransform::translation(1.0, 0.0, 0.0);
        for k in 0..4 {
            let t = step.pow(k as f64);
            let v = t.translation_vec();
            assert!((v.x - k as f64).abs() < 1e-12);
            assert!(v.y.abs() < 1e-12);
        }

        let spin = RigidTransform::rotation_z(0.8);
        let half = spin.pow(0.5);
        let (axis, angle) = half.axis_angle().unwrap();
        assert!((angle - 0.4).abs() < 1e-12);
        assert!((axis.as_ref().z.abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pow_of_identity_rotation() {
        let t = RigidTransform::translation(0.0, 2.0, 0.0);
        let half = t.pow(0.5);
        assert!((half.translation_vec().y - 1.0).abs() < 1e-12);
        assert!(half.axis_angle().is_none());
    }

    #[test]
    fn normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(0.25) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn quantized_compare_is_total() {
        let tol = 1e-4;
        assert_eq!(cmp_quantized(1.0, 1.0 + 2e-5, tol), Ordering::Equal);
        assert_eq!(cmp_quantized(1.0, 1.001, tol), Ordering::Less);
        assert_eq!(cmp_quantized(1.001, 1.0, tol), Ordering::Greater);
    }

    #[test]
    fn angle_compare_identifies_full_turn_aliases() {
        let tol = Tolerance::DEFAULT;
        assert_eq!(tol.cmp_angle(0.25, 0.25 + 2.0 * PI), Ordering::Equal);
        assert_eq!(tol.cmp_angle(-PI, PI), Ordering::Equal);
        assert_eq!(tol.cmp_angle(0.0, 0.1), Ordering::Less);
    }

    #[test]
    fn angle_compare_seam_misses_but_stays_ordered() {
        // Just below +pi and just above -pi describe nearly the same
        // rotation but sit on opposite ends of the normalized interval.
        let tol = Tolerance::DEFAULT;
        let a = PI - 1e-7;
        let b = -PI + 1e-7;
        assert_eq!(tol.cmp_angle(a, b), tol.cmp_angle(b, a).reverse());
        assert_ne!(tol.cmp_angle(a, b), Ordering::Equal);
    }
}
