//! Shapes: primitive solids and boolean composites.

use std::f64::consts::PI;

use geodag_math::RigidTransform;

use crate::count::{NodeRef, RefCount, RefCounted};

/// Shape kind code, used by the structural sorter to order shapes of
/// different kinds before any parameter is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShapeKind {
    /// Axis-aligned box given by half-lengths.
    Box,
    /// Full tube (hollow cylinder) along Z.
    Tube,
    /// Tube segment with an angular span.
    Tubs,
    /// Conical frustum, possibly hollow.
    Cone,
    /// Trapezoid: a box whose X/Y half-lengths vary linearly in Z.
    Trd,
    /// Boolean union of two operands.
    Union,
    /// Boolean intersection of two operands.
    Intersection,
    /// Boolean subtraction (left minus right).
    Subtraction,
    /// A single operand displaced by a rigid transform.
    Shift,
}

/// The structural payload of a [`Shape`].
///
/// Primitive parameters are half-lengths (mm) and angles (radians).
/// Composites own their operands; a shifted operand embeds the rigid
/// transform applied to it.
#[derive(Debug)]
pub enum ShapeRepr {
    /// Axis-aligned box with half-lengths `(dx, dy, dz)`.
    Box {
        /// Half-length along X.
        dx: f64,
        /// Half-length along Y.
        dy: f64,
        /// Half-length along Z.
        dz: f64,
    },
    /// Hollow cylinder along Z.
    Tube {
        /// Inner radius.
        rmin: f64,
        /// Outer radius.
        rmax: f64,
        /// Half-length along Z.
        zhalf: f64,
    },
    /// Tube segment spanning `dphi` radians starting at `sphi`.
    Tubs {
        /// Inner radius.
        rmin: f64,
        /// Outer radius.
        rmax: f64,
        /// Half-length along Z.
        zhalf: f64,
        /// Start angle of the segment.
        sphi: f64,
        /// Angular span of the segment.
        dphi: f64,
    },
    /// Conical frustum between two Z faces, possibly hollow.
    Cone {
        /// Inner radius at -zhalf.
        rmin1: f64,
        /// Outer radius at -zhalf.
        rmax1: f64,
        /// Inner radius at +zhalf.
        rmin2: f64,
        /// Outer radius at +zhalf.
        rmax2: f64,
        /// Half-length along Z.
        zhalf: f64,
    },
    /// Trapezoid with X/Y half-lengths interpolated linearly in Z.
    Trd {
        /// X half-length at -zhalf.
        dx1: f64,
        /// X half-length at +zhalf.
        dx2: f64,
        /// Y half-length at -zhalf.
        dy1: f64,
        /// Y half-length at +zhalf.
        dy2: f64,
        /// Half-length along Z.
        zhalf: f64,
    },
    /// Boolean union of two shapes.
    Union {
        /// Left operand.
        left: NodeRef<Shape>,
        /// Right operand.
        right: NodeRef<Shape>,
    },
    /// Boolean intersection of two shapes.
    Intersection {
        /// Left operand.
        left: NodeRef<Shape>,
        /// Right operand.
        right: NodeRef<Shape>,
    },
    /// Boolean subtraction: left minus right.
    Subtraction {
        /// Left operand (base).
        left: NodeRef<Shape>,
        /// Right operand (subtracted).
        right: NodeRef<Shape>,
    },
    /// One operand displaced by a rigid transform.
    Shift {
        /// The displaced operand.
        operand: NodeRef<Shape>,
        /// The embedded displacement.
        shift: RigidTransform,
    },
}

/// An immutable shape node: a primitive solid or a boolean composite.
#[derive(Debug)]
pub struct Shape {
    repr: ShapeRepr,
    owners: RefCount,
}

impl Shape {
    fn from_repr(repr: ShapeRepr) -> Self {
        Self {
            repr,
            owners: RefCount::new(),
        }
    }

    /// Axis-aligned box with half-lengths `(dx, dy, dz)`.
    pub fn cube(dx: f64, dy: f64, dz: f64) -> Self {
        Self::from_repr(ShapeRepr::Box { dx, dy, dz })
    }

    /// Hollow cylinder along Z.
    pub fn tube(rmin: f64, rmax: f64, zhalf: f64) -> Self {
        Self::from_repr(ShapeRepr::Tube { rmin, rmax, zhalf })
    }

    /// Tube segment spanning `dphi` radians starting at `sphi`.
    pub fn tubs(rmin: f64, rmax: f64, zhalf: f64, sphi: f64, dphi: f64) -> Self {
        Self::from_repr(ShapeRepr::Tubs {
            rmin,
            rmax,
            zhalf,
            sphi,
            dphi,
        })
    }

    /// Conical frustum, possibly hollow.
    pub fn cone(rmin1: f64, rmax1: f64, rmin2: f64, rmax2: f64, zhalf: f64) -> Self {
        Self::from_repr(ShapeRepr::Cone {
            rmin1,
            rmax1,
            rmin2,
            rmax2,
            zhalf,
        })
    }

    /// Trapezoid with X/Y half-lengths interpolated linearly in Z.
    pub fn trd(dx1: f64, dx2: f64, dy1: f64, dy2: f64, zhalf: f64) -> Self {
        Self::from_repr(ShapeRepr::Trd {
            dx1,
            dx2,
            dy1,
            dy2,
            zhalf,
        })
    }

    /// Boolean union of two shapes.
    pub fn union(left: NodeRef<Shape>, right: NodeRef<Shape>) -> Self {
        Self::from_repr(ShapeRepr::Union { left, right })
    }

    /// Boolean intersection of two shapes.
    pub fn intersection(left: NodeRef<Shape>, right: NodeRef<Shape>) -> Self {
        Self::from_repr(ShapeRepr::Intersection { left, right })
    }

    /// Boolean subtraction: `left` minus `right`.
    pub fn subtraction(left: NodeRef<Shape>, right: NodeRef<Shape>) -> Self {
        Self::from_repr(ShapeRepr::Subtraction { left, right })
    }

    /// Displace a shape by a rigid transform.
    pub fn shift(operand: NodeRef<Shape>, shift: RigidTransform) -> Self {
        Self::from_repr(ShapeRepr::Shift { operand, shift })
    }

    /// The structural payload.
    pub fn repr(&self) -> &ShapeRepr {
        &self.repr
    }

    /// The kind code for this shape.
    pub fn kind(&self) -> ShapeKind {
        match self.repr {
            ShapeRepr::Box { .. } => ShapeKind::Box,
            ShapeRepr::Tube { .. } => ShapeKind::Tube,
            ShapeRepr::Tubs { .. } => ShapeKind::Tubs,
            ShapeRepr::Cone { .. } => ShapeKind::Cone,
            ShapeRepr::Trd { .. } => ShapeKind::Trd,
            ShapeRepr::Union { .. } => ShapeKind::Union,
            ShapeRepr::Intersection { .. } => ShapeKind::Intersection,
            ShapeRepr::Subtraction { .. } => ShapeKind::Subtraction,
            ShapeRepr::Shift { .. } => ShapeKind::Shift,
        }
    }

    /// Analytic volume for primitives and shifted primitives.
    ///
    /// Boolean composites return `None` — evaluating their volume would
    /// need a CSG kernel, which this crate deliberately is not.
    pub fn volume(&self) -> Option<f64> {
        match &self.repr {
            ShapeRepr::Box { dx, dy, dz } => Some(8.0 * dx * dy * dz),
            ShapeRepr::Tube { rmin, rmax, zhalf } => {
                Some(2.0 * PI * (rmax * rmax - rmin * rmin) * zhalf)
            }
            ShapeRepr::Tubs {
                rmin,
                rmax,
                zhalf,
                dphi,
                ..
            } => Some(dphi * (rmax * rmax - rmin * rmin) * zhalf),
            ShapeRepr::Cone {
                rmin1,
                rmax1,
                rmin2,
                rmax2,
                zhalf,
            } => {
                let frustum = |r1: f64, r2: f64| r1 * r1 + r1 * r2 + r2 * r2;
                Some(2.0 * zhalf * PI / 3.0 * (frustum(*rmax1, *rmax2) - frustum(*rmin1, *rmin2)))
            }
            ShapeRepr::Trd {
                dx1,
                dx2,
                dy1,
                dy2,
                zhalf,
            } => {
                // Integrate the linearly interpolated cross-section over Z.
                let bx = dx2 - dx1;
                let by = dy2 - dy1;
                Some(8.0 * zhalf * (dx1 * dy1 + (dx1 * by + dy1 * bx) / 2.0 + bx * by / 3.0))
            }
            ShapeRepr::Shift { operand, .. } => operand.volume(),
            ShapeRepr::Union { .. }
            | ShapeRepr::Intersection { .. }
            | ShapeRepr::Subtraction { .. } => None,
        }
    }
}

impl RefCounted for Shape {
    fn owner_count(&self) -> &RefCount {
        &self.owners
    }
}
