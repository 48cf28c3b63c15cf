//! Tolerance-aware total orders over the node kinds.
//!
//! Each compare quantizes its numeric components onto a tolerance grid
//! (see `geodag_math::cmp_quantized`), so every order here is genuinely
//! total, antisymmetric and transitive — including near tolerance
//! boundaries, where naive `|a - b| < tol` comparison breaks transitivity.
//!
//! Alignable transforms never take part in any of these orders: the store
//! has no entry point for them, so a run-time-mutable transform can never
//! compare equal to anything but itself.

use std::cmp::Ordering;

use geodag_math::{cmp_quantized, RigidTransform, Tolerance};
use geodag_model::{Element, GraphNode, LogicalVolume, Material, PhysicalVolume, Shape, ShapeRepr};

/// Absolute tolerance for material density comparison.
const DENSITY_TOLERANCE: f64 = 1e-9;

/// Exact order on elements: atomic number, then atomic weight.
pub fn cmp_elements(a: &Element, b: &Element) -> Ordering {
    a.atomic_number()
        .total_cmp(&b.atomic_number())
        .then_with(|| a.atomic_weight().total_cmp(&b.atomic_weight()))
}

/// Order on materials: component count, density within tolerance, then
/// each `(fraction, element)` pair in storage order.
pub fn cmp_materials(a: &Material, b: &Material) -> Ordering {
    let by_count = a.num_components().cmp(&b.num_components());
    if by_count != Ordering::Equal {
        return by_count;
    }
    let by_density = cmp_quantized(a.density(), b.density(), DENSITY_TOLERANCE);
    if by_density != Ordering::Equal {
        return by_density;
    }
    for ((ea, fa), (eb, fb)) in a.components().iter().zip(b.components()) {
        let by_fraction = fa.total_cmp(fb);
        if by_fraction != Ordering::Equal {
            return by_fraction;
        }
        let by_element = cmp_elements(ea, eb);
        if by_element != Ordering::Equal {
            return by_element;
        }
    }
    Ordering::Equal
}

/// Order on rigid transforms: translation component-wise on the linear
/// grid, then Euler angles on the angular grid.
pub fn cmp_rigid(a: &RigidTransform, b: &RigidTransform, tol: &Tolerance) -> Ordering {
    let ta = a.translation_vec();
    let tb = b.translation_vec();
    let by_translation = tol
        .cmp_length(ta.x, tb.x)
        .then_with(|| tol.cmp_length(ta.y, tb.y))
        .then_with(|| tol.cmp_length(ta.z, tb.z));
    if by_translation != Ordering::Equal {
        return by_translation;
    }
    let (ra, pa, ya) = a.euler_angles();
    let (rb, pb, yb) = b.euler_angles();
    tol.cmp_angle(ra, rb)
        .then_with(|| tol.cmp_angle(pa, pb))
        .then_with(|| tol.cmp_angle(ya, yb))
}

/// Order on shapes: kind code first (distinct kinds never compare equal),
/// then declared parameters within the length/angle tolerances; boolean
/// composites recurse into both operands and shifts into the operand plus
/// the embedded transform.
pub fn cmp_shapes(a: &Shape, b: &Shape, tol: &Tolerance) -> Ordering {
    let by_kind = a.kind().cmp(&b.kind());
    if by_kind != Ordering::Equal {
        return by_kind;
    }
    match (a.repr(), b.repr()) {
        (
            ShapeRepr::Box { dx, dy, dz },
            ShapeRepr::Box {
                dx: ex,
                dy: ey,
                dz: ez,
            },
        ) => tol
            .cmp_length(*dx, *ex)
            .then_with(|| tol.cmp_length(*dy, *ey))
            .then_with(|| tol.cmp_length(*dz, *ez)),
        (
            ShapeRepr::Tube { rmin, rmax, zhalf },
            ShapeRepr::Tube {
                rmin: sn,
                rmax: sx,
                zhalf: sz,
            },
        ) => tol
            .cmp_length(*rmin, *sn)
            .then_with(|| tol.cmp_length(*rmax, *sx))
            .then_with(|| tol.cmp_length(*zhalf, *sz)),
        (
            ShapeRepr::Tubs {
                rmin,
                rmax,
                zhalf,
                sphi,
                dphi,
            },
            ShapeRepr::Tubs {
                rmin: sn,
                rmax: sx,
                zhalf: sz,
                sphi: sp,
                dphi: dp,
            },
        ) => tol
            .cmp_length(*rmin, *sn)
            .then_with(|| tol.cmp_length(*rmax, *sx))
            .then_with(|| tol.cmp_length(*zhalf, *sz))
            .then_with(|| tol.cmp_angle(*sphi, *sp))
            .then_with(|| tol.cmp_angle(*dphi, *dp)),
        (
            ShapeRepr::Cone {
                rmin1,
                rmax1,
                rmin2,
                rmax2,
                zhalf,
            },
            ShapeRepr::Cone {
                rmin1: n1,
                rmax1: x1,
                rmin2: n2,
                rmax2: x2,
                zhalf: sz,
            },
        ) => tol
            .cmp_length(*rmin1, *n1)
            .then_with(|| tol.cmp_length(*rmax1, *x1))
            .then_with(|| tol.cmp_length(*rmin2, *n2))
            .then_with(|| tol.cmp_length(*rmax2, *x2))
            .then_with(|| tol.cmp_length(*zhalf, *sz)),
        (
            ShapeRepr::Trd {
                dx1,
                dx2,
                dy1,
                dy2,
                zhalf,
            },
            ShapeRepr::Trd {
                dx1: a1,
                dx2: a2,
                dy1: b1,
                dy2: b2,
                zhalf: sz,
            },
        ) => tol
            .cmp_length(*dx1, *a1)
            .then_with(|| tol.cmp_length(*dx2, *a2))
            .then_with(|| tol.cmp_length(*dy1, *b1))
            .then_with(|| tol.cmp_length(*dy2, *b2))
            .then_with(|| tol.cmp_length(*zhalf, *sz)),
        (
            ShapeRepr::Union { left, right },
            ShapeRepr::Union {
                left: l2,
                right: r2,
            },
        )
        | (
            ShapeRepr::Intersection { left, right },
            ShapeRepr::Intersection {
                left: l2,
                right: r2,
            },
        )
        | (
            ShapeRepr::Subtraction { left, right },
            ShapeRepr::Subtraction {
                left: l2,
                right: r2,
            },
        ) => cmp_shapes(left, l2, tol).then_with(|| cmp_shapes(right, r2, tol)),
        (
            ShapeRepr::Shift { operand, shift },
            ShapeRepr::Shift {
                operand: o2,
                shift: s2,
            },
        ) => cmp_shapes(operand, o2, tol).then_with(|| cmp_rigid(shift, s2, tol)),
        // kind codes matched above, so the variants are identical
        _ => unreachable!("shape kind codes disagree with representations"),
    }
}

/// Order on logical volumes: material identity (pointer order, not
/// structural equality), then shape order.
pub fn cmp_logical(a: &LogicalVolume, b: &LogicalVolume, tol: &Tolerance) -> Ordering {
    a.material()
        .addr()
        .cmp(&b.material().addr())
        .then_with(|| cmp_shapes(a.shape(), b.shape(), tol))
}

/// Order on physical volumes: logical-volume identity, then child count,
/// then per-child identity in list order.
pub fn cmp_physical(a: &PhysicalVolume, b: &PhysicalVolume) -> Ordering {
    let by_logvol = a.logical_volume().addr().cmp(&b.logical_volume().addr());
    if by_logvol != Ordering::Equal {
        return by_logvol;
    }
    let ca = a.children();
    let cb = b.children();
    let by_count = ca.len().cmp(&cb.len());
    if by_count != Ordering::Equal {
        return by_count;
    }
    for (x, y) in ca.iter().zip(&cb) {
        let by_child = node_identity(x).cmp(&node_identity(y));
        if by_child != Ordering::Equal {
            return by_child;
        }
    }
    Ordering::Equal
}

/// Kind rank plus node address, the identity key for child comparison.
fn node_identity(n: &GraphNode) -> (u8, usize) {
    match n {
        GraphNode::Shape(r) => (0, r.addr()),
        GraphNode::Transform(r) => (1, r.addr()),
        GraphNode::AlignableTransform(r) => (2, r.addr()),
        GraphNode::Physical(r) => (3, r.addr()),
        GraphNode::Full(r) => (4, r.addr()),
        GraphNode::Name(r) => (5, r.addr()),
        GraphNode::Identifier(r) => (6, r.addr()),
        GraphNode::Serial(r) => (7, r.addr()),
    }
}
