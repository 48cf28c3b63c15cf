//! Transform nodes: fixed and alignable.

use std::sync::{Mutex, PoisonError};

use geodag_math::RigidTransform;

use crate::count::{RefCount, RefCounted};

/// A fixed rigid-transform node.
///
/// Transform nodes appear in a physical volume's child list and position
/// the volume that follows them; several in a row compose in list order.
#[derive(Debug)]
pub struct TransformNode {
    transform: RigidTransform,
    owners: RefCount,
}

impl TransformNode {
    /// Create a transform node.
    pub fn new(transform: RigidTransform) -> Self {
        Self {
            transform,
            owners: RefCount::new(),
        }
    }

    /// The rigid transform this node applies.
    pub fn transform(&self) -> &RigidTransform {
        &self.transform
    }
}

impl RefCounted for TransformNode {
    fn owner_count(&self) -> &RefCount {
        &self.owners
    }
}

/// A transform node whose value can be corrected at run time.
///
/// The node caches a default transform and an alignment delta applied on
/// top of it. The delta is mutated in place by an external alignment path,
/// which is why alignable transforms are permanently excluded from
/// canonicalization and why traversal must not race alignment updates —
/// that exclusion is the caller's responsibility.
#[derive(Debug)]
pub struct AlignableTransformNode {
    default: RigidTransform,
    delta: Mutex<Option<RigidTransform>>,
    owners: RefCount,
}

impl AlignableTransformNode {
    /// Create an alignable transform with the given default value.
    pub fn new(default: RigidTransform) -> Self {
        Self {
            default,
            delta: Mutex::new(None),
            owners: RefCount::new(),
        }
    }

    /// The default transform, with no alignment applied.
    pub fn default_transform(&self) -> &RigidTransform {
        &self.default
    }

    /// Install an alignment correction, applied in the local frame.
    pub fn set_delta(&self, delta: RigidTransform) {
        *self.delta.lock().unwrap_or_else(PoisonError::into_inner) = Some(delta);
    }

    /// Remove any alignment correction.
    pub fn clear_delta(&self) {
        *self.delta.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The current transform: default composed with the alignment delta.
    pub fn current(&self) -> RigidTransform {
        let delta = self.delta.lock().unwrap_or_else(PoisonError::into_inner);
        match &*delta {
            Some(d) => self.default.then(d),
            None => self.default.clone(),
        }
    }
}

impl RefCounted for AlignableTransformNode {
    fn owner_count(&self) -> &RefCount {
        &self.owners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodag_math::Point3;

    #[test]
    fn alignable_applies_delta_in_local_frame() {
        let node = AlignableTransformNode::new(RigidTransform::translation(10.0, 0.0, 0.0));
        let p = Point3::new(0.0, 0.0, 0.0);
        assert!((node.current().apply_point(&p).x - 10.0).abs() < 1e-12);

        node.set_delta(RigidTransform::translation(0.5, 0.0, 0.0));
        assert!((node.current().apply_point(&p).x - 10.5).abs() < 1e-12);

        node.clear_delta();
        assert!((node.current().apply_point(&p).x - 10.0).abs() < 1e-12);
    }
}
