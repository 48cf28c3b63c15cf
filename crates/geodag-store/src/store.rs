//! Canonicalization stores.
//!
//! A store keeps one ordered set per node kind, keyed by the structural
//! sorters. Offering a candidate either finds an existing structural equal
//! (the candidate is dropped and the canonical instance returned) or
//! inserts the candidate as the new canonical instance.
//!
//! Shape, transform, name and serial-id sets are process-wide and safe to
//! share across threads — each kind is serialized through its own lock, so
//! at most one canonical instance survives per equivalence class even
//! under a race, while distinct kinds proceed fully in parallel. Logical
//! and physical volume sets live per builder and need no locking, unless a
//! builder explicitly routes them to the shared store.
//!
//! The sets retain plain `Arc`s rather than owning handles: retention
//! keeps a canonical node's memory alive without inflating the owner
//! count that the sharing invariants observe, and it makes [`SharedStore::clear`]
//! incapable of invalidating a live tree — any tree still referencing a
//! canonical node keeps it alive on its own.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use geodag_math::Tolerance;
use geodag_model::{
    LogicalVolume, NameTag, NodeRef, PhysicalVolume, RefCounted, SerialIdentifier, Shape,
    TransformNode,
};

use crate::sort::{cmp_logical, cmp_physical, cmp_rigid, cmp_shapes};

/// Per-kind deduplication switches, all off by default.
///
/// Alignable transforms are never offered: the store has no entry point
/// for them, so there is no switch to get wrong.
#[derive(Debug, Clone, Copy, Default)]
pub struct DedupConfig {
    /// Deduplicate shapes.
    pub shapes: bool,
    /// Deduplicate non-alignable transforms.
    pub transforms: bool,
    /// Deduplicate logical volumes.
    pub logical_volumes: bool,
    /// Deduplicate ordinary physical volumes.
    pub physical_volumes: bool,
}

impl DedupConfig {
    /// Every switch on — the configuration used by deduplicating builds.
    pub fn all() -> Self {
        Self {
            shapes: true,
            transforms: true,
            logical_volumes: true,
            physical_volumes: true,
        }
    }
}

/// One kind's ordered canonical set.
///
/// When the kind is disabled, `canonicalize` passes every candidate
/// through untouched but still records retention in a holding list, so
/// the store shares ownership either way.
struct CanonicalSet<T: RefCounted> {
    enabled: bool,
    entries: Vec<Arc<T>>,
    held: Vec<Arc<T>>,
}

impl<T: RefCounted> CanonicalSet<T> {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: Vec::new(),
            held: Vec::new(),
        }
    }

    fn canonicalize(
        &mut self,
        candidate: NodeRef<T>,
        cmp: impl Fn(&T, &T) -> Ordering,
    ) -> NodeRef<T> {
        if !self.enabled {
            self.held.push(candidate.as_arc().clone());
            return candidate;
        }
        match self
            .entries
            .binary_search_by(|probe| cmp(probe, &candidate))
        {
            Ok(found) => NodeRef::adopt(self.entries[found].clone()),
            Err(slot) => {
                self.entries.insert(slot, candidate.as_arc().clone());
                candidate
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.held.clear();
    }
}

/// The process-wide canonicalization store.
///
/// Holds the shape, transform, name and serial-id sets shared across
/// unrelated geometry branches, plus the logical/physical sets a builder
/// may opt into globally. Create one per process (or per independent
/// build domain) and pass it explicitly — there is no hidden singleton.
pub struct SharedStore {
    tolerance: Tolerance,
    config: DedupConfig,
    shapes: Mutex<CanonicalSet<Shape>>,
    transforms: Mutex<CanonicalSet<TransformNode>>,
    logical: Mutex<CanonicalSet<LogicalVolume>>,
    physical: Mutex<CanonicalSet<PhysicalVolume>>,
    names: Mutex<BTreeMap<String, Arc<NameTag>>>,
    serials: Mutex<BTreeMap<i64, Arc<SerialIdentifier>>>,
}

impl SharedStore {
    /// Create a store with the default tolerances.
    pub fn new(config: DedupConfig) -> Self {
        Self::with_tolerance(config, Tolerance::DEFAULT)
    }

    /// Create a store with explicit tolerances.
    pub fn with_tolerance(config: DedupConfig, tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            config,
            shapes: Mutex::new(CanonicalSet::new(config.shapes)),
            transforms: Mutex::new(CanonicalSet::new(config.transforms)),
            logical: Mutex::new(CanonicalSet::new(config.logical_volumes)),
            physical: Mutex::new(CanonicalSet::new(config.physical_volumes)),
            names: Mutex::new(BTreeMap::new()),
            serials: Mutex::new(BTreeMap::new()),
        }
    }

    /// The tolerances the sorters run with.
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// The deduplication switches this store was built with.
    pub fn config(&self) -> DedupConfig {
        self.config
    }

    /// Canonicalize a shape.
    pub fn shape(&self, candidate: NodeRef<Shape>) -> NodeRef<Shape> {
        let tol = self.tolerance;
        self.shapes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .canonicalize(candidate, |a, b| cmp_shapes(a, b, &tol))
    }

    /// Canonicalize a fixed transform node.
    pub fn transform(&self, candidate: NodeRef<TransformNode>) -> NodeRef<TransformNode> {
        let tol = self.tolerance;
        self.transforms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .canonicalize(candidate, |a, b| {
                cmp_rigid(a.transform(), b.transform(), &tol)
            })
    }

    /// Canonicalize a logical volume in the shared (opt-in) set.
    pub fn logical_volume(&self, candidate: NodeRef<LogicalVolume>) -> NodeRef<LogicalVolume> {
        let tol = self.tolerance;
        self.logical
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .canonicalize(candidate, |a, b| cmp_logical(a, b, &tol))
    }

    /// Canonicalize an ordinary physical volume in the shared (opt-in) set.
    pub fn physical_volume(&self, candidate: NodeRef<PhysicalVolume>) -> NodeRef<PhysicalVolume> {
        self.physical
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .canonicalize(candidate, cmp_physical)
    }

    /// Intern a name tag: one canonical tag per distinct name.
    pub fn intern_name(&self, name: &str) -> NodeRef<NameTag> {
        let mut names = self.names.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = names.get(name) {
            return NodeRef::adopt(existing.clone());
        }
        let tag = NodeRef::new(NameTag::new(name));
        names.insert(name.to_owned(), tag.as_arc().clone());
        tag
    }

    /// Intern a serial identifier: one canonical node per base value.
    pub fn intern_serial_id(&self, base_id: i64) -> NodeRef<SerialIdentifier> {
        let mut serials = self.serials.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = serials.get(&base_id) {
            return NodeRef::adopt(existing.clone());
        }
        let tag = NodeRef::new(SerialIdentifier::new(base_id));
        serials.insert(base_id, tag.as_arc().clone());
        tag
    }

    /// Number of canonical shapes currently interned.
    pub fn shape_count(&self) -> usize {
        self.shapes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of canonical transforms currently interned.
    pub fn transform_count(&self) -> usize {
        self.transforms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Empty every set, between independent builds.
    ///
    /// Canonical instances still referenced by a live tree stay alive
    /// through the tree's own handles; subsequent builds simply start
    /// interning from scratch.
    pub fn clear(&self) {
        self.shapes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.transforms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.logical
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.physical
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.serials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// A per-builder store: unlocked logical/physical volume sets on top of a
/// shared store, with optional routing of either kind to the shared sets.
pub struct BuilderStore {
    shared: Arc<SharedStore>,
    logical: CanonicalSet<LogicalVolume>,
    physical: CanonicalSet<PhysicalVolume>,
    global_logical: bool,
    global_physical: bool,
}

impl BuilderStore {
    /// A builder store with per-builder logical/physical sets.
    pub fn new(shared: Arc<SharedStore>) -> Self {
        let config = shared.config();
        Self {
            logical: CanonicalSet::new(config.logical_volumes),
            physical: CanonicalSet::new(config.physical_volumes),
            global_logical: false,
            global_physical: false,
            shared,
        }
    }

    /// A builder store routing the given kinds to the shared store, for
    /// builds that want cross-builder sharing of volumes.
    pub fn with_global_kinds(shared: Arc<SharedStore>, logical: bool, physical: bool) -> Self {
        let mut store = Self::new(shared);
        store.global_logical = logical;
        store.global_physical = physical;
        store
    }

    /// Canonicalize a shape (always in the shared store).
    pub fn shape(&self, candidate: NodeRef<Shape>) -> NodeRef<Shape> {
        self.shared.shape(candidate)
    }

    /// Canonicalize a fixed transform (always in the shared store).
    pub fn transform(&self, candidate: NodeRef<TransformNode>) -> NodeRef<TransformNode> {
        self.shared.transform(candidate)
    }

    /// Intern a name tag (always in the shared store).
    pub fn intern_name(&self, name: &str) -> NodeRef<NameTag> {
        self.shared.intern_name(name)
    }

    /// Intern a serial identifier (always in the shared store).
    pub fn intern_serial_id(&self, base_id: i64) -> NodeRef<SerialIdentifier> {
        self.shared.intern_serial_id(base_id)
    }

    /// Canonicalize a logical volume.
    pub fn logical_volume(&mut self, candidate: NodeRef<LogicalVolume>) -> NodeRef<LogicalVolume> {
        if self.global_logical {
            return self.shared.logical_volume(candidate);
        }
        let tol = *self.shared.tolerance();
        self.logical
            .canonicalize(candidate, |a, b| cmp_logical(a, b, &tol))
    }

    /// Canonicalize an ordinary physical volume.
    pub fn physical_volume(&mut self, candidate: NodeRef<PhysicalVolume>) -> NodeRef<PhysicalVolume> {
        if self.global_physical {
            return self.shared.physical_volume(candidate);
        }
        self.physical.canonicalize(candidate, cmp_physical)
    }
}
