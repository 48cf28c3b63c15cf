//! Logical volumes and physical volume placements.
//!
//! A physical volume places a logical volume and owns an ordered child
//! list mixing sub-volumes, transform nodes and tags. Ordinary physical
//! volumes may be shared under many parents; full physical volumes cache
//! their absolute position and are pinned to exactly one owner.

use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use geodag_math::RigidTransform;

use crate::count::{NodeRef, RefCount, RefCounted};
use crate::error::{ModelError, Result};
use crate::material::Material;
use crate::node::GraphNode;
use crate::shape::Shape;

/// An immutable pairing of one shape, one material and a name.
#[derive(Debug)]
pub struct LogicalVolume {
    name: String,
    shape: NodeRef<Shape>,
    material: NodeRef<Material>,
    owners: RefCount,
}

impl LogicalVolume {
    /// Create a logical volume.
    pub fn new(name: impl Into<String>, shape: NodeRef<Shape>, material: NodeRef<Material>) -> Self {
        Self {
            name: name.into(),
            shape,
            material,
            owners: RefCount::new(),
        }
    }

    /// Volume name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shape bounding this volume.
    pub fn shape(&self) -> &NodeRef<Shape> {
        &self.shape
    }

    /// The material filling this volume.
    pub fn material(&self) -> &NodeRef<Material> {
        &self.material
    }
}

impl RefCounted for LogicalVolume {
    fn owner_count(&self) -> &RefCount {
        &self.owners
    }
}

/// Where a placed volume sits in the graph.
///
/// The sharing state machine: `None` → `Parent(..)` on first insertion,
/// `Parent(..)` → `Shared` on the second. Full physical volumes reject
/// the second transition at the point of insertion.
#[derive(Debug, Clone)]
pub(crate) enum ParentLink {
    /// Not yet placed under any parent.
    None,
    /// Placed under exactly one ordinary physical volume.
    Ordinary(Weak<PhysicalVolume>),
    /// Placed under exactly one full physical volume.
    Full(Weak<FullPhysicalVolume>),
    /// Placed under more than one parent; the backlink is no longer unique.
    Shared,
}

/// A shareable placement of a logical volume.
#[derive(Debug)]
pub struct PhysicalVolume {
    log_vol: NodeRef<LogicalVolume>,
    children: RwLock<Vec<GraphNode>>,
    parent: Mutex<ParentLink>,
    owners: RefCount,
}

impl PhysicalVolume {
    /// Create an unplaced physical volume.
    pub fn new(log_vol: NodeRef<LogicalVolume>) -> Self {
        Self {
            log_vol,
            children: RwLock::new(Vec::new()),
            parent: Mutex::new(ParentLink::None),
            owners: RefCount::new(),
        }
    }

    /// The logical volume this placement instantiates.
    pub fn logical_volume(&self) -> &NodeRef<LogicalVolume> {
        &self.log_vol
    }

    /// Snapshot of the ordered child list.
    ///
    /// The clones in the snapshot acquire their nodes for as long as the
    /// snapshot is held.
    pub fn children(&self) -> Vec<GraphNode> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether this volume currently has more than one parent.
    pub fn is_shared(&self) -> bool {
        matches!(
            *self.parent.lock().unwrap_or_else(PoisonError::into_inner),
            ParentLink::Shared
        )
    }

    pub(crate) fn parent_link(&self) -> ParentLink {
        self.parent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RefCounted for PhysicalVolume {
    fn owner_count(&self) -> &RefCount {
        &self.owners
    }
}

/// A placement that caches its absolute position and identifier.
///
/// Full physical volumes must never acquire a second owner: the cached
/// absolute data is only meaningful on a unique path to the root.
#[derive(Debug)]
pub struct FullPhysicalVolume {
    log_vol: NodeRef<LogicalVolume>,
    children: RwLock<Vec<GraphNode>>,
    parent: Mutex<ParentLink>,
    cached_transform: Mutex<Option<RigidTransform>>,
    cached_id: Mutex<Option<Option<i64>>>,
    owners: RefCount,
}

impl FullPhysicalVolume {
    fn new(log_vol: NodeRef<LogicalVolume>) -> Self {
        Self {
            log_vol,
            children: RwLock::new(Vec::new()),
            parent: Mutex::new(ParentLink::None),
            cached_transform: Mutex::new(None),
            cached_id: Mutex::new(None),
            owners: RefCount::new(),
        }
    }

    /// The logical volume this placement instantiates.
    pub fn logical_volume(&self) -> &NodeRef<LogicalVolume> {
        &self.log_vol
    }

    /// Snapshot of the ordered child list.
    pub fn children(&self) -> Vec<GraphNode> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The volume's transform relative to the root of its tree.
    ///
    /// Computed on first use by walking parents to the root, accumulating
    /// the transform nodes that position each volume in its parent's child
    /// list; cached thereafter. Fails if any ordinary volume on the path
    /// is shared — a shared ancestor has no unique path to the root.
    pub fn absolute_transform(&self) -> Result<RigidTransform> {
        let mut cache = self
            .cached_transform
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(t) = &*cache {
            return Ok(t.clone());
        }
        let computed = accumulate_to_root(
            self as *const Self as usize,
            self.parent_link(),
            self.log_vol.name(),
        )?;
        *cache = Some(computed.clone());
        Ok(computed)
    }

    /// The volume's identifier, resolved from the identifier and serial
    /// tags among its siblings; `None` when nothing labels it.
    pub fn absolute_identifier(&self) -> Result<Option<i64>> {
        let mut cache = self
            .cached_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = &*cache {
            return Ok(*id);
        }
        let self_addr = self as *const Self as usize;
        let id = match self.parent_link() {
            ParentLink::None => None,
            ParentLink::Shared => {
                return Err(ModelError::SharedAncestor(self.log_vol.name().to_owned()))
            }
            ParentLink::Ordinary(w) => {
                let parent = w
                    .upgrade()
                    .ok_or_else(|| ModelError::DetachedAncestor(self.log_vol.name().to_owned()))?;
                identifier_among(&parent.children(), self_addr, self.log_vol.name())?
            }
            ParentLink::Full(w) => {
                let parent = w
                    .upgrade()
                    .ok_or_else(|| ModelError::DetachedAncestor(self.log_vol.name().to_owned()))?;
                identifier_among(&parent.children(), self_addr, self.log_vol.name())?
            }
        };
        *cache = Some(id);
        Ok(id)
    }

    /// Drop the cached absolute position and identifier, e.g. after an
    /// alignment update somewhere on the path to the root.
    pub fn clear_cached_position(&self) {
        *self
            .cached_transform
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        *self
            .cached_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub(crate) fn parent_link(&self) -> ParentLink {
        self.parent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RefCounted for FullPhysicalVolume {
    fn owner_count(&self) -> &RefCount {
        &self.owners
    }
}

/// The unique insertion currency for a full physical volume.
///
/// `FullVolume` is deliberately not `Clone`: inserting it into a parent
/// consumes it, so a second owner cannot be expressed on this path. The
/// caller keeps the query handle returned by [`FullVolume::handle`] or by
/// the insertion for the cached-position API.
#[derive(Debug)]
pub struct FullVolume {
    pub(crate) node: NodeRef<FullPhysicalVolume>,
}

impl FullVolume {
    /// Create an unplaced full physical volume.
    pub fn new(log_vol: NodeRef<LogicalVolume>) -> Self {
        Self {
            node: NodeRef::new(FullPhysicalVolume::new(log_vol)),
        }
    }

    /// A query handle onto the volume, for use after placement.
    pub fn handle(&self) -> NodeRef<FullPhysicalVolume> {
        self.node.clone()
    }
}

/// Either flavour of placed volume, used by the upward walk.
#[derive(Clone)]
enum Anchor {
    Ordinary(Arc<PhysicalVolume>),
    Full(Arc<FullPhysicalVolume>),
}

impl Anchor {
    fn addr(&self) -> usize {
        match self {
            Anchor::Ordinary(a) => Arc::as_ptr(a) as usize,
            Anchor::Full(a) => Arc::as_ptr(a) as usize,
        }
    }

    fn name(&self) -> &str {
        match self {
            Anchor::Ordinary(a) => a.log_vol.name(),
            Anchor::Full(a) => a.log_vol.name(),
        }
    }

    fn children(&self) -> Vec<GraphNode> {
        match self {
            Anchor::Ordinary(a) => a.children(),
            Anchor::Full(a) => a.children(),
        }
    }

    fn parent_link(&self) -> ParentLink {
        match self {
            Anchor::Ordinary(a) => a.parent_link(),
            Anchor::Full(a) => a.parent_link(),
        }
    }

    fn push_child(&self, child: GraphNode) {
        let children = match self {
            Anchor::Ordinary(a) => &a.children,
            Anchor::Full(a) => &a.children,
        };
        children
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(child);
    }

    fn downgrade(&self) -> ParentLink {
        match self {
            Anchor::Ordinary(a) => ParentLink::Ordinary(Arc::downgrade(a)),
            Anchor::Full(a) => ParentLink::Full(Arc::downgrade(a)),
        }
    }
}

impl NodeRef<PhysicalVolume> {
    /// Append a child node.
    ///
    /// Ordinary volume children may already have a parent — they become
    /// shared. Full volume children must be unowned; offering an owned one
    /// is rejected here, at the point of insertion.
    pub fn add(&self, child: GraphNode) -> Result<()> {
        attach(&Anchor::Ordinary(self.as_arc().clone()), child)
    }

    /// Place a full physical volume, consuming its insertion currency and
    /// returning the query handle.
    pub fn add_full(&self, child: FullVolume) -> Result<NodeRef<FullPhysicalVolume>> {
        let handle = child.node.clone();
        self.add(GraphNode::Full(child.node))?;
        Ok(handle)
    }
}

impl NodeRef<FullPhysicalVolume> {
    /// Append a child node, with the same sharing rules as for an
    /// ordinary parent volume.
    pub fn add(&self, child: GraphNode) -> Result<()> {
        attach(&Anchor::Full(self.as_arc().clone()), child)
    }

    /// Place a full physical volume, consuming its insertion currency and
    /// returning the query handle.
    pub fn add_full(&self, child: FullVolume) -> Result<NodeRef<FullPhysicalVolume>> {
        let handle = child.node.clone();
        self.add(GraphNode::Full(child.node))?;
        Ok(handle)
    }
}

fn attach(parent: &Anchor, child: GraphNode) -> Result<()> {
    match &child {
        GraphNode::Physical(p) => {
            guard_cycle(parent, p.addr(), p.logical_volume().name())?;
            let mut link = p
                .as_arc()
                .parent
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *link = match &*link {
                ParentLink::None => parent.downgrade(),
                _ => ParentLink::Shared,
            };
        }
        GraphNode::Full(f) => {
            guard_cycle(parent, f.addr(), f.logical_volume().name())?;
            let mut link = f
                .as_arc()
                .parent
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if !matches!(*link, ParentLink::None) {
                return Err(ModelError::FullVolumeShared(
                    f.logical_volume().name().to_owned(),
                ));
            }
            *link = parent.downgrade();
        }
        _ => {}
    }
    parent.push_child(child);
    Ok(())
}

/// Reject a child that is already an ancestor of `parent`.
///
/// The check follows unique parent backlinks; past a shared volume the
/// ancestry is not verifiable and the remainder of the acyclicity
/// invariant is the caller's contract.
fn guard_cycle(parent: &Anchor, child_addr: usize, child_name: &str) -> Result<()> {
    let mut cursor = Some(parent.clone());
    while let Some(anchor) = cursor {
        if anchor.addr() == child_addr {
            return Err(ModelError::cycle(parent.name(), child_name));
        }
        cursor = match anchor.parent_link() {
            ParentLink::None | ParentLink::Shared => None,
            ParentLink::Ordinary(w) => w.upgrade().map(Anchor::Ordinary),
            ParentLink::Full(w) => w.upgrade().map(Anchor::Full),
        };
    }
    Ok(())
}

/// Fold the local transforms from `start`'s position up to the root.
fn accumulate_to_root(
    mut node_addr: usize,
    mut link: ParentLink,
    start_name: &str,
) -> Result<RigidTransform> {
    let mut acc = RigidTransform::identity();
    let mut current_name = start_name.to_owned();
    loop {
        let parent = match link {
            ParentLink::None => return Ok(acc),
            ParentLink::Shared => return Err(ModelError::SharedAncestor(current_name)),
            ParentLink::Ordinary(w) => Anchor::Ordinary(
                w.upgrade()
                    .ok_or_else(|| ModelError::DetachedAncestor(current_name.clone()))?,
            ),
            ParentLink::Full(w) => Anchor::Full(
                w.upgrade()
                    .ok_or_else(|| ModelError::DetachedAncestor(current_name.clone()))?,
            ),
        };
        let local = local_transform_among(&parent.children(), node_addr, &current_name)?;
        acc = local.then(&acc);
        node_addr = parent.addr();
        current_name = parent.name().to_owned();
        link = parent.parent_link();
    }
}

/// The transform positioning `target` within one child list: the product
/// of the transform nodes since the previous placed volume.
fn local_transform_among(
    children: &[GraphNode],
    target_addr: usize,
    target_name: &str,
) -> Result<RigidTransform> {
    let mut pending = RigidTransform::identity();
    for child in children {
        match child {
            GraphNode::Transform(t) => pending = pending.then(t.transform()),
            GraphNode::AlignableTransform(t) => pending = pending.then(&t.current()),
            GraphNode::Physical(p) => {
                if p.addr() == target_addr {
                    return Ok(pending);
                }
                pending = RigidTransform::identity();
            }
            GraphNode::Full(p) => {
                if p.addr() == target_addr {
                    return Ok(pending);
                }
                pending = RigidTransform::identity();
            }
            _ => {}
        }
    }
    Err(ModelError::MissingChild(target_name.to_owned()))
}

/// Resolve `target`'s identifier from the tags among its siblings.
fn identifier_among(
    children: &[GraphNode],
    target_addr: usize,
    target_name: &str,
) -> Result<Option<i64>> {
    let mut pending: Option<i64> = None;
    let mut serial: Option<(i64, i64)> = None;
    for child in children {
        let placed_addr = match child {
            GraphNode::Identifier(t) => {
                pending = Some(t.id());
                continue;
            }
            GraphNode::Serial(s) => {
                serial = Some((s.base_id(), 0));
                pending = None;
                continue;
            }
            GraphNode::Physical(p) => p.addr(),
            GraphNode::Full(p) => p.addr(),
            _ => continue,
        };
        let id = pending.take().or(serial.map(|(base, k)| base + k));
        if placed_addr == target_addr {
            return Ok(id);
        }
        if let Some((_, k)) = &mut serial {
            *k += 1;
        }
    }
    Err(ModelError::MissingChild(target_name.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Element;
    use crate::tag::{IdentifierTag, SerialIdentifier};
    use crate::transform::TransformNode;
    use geodag_math::Point3;

    fn test_logvol(name: &str) -> NodeRef<LogicalVolume> {
        let fe = NodeRef::new(Element::new("Iron", "Fe", 26.0, 55.845));
        let mat = NodeRef::new(Material::new("Steel", 7.9, vec![(fe, 1.0)]));
        let shape = NodeRef::new(Shape::cube(10.0, 10.0, 10.0));
        NodeRef::new(LogicalVolume::new(name, shape, mat))
    }

    fn xf(dx: f64) -> GraphNode {
        GraphNode::Transform(NodeRef::new(TransformNode::new(
            RigidTransform::translation(dx, 0.0, 0.0),
        )))
    }

    #[test]
    fn ordinary_volume_may_be_shared() {
        let child = NodeRef::new(PhysicalVolume::new(test_logvol("leaf")));
        let p1 = NodeRef::new(PhysicalVolume::new(test_logvol("p1")));
        let p2 = NodeRef::new(PhysicalVolume::new(test_logvol("p2")));

        p1.add(GraphNode::Physical(child.clone())).unwrap();
        assert!(!child.is_shared());
        p2.add(GraphNode::Physical(child.clone())).unwrap();
        assert!(child.is_shared());

        // both parents observe the same child identity
        let c1 = &p1.children()[0];
        let c2 = &p2.children()[0];
        match (c1, c2) {
            (GraphNode::Physical(a), GraphNode::Physical(b)) => {
                assert!(NodeRef::ptr_eq(a, b));
            }
            _ => panic!("expected physical children"),
        }
    }

    #[test]
    fn full_volume_rejects_second_owner() {
        let root = NodeRef::new(PhysicalVolume::new(test_logvol("root")));
        let other = NodeRef::new(PhysicalVolume::new(test_logvol("other")));
        let fv = FullVolume::new(test_logvol("full"));
        let handle = root.add_full(fv).unwrap();

        let err = other.add(GraphNode::Full(handle.clone())).unwrap_err();
        assert!(matches!(err, ModelError::FullVolumeShared(_)));
        assert_eq!(other.child_count(), 0);
        assert_eq!(root.child_count(), 1);
    }

    #[test]
    fn absolute_transform_accumulates_to_root() {
        let root = NodeRef::new(PhysicalVolume::new(test_logvol("root")));
        let mid = NodeRef::new(PhysicalVolume::new(test_logvol("mid")));

        root.add(xf(100.0)).unwrap();
        root.add(GraphNode::Physical(mid.clone())).unwrap();

        mid.add(xf(10.0)).unwrap();
        mid.add(xf(1.0)).unwrap();
        let leaf = mid.add_full(FullVolume::new(test_logvol("leaf"))).unwrap();

        let abs = leaf.absolute_transform().unwrap();
        let p = abs.apply_point(&Point3::new(0.0, 0.0, 0.0));
        assert!((p.x - 111.0).abs() < 1e-12);
    }

    #[test]
    fn transforms_reset_after_each_placed_volume() {
        let root = NodeRef::new(PhysicalVolume::new(test_logvol("root")));
        let first = NodeRef::new(PhysicalVolume::new(test_logvol("first")));

        root.add(xf(5.0)).unwrap();
        root.add(GraphNode::Physical(first)).unwrap();
        let second = root.add_full(FullVolume::new(test_logvol("second"))).unwrap();

        // the 5 mm step was consumed by `first`; `second` sits at the origin
        let abs = second.absolute_transform().unwrap();
        assert!(abs.translation_vec().norm() < 1e-12);
    }

    #[test]
    fn walk_fails_through_shared_ancestor() {
        let shared = NodeRef::new(PhysicalVolume::new(test_logvol("shared")));
        let leaf = shared.add_full(FullVolume::new(test_logvol("leaf"))).unwrap();

        let p1 = NodeRef::new(PhysicalVolume::new(test_logvol("p1")));
        let p2 = NodeRef::new(PhysicalVolume::new(test_logvol("p2")));
        p1.add(GraphNode::Physical(shared.clone())).unwrap();
        p2.add(GraphNode::Physical(shared.clone())).unwrap();

        let err = leaf.absolute_transform().unwrap_err();
        assert!(matches!(err, ModelError::SharedAncestor(_)));
    }

    #[test]
    fn cached_transform_is_stable_and_clearable() {
        let root = NodeRef::new(PhysicalVolume::new(test_logvol("root")));
        root.add(xf(2.0)).unwrap();
        let leaf = root.add_full(FullVolume::new(test_logvol("leaf"))).unwrap();

        let a = leaf.absolute_transform().unwrap();
        let b = leaf.absolute_transform().unwrap();
        assert_eq!(a, b);

        leaf.clear_cached_position();
        let c = leaf.absolute_transform().unwrap();
        assert_eq!(a, c);
    }

    #[test]
    fn identifier_from_tag_and_serial() {
        let root = NodeRef::new(PhysicalVolume::new(test_logvol("root")));

        root.add(GraphNode::Identifier(NodeRef::new(IdentifierTag::new(42))))
            .unwrap();
        let tagged = root.add_full(FullVolume::new(test_logvol("tagged"))).unwrap();

        root.add(GraphNode::Serial(NodeRef::new(SerialIdentifier::new(100))))
            .unwrap();
        let s0 = root.add_full(FullVolume::new(test_logvol("s0"))).unwrap();
        let s1 = root.add_full(FullVolume::new(test_logvol("s1"))).unwrap();

        assert_eq!(tagged.absolute_identifier().unwrap(), Some(42));
        assert_eq!(s0.absolute_identifier().unwrap(), Some(100));
        assert_eq!(s1.absolute_identifier().unwrap(), Some(101));
    }

    #[test]
    fn unlabelled_volume_has_no_identifier() {
        let root = NodeRef::new(PhysicalVolume::new(test_logvol("root")));
        let leaf = root.add_full(FullVolume::new(test_logvol("leaf"))).unwrap();
        assert_eq!(leaf.absolute_identifier().unwrap(), None);
    }

    #[test]
    fn self_insertion_is_a_cycle() {
        let pv = NodeRef::new(PhysicalVolume::new(test_logvol("pv")));
        let err = pv.add(GraphNode::Physical(pv.clone())).unwrap_err();
        assert!(matches!(err, ModelError::Cycle { .. }));
    }

    #[test]
    fn ancestor_insertion_is_a_cycle() {
        let root = NodeRef::new(PhysicalVolume::new(test_logvol("root")));
        let mid = NodeRef::new(PhysicalVolume::new(test_logvol("mid")));
        root.add(GraphNode::Physical(mid.clone())).unwrap();

        let err = mid.add(GraphNode::Physical(root.clone())).unwrap_err();
        assert!(matches!(err, ModelError::Cycle { .. }));
    }

    #[test]
    fn alignment_shifts_the_recomputed_position() {
        let root = NodeRef::new(PhysicalVolume::new(test_logvol("root")));
        let align = NodeRef::new(crate::transform::AlignableTransformNode::new(
            RigidTransform::translation(10.0, 0.0, 0.0),
        ));
        root.add(GraphNode::AlignableTransform(align.clone())).unwrap();
        let leaf = root.add_full(FullVolume::new(test_logvol("leaf"))).unwrap();

        let before = leaf.absolute_transform().unwrap();
        assert!((before.translation_vec().x - 10.0).abs() < 1e-12);

        align.set_delta(RigidTransform::translation(0.25, 0.0, 0.0));
        leaf.clear_cached_position();
        let after = leaf.absolute_transform().unwrap();
        assert!((after.translation_vec().x - 10.25).abs() < 1e-12);
    }
}
