//! The closed graph-node union and the visitor capability.

use crate::count::NodeRef;
use crate::shape::Shape;
use crate::tag::{IdentifierTag, NameTag, SerialIdentifier};
use crate::transform::{AlignableTransformNode, TransformNode};
use crate::volume::{FullPhysicalVolume, PhysicalVolume};

/// Any element of the geometry graph.
///
/// The set of node kinds is closed: external consumers dispatch over it
/// through [`Visitor`] and exhaustive matching, never by downcasting.
#[derive(Debug, Clone)]
pub enum GraphNode {
    /// A shape node.
    Shape(NodeRef<Shape>),
    /// A fixed transform node.
    Transform(NodeRef<TransformNode>),
    /// A run-time alignable transform node.
    AlignableTransform(NodeRef<AlignableTransformNode>),
    /// A shareable physical volume placement.
    Physical(NodeRef<PhysicalVolume>),
    /// A full physical volume placement (single-owner, caching).
    Full(NodeRef<FullPhysicalVolume>),
    /// A name tag.
    Name(NodeRef<NameTag>),
    /// An identifier tag.
    Identifier(NodeRef<IdentifierTag>),
    /// A serial identifier.
    Serial(NodeRef<SerialIdentifier>),
}

/// Double-dispatch callbacks, one per concrete node kind.
///
/// This is the only interface through which database writers, exporters
/// and dumpers observe a finished graph. All callbacks default to no-ops
/// so a visitor implements just the kinds it cares about.
pub trait Visitor {
    /// Called for a shape node.
    fn shape(&mut self, _node: &NodeRef<Shape>) {}

    /// Called for a fixed transform node.
    fn transform(&mut self, _node: &NodeRef<TransformNode>) {}

    /// Called for an alignable transform node.
    fn alignable_transform(&mut self, _node: &NodeRef<AlignableTransformNode>) {}

    /// Called for an ordinary physical volume.
    fn physical_volume(&mut self, _node: &NodeRef<PhysicalVolume>) {}

    /// Called for a full physical volume.
    fn full_physical_volume(&mut self, _node: &NodeRef<FullPhysicalVolume>) {}

    /// Called for a name tag.
    fn name_tag(&mut self, _node: &NodeRef<NameTag>) {}

    /// Called for an identifier tag.
    fn identifier_tag(&mut self, _node: &NodeRef<IdentifierTag>) {}

    /// Called for a serial identifier.
    fn serial_identifier(&mut self, _node: &NodeRef<SerialIdentifier>) {}
}

impl GraphNode {
    /// Dispatch to the visitor callback for this node's concrete kind.
    pub fn accept(&self, visitor: &mut dyn Visitor) {
        match self {
            GraphNode::Shape(n) => visitor.shape(n),
            GraphNode::Transform(n) => visitor.transform(n),
            GraphNode::AlignableTransform(n) => visitor.alignable_transform(n),
            GraphNode::Physical(n) => visitor.physical_volume(n),
            GraphNode::Full(n) => visitor.full_physical_volume(n),
            GraphNode::Name(n) => visitor.name_tag(n),
            GraphNode::Identifier(n) => visitor.identifier_tag(n),
            GraphNode::Serial(n) => visitor.serial_identifier(n),
        }
    }

    /// Visit this node, then descend depth-first into volume children.
    pub fn walk(&self, visitor: &mut dyn Visitor) {
        self.accept(visitor);
        let children = match self {
            GraphNode::Physical(n) => n.children(),
            GraphNode::Full(n) => n.children(),
            _ => return,
        };
        for child in &children {
            child.walk(visitor);
        }
    }
}

impl From<NodeRef<Shape>> for GraphNode {
    fn from(n: NodeRef<Shape>) -> Self {
        GraphNode::Shape(n)
    }
}

impl From<NodeRef<TransformNode>> for GraphNode {
    fn from(n: NodeRef<TransformNode>) -> Self {
        GraphNode::Transform(n)
    }
}

impl From<NodeRef<AlignableTransformNode>> for GraphNode {
    fn from(n: NodeRef<AlignableTransformNode>) -> Self {
        GraphNode::AlignableTransform(n)
    }
}

impl From<NodeRef<PhysicalVolume>> for GraphNode {
    fn from(n: NodeRef<PhysicalVolume>) -> Self {
        GraphNode::Physical(n)
    }
}

impl From<NodeRef<FullPhysicalVolume>> for GraphNode {
    fn from(n: NodeRef<FullPhysicalVolume>) -> Self {
        GraphNode::Full(n)
    }
}

impl From<NodeRef<NameTag>> for GraphNode {
    fn from(n: NodeRef<NameTag>) -> Self {
        GraphNode::Name(n)
    }
}

impl From<NodeRef<IdentifierTag>> for GraphNode {
    fn from(n: NodeRef<IdentifierTag>) -> Self {
        GraphNode::Identifier(n)
    }
}

impl From<NodeRef<SerialIdentifier>> for GraphNode {
    fn from(n: NodeRef<SerialIdentifier>) -> Self {
        GraphNode::Serial(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Element, Material};
    use crate::volume::LogicalVolume;
    use geodag_math::RigidTransform;

    #[derive(Default)]
    struct Census {
        shapes: usize,
        transforms: usize,
        physicals: usize,
        fulls: usize,
        names: usize,
    }

    impl Visitor for Census {
        fn shape(&mut self, _node: &NodeRef<Shape>) {
            self.shapes += 1;
        }
        fn transform(&mut self, _node: &NodeRef<TransformNode>) {
            self.transforms += 1;
        }
        fn physical_volume(&mut self, _node: &NodeRef<PhysicalVolume>) {
            self.physicals += 1;
        }
        fn full_physical_volume(&mut self, _node: &NodeRef<FullPhysicalVolume>) {
            self.fulls += 1;
        }
        fn name_tag(&mut self, _node: &NodeRef<NameTag>) {
            self.names += 1;
        }
    }

    fn test_logvol(name: &str) -> NodeRef<LogicalVolume> {
        let al = NodeRef::new(Element::new("Aluminium", "Al", 13.0, 26.98));
        let mat = NodeRef::new(Material::new("Alu", 2.7, vec![(al, 1.0)]));
        let shape = NodeRef::new(Shape::cube(1.0, 1.0, 1.0));
        NodeRef::new(LogicalVolume::new(name, shape, mat))
    }

    #[test]
    fn walk_counts_every_node_kind_it_meets() {
        let root = NodeRef::new(PhysicalVolume::new(test_logvol("root")));
        root.add(GraphNode::Name(NodeRef::new(NameTag::new("daughter"))))
            .unwrap();
        root.add(GraphNode::Transform(NodeRef::new(TransformNode::new(
            RigidTransform::translation(1.0, 0.0, 0.0),
        ))))
        .unwrap();

        let inner = NodeRef::new(PhysicalVolume::new(test_logvol("inner")));
        root.add(GraphNode::Physical(inner.clone())).unwrap();
        inner
            .add_full(crate::volume::FullVolume::new(test_logvol("leaf")))
            .unwrap();

        let mut census = Census::default();
        GraphNode::Physical(root).walk(&mut census);

        assert_eq!(census.physicals, 2);
        assert_eq!(census.fulls, 1);
        assert_eq!(census.transforms, 1);
        assert_eq!(census.names, 1);
        assert_eq!(census.shapes, 0); // shapes live on logical volumes, not in child lists
    }

    #[test]
    fn accept_does_not_descend() {
        let root = NodeRef::new(PhysicalVolume::new(test_logvol("root")));
        let inner = NodeRef::new(PhysicalVolume::new(test_logvol("inner")));
        root.add(GraphNode::Physical(inner)).unwrap();

        let mut census = Census::default();
        GraphNode::Physical(root).accept(&mut census);
        assert_eq!(census.physicals, 1);
    }
}
