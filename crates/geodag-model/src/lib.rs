#![warn(missing_docs)]

//! Reference-counted geometry graph nodes for geodag.
//!
//! This crate defines the DAG node family that describes a detector-style
//! spatial hierarchy: shapes, materials, logical volumes, transforms,
//! physical volume placements and small bookkeeping tags. Nodes are
//! shared-owned through [`NodeRef`] handles; placements form a tree-shaped
//! DAG in which ordinary physical volumes may sit under many parents while
//! full physical volumes are pinned to exactly one.
//!
//! External consumers (database writers, visualizers, dumpers) traverse a
//! finished graph exclusively through the [`Visitor`] capability.

mod count;
mod error;
mod material;
mod node;
mod shape;
mod tag;
mod transform;
mod volume;

pub use count::{NodeRef, RefCount, RefCounted};
pub use error::{ModelError, Result};
pub use material::{Element, Material};
pub use node::{GraphNode, Visitor};
pub use shape::{Shape, ShapeKind, ShapeRepr};
pub use tag::{IdentifierTag, NameTag, SerialIdentifier};
pub use transform::{AlignableTransformNode, TransformNode};
pub use volume::{FullPhysicalVolume, FullVolume, LogicalVolume, PhysicalVolume};
