#![warn(missing_docs)]

//! geodag — a shared geometry description graph.
//!
//! Builds and persists the spatial hierarchy of a detector-style model:
//! reference-counted DAG nodes, tolerance-based structural
//! canonicalization, a parametrized transform-function algebra, and the
//! textual persistification codec for function trees.
//!
//! # Example
//!
//! ```
//! use geodag::geodag_math::RigidTransform;
//! use geodag::geodag_model::{
//!     Element, FullVolume, GraphNode, LogicalVolume, Material, NodeRef, PhysicalVolume, Shape,
//!     TransformNode,
//! };
//! use geodag::geodag_store::{DedupConfig, SharedStore};
//!
//! let store = SharedStore::new(DedupConfig::all());
//!
//! let si = NodeRef::new(Element::new("Silicon", "Si", 14.0, 28.085));
//! let silicon = NodeRef::new(Material::new("Silicon", 2.33, vec![(si, 1.0)]));
//!
//! // two structurally equal wafers collapse onto one canonical shape
//! let wafer = store.shape(NodeRef::new(Shape::cube(50.0, 50.0, 0.15)));
//! let again = store.shape(NodeRef::new(Shape::cube(50.0, 50.0, 0.15)));
//! assert!(NodeRef::ptr_eq(&wafer, &again));
//!
//! let sensor = NodeRef::new(LogicalVolume::new("Sensor", wafer, silicon));
//! let world = NodeRef::new(PhysicalVolume::new(sensor.clone()));
//!
//! world
//!     .add(GraphNode::Transform(NodeRef::new(TransformNode::new(
//!         RigidTransform::translation(0.0, 0.0, 10.0),
//!     ))))
//!     .unwrap();
//! let placed = world.add_full(FullVolume::new(sensor)).unwrap();
//!
//! let z = placed.absolute_transform().unwrap().translation_vec().z;
//! assert!((z - 10.0).abs() < 1e-12);
//! ```

pub use geodag_funcs;
pub use geodag_math;
pub use geodag_model;
pub use geodag_persist;
pub use geodag_store;
