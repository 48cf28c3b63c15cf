#![warn(missing_docs)]

//! Structural sorters and canonicalization stores for geodag.
//!
//! The sorters define tolerance-aware total orders over shapes, materials,
//! logical volumes and rigid transforms. The stores use those orders to
//! hash-cons structurally equivalent nodes: offer a candidate, get back the
//! one canonical instance for its equivalence class.
//!
//! The orders exist for canonicalization only — they are never a statement
//! about geometric correctness.

mod sort;
mod store;

pub use sort::{
    cmp_elements, cmp_logical, cmp_materials, cmp_physical, cmp_rigid, cmp_shapes,
};
pub use store::{BuilderStore, DedupConfig, SharedStore};
