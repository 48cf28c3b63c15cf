//! Error types for graph construction and traversal.

use thiserror::Error;

/// Errors raised by graph construction and the absolute-position walk.
///
/// Every variant is an invariant violation: the core never retries and
/// never degrades silently, so callers should treat any of these as a bug
/// in input data or build order.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A full physical volume was offered a second owner.
    #[error("full physical volume '{0}' already has an owner")]
    FullVolumeShared(String),

    /// The absolute-position walk met a shared ordinary volume.
    #[error("absolute-position walk through shared volume '{0}'")]
    SharedAncestor(String),

    /// Inserting the child would make it its own ancestor.
    #[error("inserting '{child}' under '{parent}' would create a cycle")]
    Cycle {
        /// Name of the would-be parent volume.
        parent: String,
        /// Name of the offending child volume.
        child: String,
    },

    /// A parent on the walk has been dropped out from under its child.
    #[error("volume '{0}' is detached from its parent tree")]
    DetachedAncestor(String),

    /// A volume's parent does not list it as a child.
    #[error("volume '{0}' not found among its parent's children")]
    MissingChild(String),
}

impl ModelError {
    /// Create a cycle error.
    pub fn cycle(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::Cycle {
            parent: parent.into(),
            child: child.into(),
        }
    }
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, ModelError>;
