//! Intrusive ownership counting and the owning node handle.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// An atomic ownership counter embedded in every graph node.
///
/// A freshly constructed node has a count of zero and may be dropped
/// directly by its creator. The count only moves through [`NodeRef`]
/// handles, which acquire on creation/clone and release on drop — so a
/// release below zero cannot be expressed by safe use of the API.
#[derive(Debug, Default)]
pub struct RefCount(AtomicUsize);

impl RefCount {
    /// A new counter, starting at zero.
    pub fn new() -> Self {
        Self(AtomicUsize::new(0))
    }

    /// Increment and return the new count.
    pub fn acquire(&self) -> usize {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrement and return the new count.
    ///
    /// Callers must hold a previously acquired reference; the owning
    /// handle type guarantees this.
    pub fn release(&self) -> usize {
        let prev = self.0.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "owner count released below zero");
        prev - 1
    }

    /// Current count.
    pub fn count(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }
}

/// Implemented by every node kind that can be shared-owned.
pub trait RefCounted {
    /// The node's embedded ownership counter.
    fn owner_count(&self) -> &RefCount;
}

/// Owning handle to a shared graph node.
///
/// Cloning acquires the node's ownership counter, dropping releases it;
/// the node's memory itself rides on [`Arc`], so canonicalization stores
/// may retain uncounted `Arc`s without inflating the owner count that the
/// sharing invariants observe.
pub struct NodeRef<T: RefCounted> {
    inner: Arc<T>,
}

impl<T: RefCounted> NodeRef<T> {
    /// Wrap a freshly built node into its first owning handle.
    pub fn new(value: T) -> Self {
        Self::adopt(Arc::new(value))
    }

    /// Acquire an owning handle onto an already-shared node.
    pub fn adopt(inner: Arc<T>) -> Self {
        inner.owner_count().acquire();
        Self { inner }
    }

    /// Number of owning handles currently alive for this node.
    pub fn owners(&self) -> usize {
        self.inner.owner_count().count()
    }

    /// Whether two handles designate the same node.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// The underlying shared allocation.
    pub fn as_arc(&self) -> &Arc<T> {
        &self.inner
    }

    /// Stable address of the node, used for identity-based orderings.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl<T: RefCounted> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        Self::adopt(self.inner.clone())
    }
}

impl<T: RefCounted> Drop for NodeRef<T> {
    fn drop(&mut self) {
        self.inner.owner_count().release();
    }
}

impl<T: RefCounted> Deref for NodeRef<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: RefCounted + fmt::Debug> fmt::Debug for NodeRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}
