#![warn(missing_docs)]

//! Parametrized transform functions for replicated geometry.
//!
//! A [`TransformFn`] is a one-parameter function returning a rigid
//! transform, built from a small combinator algebra. Evaluating one at
//! integer steps generates the per-copy placements of replicated volumes:
//! `Pow(step, Variable)` at x = 0, 1, 2, … walks copy after copy along a
//! fixed step transform.
//!
//! Combinators hold their sub-functions by value: cloning a function tree
//! deep-clones it, unlike the shared-ownership graph nodes elsewhere in
//! geodag. Every scalar operand is one-parameter by construction, so the
//! dimensionality contract needs no run-time check.

mod scalar;
mod xf;

pub use scalar::ScalarFn;
pub use xf::TransformFn;
