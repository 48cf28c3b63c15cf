#![warn(missing_docs)]

//! Textual persistification for geodag transform functions.
//!
//! A function tree flattens to a [`PersistedFunction`]: a grammar string
//! of the form `Identifier "(" Arg ("," Arg)* ")"` plus a positional
//! literal queue. Numeric arguments never appear in the string — each one
//! is written as the placeholder token `#` and its value pushed onto the
//! queue in traversal order; a rigid transform is twelve placeholders
//! (rotation block row-major, then translation). Decoding pops the queue
//! in the same order, so writer and reader agree on a purely positional
//! channel and the round trip is bit-exact.
//!
//! One grammar serves both the scalar and the transform algebra; each
//! argument position knows which algebra it expects, so overlapping
//! keywords such as `Product` stay unambiguous. Any unrecognized keyword,
//! literal-queue mismatch or malformed nesting is a fatal decode error
//! naming the offending fragment.

mod decode;
mod encode;
mod error;
mod record;

pub use decode::{decode_scalar, decode_transform};
pub use encode::{encode_scalar, encode_transform};
pub use error::{PersistError, Result};
pub use record::PersistedFunction;
