//! The persisted record: grammar string plus positional literal queue.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A persisted function tree.
///
/// `expression` carries the structure, `literals` the numeric payload in
/// traversal order. The pair is the unit that database writers store and
/// load; the JSON helpers are a convenience for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedFunction {
    /// The grammar string, e.g. `Pow(#,#,#,#,#,#,#,#,#,#,#,#,Variable)`.
    pub expression: String,
    /// The literal values consumed by the placeholders, front to back.
    pub literals: VecDeque<f64>,
}

impl PersistedFunction {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
