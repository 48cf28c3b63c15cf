//! Error types for persistification.

use thiserror::Error;

/// Errors raised while decoding a persisted function.
///
/// Every variant is fatal and names the offending fragment; a decode
/// failure means the record is corrupt or was written by an incompatible
/// writer, and the core never guesses its way past either.
#[derive(Error, Debug)]
pub enum PersistError {
    /// A keyword with no registered reader.
    #[error("unknown function keyword '{keyword}' in '{fragment}'")]
    UnknownKeyword {
        /// The unrecognized keyword.
        keyword: String,
        /// The fragment it headed.
        fragment: String,
    },

    /// Unbalanced or misplaced brackets.
    #[error("malformed nesting in '{0}'")]
    MalformedNesting(String),

    /// A fragment that is neither a placeholder nor a function call.
    #[error("unparsable fragment '{0}'")]
    BadFragment(String),

    /// A keyword applied to the wrong number of arguments.
    #[error("'{keyword}' takes {expected} arguments, found {found} in '{fragment}'")]
    BadArity {
        /// The keyword.
        keyword: String,
        /// Number of arguments the keyword takes.
        expected: usize,
        /// Number of arguments present.
        found: usize,
        /// The offending fragment.
        fragment: String,
    },

    /// The literal queue ran out before the placeholders did.
    #[error("literal queue exhausted while decoding '{0}'")]
    LiteralUnderflow(String),

    /// Literals were left over after the last placeholder.
    #[error("{0} literals left over after decoding")]
    LiteralOverflow(usize),
}

impl PersistError {
    /// Create an unknown-keyword error.
    pub fn unknown_keyword(keyword: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::UnknownKeyword {
            keyword: keyword.into(),
            fragment: fragment.into(),
        }
    }

    /// Create a wrong-arity error.
    pub fn bad_arity(
        keyword: impl Into<String>,
        expected: usize,
        found: usize,
        fragment: impl Into<String>,
    ) -> Self {
        Self::BadArity {
            keyword: keyword.into(),
            expected,
            found,
            fragment: fragment.into(),
        }
    }
}

/// Result type for persistification operations.
pub type Result<T> = std::result::Result<T, PersistError>;
