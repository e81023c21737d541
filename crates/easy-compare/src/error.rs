//! Error types for structural comparison
//!
//! Only contract violations are errors. A tree that simply does not match
//! comes back as a negative [`MatchResult`](crate::MatchResult).

use thiserror::Error;

/// Result type for comparison operations
pub type CompareResult<T> = Result<T, CompareError>;

/// Errors that can occur while comparing two mapping trees
#[derive(Debug, Error)]
pub enum CompareError {
    /// A top-level input is not a mapping
    #[error("only mapping trees can be compared, {side} is {found}")]
    NotAMapping { side: &'static str, found: &'static str },

    /// A value could not be converted into a mapping tree
    #[error("failed to convert {side} into a mapping tree: {source}")]
    Serialize {
        side: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An expected leaf is not a valid regular expression
    #[error("invalid pattern '{pattern}' at {path}: {source}")]
    InvalidPattern {
        path: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Recursion went deeper than the configured limit
    #[error("comparison exceeded maximum depth {max_depth} at {path}")]
    DepthExceeded { max_depth: usize, path: String },
}
