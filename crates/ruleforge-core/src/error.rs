//! # Error Types
//!
//! Errors raised while building or describing rules. Evaluation failures are
//! not errors: they are reported as [`crate::ValidationViolations`].

use thiserror::Error;

/// Error raised while constructing or describing a rule.
#[derive(Error, Debug)]
pub enum RuleError {
    /// A string pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        /// The pattern source as written in the schema.
        pattern: String,
        /// The underlying regex compilation error.
        #[source]
        source: fancy_regex::Error,
    },

    /// A pattern exceeded its backtracking limit while matching.
    #[error("pattern '{pattern}' could not be evaluated: {source}")]
    PatternEvaluation {
        pattern: String,
        #[source]
        source: fancy_regex::Error,
    },

    /// The rule tree could not be rendered as JSON.
    #[error("rule description failed: {0}")]
    Describe(#[from] serde_json::Error),
}
