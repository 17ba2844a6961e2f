//! # Error Types
//!
//! Every compile failure aborts the whole compile call: there is no partial
//! rule tree. Each variant carries the location of the schema node being
//! compiled, written as `#/...` for the root document or as the `$ref`
//! string that led into another fragment.

use ruleforge_core::RuleError;
use thiserror::Error;

/// Error raised while compiling a schema into a rule tree.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The top-level arguments are malformed (non-object schema or registry).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A `$ref` names a registry entry or document path that cannot be located.
    #[error("cannot resolve reference '{reference}' at {location}: {reason}")]
    Reference {
        /// The `$ref` string as written.
        reference: String,
        /// Location of the node holding the `$ref`.
        location: String,
        /// Why the lookup failed.
        reason: String,
    },

    /// A node cannot be turned into a rule (unknown `type`, malformed keyword).
    #[error("schema error at {location}: {reason}")]
    Schema {
        /// Location of the offending node.
        location: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `pattern` keyword is not a valid regular expression.
    #[error("pattern error at {location}: {source}")]
    Pattern {
        /// Location of the string node.
        location: String,
        /// The rule-building failure, carrying the regex error.
        #[source]
        source: RuleError,
    },

    /// A `$ref` chain re-enters a reference that is still being expanded.
    #[error("cyclic reference '{reference}' at {location}: {}", .chain.join(" -> "))]
    CyclicReference {
        /// The reference that closed the cycle.
        reference: String,
        /// Location of the node holding that reference.
        location: String,
        /// References being expanded, outermost first, ending with `reference`.
        chain: Vec<String>,
    },
}

impl CompileError {
    pub(crate) fn schema(location: &str, reason: impl Into<String>) -> Self {
        Self::Schema {
            location: location.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn reference(reference: &str, location: &str, reason: impl Into<String>) -> Self {
        Self::Reference {
            reference: reference.to_string(),
            location: location.to_string(),
            reason: reason.into(),
        }
    }
}

/// Error while loading schema documents into a registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A document file could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// IO error while listing the registry directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_reference_display_lists_chain() {
        let err = CompileError::CyclicReference {
            reference: "#/definitions/a".to_string(),
            location: "#/definitions/b".to_string(),
            chain: vec![
                "#/definitions/a".to_string(),
                "#/definitions/b".to_string(),
                "#/definitions/a".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "cyclic reference '#/definitions/a' at #/definitions/b: \
             #/definitions/a -> #/definitions/b -> #/definitions/a"
        );
    }

    #[test]
    fn test_schema_error_display() {
        let err = CompileError::schema("#/properties/x", "could not resolve type: date");
        assert_eq!(
            err.to_string(),
            "schema error at #/properties/x: could not resolve type: date"
        );
    }
}
