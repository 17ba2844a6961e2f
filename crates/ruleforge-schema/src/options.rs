//! # Compile Options
//!
//! Policy knobs for the compiler. Options deserialize from JSON or YAML
//! (missing fields take their defaults), so host applications can keep them
//! alongside the rest of their configuration.

use serde::{Deserialize, Serialize};

/// What to do with a node that has none of `type`, `$ref` or `enum`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UntypedPolicy {
    /// Accept any value and emit a `tracing` warning.
    #[default]
    Warn,
    /// Fail the compile with [`crate::CompileError::Schema`].
    Reject,
}

/// Options for a compile call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Handling of untyped nodes.
    pub untyped: UntypedPolicy,
    /// Fail with [`crate::CompileError::CyclicReference`] when a `$ref`
    /// chain re-enters itself. When disabled a cyclic chain recurses until
    /// the stack is exhausted.
    pub detect_cycles: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            untyped: UntypedPolicy::Warn,
            detect_cycles: true,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_untyped(mut self, policy: UntypedPolicy) -> Self {
        self.untyped = policy;
        self
    }

    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }
}
