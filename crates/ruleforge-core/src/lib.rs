//! # ruleforge-core — Validation Rule Tree
//!
//! This crate defines the artifact that schema compilation produces: an
//! immutable tree of [`Rule`] nodes, one per schema node, each carrying a
//! type bound plus its refinements (bounds, patterns, uniqueness, declared
//! keys). It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One enum, exhaustive matches.** [`Rule`] has exactly one variant per
//!    rule kind. The evaluator and the describer both `match` on it, so a new
//!    kind forces every consumer to handle it.
//!
//! 2. **Consuming builders.** Refinements are applied with `self`-consuming
//!    methods (`NumRule::new().integer().min(0.0)`). Once a rule is placed in
//!    a tree nothing can mutate it.
//!
//! 3. **Patterns compile at build time.** [`StrRule::pattern`] compiles the
//!    regular expression immediately and returns [`RuleError::Pattern`] on
//!    failure, so a bad pattern can never reach evaluation.
//!
//! 4. **Structural equality.** Enumerations and `unique` arrays compare values
//!    with [`json_equal`], where numbers compare numerically.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ruleforge-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod equality;
pub mod error;
pub mod rule;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use equality::json_equal;
pub use error::RuleError;
pub use rule::{
    AnyRule, ArrRule, BoolRule, KeyRule, NumRule, ObjRule, Pattern, Rule, RuleKind, StrRule,
};
pub use validate::{ValidationViolations, Violation, ViolationCode};
