//! # ruleforge-schema — Schema to Rule Compiler
//!
//! Compiles a JSON Schema document (draft-04 style subset) into a
//! [`ruleforge_core::Rule`] tree that can validate JSON values.
//!
//! ## Compilation (`resolver`, `builders`)
//!
//! [`compile`] walks the schema depth-first. Each node is classified once
//! by [`node::SchemaNode::parse`] and then dispatched on its `type`
//! (`array`, `boolean`, `integer`, `number`, `object`, `string`) to a
//! builder. `$ref` nodes are replaced by the fragment they point at, `enum`
//! nodes become value enumerations, and nodes with none of these accept any
//! value (logged at `warn`).
//!
//! Supported keywords: `properties`, `required`, `minProperties`,
//! `maxProperties`, `items` (single schema), `minItems`, `maxItems`,
//! `uniqueItems`, `minimum`, `maximum`, `pattern`, `minLength`, `maxLength`.
//! Everything else is ignored.
//!
//! ## References (`reference`, `registry`)
//!
//! `$ref` strings of the form `#/path` resolve against the root document;
//! `<id>#/path` resolve against a document in the [`SchemaRegistry`]. A
//! registry can be built from a JSON object or loaded from a directory of
//! JSON/YAML files.
//!
//! ## Crate Policy
//!
//! - Depends only on `ruleforge-core` internally.
//! - Compilation is fail-fast: any [`CompileError`] aborts the call with no
//!   partial tree.
//! - No I/O during compilation. Registry loading happens beforehand.

pub mod builders;
pub mod error;
pub mod node;
pub mod options;
pub mod reference;
pub mod registry;
pub mod resolver;

pub use error::{CompileError, RegistryError};
pub use node::SchemaType;
pub use options::{CompileOptions, UntypedPolicy};
pub use reference::Reference;
pub use registry::SchemaRegistry;
pub use resolver::{ResolveContext, Resolver};

use ruleforge_core::Rule;
use serde_json::Value;

/// Compile `schema` into a rule tree with default options.
///
/// `registry`, when supplied, must be a JSON object mapping document ids to
/// schema documents.
///
/// # Errors
///
/// Returns [`CompileError::InvalidArgument`] if `schema` or `registry` is
/// not an object, and any other [`CompileError`] raised while resolving the
/// schema.
pub fn compile(schema: &Value, registry: Option<&Value>) -> Result<Rule, CompileError> {
    let registry = registry.map(SchemaRegistry::from_value).transpose()?;
    compile_with(schema, registry.as_ref(), &CompileOptions::default())
}

/// Compile `schema` against a prepared registry with explicit options.
///
/// # Errors
///
/// See [`compile`].
pub fn compile_with(
    schema: &Value,
    registry: Option<&SchemaRegistry>,
    options: &CompileOptions,
) -> Result<Rule, CompileError> {
    if !schema.is_object() {
        return Err(CompileError::InvalidArgument(
            "expected schema to be an object".to_string(),
        ));
    }

    tracing::debug!(
        registered = registry.map_or(0, SchemaRegistry::len),
        untyped = ?options.untyped,
        detect_cycles = options.detect_cycles,
        "compiling schema"
    );

    let cx = ResolveContext::new(schema, registry, options);
    let rule = Resolver::new(cx).resolve(schema, resolver::ROOT_LOCATION)?;

    tracing::debug!(kind = %rule.kind(), "compiled schema");
    Ok(rule)
}
