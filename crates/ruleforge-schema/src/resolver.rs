//! # Schema Resolution
//!
//! Depth-first walk turning a schema document into a [`Rule`] tree.
//!
//! ## Resolution Order
//!
//! For each node, [`Resolver::resolve`] takes the first matching path:
//!
//! 1. `type` present: dispatch to the type builder (see [`crate::builders`]).
//! 2. `$ref` present: locate the target fragment and resolve it in turn.
//! 3. `enum` present: any value structurally equal to one of the listed values.
//! 4. Otherwise: any value, with a warning (or an error under
//!    [`UntypedPolicy::Reject`]).
//!
//! ## References
//!
//! `#/...` references, and every reference when no registry is supplied,
//! walk the root document. `<id>#/...` references walk the registered
//! document named by `<id>`. A relative reference found inside a
//! registered document still walks the root document.
//!
//! The resolver tracks the references currently being expanded. A reference
//! that re-enters that chain fails with [`CompileError::CyclicReference`];
//! the same reference used by sibling subtrees is not a cycle.

use ruleforge_core::{AnyRule, Rule};
use serde_json::Value;

use crate::error::CompileError;
use crate::node::{SchemaNode, SchemaType};
use crate::options::{CompileOptions, UntypedPolicy};
use crate::reference::Reference;
use crate::registry::SchemaRegistry;

/// Location of the root document in error messages and logs.
pub const ROOT_LOCATION: &str = "#";

/// Read-only inputs shared by every step of one compile call.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// The document being compiled; target of local references.
    pub root: &'a Value,
    /// Registered documents for `<id>#...` references.
    pub registry: Option<&'a SchemaRegistry>,
    pub options: &'a CompileOptions,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        root: &'a Value,
        registry: Option<&'a SchemaRegistry>,
        options: &'a CompileOptions,
    ) -> Self {
        Self {
            root,
            registry,
            options,
        }
    }
}

/// One compile call's walk state: the shared context plus the chain of
/// references currently being expanded.
#[derive(Debug)]
pub struct Resolver<'a> {
    pub(crate) cx: ResolveContext<'a>,
    active_refs: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(cx: ResolveContext<'a>) -> Self {
        Self {
            cx,
            active_refs: Vec::new(),
        }
    }

    /// Resolve `node` (found at `location`) into a rule.
    pub fn resolve(&mut self, node: &'a Value, location: &str) -> Result<Rule, CompileError> {
        match SchemaNode::parse(node, location)? {
            SchemaNode::Typed {
                schema_type,
                keywords,
            } => self.dispatch(schema_type, keywords, location),
            SchemaNode::Ref(reference) => self.resolve_ref_node(reference, location),
            SchemaNode::Enum(values) => Ok(AnyRule::new().valid(values.to_vec()).into()),
            SchemaNode::Untyped => match self.cx.options.untyped {
                UntypedPolicy::Warn => {
                    tracing::warn!(
                        location,
                        node = %node,
                        "schema node has no 'type', '$ref' or 'enum'; accepting any value"
                    );
                    Ok(Rule::any())
                }
                UntypedPolicy::Reject => Err(CompileError::schema(
                    location,
                    "schema node has no 'type', '$ref' or 'enum'",
                )),
            },
        }
    }

    /// Build the rule for a node with a recognized `type`.
    pub fn dispatch(
        &mut self,
        schema_type: SchemaType,
        keywords: &'a serde_json::Map<String, Value>,
        location: &str,
    ) -> Result<Rule, CompileError> {
        tracing::trace!(location, schema_type = %schema_type, "dispatching schema node");
        match schema_type {
            SchemaType::Array => self.build_array(keywords, location),
            SchemaType::Boolean => Ok(Rule::boolean()),
            SchemaType::Integer | SchemaType::Number => {
                Ok(crate::builders::build_number(keywords, schema_type))
            }
            SchemaType::Object => self.build_object(keywords, location),
            SchemaType::String => crate::builders::build_string(keywords, location),
        }
    }

    fn resolve_ref_node(
        &mut self,
        reference: &'a str,
        location: &str,
    ) -> Result<Rule, CompileError> {
        if self.cx.options.detect_cycles && self.active_refs.iter().any(|r| r == reference) {
            let mut chain = self.active_refs.clone();
            chain.push(reference.to_string());
            return Err(CompileError::CyclicReference {
                reference: reference.to_string(),
                location: location.to_string(),
                chain,
            });
        }

        let target = self.resolve_ref(reference, location)?;

        let target_location = if reference.is_empty() {
            ROOT_LOCATION
        } else {
            reference
        };
        self.active_refs.push(reference.to_string());
        let rule = self.resolve(target, target_location);
        self.active_refs.pop();
        rule
    }

    /// Locate the fragment `reference` points at.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Reference`] if the registry has no document
    /// for the reference's id, or the path does not lead to a fragment.
    pub fn resolve_ref(
        &self,
        reference: &'a str,
        location: &str,
    ) -> Result<&'a Value, CompileError> {
        let parsed = Reference::parse(reference);

        let (document, external) = match self.cx.registry {
            Some(registry) if !parsed.is_local() => {
                let document = registry.lookup(&parsed).ok_or_else(|| {
                    CompileError::reference(
                        reference,
                        location,
                        format!("no registered schema for '{}'", parsed.id),
                    )
                })?;
                (document, true)
            }
            _ => (self.cx.root, false),
        };

        let fragment = parsed.path.walk(document).ok_or_else(|| {
            CompileError::reference(reference, location, "path does not exist in target schema")
        })?;

        tracing::debug!(reference, location, external, "resolved schema reference");
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruleforge_core::RuleKind;
    use serde_json::json;

    fn resolve_with(
        root: &Value,
        registry: Option<&SchemaRegistry>,
        options: &CompileOptions,
    ) -> Result<Rule, CompileError> {
        Resolver::new(ResolveContext::new(root, registry, options)).resolve(root, ROOT_LOCATION)
    }

    fn resolve(root: &Value) -> Result<Rule, CompileError> {
        resolve_with(root, None, &CompileOptions::default())
    }

    #[test]
    fn test_dispatch_matches_declared_type() {
        for (t, kind) in [
            ("boolean", RuleKind::Boolean),
            ("integer", RuleKind::Integer),
            ("number", RuleKind::Number),
            ("string", RuleKind::String),
            ("object", RuleKind::Object),
        ] {
            let rule = resolve(&json!({ "type": t })).unwrap();
            assert_eq!(rule.kind(), kind, "type {t}");
        }
        let rule = resolve(&json!({"type": "array", "items": {"type": "string"}})).unwrap();
        assert_eq!(rule.kind(), RuleKind::Array);
    }

    #[test]
    fn test_enum_only_node_restricts_values() {
        let rule = resolve(&json!({"enum": ["a", "b"]})).unwrap();
        assert!(rule.is_valid(&json!("a")));
        assert!(!rule.is_valid(&json!("c")));
    }

    #[test]
    fn test_local_reference_resolves_against_root() {
        let root = json!({
            "definitions": {"name": {"type": "string", "minLength": 1}},
            "$ref": "#/definitions/name"
        });
        let rule = resolve(&root).unwrap();
        assert_eq!(rule.kind(), RuleKind::String);
        assert!(!rule.is_valid(&json!("")));
    }

    #[test]
    fn test_reference_without_registry_walks_root() {
        let root = json!({
            "definitions": {"n": {"type": "number"}},
            "$ref": "urn:whatever#/definitions/n"
        });
        assert_eq!(resolve(&root).unwrap().kind(), RuleKind::Number);
    }

    #[test]
    fn test_missing_path_is_a_reference_error() {
        let root = json!({"$ref": "#/definitions/missing"});
        let err = resolve(&root).unwrap_err();
        match err {
            CompileError::Reference { reference, location, .. } => {
                assert_eq!(reference, "#/definitions/missing");
                assert_eq!(location, "#");
            }
            other => panic!("Expected Reference error, got: {other}"),
        }
    }

    #[test]
    fn test_external_reference_uses_registry() {
        let registry = SchemaRegistry::from_value(&json!({
            "urn:shapes#": {"definitions": {"point": {"type": "array", "items": {"type": "number"}}}}
        }))
        .unwrap();
        let root = json!({"$ref": "urn:shapes#/definitions/point"});
        let rule = resolve_with(&root, Some(&registry), &CompileOptions::default()).unwrap();
        assert!(rule.is_valid(&json!([1, 2.5])));
        assert!(!rule.is_valid(&json!(["x"])));
    }

    #[test]
    fn test_relative_reference_inside_registered_document_walks_root() {
        let registry = SchemaRegistry::from_value(&json!({
            "urn:ext#": {"$ref": "#/definitions/local"}
        }))
        .unwrap();
        let root = json!({
            "definitions": {"local": {"type": "boolean"}},
            "$ref": "urn:ext#"
        });
        let rule = resolve_with(&root, Some(&registry), &CompileOptions::default()).unwrap();
        assert_eq!(rule.kind(), RuleKind::Boolean);
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let root = json!({
            "definitions": {
                "a": {"$ref": "#/definitions/b"},
                "b": {"$ref": "#/definitions/a"}
            },
            "$ref": "#/definitions/a"
        });
        match resolve(&root).unwrap_err() {
            CompileError::CyclicReference { reference, chain, .. } => {
                assert_eq!(reference, "#/definitions/a");
                assert_eq!(
                    chain,
                    vec!["#/definitions/a", "#/definitions/b", "#/definitions/a"]
                );
            }
            other => panic!("Expected CyclicReference, got: {other}"),
        }
    }

    #[test]
    fn test_recursive_property_is_a_cycle() {
        let root = json!({
            "definitions": {
                "tree": {
                    "type": "object",
                    "properties": {"child": {"$ref": "#/definitions/tree"}}
                }
            },
            "$ref": "#/definitions/tree"
        });
        assert!(matches!(
            resolve(&root).unwrap_err(),
            CompileError::CyclicReference { .. }
        ));
    }

    #[test]
    fn test_sibling_reuse_is_not_a_cycle() {
        let root = json!({
            "definitions": {"id": {"type": "string"}},
            "type": "object",
            "properties": {
                "a": {"$ref": "#/definitions/id"},
                "b": {"$ref": "#/definitions/id"}
            }
        });
        let rule = resolve(&root).unwrap();
        assert!(rule.is_valid(&json!({"a": "x", "b": "y"})));
    }

    #[test]
    fn test_falsy_dispatch_keywords_degrade_to_any() {
        for root in [
            json!({"$ref": ""}),
            json!({"type": ""}),
            json!({"type": false, "$ref": ""}),
        ] {
            let rule = resolve(&root).unwrap();
            assert_eq!(rule.kind(), RuleKind::Any, "schema {root}");
            assert!(rule.is_valid(&json!({"anything": [1, 2]})));
        }
    }

    #[test]
    fn test_scalar_enum_allows_only_that_value() {
        let rule = resolve(&json!({"enum": "a"})).unwrap();
        assert!(rule.is_valid(&json!("a")));
        assert!(!rule.is_valid(&json!("b")));
        assert!(!rule.is_valid(&json!(["a"])));
    }

    #[test]
    fn test_untyped_node_rejected_under_reject_policy() {
        let options = CompileOptions::new().with_untyped(UntypedPolicy::Reject);
        let root = json!({"type": "object", "properties": {"loose": {"description": "?"}}});
        match resolve_with(&root, None, &options).unwrap_err() {
            CompileError::Schema { location, .. } => assert_eq!(location, "#/properties/loose"),
            other => panic!("Expected Schema error, got: {other}"),
        }
    }
}
