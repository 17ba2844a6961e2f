//! Integration test: compile representative schemas end to end and check the
//! resulting rule trees against sample instances.

use ruleforge_core::{RuleKind, ViolationCode};
use ruleforge_schema::{compile, compile_with, CompileError, CompileOptions, SchemaRegistry};
use serde_json::{json, Value};

fn person_schema() -> Value {
    json!({
        "definitions": {
            "name": {"type": "string", "minLength": 1, "maxLength": 64},
            "tag": {"type": "string", "pattern": "[a-z][a-z0-9-]*"}
        },
        "type": "object",
        "properties": {
            "name": {"$ref": "#/definitions/name"},
            "age": {"type": "integer", "minimum": 0, "maximum": 150},
            "tags": {
                "type": "array",
                "items": {"$ref": "#/definitions/tag"},
                "maxItems": 5,
                "uniqueItems": true
            },
            "active": {"type": "boolean"},
            "role": {"enum": ["admin", "member", null]}
        },
        "required": ["name", "age"]
    })
}

#[test]
fn test_recognized_types_produce_matching_kinds() {
    let cases = [
        (json!({"type": "boolean"}), RuleKind::Boolean),
        (json!({"type": "string"}), RuleKind::String),
        (json!({"type": "number"}), RuleKind::Number),
        (json!({"type": "integer"}), RuleKind::Integer),
        (json!({"type": "object"}), RuleKind::Object),
        (json!({"type": "array", "items": {}}), RuleKind::Array),
    ];
    for (schema, kind) in cases {
        let rule = compile(&schema, None).unwrap();
        assert_eq!(rule.kind(), kind, "schema {schema}");
    }
}

#[test]
fn test_person_schema_accepts_valid_document() {
    let rule = compile(&person_schema(), None).unwrap();
    let doc = json!({
        "name": "Ada",
        "age": 36,
        "tags": ["math", "engine-1"],
        "active": true,
        "role": null
    });
    assert!(rule.validate(&doc).is_ok(), "{:?}", rule.validate(&doc));
}

#[test]
fn test_person_schema_reports_every_violation() {
    let rule = compile(&person_schema(), None).unwrap();
    let doc = json!({
        "age": 36.5,
        "tags": ["ok", "ok", "Bad"],
        "role": "owner",
        "nickname": "x"
    });
    let err = rule.validate(&doc).unwrap_err();
    assert!(err.has(ViolationCode::MissingKey));
    assert!(err.has(ViolationCode::Integer));
    assert!(err.has(ViolationCode::Unique));
    assert!(err.has(ViolationCode::Pattern));
    assert!(err.has(ViolationCode::NotAllowed));
    assert!(err.has(ViolationCode::UnknownKey));

    let paths: Vec<&str> = err.violations().iter().map(|v| v.path.as_str()).collect();
    assert!(paths.contains(&"/age"));
    assert!(paths.contains(&"/tags/2"));
    assert!(paths.contains(&"/role"));
}

#[test]
fn test_required_min_length_property() {
    let rule = compile(
        &json!({
            "type": "object",
            "properties": {"a": {"type": "string", "minLength": 2}},
            "required": ["a"]
        }),
        None,
    )
    .unwrap();
    assert!(rule.is_valid(&json!({"a": "ab"})));
    assert!(!rule.is_valid(&json!({"a": "a"})));
    assert!(!rule.is_valid(&json!({})));
}

#[test]
fn test_local_reference_equals_direct_compile() {
    let target = json!({
        "type": "object",
        "properties": {"x": {"type": "number", "minimum": 1}},
        "required": ["x"]
    });
    let via_ref = compile(
        &json!({"definitions": {"x": target.clone()}, "$ref": "#/definitions/x"}),
        None,
    )
    .unwrap();
    let direct = compile(&target, None).unwrap();
    assert_eq!(via_ref.describe().unwrap(), direct.describe().unwrap());
}

#[test]
fn test_external_reference_with_either_key_form() {
    for key in ["urn:a#", "urn:a"] {
        let registry = json!({ key: {"type": "string"} });
        let rule = compile(&json!({"$ref": "urn:a#"}), Some(&registry)).unwrap();
        assert_eq!(rule.kind(), RuleKind::String, "registry key {key}");
    }
}

#[test]
fn test_external_reference_into_definitions() {
    let registry = json!({
        "urn:common#": {
            "definitions": {
                "id": {"type": "string", "pattern": "[0-9a-f]{8}"},
                "ids": {"type": "array", "items": {"$ref": "urn:common#/definitions/id"}}
            }
        }
    });
    let schema = json!({
        "type": "object",
        "properties": {"owners": {"$ref": "urn:common#/definitions/ids"}}
    });
    let rule = compile(&schema, Some(&registry)).unwrap();
    assert!(rule.is_valid(&json!({"owners": ["deadbeef", "0badf00d"]})));
    assert!(!rule.is_valid(&json!({"owners": ["deadbeef-"]})));
}

#[test]
fn test_invalid_pattern_fails_at_compile_time() {
    let err = compile(&json!({"type": "string", "pattern": "("}), None).unwrap_err();
    match err {
        CompileError::Pattern { location, .. } => assert_eq!(location, "#"),
        other => panic!("Expected Pattern error, got: {other}"),
    }
}

#[test]
fn test_lookahead_pattern_compiles() {
    let rule = compile(
        &json!({"type": "string", "pattern": "^(?!admin).*$"}),
        None,
    )
    .unwrap();
    assert!(rule.is_valid(&json!("guest")));
    let err = rule.validate(&json!("admin-root")).unwrap_err();
    assert!(err.has(ViolationCode::Pattern));
}

#[test]
fn test_falsy_dispatch_keywords_fall_through_to_any() {
    for schema in [json!({"$ref": ""}), json!({"type": ""})] {
        let rule = compile(&schema, None).unwrap();
        assert_eq!(rule.kind(), RuleKind::Any, "schema {schema}");
    }
    let rule = compile(&json!({"enum": "a"}), None).unwrap();
    assert!(rule.is_valid(&json!("a")));
    assert!(!rule.is_valid(&json!("b")));
}

#[test]
fn test_missing_registry_entry_is_reference_error() {
    let registry = json!({"urn:other#": {"type": "string"}});
    let err = compile(&json!({"$ref": "urn:missing#/x"}), Some(&registry)).unwrap_err();
    match err {
        CompileError::Reference { reference, .. } => assert_eq!(reference, "urn:missing#/x"),
        other => panic!("Expected Reference error, got: {other}"),
    }
}

#[test]
fn test_untyped_node_accepts_anything() {
    let rule = compile(&json!({"description": "free-form"}), None).unwrap();
    assert_eq!(rule.kind(), RuleKind::Any);
    for value in [json!(null), json!(1), json!("s"), json!([1, {}]), json!({"k": false})] {
        assert!(rule.is_valid(&value));
    }
}

#[test]
fn test_unknown_type_is_schema_error() {
    let err = compile(
        &json!({"type": "object", "properties": {"when": {"type": "date"}}}),
        None,
    )
    .unwrap_err();
    match err {
        CompileError::Schema { location, reason } => {
            assert_eq!(location, "#/properties/when");
            assert!(reason.contains("date"), "reason: {reason}");
        }
        other => panic!("Expected Schema error, got: {other}"),
    }
}

#[test]
fn test_self_referencing_chain_is_cyclic() {
    let err = compile(
        &json!({"definitions": {"loop": {"$ref": "#/definitions/loop"}}, "$ref": "#/definitions/loop"}),
        None,
    )
    .unwrap_err();
    match err {
        CompileError::CyclicReference { chain, .. } => {
            assert_eq!(chain, vec!["#/definitions/loop", "#/definitions/loop"]);
        }
        other => panic!("Expected CyclicReference, got: {other}"),
    }
}

#[test]
fn test_registry_loaded_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("money.yaml"),
        "$id: 'urn:money'\ndefinitions:\n  amount:\n    type: number\n    minimum: 0\n",
    )
    .unwrap();

    let registry = SchemaRegistry::load_dir(dir.path()).unwrap();
    let schema = json!({
        "type": "object",
        "properties": {"price": {"$ref": "urn:money#/definitions/amount"}},
        "required": ["price"]
    });
    let rule = compile_with(&schema, Some(&registry), &CompileOptions::default()).unwrap();
    assert!(rule.is_valid(&json!({"price": 9.99})));
    assert!(!rule.is_valid(&json!({"price": -1})));
}

#[test]
fn test_describe_renders_compiled_tree() {
    let rule = compile(
        &json!({
            "type": "array",
            "items": {"type": "string", "pattern": "^x", "maxLength": 3},
            "uniqueItems": true
        }),
        None,
    )
    .unwrap();
    let described = rule.describe().unwrap();
    assert_eq!(described["type"], "array");
    assert_eq!(described["uniqueItems"], true);
    assert_eq!(described["items"]["type"], "string");
    assert_eq!(described["items"]["pattern"], "^x");
    assert_eq!(described["items"]["maxLength"], 3);
}
