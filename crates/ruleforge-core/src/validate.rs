//! # Rule Evaluation
//!
//! Checks a `serde_json::Value` against a [`Rule`] tree and reports every
//! violation with the JSON Pointer of the offending instance location.
//!
//! Evaluation never fails on its own: a rule tree that was built successfully
//! can always be evaluated, so the only outcomes are "valid" or a non-empty
//! [`ValidationViolations`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::equality::json_equal;
use crate::rule::{AnyRule, ArrRule, KeyRule, NumRule, ObjRule, Rule, RuleKind, StrRule};

/// Category of a single violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    /// The value has the wrong JSON type.
    Type,
    /// The value is a number but not an integer.
    Integer,
    Minimum,
    Maximum,
    MinLength,
    MaxLength,
    Pattern,
    MinItems,
    MaxItems,
    /// Two array elements are structurally equal.
    Unique,
    MinProperties,
    MaxProperties,
    /// A required key is absent.
    MissingKey,
    /// A key is present that the object rule does not declare.
    UnknownKey,
    /// The value is not one of the enumerated values.
    NotAllowed,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Integer => "integer",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::Pattern => "pattern",
            Self::MinItems => "min_items",
            Self::MaxItems => "max_items",
            Self::Unique => "unique",
            Self::MinProperties => "min_properties",
            Self::MaxProperties => "max_properties",
            Self::MissingKey => "missing_key",
            Self::UnknownKey => "unknown_key",
            Self::NotAllowed => "not_allowed",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    /// JSON Pointer path to the violating location in the instance.
    pub path: String,
    /// Category of the violation.
    pub code: ViolationCode,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{path} [{}]: {}", self.code, self.message)
    }
}

/// Every violation found by one [`Rule::validate`] call, in instance order.
/// Never empty.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// True if any violation carries `code`.
    pub fn has(&self, code: ViolationCode) -> bool {
        self.violations.iter().any(|v| v.code == code)
    }

    /// Violations located at exactly `path`.
    pub fn at<'v>(&'v self, path: &'v str) -> impl Iterator<Item = &'v Violation> + 'v {
        self.violations.iter().filter(move |v| v.path == path)
    }
}

impl IntoIterator for ValidationViolations {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

impl std::error::Error for ValidationViolations {}

impl Rule {
    /// Validate `value` against this rule, collecting every violation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationViolations`] (never empty) if `value` does not
    /// satisfy the rule.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationViolations> {
        let mut violations = Vec::new();
        check(self, value, "", &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationViolations { violations })
        }
    }

    /// Returns true if `value` satisfies this rule.
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }
}

fn push(out: &mut Vec<Violation>, path: &str, code: ViolationCode, message: String) {
    out.push(Violation {
        path: path.to_string(),
        code,
        message,
    });
}

fn type_mismatch(out: &mut Vec<Violation>, path: &str, expected: RuleKind, value: &Value) {
    push(
        out,
        path,
        ViolationCode::Type,
        format!("expected {expected}, found {}", json_type_name(value)),
    );
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Append `segment` to a JSON Pointer, escaping `~` and `/`.
fn child_path(path: &str, segment: &str) -> String {
    let escaped = segment.replace('~', "~0").replace('/', "~1");
    format!("{path}/{escaped}")
}

fn check(rule: &Rule, value: &Value, path: &str, out: &mut Vec<Violation>) {
    match rule {
        Rule::Any(r) => check_any(r, value, path, out),
        Rule::Bool(_) => {
            if !value.is_boolean() {
                type_mismatch(out, path, RuleKind::Boolean, value);
            }
        }
        Rule::Num(r) => check_num(r, value, path, out),
        Rule::Str(r) => check_str(r, value, path, out),
        Rule::Arr(r) => check_arr(r, value, path, out),
        Rule::Obj(r) => check_obj(r, value, path, out),
    }
}

fn check_any(r: &AnyRule, value: &Value, path: &str, out: &mut Vec<Violation>) {
    if let Some(allowed) = &r.allowed {
        if !allowed.iter().any(|a| json_equal(a, value)) {
            push(
                out,
                path,
                ViolationCode::NotAllowed,
                format!("{value} is not one of the allowed values"),
            );
        }
    }
}

fn check_num(r: &NumRule, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let expected = if r.integer {
        RuleKind::Integer
    } else {
        RuleKind::Number
    };
    let Some(n) = value.as_f64() else {
        type_mismatch(out, path, expected, value);
        return;
    };

    if r.integer && (!n.is_finite() || n.fract() != 0.0) {
        push(out, path, ViolationCode::Integer, format!("{n} is not an integer"));
    }
    if let Some(min) = r.min {
        if n < min {
            push(out, path, ViolationCode::Minimum, format!("{n} is less than {min}"));
        }
    }
    if let Some(max) = r.max {
        if n > max {
            push(out, path, ViolationCode::Maximum, format!("{n} is greater than {max}"));
        }
    }
}

fn check_str(r: &StrRule, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(s) = value.as_str() else {
        type_mismatch(out, path, RuleKind::String, value);
        return;
    };

    let len = s.chars().count() as u64;
    if let Some(min) = r.min_length {
        if len < min {
            push(
                out,
                path,
                ViolationCode::MinLength,
                format!("length {len} is less than {min}"),
            );
        }
    }
    if let Some(max) = r.max_length {
        if len > max {
            push(
                out,
                path,
                ViolationCode::MaxLength,
                format!("length {len} is greater than {max}"),
            );
        }
    }
    if let Some(pattern) = &r.pattern {
        match pattern.try_match(s) {
            Ok(true) => {}
            Ok(false) => push(
                out,
                path,
                ViolationCode::Pattern,
                format!("{s:?} does not match pattern {:?}", pattern.source()),
            ),
            Err(e) => push(out, path, ViolationCode::Pattern, e.to_string()),
        }
    }
}

fn check_arr(r: &ArrRule, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(items) = value.as_array() else {
        type_mismatch(out, path, RuleKind::Array, value);
        return;
    };

    let len = items.len() as u64;
    if let Some(min) = r.min_items {
        if len < min {
            push(
                out,
                path,
                ViolationCode::MinItems,
                format!("{len} items is fewer than {min}"),
            );
        }
    }
    if let Some(max) = r.max_items {
        if len > max {
            push(
                out,
                path,
                ViolationCode::MaxItems,
                format!("{len} items is more than {max}"),
            );
        }
    }

    for (i, item) in items.iter().enumerate() {
        check(&r.items, item, &child_path(path, &i.to_string()), out);
    }

    if r.unique {
        for (j, item) in items.iter().enumerate() {
            if let Some(i) = items[..j].iter().position(|prev| json_equal(prev, item)) {
                push(
                    out,
                    &child_path(path, &j.to_string()),
                    ViolationCode::Unique,
                    format!("duplicates element {i}"),
                );
            }
        }
    }
}

fn check_obj(r: &ObjRule, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let Some(obj) = value.as_object() else {
        type_mismatch(out, path, RuleKind::Object, value);
        return;
    };

    let count = obj.len() as u64;
    if let Some(min) = r.min_keys {
        if count < min {
            push(
                out,
                path,
                ViolationCode::MinProperties,
                format!("{count} properties is fewer than {min}"),
            );
        }
    }
    if let Some(max) = r.max_keys {
        if count > max {
            push(
                out,
                path,
                ViolationCode::MaxProperties,
                format!("{count} properties is more than {max}"),
            );
        }
    }

    if let Some(keys) = &r.keys {
        check_keys(keys, obj, path, out);
    }
}

fn check_keys(
    keys: &BTreeMap<String, KeyRule>,
    obj: &Map<String, Value>,
    path: &str,
    out: &mut Vec<Violation>,
) {
    for (name, key) in keys {
        let key_path = child_path(path, name);
        match obj.get(name) {
            Some(v) => check(&key.rule, v, &key_path, out),
            None if key.required => push(
                out,
                &key_path,
                ViolationCode::MissingKey,
                format!("required property {name:?} is missing"),
            ),
            None => {}
        }
    }

    for name in obj.keys() {
        if !keys.contains_key(name) {
            push(
                out,
                &child_path(path, name),
                ViolationCode::UnknownKey,
                format!("property {name:?} is not allowed"),
            );
        }
    }
}
