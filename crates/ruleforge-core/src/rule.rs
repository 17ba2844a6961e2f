//! # Rule Nodes
//!
//! The validation rule tree. Each [`Rule`] variant wraps a per-kind struct
//! holding that kind's refinements. Object rules own their children through
//! [`KeyRule`]s; array rules own their element rule.
//!
//! Rules serialize (internally tagged by `type`) so a compiled tree can be
//! inspected as JSON via [`Rule::describe`].

use std::collections::BTreeMap;
use std::fmt;

use fancy_regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::RuleError;

/// The type bound of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Any,
    Boolean,
    Number,
    Integer,
    String,
    Array,
    Object,
}

impl RuleKind {
    /// Lowercase name, matching the JSON-Schema `type` keyword where one exists.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a validation rule tree.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Rule {
    #[serde(rename = "any")]
    Any(AnyRule),
    #[serde(rename = "boolean")]
    Bool(BoolRule),
    #[serde(rename = "number")]
    Num(NumRule),
    #[serde(rename = "string")]
    Str(StrRule),
    #[serde(rename = "array")]
    Arr(ArrRule),
    #[serde(rename = "object")]
    Obj(ObjRule),
}

impl Rule {
    /// A rule accepting every value.
    pub fn any() -> Self {
        Self::Any(AnyRule::new())
    }

    /// A rule accepting `true` and `false`.
    pub fn boolean() -> Self {
        Self::Bool(BoolRule {})
    }

    /// The type bound of this rule. Integral number rules report
    /// [`RuleKind::Integer`].
    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Any(_) => RuleKind::Any,
            Self::Bool(_) => RuleKind::Boolean,
            Self::Num(n) if n.integer => RuleKind::Integer,
            Self::Num(_) => RuleKind::Number,
            Self::Str(_) => RuleKind::String,
            Self::Arr(_) => RuleKind::Array,
            Self::Obj(_) => RuleKind::Object,
        }
    }

    /// Render the rule tree as a JSON value.
    pub fn describe(&self) -> Result<Value, RuleError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn as_obj(&self) -> Option<&ObjRule> {
        match self {
            Self::Obj(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_arr(&self) -> Option<&ArrRule> {
        match self {
            Self::Arr(a) => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}

// -------------------------------------------------------------------------
// AnyRule

/// Accepts any value, optionally restricted to an enumerated set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnyRule {
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
}

impl AnyRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict accepted values to `values` (compared structurally).
    pub fn valid(mut self, values: Vec<Value>) -> Self {
        self.allowed = Some(values);
        self
    }
}

impl From<AnyRule> for Rule {
    fn from(r: AnyRule) -> Self {
        Self::Any(r)
    }
}

// -------------------------------------------------------------------------
// BoolRule

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct BoolRule {}

impl From<BoolRule> for Rule {
    fn from(r: BoolRule) -> Self {
        Self::Bool(r)
    }
}

// -------------------------------------------------------------------------
// NumRule

/// Numeric rule with optional integrality and inclusive bounds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NumRule {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub integer: bool,
    #[serde(rename = "minimum", skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(rename = "maximum", skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumRule {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }
    pub fn min(mut self, v: f64) -> Self {
        self.min = Some(v);
        self
    }
    pub fn max(mut self, v: f64) -> Self {
        self.max = Some(v);
        self
    }
}

impl From<NumRule> for Rule {
    fn from(r: NumRule) -> Self {
        Self::Num(r)
    }
}

// -------------------------------------------------------------------------
// StrRule

/// A compiled regular expression that must match a whole string.
///
/// Look-around and backreferences are supported, so the usual JSON-Schema
/// (ECMA-262 style) patterns such as `^(?!admin).*$` compile.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` anchored at both ends.
    pub fn new(source: &str) -> Result<Self, RuleError> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| RuleError::Pattern {
            pattern: source.to_string(),
            source: e,
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written, without anchors.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match `s` against the whole pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::PatternEvaluation`] if the backtracking engine
    /// gives up on `s`.
    pub fn try_match(&self, s: &str) -> Result<bool, RuleError> {
        self.regex
            .is_match(s)
            .map_err(|source| RuleError::PatternEvaluation {
                pattern: self.source.clone(),
                source,
            })
    }

    /// Like [`Pattern::try_match`], treating an evaluation failure as no match.
    pub fn is_match(&self, s: &str) -> bool {
        self.try_match(s).unwrap_or(false)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// String rule with optional full-match pattern and inclusive length bounds.
///
/// Lengths count Unicode scalar values.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StrRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl StrRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the whole string to match `source`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Pattern`] if `source` is not a valid regular expression.
    pub fn pattern(mut self, source: &str) -> Result<Self, RuleError> {
        self.pattern = Some(Pattern::new(source)?);
        Ok(self)
    }
    pub fn min_length(mut self, v: u64) -> Self {
        self.min_length = Some(v);
        self
    }
    pub fn max_length(mut self, v: u64) -> Self {
        self.max_length = Some(v);
        self
    }
}

impl From<StrRule> for Rule {
    fn from(r: StrRule) -> Self {
        Self::Str(r)
    }
}

// -------------------------------------------------------------------------
// ArrRule

/// Array rule: every element must satisfy `items`.
#[derive(Debug, Clone, Serialize)]
pub struct ArrRule {
    pub items: Box<Rule>,
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(rename = "uniqueItems", skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
}

impl ArrRule {
    pub fn new(items: impl Into<Rule>) -> Self {
        Self {
            items: Box::new(items.into()),
            min_items: None,
            max_items: None,
            unique: false,
        }
    }
    pub fn min_items(mut self, v: u64) -> Self {
        self.min_items = Some(v);
        self
    }
    pub fn max_items(mut self, v: u64) -> Self {
        self.max_items = Some(v);
        self
    }
    /// Require elements to be pairwise structurally distinct.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

impl From<ArrRule> for Rule {
    fn from(r: ArrRule) -> Self {
        Self::Arr(r)
    }
}

// -------------------------------------------------------------------------
// ObjRule

/// A declared object property and whether it must be present.
#[derive(Debug, Clone, Serialize)]
pub struct KeyRule {
    pub rule: Rule,
    pub required: bool,
}

impl KeyRule {
    pub fn required(rule: impl Into<Rule>) -> Self {
        Self {
            rule: rule.into(),
            required: true,
        }
    }

    pub fn optional(rule: impl Into<Rule>) -> Self {
        Self {
            rule: rule.into(),
            required: false,
        }
    }
}

/// Object rule.
///
/// `keys: None` accepts arbitrary keys. `keys: Some(..)` declares the
/// permitted keys; undeclared keys are rejected.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjRule {
    #[serde(rename = "properties", skip_serializing_if = "Option::is_none")]
    pub keys: Option<BTreeMap<String, KeyRule>>,
    #[serde(rename = "minProperties", skip_serializing_if = "Option::is_none")]
    pub min_keys: Option<u64>,
    #[serde(rename = "maxProperties", skip_serializing_if = "Option::is_none")]
    pub max_keys: Option<u64>,
}

impl ObjRule {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn keys(mut self, keys: BTreeMap<String, KeyRule>) -> Self {
        self.keys = Some(keys);
        self
    }
    /// Declare a single key, creating the key map if needed.
    pub fn key(mut self, name: impl Into<String>, key: KeyRule) -> Self {
        self.keys
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), key);
        self
    }
    pub fn min_keys(mut self, v: u64) -> Self {
        self.min_keys = Some(v);
        self
    }
    pub fn max_keys(mut self, v: u64) -> Self {
        self.max_keys = Some(v);
        self
    }

    pub fn get(&self, name: &str) -> Option<&KeyRule> {
        self.keys.as_ref().and_then(|k| k.get(name))
    }
}

impl From<ObjRule> for Rule {
    fn from(r: ObjRule) -> Self {
        Self::Obj(r)
    }
}
