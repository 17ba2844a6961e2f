//! # Schema Node IR
//!
//! Typed view over one schema node. [`SchemaNode::parse`] decides which of
//! the four resolution paths a node takes; the per-type keyword structs
//! ([`ObjectKeywords`], [`ArrayKeywords`], [`NumberKeywords`],
//! [`StringKeywords`]) turn the raw keyword map into typed, already-checked
//! fields before a builder sees them.
//!
//! Keywords that a type does not use are never read, so they are ignored
//! silently. A numeric constraint keyword holding a non-numeric value is
//! likewise ignored and the bound is omitted.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::CompileError;

/// The six recognized values of the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Array,
    Boolean,
    Integer,
    Number,
    Object,
    String,
}

impl SchemaType {
    /// Parse a `type` keyword value.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "array" => Some(Self::Array),
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "object" => Some(Self::Object),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Object => "object",
            Self::String => "string",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a schema node resolves.
#[derive(Debug, Clone, Copy)]
pub enum SchemaNode<'a> {
    /// `type` is present; `keywords` is the node's full keyword map.
    Typed {
        schema_type: SchemaType,
        keywords: &'a Map<String, Value>,
    },
    /// `$ref` is present (and `type` is not).
    Ref(&'a str),
    /// `enum` is present (and neither `type` nor `$ref` is).
    Enum(&'a [Value]),
    /// None of the above, including non-object nodes such as `true`.
    Untyped,
}

impl<'a> SchemaNode<'a> {
    /// Classify `value`. Precedence is `type`, then `$ref`, then `enum`.
    /// A dispatch keyword only counts when its value is truthy, so `null`,
    /// `false`, `0` and `""` fall through to the next path.
    ///
    /// A non-array `enum` enumerates that single value.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Schema`] if `type` is not one of the six
    /// recognized strings or `$ref` is not a string.
    pub fn parse(value: &'a Value, location: &str) -> Result<Self, CompileError> {
        let Some(keywords) = value.as_object() else {
            return Ok(Self::Untyped);
        };

        if let Some(t) = dispatch_keyword(keywords, "type") {
            let schema_type = t
                .as_str()
                .and_then(SchemaType::from_keyword)
                .ok_or_else(|| {
                    CompileError::schema(location, format!("could not resolve type: {t}"))
                })?;
            return Ok(Self::Typed {
                schema_type,
                keywords,
            });
        }

        if let Some(r) = dispatch_keyword(keywords, "$ref") {
            return r.as_str().map(Self::Ref).ok_or_else(|| {
                CompileError::schema(location, format!("$ref must be a string, found {r}"))
            });
        }

        if let Some(e) = dispatch_keyword(keywords, "enum") {
            let values = match e {
                Value::Array(values) => values.as_slice(),
                single => std::slice::from_ref(single),
            };
            return Ok(Self::Enum(values));
        }

        Ok(Self::Untyped)
    }
}

fn dispatch_keyword<'a>(keywords: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    keywords.get(key).filter(|v| truthy(Some(*v)))
}

fn present<'a>(keywords: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    keywords.get(key).filter(|v| !v.is_null())
}

/// A numeric keyword as `f64`, or `None` when absent or non-numeric.
fn number(keywords: &Map<String, Value>, key: &str) -> Option<f64> {
    keywords.get(key).and_then(Value::as_f64)
}

/// A count-valued keyword (`minLength`, `maxItems`, ...).
///
/// Non-numeric values are ignored. Numeric values must be non-negative
/// integers; `2.0` is accepted as `2`.
fn count(
    keywords: &Map<String, Value>,
    key: &str,
    location: &str,
) -> Result<Option<u64>, CompileError> {
    let Some(Value::Number(n)) = keywords.get(key) else {
        return Ok(None);
    };
    if let Some(u) = n.as_u64() {
        return Ok(Some(u));
    }
    match n.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(Some(f as u64)),
        _ => Err(CompileError::schema(
            location,
            format!("{key} must be a non-negative integer, found {n}"),
        )),
    }
}

/// JavaScript-style truthiness, used for flag keywords such as `uniqueItems`.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Keywords read by the object builder.
#[derive(Debug, Clone)]
pub struct ObjectKeywords<'a> {
    /// Declared properties, or `None` when `properties` is absent or not an object.
    pub properties: Option<&'a Map<String, Value>>,
    /// Names listed in `required`; non-string entries are skipped.
    pub required: Vec<&'a str>,
    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,
}

impl<'a> ObjectKeywords<'a> {
    pub fn parse(keywords: &'a Map<String, Value>, location: &str) -> Result<Self, CompileError> {
        let required: Vec<&'a str> = keywords
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        Ok(Self {
            properties: keywords.get("properties").and_then(Value::as_object),
            required,
            min_properties: count(keywords, "minProperties", location)?,
            max_properties: count(keywords, "maxProperties", location)?,
        })
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| *r == name)
    }
}

/// Keywords read by the array builder.
#[derive(Debug, Clone)]
pub struct ArrayKeywords<'a> {
    /// The single element schema.
    pub items: &'a Value,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
}

impl<'a> ArrayKeywords<'a> {
    /// # Errors
    ///
    /// Returns [`CompileError::Schema`] if `items` is missing or uses the
    /// tuple form (an array of schemas).
    pub fn parse(keywords: &'a Map<String, Value>, location: &str) -> Result<Self, CompileError> {
        let items = match present(keywords, "items") {
            None => return Err(CompileError::schema(location, "array schema requires 'items'")),
            Some(Value::Array(_)) => {
                return Err(CompileError::schema(
                    location,
                    "tuple-form 'items' (an array of schemas) is not supported",
                ))
            }
            Some(items) => items,
        };
        Ok(Self {
            items,
            min_items: count(keywords, "minItems", location)?,
            max_items: count(keywords, "maxItems", location)?,
            unique_items: truthy(keywords.get("uniqueItems")),
        })
    }
}

/// Keywords read by the number builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberKeywords {
    pub integer: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl NumberKeywords {
    pub fn parse(keywords: &Map<String, Value>, schema_type: SchemaType) -> Self {
        Self {
            integer: schema_type == SchemaType::Integer,
            minimum: number(keywords, "minimum"),
            maximum: number(keywords, "maximum"),
        }
    }
}

/// Keywords read by the string builder.
#[derive(Debug, Clone)]
pub struct StringKeywords<'a> {
    /// Pattern source; an empty pattern counts as absent.
    pub pattern: Option<&'a str>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

impl<'a> StringKeywords<'a> {
    pub fn parse(keywords: &'a Map<String, Value>, location: &str) -> Result<Self, CompileError> {
        let pattern = match present(keywords, "pattern") {
            None => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => {
                return Err(CompileError::schema(
                    location,
                    format!("pattern must be a string, found {other}"),
                ))
            }
        };
        Ok(Self {
            pattern,
            min_length: count(keywords, "minLength", location)?,
            max_length: count(keywords, "maxLength", location)?,
        })
    }
}
