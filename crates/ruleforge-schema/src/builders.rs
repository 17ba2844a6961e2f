//! # Type Builders
//!
//! One builder per schema type. Object and array builders recurse through
//! [`Resolver::resolve`] for their children; number and string builders are
//! leaves.

use std::collections::BTreeMap;

use ruleforge_core::{ArrRule, KeyRule, NumRule, ObjRule, Rule, StrRule};
use serde_json::{Map, Value};

use crate::error::CompileError;
use crate::node::{ArrayKeywords, NumberKeywords, ObjectKeywords, SchemaType, StringKeywords};
use crate::resolver::Resolver;

/// Append `segments` to a schema location, escaping `~` and `/`.
fn child_location(location: &str, segments: &[&str]) -> String {
    let mut out = location.to_string();
    for segment in segments {
        out.push('/');
        out.push_str(&segment.replace('~', "~0").replace('/', "~1"));
    }
    out
}

impl<'a> Resolver<'a> {
    /// Object rule: declared properties plus key-count bounds.
    pub fn build_object(
        &mut self,
        keywords: &'a Map<String, Value>,
        location: &str,
    ) -> Result<Rule, CompileError> {
        let kw = ObjectKeywords::parse(keywords, location)?;

        let mut rule = ObjRule::new();
        if let Some(keys) = self.resolve_properties(&kw, location)? {
            rule = rule.keys(keys);
        }
        if let Some(min) = kw.min_properties {
            rule = rule.min_keys(min);
        }
        if let Some(max) = kw.max_properties {
            rule = rule.max_keys(max);
        }
        Ok(rule.into())
    }

    /// Resolve each declared property, marking names listed in `required`
    /// as mandatory. Returns `None` when `properties` is absent or not an
    /// object.
    pub fn resolve_properties(
        &mut self,
        kw: &ObjectKeywords<'a>,
        location: &str,
    ) -> Result<Option<BTreeMap<String, KeyRule>>, CompileError> {
        let Some(properties) = kw.properties else {
            return Ok(None);
        };

        let mut keys = BTreeMap::new();
        for (name, schema) in properties {
            let rule = self.resolve(schema, &child_location(location, &["properties", name]))?;
            let key = if kw.is_required(name) {
                KeyRule::required(rule)
            } else {
                KeyRule::optional(rule)
            };
            keys.insert(name.clone(), key);
        }
        Ok(Some(keys))
    }

    /// Array rule: element rule from `items`, length bounds, uniqueness.
    pub fn build_array(
        &mut self,
        keywords: &'a Map<String, Value>,
        location: &str,
    ) -> Result<Rule, CompileError> {
        let kw = ArrayKeywords::parse(keywords, location)?;

        let items = self.resolve(kw.items, &child_location(location, &["items"]))?;
        let mut rule = ArrRule::new(items);
        if let Some(min) = kw.min_items {
            rule = rule.min_items(min);
        }
        if let Some(max) = kw.max_items {
            rule = rule.max_items(max);
        }
        if kw.unique_items {
            rule = rule.unique();
        }
        Ok(rule.into())
    }
}

/// Number rule for `number` and `integer` nodes; `integer` adds integrality.
pub fn build_number(keywords: &Map<String, Value>, schema_type: SchemaType) -> Rule {
    let kw = NumberKeywords::parse(keywords, schema_type);

    let mut rule = NumRule::new();
    if kw.integer {
        rule = rule.integer();
    }
    if let Some(min) = kw.minimum {
        rule = rule.min(min);
    }
    if let Some(max) = kw.maximum {
        rule = rule.max(max);
    }
    rule.into()
}

/// String rule. The pattern is compiled here, so an invalid one fails the
/// compile rather than a later validation.
pub fn build_string(keywords: &Map<String, Value>, location: &str) -> Result<Rule, CompileError> {
    let kw = StringKeywords::parse(keywords, location)?;

    let mut rule = StrRule::new();
    if let Some(pattern) = kw.pattern {
        rule = rule.pattern(pattern).map_err(|source| CompileError::Pattern {
            location: location.to_string(),
            source,
        })?;
    }
    if let Some(min) = kw.min_length {
        rule = rule.min_length(min);
    }
    if let Some(max) = kw.max_length {
        rule = rule.max_length(max);
    }
    Ok(rule.into())
}
