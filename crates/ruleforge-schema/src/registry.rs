//! # Schema Registry
//!
//! External schema documents addressable from `$ref` strings, keyed by
//! identifier (typically a URI ending in `#`).
//!
//! A registry is built before compilation, either from a JSON object
//! ([`SchemaRegistry::from_value`]), document by document
//! ([`SchemaRegistry::insert`]), or by loading every schema file in a
//! directory ([`SchemaRegistry::load_dir`]). Compilation only borrows it.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{CompileError, RegistryError};
use crate::reference::Reference;

/// Named schema documents for cross-document `$ref` resolution.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Map from identifier to schema document.
    documents: HashMap<String, Value>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a JSON object mapping identifiers to documents.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidArgument`] if `value` is not an object.
    pub fn from_value(value: &Value) -> Result<Self, CompileError> {
        let map = value.as_object().ok_or_else(|| {
            CompileError::InvalidArgument("expected registry to be an object".to_string())
        })?;
        Ok(Self {
            documents: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        })
    }

    /// Register `document` under `id`, replacing any previous entry.
    pub fn insert(&mut self, id: impl Into<String>, document: Value) -> Option<Value> {
        self.documents.insert(id.into(), document)
    }

    /// Look up a document by exact identifier.
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.documents.get(id)
    }

    /// Look up the document a reference's `id` names, trying the exact id
    /// first and then its fallback form.
    pub fn lookup(&self, reference: &Reference<'_>) -> Option<&Value> {
        reference
            .registry_keys()
            .iter()
            .find_map(|key| self.documents.get(&**key))
    }

    /// Returns the number of registered documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no documents are registered.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns all identifiers, sorted alphabetically.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.documents.keys().map(|s| s.as_str()).collect();
        ids.sort();
        ids
    }

    /// Load every `*.json`, `*.yaml` and `*.yml` file in `dir`.
    ///
    /// Each document is registered under its `$id` (with a trailing `#`
    /// appended when missing) or, lacking a string `$id`, under its file
    /// name. Subdirectories are not searched.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] if the directory cannot be listed and
    /// [`RegistryError::DocumentLoad`] if a file cannot be read or parsed.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let dir = dir.as_ref();
        let mut registry = Self::new();

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        paths.sort();

        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !path.is_file() || !matches!(ext, "json" | "yaml" | "yml") {
                continue;
            }

            let document = load_document(&path, ext)?;
            let id = match document.get("$id").and_then(Value::as_str) {
                Some(id) if id.ends_with('#') => id.to_string(),
                Some(id) => format!("{id}#"),
                None => name.to_string(),
            };
            tracing::debug!(id = %id, path = %path.display(), "registered schema document");
            registry.insert(id, document);
        }

        Ok(registry)
    }
}

fn load_document(path: &Path, ext: &str) -> Result<Value, RegistryError> {
    let load_error = |reason: String| RegistryError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    };

    let content =
        std::fs::read_to_string(path).map_err(|e| load_error(format!("cannot read file: {e}")))?;

    match ext {
        "yaml" | "yml" => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
                .map_err(|e| load_error(format!("invalid YAML: {e}")))?;
            serde_json::to_value(&yaml).map_err(|e| {
                load_error(format!("YAML document is not representable as JSON: {e}"))
            })
        }
        _ => serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}"))),
    }
}
