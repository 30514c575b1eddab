use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use jsonschema::Validator;
use serde_json::{Map, Value};

use crate::config::RegistryConfig;
use crate::error::{Result, SchemaError};

/// File suffix for schemas loaded from a directory: `<topic>.schema.json`.
pub const SCHEMA_FILE_SUFFIX: &str = ".schema.json";

/// Object-schema keywords whose children are schemas keyed by name.
const NAMED_CHILDREN: [&str; 5] = [
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// Object-schema keywords whose value is a single schema.
const SINGLE_CHILDREN: [&str; 11] = [
    "propertyNames",
    "additionalProperties",
    "unevaluatedProperties",
    "items",
    "contains",
    "additionalItems",
    "unevaluatedItems",
    "not",
    "if",
    "then",
    "else",
];

/// Object-schema keywords whose value is a list of schemas.
const LIST_CHILDREN: [&str; 4] = ["prefixItems", "allOf", "anyOf", "oneOf"];

/// Keywords that make a schema without `type` an object schema.
const OBJECT_KEYWORDS: [&str; 8] = [
    "properties",
    "patternProperties",
    "additionalProperties",
    "unevaluatedProperties",
    "required",
    "dependentRequired",
    "dependentSchemas",
    "propertyNames",
];

/// Topic-keyed registry of compiled JSON Schema validators.
pub struct SchemaRegistry {
    validators: BTreeMap<String, Validator>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            validators: BTreeMap::new(),
            config,
        }
    }

    /// Register a schema for a topic from JSON text.
    pub fn register(&mut self, topic: &str, schema_json: &str) -> Result<()> {
        let schema: Value = serde_json::from_str(schema_json)?;
        self.register_value(topic, &schema)
    }

    /// Register a schema for a topic.
    pub fn register_value(&mut self, topic: &str, schema: &Value) -> Result<()> {
        if topic.is_empty() {
            return Err(SchemaError::CompileFailed(
                "schema topic must not be empty".to_string(),
            ));
        }

        let mut schema = schema.clone();
        if self.config.strict_mode {
            forbid_additional_properties(&mut schema);
        }

        let compiled = jsonschema::validator_for(&schema)
            .map_err(|err| SchemaError::CompileFailed(format!("{topic}: {err}")))?;

        tracing::debug!(topic, strict = self.config.strict_mode, "schema registered");
        self.validators.insert(topic.to_string(), compiled);
        Ok(())
    }

    /// Load every `<topic>.schema.json` file in a directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        Self::from_directory_with_config(path, RegistryConfig::default())
    }

    /// Load schemas from a directory with explicit config.
    ///
    /// Symlinked schema files are refused. Other files are ignored.
    pub fn from_directory_with_config(path: &Path, config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);

        let entries = std::fs::read_dir(path)
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;

        let mut loaded = 0usize;
        for entry in entries {
            let entry = entry.map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            let Some(topic) = topic_from_file_name(&file_name) else {
                continue;
            };

            let file_type = entry
                .file_type()
                .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
            if file_type.is_symlink() {
                return Err(SchemaError::LoadFailed(format!(
                    "refusing to load schema symlink: {file_name}"
                )));
            }
            if !file_type.is_file() {
                continue;
            }

            loaded += 1;
            if loaded > config.max_schemas_from_directory {
                return Err(SchemaError::LoadFailed(format!(
                    "schema count exceeds configured max ({})",
                    config.max_schemas_from_directory
                )));
            }

            let content = read_bounded(&entry.path(), config.max_schema_file_size)?;
            registry.register(topic, &content)?;
        }

        Ok(registry)
    }

    /// Load from embedded `(topic, schema)` pairs.
    pub fn from_embedded(schemas: &[(&str, &str)]) -> Result<Self> {
        let mut registry = Self::new();
        for (topic, schema) in schemas {
            registry.register(topic, schema)?;
        }
        Ok(registry)
    }

    /// Validate a payload against the schema registered for `topic`.
    pub fn validate(&self, topic: &str, payload: &Value) -> Result<()> {
        let Some(validator) = self.validators.get(topic) else {
            if self.config.fail_on_missing_schema {
                return Err(SchemaError::NoSchema(topic.to_string()));
            }
            return Ok(());
        };

        let mut errors = validator.iter_errors(payload);
        if let Some(first) = errors.next() {
            let mut message = first.to_string();
            for err in errors.take(3) {
                message.push_str("; ");
                message.push_str(&err.to_string());
            }
            return Err(SchemaError::ValidationFailed {
                topic: topic.to_string(),
                message,
            });
        }

        Ok(())
    }

    /// Check if a topic has a registered schema.
    pub fn has_schema(&self, topic: &str) -> bool {
        self.validators.contains_key(topic)
    }

    /// Topics with registered schemas, sorted.
    pub fn topics(&self) -> Vec<&str> {
        self.validators.keys().map(String::as_str).collect()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn topic_from_file_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(SCHEMA_FILE_SUFFIX)
        .filter(|topic| !topic.is_empty())
}

fn read_bounded(path: &Path, max_bytes: usize) -> Result<String> {
    let file = File::open(path).map_err(|err| {
        SchemaError::LoadFailed(format!("failed opening schema {}: {err}", path.display()))
    })?;

    let limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(limit).read_to_string(&mut content).map_err(|err| {
        SchemaError::LoadFailed(format!("failed reading schema {}: {err}", path.display()))
    })?;

    if content.len() > max_bytes {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large (max {max_bytes} bytes): {}",
            path.display()
        )));
    }
    Ok(content)
}

fn forbid_additional_properties(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            if is_object_schema(map) && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }

            for key in NAMED_CHILDREN {
                if let Some(Value::Object(children)) = map.get_mut(key) {
                    children.values_mut().for_each(forbid_additional_properties);
                }
            }
            for key in SINGLE_CHILDREN {
                if let Some(child) = map.get_mut(key) {
                    forbid_additional_properties(child);
                }
            }
            for key in LIST_CHILDREN {
                if let Some(Value::Array(children)) = map.get_mut(key) {
                    children.iter_mut().for_each(forbid_additional_properties);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(forbid_additional_properties),
        _ => {}
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind == "object"),
        _ => OBJECT_KEYWORDS.iter().any(|keyword| map.contains_key(*keyword)),
    }
}
