//! A named bundle of settings keys with defaults and validation.
//!
//! Groups own their current values and mediate every read/write;
//! nothing is ever stored without passing its key's rule. Nested
//! document sections (the theme color tree) are addressed with
//! dotted keys (`colors.light.primary`) and expanded back into
//! nested maps on export.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use super::errors::{SettingsError, SettingsResult};
use super::validators::Validator;

/// Schema entry for one key: its default plus an optional rule.
#[derive(Debug, Clone)]
pub struct KeyDef {
    /// Value used at construction and on reset.
    pub default: Value,
    /// Rule checked on every write; absent means always accepted.
    pub validator: Option<Validator>,
}

/// Fluent builder assembling a group's schema.
pub struct GroupBuilder {
    name: String,
    schema: BTreeMap<String, KeyDef>,
}

impl GroupBuilder {
    /// Add a key with a default and a rule.
    pub fn key(
        mut self,
        key: impl Into<String>,
        default: Value,
        validator: Validator,
    ) -> Self {
        self.schema.insert(
            key.into(),
            KeyDef {
                default,
                validator: Some(validator),
            },
        );
        self
    }

    /// Add a key with a default and no rule.
    pub fn unchecked_key(mut self, key: impl Into<String>, default: Value) -> Self {
        self.schema.insert(
            key.into(),
            KeyDef {
                default,
                validator: None,
            },
        );
        self
    }

    /// Finish, populating every key with its default.
    pub fn build(self) -> SettingsGroup {
        let values = self
            .schema
            .iter()
            .map(|(key, def)| (key.clone(), def.default.clone()))
            .collect();
        SettingsGroup {
            name: self.name,
            schema: self.schema,
            values,
        }
    }
}

/// A named collection of validated key/value settings.
#[derive(Debug, Clone)]
pub struct SettingsGroup {
    /// Group name as it appears in the persisted document.
    name: String,
    /// Per-key defaults and rules; the key set is fixed here.
    schema: BTreeMap<String, KeyDef>,
    /// Current values; every entry has passed its key's rule.
    values: BTreeMap<String, Value>,
}

impl SettingsGroup {
    /// Start building a group with the given name.
    pub fn builder(name: impl Into<String>) -> GroupBuilder {
        GroupBuilder {
            name: name.into(),
            schema: BTreeMap::new(),
        }
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All keys, in stable order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.schema.keys().map(String::as_str)
    }

    /// Whether the schema contains this key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.schema.contains_key(key)
    }

    /// Current value for a key.
    pub fn get(&self, key: &str) -> SettingsResult<&Value> {
        self.values
            .get(key)
            .ok_or_else(|| SettingsError::key_not_found(&self.name, key))
    }

    /// Validate and store a value, returning the previous one.
    ///
    /// On rejection nothing is stored and the prior value stays in
    /// place. The returned old value lets the registry raise the
    /// change notification; the group itself never notifies.
    pub fn set(&mut self, key: &str, value: Value) -> SettingsResult<Value> {
        let def = self
            .schema
            .get(key)
            .ok_or_else(|| SettingsError::key_not_found(&self.name, key))?;

        if let Some(validator) = &def.validator {
            if let Err(reason) = validator.validate(&value) {
                return Err(SettingsError::validation(&self.name, key, value, reason));
            }
        }

        let old = self.values.insert(key.to_string(), value);
        // Every schema key is populated at construction, so the
        // previous value always exists.
        Ok(old.unwrap_or(Value::Null))
    }

    /// Export values as this group's document section.
    ///
    /// Dotted keys come back as nested objects.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for (key, value) in &self.values {
            insert_dotted(&mut out, key, value.clone());
        }
        out
    }

    /// Import a document section, validating every recognized key.
    ///
    /// Atomic: the whole mapping is validated before any value is
    /// applied, so one rejected entry leaves the group untouched.
    /// Unknown keys (including unrecognized nested branches) are
    /// ignored for forward compatibility, never rejected.
    pub fn from_map(&mut self, section: &Map<String, Value>) -> SettingsResult<()> {
        let mut accepted: Vec<(String, Value)> = Vec::new();

        for (key, value) in self.flatten_section(section) {
            let Some(def) = self.schema.get(&key) else {
                tracing::debug!("Ignoring unknown key '{}' in group '{}'", key, self.name);
                continue;
            };
            if let Some(validator) = &def.validator {
                if let Err(reason) = validator.validate(&value) {
                    return Err(SettingsError::validation(&self.name, &key, value, reason));
                }
            }
            accepted.push((key, value));
        }

        for (key, value) in accepted {
            self.values.insert(key, value);
        }
        Ok(())
    }

    /// Replace every value with its schema default.
    ///
    /// Defaults are valid by construction and skip validation.
    pub fn reset_to_defaults(&mut self) {
        for (key, def) in &self.schema {
            self.values.insert(key.clone(), def.default.clone());
        }
    }

    /// Per-key default and rule description, for UI form generation.
    pub fn get_schema(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for (key, def) in &self.schema {
            let rule = def.validator.as_ref().map(|v| v.describe());
            out.insert(
                key.clone(),
                json!({
                    "default": def.default,
                    "rule": rule,
                }),
            );
        }
        out
    }

    /// Re-check every held value against its rule.
    ///
    /// Returns the violations as (key, reason) pairs; empty means
    /// the group is currently valid.
    pub fn violations(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (key, def) in &self.schema {
            let Some(validator) = &def.validator else {
                continue;
            };
            if let Some(value) = self.values.get(key) {
                if let Err(reason) = validator.validate(value) {
                    out.push((key.clone(), reason));
                }
            }
        }
        out
    }

    /// Flatten a section into dotted key/value pairs.
    ///
    /// A nested branch stops flattening as soon as its dotted path
    /// names a schema key, so object-valued keys stay intact.
    fn flatten_section(&self, section: &Map<String, Value>) -> Vec<(String, Value)> {
        let mut out = Vec::new();
        for (key, value) in section {
            self.flatten_into(key.clone(), value, &mut out);
        }
        out
    }

    fn flatten_into(&self, prefix: String, value: &Value, out: &mut Vec<(String, Value)>) {
        if !self.schema.contains_key(&prefix) {
            if let Value::Object(map) = value {
                for (key, child) in map {
                    self.flatten_into(format!("{}.{}", prefix, key), child, out);
                }
                return;
            }
        }
        out.push((prefix, value.clone()));
    }
}

/// Insert a dotted key as nested objects.
fn insert_dotted(out: &mut Map<String, Value>, dotted: &str, value: Value) {
    match dotted.split_once('.') {
        None => {
            out.insert(dotted.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = out
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = entry {
                insert_dotted(map, rest, value);
            }
        }
    }
}
