//! Local state of one managed resource
//!
//! `ResourceData` mirrors a subset of a remote object's attributes. The id
//! is the appliance oid; it is non-empty iff the remote object is believed
//! to exist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params;

/// Id and field values of a managed resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

impl ResourceData {
    /// Create empty data with no id
    pub fn new() -> Self {
        Self::default()
    }

    /// Create data for an existing remote object (used by import)
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    /// Whether a remote object is believed to exist
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// String value, `""` when unset
    pub fn get_str(&self, key: &str) -> &str {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Bool value, `false` when unset
    pub fn get_bool(&self, key: &str) -> bool {
        self.fields
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    /// Integer value, `0` when unset
    pub fn get_i64(&self, key: &str) -> i64 {
        self.fields
            .get(key)
            .and_then(Value::as_i64)
            .unwrap_or_default()
    }

    /// List of strings, empty when unset
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.fields
            .get(key)
            .map(params::to_string_array)
            .unwrap_or_default()
    }

    /// Map of strings, empty when unset
    pub fn get_map(&self, key: &str) -> BTreeMap<String, String> {
        self.fields
            .get(key)
            .map(params::class_params_from_value)
            .unwrap_or_default()
    }

    /// Store a string map as a JSON object
    pub fn set_map(&mut self, key: impl Into<String>, map: BTreeMap<String, String>) {
        let object = map
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect::<serde_json::Map<_, _>>();
        self.fields.insert(key.into(), Value::Object(object));
    }

    /// Store a list of strings as a JSON array
    pub fn set_list(&mut self, key: impl Into<String>, items: Vec<String>) {
        self.fields.insert(
            key.into(),
            Value::Array(items.into_iter().map(Value::String).collect()),
        );
    }

    /// Human label for messages: the `name` field when set, else the id
    pub fn display_name(&self) -> &str {
        match self.get_str("name") {
            "" => &self.id,
            name => name,
        }
    }
}
