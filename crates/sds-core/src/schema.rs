//! Resource schemas
//!
//! A schema lists the user-facing fields of a resource type, their kind,
//! defaults and validation rules. [`Schema::build`] turns a JSON
//! configuration into [`ResourceData`] the CRUD adapter can work with.

use std::net::IpAddr;

use regex::Regex;
use serde_json::Value;

use crate::data::ResourceData;
use crate::error::{Error, Result};

/// Value kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Bool,
    Int,
    /// List of strings
    List,
    /// Map of string to string
    Map,
}

impl FieldKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Bool => value.is_boolean(),
            FieldKind::Int => value.is_i64(),
            FieldKind::List => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldKind::Map => value
                .as_object()
                .is_some_and(|map| map.values().all(Value::is_string)),
        }
    }

    fn zero(&self) -> Value {
        match self {
            FieldKind::String => Value::String(String::new()),
            FieldKind::Bool => Value::Bool(false),
            FieldKind::Int => Value::from(0),
            FieldKind::List => Value::Array(Vec::new()),
            FieldKind::Map => Value::Object(serde_json::Map::new()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Bool => "bool",
            FieldKind::Int => "integer",
            FieldKind::List => "list of strings",
            FieldKind::Map => "map of strings",
        }
    }
}

/// Validation rule applied to a configured value
#[derive(Debug, Clone)]
pub enum Validator {
    /// String must be one of `values`
    OneOf {
        values: &'static [&'static str],
        ignore_case: bool,
    },
    /// String must parse as an IPv4 or IPv6 address
    IpAddress,
    /// String must match the regex
    Matches { pattern: Regex, message: &'static str },
    /// Integer must be at least the given bound
    IntAtLeast(i64),
}

impl Validator {
    fn check(&self, field: &str, value: &Value) -> Result<()> {
        match self {
            Validator::OneOf {
                values,
                ignore_case,
            } => {
                let s = value.as_str().unwrap_or_default();
                let found = values.iter().any(|allowed| {
                    if *ignore_case {
                        allowed.eq_ignore_ascii_case(s)
                    } else {
                        *allowed == s
                    }
                });
                if !found {
                    return Err(Error::invalid_input(format!(
                        "{}: expected one of [{}], got '{}'",
                        field,
                        values.join(", "),
                        s
                    )));
                }
            }
            Validator::IpAddress => {
                let s = value.as_str().unwrap_or_default();
                if s.parse::<IpAddr>().is_err() {
                    return Err(Error::invalid_input(format!(
                        "{}: '{}' is not a valid IP address",
                        field, s
                    )));
                }
            }
            Validator::Matches { pattern, message } => {
                let s = value.as_str().unwrap_or_default();
                if !pattern.is_match(s) {
                    return Err(Error::invalid_input(format!("{}: {}", field, message)));
                }
            }
            Validator::IntAtLeast(min) => {
                let n = value.as_i64().unwrap_or_default();
                if n < *min {
                    return Err(Error::invalid_input(format!(
                        "{}: expected at least {}, got {}",
                        field, min, n
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Declaration of one resource field
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
    pub required: bool,
    /// Changing this field replaces the remote object
    pub force_new: bool,
    /// Values differing only in ASCII case are the same value
    pub ignore_case: bool,
    pub default: Option<Value>,
    pub validator: Option<Validator>,
}

impl FieldSchema {
    fn of(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            required: false,
            force_new: false,
            ignore_case: false,
            default: None,
            validator: None,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::of(name, FieldKind::String)
    }

    pub fn bool(name: &'static str) -> Self {
        Self::of(name, FieldKind::Bool)
    }

    pub fn int(name: &'static str) -> Self {
        Self::of(name, FieldKind::Int)
    }

    pub fn list(name: &'static str) -> Self {
        Self::of(name, FieldKind::List)
    }

    pub fn map(name: &'static str) -> Self {
        Self::of(name, FieldKind::Map)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Whether `old` and `new` hold the same value for this field
    pub fn same_value(&self, old: Option<&Value>, new: Option<&Value>) -> bool {
        match (old, new) {
            (Some(Value::String(a)), Some(Value::String(b))) if self.ignore_case => {
                a.eq_ignore_ascii_case(b)
            }
            _ => old == new,
        }
    }
}

/// Field set of a resource type
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldSchema>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Build resource data from a JSON configuration object
    ///
    /// Unknown keys, kind mismatches, missing required fields and failed
    /// validators are rejected. Unset optional fields take their default,
    /// or the zero value of their kind.
    pub fn build(&self, config: &Value) -> Result<ResourceData> {
        let object = config
            .as_object()
            .ok_or_else(|| Error::invalid_input("resource configuration must be a JSON object"))?;

        if let Some(unknown) = object.keys().find(|k| self.field(k).is_none()) {
            return Err(Error::invalid_input(format!("unknown field '{}'", unknown)));
        }

        let mut data = ResourceData::new();

        for field in &self.fields {
            let value = match object.get(field.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    if !field.kind.matches(value) {
                        return Err(Error::invalid_input(format!(
                            "{}: expected {}",
                            field.name,
                            field.kind.name()
                        )));
                    }
                    if let Some(validator) = &field.validator {
                        validator.check(field.name, value)?;
                    }
                    value.clone()
                }
                None if field.required => {
                    return Err(Error::invalid_input(format!(
                        "{}: field is required",
                        field.name
                    )));
                }
                None => field.default.clone().unwrap_or_else(|| field.kind.zero()),
            };

            data.set(field.name, value);
        }

        Ok(data)
    }

    /// Force-new fields whose value differs between `old` and `new`
    ///
    /// A field absent from `old` was never observed (e.g. not returned on
    /// import) and does not count as a change.
    pub fn requires_replace(&self, old: &ResourceData, new: &ResourceData) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.force_new)
            .filter(|f| {
                old.get(f.name)
                    .is_some_and(|value| !f.same_value(Some(value), new.get(f.name)))
            })
            .map(|f| f.name)
            .collect()
    }

    /// Whether `old` and `new` carry the same fields, compared per field rules
    pub fn same_fields(&self, old: &ResourceData, new: &ResourceData) -> bool {
        old.fields().len() == new.fields().len()
            && old.fields().iter().all(|(name, value)| match self.field(name) {
                Some(field) => field.same_value(Some(value), new.get(name)),
                None => Some(value) == new.get(name),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(vec![
            FieldSchema::string("name").required().force_new(),
            FieldSchema::string("forward")
                .default("only")
                .validate(Validator::OneOf {
                    values: &["first", "only"],
                    ignore_case: true,
                }),
            FieldSchema::string("address").validate(Validator::IpAddress),
            FieldSchema::int("nodes").default(1).validate(Validator::IntAtLeast(1)),
            FieldSchema::list("forwarders"),
            FieldSchema::map("class_parameters"),
            FieldSchema::bool("affinity"),
        ])
    }

    #[test]
    fn build_applies_defaults_and_zero_values() {
        let data = schema().build(&json!({"name": "fwd.example.com"})).unwrap();

        assert_eq!(data.get_str("name"), "fwd.example.com");
        assert_eq!(data.get_str("forward"), "only");
        assert_eq!(data.get_i64("nodes"), 1);
        assert_eq!(data.get("forwarders"), Some(&json!([])));
        assert_eq!(data.get("class_parameters"), Some(&json!({})));
        assert_eq!(data.get("affinity"), Some(&json!(false)));
        assert!(!data.has_id());
    }

    #[test]
    fn build_rejects_missing_required_field() {
        let err = schema().build(&json!({})).unwrap_err();
        assert!(err.to_string().contains("name: field is required"));
    }

    #[test]
    fn build_rejects_unknown_field_and_wrong_kind() {
        assert!(schema().build(&json!({"name": "a", "bogus": 1})).is_err());
        assert!(schema().build(&json!({"name": "a", "nodes": "3"})).is_err());
        assert!(schema().build(&json!({"name": "a", "forwarders": [1]})).is_err());
        assert!(schema().build(&json!("not an object")).is_err());
    }

    #[test]
    fn validators_are_applied() {
        assert!(schema().build(&json!({"name": "a", "forward": "FIRST"})).is_ok());
        assert!(schema().build(&json!({"name": "a", "forward": "never"})).is_err());
        assert!(schema().build(&json!({"name": "a", "address": "10.0.0.300"})).is_err());
        assert!(schema().build(&json!({"name": "a", "address": "2001:db8::1"})).is_ok());
        assert!(schema().build(&json!({"name": "a", "nodes": 0})).is_err());
    }

    #[test]
    fn regex_validator_reports_message() {
        let schema = Schema::new(vec![FieldSchema::string("mac").validate(Validator::Matches {
            pattern: Regex::new("^[0-9a-f]{2}$").unwrap(),
            message: "Unsupported MAC address format.",
        })]);

        let err = schema.build(&json!({"mac": "zz"})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: mac: Unsupported MAC address format.");
    }

    #[test]
    fn requires_replace_lists_changed_force_new_fields() {
        let schema = schema();
        let old = schema.build(&json!({"name": "a", "forward": "only"})).unwrap();
        let same = schema.build(&json!({"name": "a", "forward": "first"})).unwrap();
        let renamed = schema.build(&json!({"name": "b"})).unwrap();

        assert!(schema.requires_replace(&old, &same).is_empty());
        assert_eq!(schema.requires_replace(&old, &renamed), vec!["name"]);

        let imported = ResourceData::with_id("3");
        assert!(schema.requires_replace(&imported, &renamed).is_empty());
    }

    #[test]
    fn case_insensitive_fields_ignore_case_only_edits() {
        let schema = Schema::new(vec![
            FieldSchema::string("mac").required().force_new().ignore_case(),
            FieldSchema::string("space").required().force_new(),
        ]);
        let old = schema
            .build(&json!({"mac": "AA:BB:CC:DD:EE:FF", "space": "Local"}))
            .unwrap();
        let lower = schema
            .build(&json!({"mac": "aa:bb:cc:dd:ee:ff", "space": "Local"}))
            .unwrap();
        let other_space = schema
            .build(&json!({"mac": "AA:BB:CC:DD:EE:FF", "space": "local"}))
            .unwrap();

        assert!(schema.requires_replace(&old, &lower).is_empty());
        assert!(schema.same_fields(&old, &lower));
        assert_eq!(schema.requires_replace(&old, &other_space), vec!["space"]);
        assert!(!schema.same_fields(&old, &other_space));
    }
}
