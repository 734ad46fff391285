//! Form parameter building
//!
//! Every request to the appliance carries its arguments as URL-encoded
//! key/value pairs. Resource mappings build a [`Parameters`] set from local
//! state using the helpers here:
//!
//! - lists are sent as `;`-terminated strings (`"10.0.0.1;10.0.0.2;"`)
//! - class parameters are a nested, URL-encoded query string
//!   (`"owner=ops&site=par1"`)

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use url::form_urlencoded;

/// Delimiter used by the appliance for list-valued attributes
pub const LIST_DELIMITER: char = ';';

/// Ordered set of form parameters for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    pairs: Vec<(String, String)>,
}

impl Parameters {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` has been added
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Iterate over the pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// URL-encode the whole set (`a=1&b=x+y`)
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Collect the string items of a JSON list, skipping non-strings
pub fn to_string_array(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Join items with every item followed by the list delimiter
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items.iter().fold(String::new(), |mut acc, item| {
        acc.push_str(item.as_ref());
        acc.push(LIST_DELIMITER);
        acc
    })
}

/// Split a delimited list as returned by the appliance
///
/// One trailing delimiter is dropped; an empty string gives an empty list.
pub fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }

    raw.strip_suffix(LIST_DELIMITER)
        .unwrap_or(raw)
        .split(LIST_DELIMITER)
        .map(str::to_string)
        .collect()
}

/// Encode class parameters as a query string, keys sorted
pub fn encode_class_params(params: &BTreeMap<String, String>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}

/// Class parameters from a JSON map value (non-string values are skipped)
pub fn class_params_from_value(value: &Value) -> BTreeMap<String, String> {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Decode a class parameter query string, keeping the first value per key
pub fn decode_class_params(query: &str) -> BTreeMap<String, String> {
    let mut decoded = BTreeMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        decoded
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    decoded
}

/// Restrict retrieved class parameters to the keys tracked in local state
///
/// The appliance attaches its own class parameters to most objects; only
/// the keys the user manages are mirrored back. Tracked keys missing on the
/// appliance come back as `""`. Keys in `internal` are never mirrored.
pub fn reconcile_class_params<'a>(
    tracked: impl IntoIterator<Item = &'a String>,
    retrieved: &BTreeMap<String, String>,
    internal: &[&str],
) -> BTreeMap<String, String> {
    let internal: BTreeSet<&str> = internal.iter().copied().collect();

    tracked
        .into_iter()
        .map(|key| {
            let value = if internal.contains(key.as_str()) {
                String::new()
            } else {
                retrieved.get(key).cloned().unwrap_or_default()
            };
            (key.clone(), value)
        })
        .collect()
}
