//! Tree preprocessing applied before matching
//!
//! Every function here borrows its input and builds a new tree, so the
//! caller's fixtures are never modified.

use serde_json::{Map, Value};

/// Keys ending with this marker are scratch fields and never compared
pub const RESERVED_SUFFIX: &str = "__";

/// What [`strip`] removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripOptions {
    /// Remove null mapping values and null sequence elements
    pub nulls: bool,
    /// Remove keys ending with [`RESERVED_SUFFIX`]
    pub reserved: bool,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            nulls: true,
            reserved: true,
        }
    }
}

/// Whether a key is a scratch field
pub fn is_reserved_key(key: &str) -> bool {
    key.ends_with(RESERVED_SUFFIX)
}

/// Remove nulls and reserved keys at every depth
pub fn strip_nulls(tree: &Value) -> Value {
    strip(tree, StripOptions::default())
}

/// Remove nulls and/or reserved keys at every depth
pub fn strip(tree: &Value, options: StripOptions) -> Value {
    match tree {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, value)| {
                    let null = options.nulls && value.is_null();
                    let reserved = options.reserved && is_reserved_key(key);
                    !(null || reserved)
                })
                .map(|(key, value)| (key.clone(), strip(value, options)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|item| !(options.nulls && item.is_null()))
                .map(|item| strip(item, options))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Normalize a single key: drop underscores and upper-case the rest.
///
/// `crm_sale_id` and `crmSaleId` both become `CRMSALEID`.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Normalize every mapping key at every depth.
///
/// Keys that collide after normalization keep the value that sorts last.
pub fn normalize_keys(tree: &Value) -> Value {
    match tree {
        Value::Object(map) => {
            let mut normalized = Map::with_capacity(map.len());
            for (key, value) in map {
                normalized.insert(normalize_key(key), normalize_keys(value));
            }
            Value::Object(normalized)
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize_keys).collect()),
        other => other.clone(),
    }
}
