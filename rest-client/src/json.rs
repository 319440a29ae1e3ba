//! Queryable view over a materialized response body.
//!
//! Lookups use dot paths (`data.id`, `items.0.name`) resolved against the
//! parsed document, optionally under a base path applied to every query.
//! An unparseable body behaves like an empty document: lookups return
//! `None` rather than inventing an error the call itself never produced.

use serde_json::Value;

use crate::error::ClientError;

/// Parsed-body view returned by [`RestResult::json`](crate::RestResult::json).
pub struct JsonResult {
    root: Value,
    base: String,
    err: Option<ClientError>,
}

impl JsonResult {
    /// Parse `body` and scope all lookups under `base_path` (may be empty).
    pub fn new(body: &str, base_path: impl Into<String>) -> Self {
        let root = serde_json::from_str(body).unwrap_or(Value::Null);
        Self {
            root,
            base: base_path.into(),
            err: None,
        }
    }

    /// View carrying the call's terminal error; every lookup returns `None`.
    pub fn from_error(err: ClientError) -> Self {
        Self {
            root: Value::Null,
            base: String::new(),
            err: Some(err),
        }
    }

    /// Top-level error of the call this view belongs to.
    pub fn err(&self) -> Option<&ClientError> {
        self.err.as_ref()
    }

    /// Resolve a dot path relative to the base path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if self.err.is_some() {
            return None;
        }
        let full = match (self.base.is_empty(), path.is_empty()) {
            (true, _) => path.to_string(),
            (false, true) => self.base.clone(),
            (false, false) => format!("{}.{}", self.base, path),
        };
        if full.is_empty() {
            return Some(&self.root);
        }
        let mut current = &self.root;
        for segment in full.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Extract a string, coercing numbers and booleans.
    pub fn str_value(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Extract an integer, coercing numeric strings.
    pub fn i64_value(&self, path: &str) -> Option<i64> {
        match self.get(path)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Extract a boolean.
    pub fn bool_value(&self, path: &str) -> Option<bool> {
        self.get(path)?.as_bool()
    }
}
