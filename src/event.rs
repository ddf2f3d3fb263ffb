//! A JSON-backed event implementation.
//!
//! Events arrive as one JSON object per line. Field lookups fall back to the
//! legacy `@fields` object so that older producers keep working.

use crate::core::{Event, FieldValue};
use chrono::{DateTime, SecondsFormat, Utc};
use chrono::format::{Item, StrftimeItems};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;

static FIELD_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\{([^}]+)\}").expect("field reference pattern is valid"));

#[derive(Error, Debug)]
pub enum EventError {
    #[error("invalid JSON event: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// An event whose fields are held in a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonEvent {
    fields: Map<String, Value>,
}

impl JsonEvent {
    /// Wraps an existing object, stamping `@timestamp` if it is missing.
    pub fn new(mut fields: Map<String, Value>) -> Self {
        if !fields.contains_key("@timestamp") {
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            fields.insert("@timestamp".to_string(), Value::String(now));
        }
        Self { fields }
    }

    /// Parses one JSON-lines record.
    pub fn from_line(line: &str) -> Result<Self, EventError> {
        match serde_json::from_str::<Value>(line)? {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(EventError::NotAnObject(json_kind(&other))),
        }
    }

    fn lookup(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).or_else(|| {
            self.fields
                .get("@fields")
                .and_then(Value::as_object)
                .and_then(|nested| nested.get(field))
        })
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.lookup("@timestamp")?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Formats `@timestamp` with a strftime pattern, or `None` if either the
    /// timestamp or the pattern is unusable.
    fn format_timestamp(&self, pattern: &str) -> Option<String> {
        let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
        if items.iter().any(|item| matches!(item, Item::Error)) {
            return None;
        }
        let ts = self.timestamp()?;
        Some(ts.format_with_items(items.into_iter()).to_string())
    }
}

impl Event for JsonEvent {
    fn get(&self, field: &str) -> Option<FieldValue> {
        self.lookup(field).and_then(to_field_value)
    }

    fn interpolate(&self, template: &str) -> String {
        FIELD_REFERENCE
            .replace_all(template, |caps: &Captures<'_>| {
                let name = &caps[1];
                let expanded = match name.strip_prefix('+') {
                    Some(pattern) => self.format_timestamp(pattern),
                    None => self.get(name).map(|value| value.to_string()),
                };
                expanded.unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn to_field_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        // Nulls stay as empty entries so positions line up across fields.
        Value::Array(items) => Some(FieldValue::Sequence(
            items
                .iter()
                .map(|item| scalar_text(item).unwrap_or_default())
                .collect(),
        )),
        other => scalar_text(other).map(FieldValue::Scalar),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
