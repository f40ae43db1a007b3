//! Key-path parsing and value conversion for the `ai.*` namespace.

use serde_json::Value as JsonValue;
use toml::Value;

use crate::error::ConfigError;

use super::defaults::NAMESPACE;

/// Split a dotted key into path segments relative to the `ai` table.
///
/// A leading `ai.` is accepted and stripped; a bare `ai` means the whole
/// namespace (empty path).
pub(crate) fn key_path(key: &str) -> Result<Vec<String>, ConfigError> {
    let trimmed = key.trim();
    let relative = if trimmed == NAMESPACE {
        ""
    } else {
        trimmed
            .strip_prefix(NAMESPACE)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(trimmed)
    };
    if relative.is_empty() {
        return Ok(Vec::new());
    }
    let segments = relative.split('.').map(str::trim).collect::<Vec<_>>();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::Invalid(format!(
            "config key `{trimmed}` has an empty segment"
        )));
    }
    Ok(segments.into_iter().map(str::to_string).collect())
}

/// Infer a typed value from CLI text.
///
/// A boolean, integer or float is only inferred when [`display_value`] gives
/// back exactly `text`, so `config get` prints what `config set` was given.
/// `007`, `+5` and `1e3` stay strings.
pub fn parse_value(text: &str) -> Value {
    match text {
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }
    if let Ok(int) = text.parse::<i64>() {
        if int.to_string() == text {
            return Value::Integer(int);
        }
    }
    if let Ok(float) = text.parse::<f64>() {
        if float.is_finite() && format_float(float) == text {
            return Value::Float(float);
        }
    }
    Value::String(text.to_string())
}

/// Floats always carry a fraction (`1.0`, not `1`) so they stay distinct
/// from integers.
fn format_float(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Convert a TOML value to JSON for structured display.
pub fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Datetime(dt) => JsonValue::String(dt.to_string()),
        Value::Array(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        Value::Table(table) => JsonValue::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

/// Render a value for `config get`: scalars as plain text, tables and arrays
/// as pretty JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(dt) => dt.to_string(),
        Value::Array(_) | Value::Table(_) => {
            serde_json::to_string_pretty(&to_json(value)).unwrap_or_default()
        }
    }
}
