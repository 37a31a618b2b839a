//! Query-string serialization for GET parameters.

use serde_json::{Map, Value};

/// Serialize GET params into a query string, leading `?` included.
///
/// Returns an empty string for absent or empty params. Scalar values are
/// percent-encoded with standard `application/x-www-form-urlencoded` rules;
/// array and object values are JSON-stringified into a single value slot
/// rather than guessing a bracket or repeat convention.
#[must_use]
pub fn query_string(params: Option<&Map<String, Value>>) -> String {
    let Some(params) = params else {
        return String::new();
    };
    if params.is_empty() {
        return String::new();
    }

    let pairs: Vec<(&str, String)> = params
        .iter()
        .map(|(key, value)| (key.as_str(), query_value(value)))
        .collect();

    match serde_urlencoded::to_string(&pairs) {
        Ok(encoded) => format!("?{encoded}"),
        // String pairs cannot fail to encode.
        Err(_) => String::new(),
    }
}

/// Render one param value into its query-string slot.
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
