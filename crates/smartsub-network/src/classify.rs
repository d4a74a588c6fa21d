//! Verdict classification of checkpoint service responses.
//!
//! The service has gone through several response shapes over time, so the
//! rules are deliberately lenient:
//!
//! 1. any status outside 2xx is a rejection;
//! 2. a JSON object carrying `registered`, `valid`, `ok` or `success` is judged
//!    by the truthiness of the first of those present, in that order;
//! 3. otherwise a JSON object with a `status` field is accepted when that
//!    value, lowercased, is `ok`, `success` or `valid`;
//! 4. otherwise the trimmed, lowercased body must be `ok`, `true`, `1` or
//!    `valid`.

use serde_json::Value;
use smartsub_core::constants::{STATUS_ACCEPTED, STATUS_FIELD, TEXT_ACCEPTED, VERDICT_FIELDS};

/// Decide whether a response accepts the tag.
///
/// # Examples
///
/// ```
/// use smartsub_network::classify_response;
///
/// assert!(classify_response(200, r#"{"valid": true}"#));
/// assert!(classify_response(200, "OK\n"));
/// assert!(!classify_response(404, "OK"));
/// assert!(!classify_response(200, r#"{"foo": "bar"}"#));
/// ```
pub fn classify_response(status: u16, body: &str) -> bool {
    if !(200..300).contains(&status) {
        return false;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(value) = VERDICT_FIELDS.iter().find_map(|f| map.get(*f)) {
            return is_truthy(value);
        }
        if let Some(value) = map.get(STATUS_FIELD) {
            let status = match value {
                Value::String(s) => s.to_lowercase(),
                other => other.to_string().to_lowercase(),
            };
            return STATUS_ACCEPTED.contains(&status.as_str());
        }
    }

    let text = body.trim().to_lowercase();
    TEXT_ACCEPTED.contains(&text.as_str())
}

/// Loose truthiness of a JSON value: `false`, `null`, zero, and empty
/// strings, arrays and objects are false; everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
