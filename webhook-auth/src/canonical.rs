//! Payload canonicalization.
//!
//! Every HMAC-based verifier hashes the output of [`canonicalize`], on both the sign path
//! and the verify path, so sender and receiver always compute over identical bytes.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A webhook payload: either the raw request text or a structured JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Json(Value),
}

impl Payload {
    /// True for an empty string, `null`, or an empty object or array.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Text(text) => text.is_empty(),
            Payload::Json(Value::Null) => true,
            Payload::Json(Value::String(text)) => text.is_empty(),
            Payload::Json(Value::Object(map)) => map.is_empty(),
            Payload::Json(Value::Array(items)) => items.is_empty(),
            Payload::Json(_) => false,
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// Converts a payload into the string that gets signed.
///
/// Text passes through untouched. JSON values are serialized compactly (object keys keep
/// their insertion order) and any `\uXXXX` escape is rewritten with uppercase hex digits.
pub fn canonicalize(payload: &Payload) -> Result<Cow<'_, str>, serde_json::Error> {
    match payload {
        Payload::Text(text) => Ok(Cow::Borrowed(text.as_str())),
        Payload::Json(value) => {
            let json = serde_json::to_string(value)?;
            Ok(Cow::Owned(uppercase_unicode_escapes(&json)))
        }
    }
}

fn uppercase_unicode_escapes(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars();

    while let Some(c) = chars.next() {
        out.push(c);
        if c != '\\' {
            continue;
        }
        // Consume the escaped character so `\\u` is never mistaken for an escape.
        match chars.next() {
            Some('u') => {
                out.push('u');
                for hex in chars.by_ref().take(4) {
                    out.push(hex.to_ascii_uppercase());
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}
