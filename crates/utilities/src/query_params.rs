//! Flatten nested JSON configuration into a query-string fragment.
//!
//! Nested objects become bracketed keys (`resources[options][fields]`), array
//! items are repeated with a `[]` suffix, and every pair is followed by `&`,
//! including the last one. Keys are emitted verbatim; values are
//! percent-encoded the same way a browser's `encodeURIComponent` does.

use std::fmt::Write;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};

/// Characters left untouched by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// How array values are written into the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayFormat {
    /// One `key[]=item&` pair per element.
    #[default]
    Brackets,
    /// A single `key=a,b&` pair with comma-joined, individually encoded items.
    Comma,
}

/// Percent-encode `input` as a URI component (spaces become `%20`).
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// Encode `value` with [`ArrayFormat::Brackets`].
pub fn encode(value: &Value) -> String {
    encode_with(value, ArrayFormat::Brackets)
}

/// Encode an object's entries in iteration order. Non-object roots produce
/// an empty string.
pub fn encode_with(value: &Value, format: ArrayFormat) -> String {
    let mut output = String::new();
    if let Value::Object(map) = value {
        write_object(&mut output, map, None, format);
    }
    output
}

fn write_object(
    output: &mut String,
    map: &Map<String, Value>,
    parent: Option<&str>,
    format: ArrayFormat,
) {
    for (key, value) in map {
        let name = match parent {
            Some(parent) => format!("{parent}[{key}]"),
            None => key.clone(),
        };

        match value {
            Value::Object(child) => write_object(output, child, Some(&name), format),
            Value::Array(items) => write_array(output, &name, items, format),
            scalar => write_pair(output, &name, &scalar_text(scalar)),
        }
    }
}

fn write_array(output: &mut String, name: &str, items: &[Value], format: ArrayFormat) {
    if items.is_empty() {
        return;
    }

    match format {
        ArrayFormat::Brackets => {
            for item in items {
                write_pair(output, &format!("{name}[]"), &scalar_text(item));
            }
        }
        ArrayFormat::Comma => {
            let joined = items
                .iter()
                .map(|item| encode_uri_component(&scalar_text(item)))
                .collect::<Vec<_>>()
                .join(",");
            let _ = write!(output, "{name}={joined}&");
        }
    }
}

fn write_pair(output: &mut String, name: &str, value: &str) {
    let _ = write!(output, "{name}={}&", encode_uri_component(value));
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        compound => compound.to_string(),
    }
}
