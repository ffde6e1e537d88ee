//! Status-driven classification of suggest responses.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::{RawResponse, TransportError};

/// Closed set of failure shapes a suggest request can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Server,
    ContentType,
    NotFound,
    Throttled,
    InvalidParameter,
    ExpectationFailed,
    JsonParse,
    Network,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Server => "server",
            ErrorKind::ContentType => "content_type",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Throttled => "throttled",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::ExpectationFailed => "expectation_failed",
            ErrorKind::JsonParse => "json_parse",
            ErrorKind::Network => "network",
        }
    }

    /// Name used when the response body does not supply one.
    fn fallback_name(self) -> &'static str {
        match self {
            ErrorKind::Server => "Server error",
            ErrorKind::ContentType => "Content-Type error",
            ErrorKind::NotFound => "Not found",
            ErrorKind::Throttled => "Throttled",
            ErrorKind::InvalidParameter => "Invalid parameter",
            ErrorKind::ExpectationFailed => "Expectation failed",
            ErrorKind::JsonParse => "JSON parse error",
            ErrorKind::Network => "Request error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified request failure.
///
/// `status` is the HTTP status of the response, or `0` when the request
/// never produced one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{name}: {message}")]
pub struct RequestError {
    pub kind: ErrorKind,
    pub name: String,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl RequestError {
    fn fixed(kind: ErrorKind, message: &str, status: u16) -> Self {
        Self {
            kind,
            name: kind.fallback_name().to_string(),
            message: message.to_string(),
            status,
            retry_after: None,
        }
    }

    pub fn server(status: u16) -> Self {
        Self::fixed(ErrorKind::Server, "Something went wrong on the server", status)
    }

    pub fn content_type(status: u16) -> Self {
        Self::fixed(
            ErrorKind::ContentType,
            "Content-Type was not provided or is of wrong type",
            status,
        )
    }

    pub fn not_found() -> Self {
        Self::fixed(ErrorKind::NotFound, "Not found", 404)
    }

    pub fn json_parse(status: u16) -> Self {
        Self::fixed(ErrorKind::JsonParse, "JSON syntax error", status)
    }

    /// Error whose name and message come from a `{message, description}` body.
    fn from_body(kind: ErrorKind, body: &Map<String, Value>, status: u16) -> Self {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            kind,
            name: text("message").unwrap_or_else(|| kind.fallback_name().to_string()),
            message: text("description").unwrap_or_default(),
            status,
            retry_after: None,
        }
    }

    pub fn is_throttled(&self) -> bool {
        self.kind == ErrorKind::Throttled
    }
}

impl From<TransportError> for RequestError {
    fn from(err: TransportError) -> Self {
        Self::fixed(ErrorKind::Network, &err.to_string(), 0)
    }
}

/// Classify a response, returning the parsed JSON object on success.
///
/// Checks run in a fixed order: server errors first, then the content type,
/// then the status-specific shapes. Server errors keep the response's actual
/// 5xx status rather than a flat 500.
pub fn classify(response: &RawResponse) -> Result<Map<String, Value>, RequestError> {
    let status = response.status;

    if status >= 500 {
        return Err(RequestError::server(status));
    }

    if !is_json(response.content_type.as_deref()) {
        return Err(RequestError::content_type(status));
    }

    if status == 404 {
        return Err(RequestError::not_found());
    }

    let body = parse_object(&response.body).ok_or_else(|| RequestError::json_parse(status))?;

    match status {
        200 => Ok(body),
        429 => {
            let mut err = RequestError::from_body(ErrorKind::Throttled, &body, status);
            err.retry_after = parse_retry_after(response.retry_after.as_deref());
            Err(err)
        }
        417 => Err(RequestError::from_body(
            ErrorKind::ExpectationFailed,
            &body,
            status,
        )),
        _ => Err(RequestError::from_body(
            ErrorKind::InvalidParameter,
            &body,
            status,
        )),
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|value| value.to_ascii_lowercase().contains("application/json"))
}

fn parse_object(body: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Integer seconds from a `Retry-After` header; HTTP dates are ignored.
fn parse_retry_after(value: Option<&str>) -> Option<u64> {
    value.and_then(|raw| raw.trim().parse().ok())
}
