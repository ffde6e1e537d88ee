//! One-shot requests against the storefront's suggest endpoint.
//!
//! [`request`] builds the endpoint URL, hands it to a [`Transport`] and routes
//! the [`RawResponse`] through [`taxonomy::classify`]. Nothing here retries;
//! throttling only surfaces a `retry_after` hint on the returned error.

mod http;
pub mod taxonomy;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use predictive_search_utils::encode_uri_component;

pub use http::{DEFAULT_TIMEOUT, HttpTransport};
pub use taxonomy::{ErrorKind, RequestError};

/// Response as seen by the classifier, independent of the HTTP client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub retry_after: Option<String>,
    pub body: String,
}

impl RawResponse {
    /// Response with an `application/json` content type.
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json; charset=utf-8".to_string()),
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }
}

/// Failures that happen before any HTTP status is available.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

/// Issues a single GET for a path-and-query relative to the storefront.
///
/// Implementations are shared with request threads, so they must be
/// `Send + Sync`.
pub trait Transport: Send + Sync {
    fn get(&self, path_and_query: &str) -> Result<RawResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn get(&self, path_and_query: &str) -> Result<RawResponse, TransportError> {
        (**self).get(path_and_query)
    }
}

/// Parsed suggest response, annotated with the raw query that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultEnvelope {
    body: Map<String, Value>,
}

impl ResultEnvelope {
    pub const QUERY_KEY: &'static str = "query";

    pub fn new(mut body: Map<String, Value>, query: &str) -> Self {
        body.insert(Self::QUERY_KEY.to_string(), Value::String(query.to_string()));
        Self { body }
    }

    /// Raw query string this envelope answers.
    pub fn query(&self) -> &str {
        self.body
            .get(Self::QUERY_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// The `resources` object of the response, when present.
    pub fn resources(&self) -> Option<&Map<String, Value>> {
        self.body.get("resources").and_then(Value::as_object)
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }
}

/// Path and query string for a suggest request.
pub fn suggest_url(search_path: &str, config_params: &str, query: &str) -> String {
    format!(
        "{search_path}/suggest.json?s={}&{config_params}",
        encode_uri_component(query)
    )
}

/// Issue exactly one suggest request for `query` and classify the outcome.
pub fn request<T>(
    transport: &T,
    search_path: &str,
    config_params: &str,
    query: &str,
) -> Result<ResultEnvelope, RequestError>
where
    T: Transport + ?Sized,
{
    let url = suggest_url(search_path, config_params, query);
    debug!(target: "predictive_search::request", %url, "issuing suggest request");

    let response = transport.get(&url).map_err(RequestError::from)?;
    let body = taxonomy::classify(&response)?;
    Ok(ResultEnvelope::new(body, query))
}
