use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use predictive_search_utils::EventMap;

use crate::request::{RequestError, ResultEnvelope};

/// Names listeners subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEventKind {
    Success,
    Error,
}

impl SearchEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchEventKind::Success => "success",
            SearchEventKind::Error => "error",
        }
    }
}

impl fmt::Display for SearchEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payloads delivered to listeners.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// Results for the current query, shared with the controller's cache.
    Success(Arc<ResultEnvelope>),
    Error(SearchError),
}

impl EventMap for SearchEvent {
    type Kind = SearchEventKind;

    fn kind(&self) -> SearchEventKind {
        match self {
            SearchEvent::Success(_) => SearchEventKind::Success,
            SearchEvent::Error(_) => SearchEventKind::Error,
        }
    }
}

/// Rejected `query` input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("'query' is missing")]
    Missing,

    #[error("'query' is not a string")]
    NotAString { found: &'static str },
}

/// Everything reported through the `error` event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Request(#[from] RequestError),
}

impl SearchError {
    /// Short classification: `argument` or the request error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Argument(_) => "argument",
            SearchError::Request(err) => err.kind.as_str(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SearchError::Argument(_) => "Argument error",
            SearchError::Request(err) => &err.name,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SearchError::Argument(err) => err.to_string(),
            SearchError::Request(err) => err.message.clone(),
        }
    }

    /// HTTP status, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            SearchError::Argument(_) => None,
            SearchError::Request(err) => Some(err.status),
        }
    }

    pub fn retry_after(&self) -> Option<u64> {
        match self {
            SearchError::Argument(_) => None,
            SearchError::Request(err) => err.retry_after,
        }
    }

    pub fn as_request(&self) -> Option<&RequestError> {
        match self {
            SearchError::Request(err) => Some(err),
            SearchError::Argument(_) => None,
        }
    }
}
