//! Client-side predictive search for storefront `suggest.json` endpoints.
//!
//! [`PredictiveSearch`] turns keystroke-rate queries into at most one request
//! per debounce window, serves repeated queries from a bounded FIFO cache, and
//! drops responses that arrive after a newer query superseded them. Results
//! and failures are reported through typed events rather than return values:
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use predictive_search::{HttpTransport, PredictiveSearch, ResourceType, SearchConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new("https://shop.example")?);
//! let config = SearchConfig::new()
//!     .resource_type(ResourceType::Product)
//!     .limit(4);
//! let mut search = PredictiveSearch::from_config(&config, transport)?;
//!
//! search.on_success(|envelope| println!("{}", envelope.query()));
//! search.on_error(|error| eprintln!("{error}"));
//!
//! search.query("The Calling");
//! search.settle(Duration::from_secs(5));
//! # Ok(())
//! # }
//! ```
//!
//! The cache, dispatcher, debouncer and query-string encoder live in the
//! `predictive-search-utils` crate, re-exported here as [`utilities`].

pub mod config;
pub mod request;
pub mod search;

pub use predictive_search_utils as utilities;
pub use predictive_search_utils::ArrayFormat;

pub use config::{
    ConfigError, DEFAULT_SEARCH_PATH, ResourceOptions, ResourceType, Resources, SearchConfig,
    SearchConfiguration, SearchField, UnavailableProducts,
};
pub use request::{
    ErrorKind, HttpTransport, RawResponse, RequestError, ResultEnvelope, Transport,
    TransportError,
};
pub use search::{
    ArgumentError, BUCKET_SIZE, DEBOUNCE_RATE, PredictiveSearch, QueryDisposition, SearchError,
    SearchEvent, SearchEventKind, SearchOptions, normalize_query,
};
