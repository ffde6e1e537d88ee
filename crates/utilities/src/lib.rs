//! Small building blocks shared by the predictive-search controller: a FIFO
//! result cache, a typed event dispatcher, a trailing-edge debouncer and a
//! nested query-string encoder.
//!
//! None of these types know about HTTP or search results. The controller in
//! the `predictive-search` crate composes them into the query lifecycle, but
//! each one is usable on its own.
//!
//! Cache usage:
//! ```
//! use predictive_search_utils::Cache;
//!
//! let mut cache = Cache::with_bucket_size(2);
//! cache.set("foo", 1);
//! cache.set("bar", 2);
//! cache.set("baz", 3);
//! assert!(!cache.has("foo"));
//! assert_eq!(cache.get("baz"), Some(&3));
//! ```
//!
//! Query-string usage:
//! ```
//! use predictive_search_utils::query_params;
//! use serde_json::json;
//!
//! let params = query_params::encode(&json!({
//!     "foo": "foo",
//!     "resources": { "fuzzy": true, "types": ["product", "collection"] }
//! }));
//! assert_eq!(
//!     params,
//!     "foo=foo&resources[fuzzy]=true&resources[types][]=product&resources[types][]=collection&"
//! );
//! ```

pub mod cache;
pub mod debounce;
pub mod dispatcher;
pub mod query_params;

pub use cache::{Cache, DEFAULT_BUCKET_SIZE};
pub use debounce::{Debouncer, debounce};
pub use dispatcher::{Dispatcher, EventMap, ListenerId, Snapshot};
pub use query_params::{ArrayFormat, encode_uri_component};
