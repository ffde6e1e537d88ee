//! The predictive-search controller.
//!
//! [`PredictiveSearch`] validates and normalizes each query, answers from
//! its cache when it can and otherwise schedules a debounced request. Request
//! outcomes come back over a channel and are applied on the owning thread by
//! [`PredictiveSearch::pump`], which is also where listeners run.

mod events;
mod normalize;

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};

use predictive_search_utils::{ArrayFormat, Cache, Debouncer, Dispatcher, EventMap, ListenerId};

use crate::config::{ConfigError, SearchConfig, SearchConfiguration};
use crate::request::{self, RequestError, ResultEnvelope, Transport, TransportError};

pub use events::{ArgumentError, SearchError, SearchEvent, SearchEventKind};
pub use normalize::normalize_query;

/// Delay between the last `query` call and the request it triggers.
pub const DEBOUNCE_RATE: Duration = Duration::from_millis(10);

/// Number of result envelopes a controller keeps.
pub const BUCKET_SIZE: usize = 40;

/// Tunables for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub debounce: Duration,
    pub bucket_size: usize,
    pub array_format: ArrayFormat,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce: DEBOUNCE_RATE,
            bucket_size: BUCKET_SIZE,
            array_format: ArrayFormat::Brackets,
        }
    }
}

/// What a call to [`PredictiveSearch::query`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryDisposition {
    /// Empty input; nothing changed.
    Ignored,
    /// Input was rejected and an `error` event was dispatched.
    Invalid,
    /// Answered from the cache; a `success` event was dispatched.
    Cached,
    /// A debounced request was scheduled.
    Scheduled,
}

enum Outcome {
    /// The debouncer released the call carrying `ticket`.
    Fired { ticket: u64 },
    Finished(Result<ResultEnvelope, RequestError>),
}

/// Bookkeeping for work not yet applied on the owner thread.
#[derive(Debug, Default)]
struct Pending {
    scheduled: u64,
    fired: u64,
    in_flight: usize,
}

impl Pending {
    fn is_idle(&self) -> bool {
        self.fired >= self.scheduled && self.in_flight == 0
    }
}

struct RequestContext {
    transport: Arc<dyn Transport>,
    configuration: SearchConfiguration,
}

/// Debounced, cached suggest queries with `success` and `error` events.
///
/// Listeners run on the thread that calls [`query`](Self::query) or one of
/// the pump methods. A response whose query no longer matches the latest
/// normalized query is cached but not dispatched. Errors are always
/// dispatched.
pub struct PredictiveSearch {
    configuration: SearchConfiguration,
    dispatcher: Dispatcher<SearchEvent>,
    cache: Cache<String, Arc<ResultEnvelope>>,
    debouncer: Debouncer<(u64, String)>,
    outcomes: Receiver<Outcome>,
    pending: Pending,
    current_query: Option<String>,
    retry_after: Option<u64>,
}

impl PredictiveSearch {
    /// Build a controller from a JSON configuration object.
    ///
    /// `Value::Null` fails with [`ConfigError::Missing`].
    pub fn new<T>(config: Value, transport: T) -> Result<Self, ConfigError>
    where
        T: Transport + 'static,
    {
        Self::with_options(config, transport, SearchOptions::default())
    }

    pub fn with_options<T>(
        config: Value,
        transport: T,
        options: SearchOptions,
    ) -> Result<Self, ConfigError>
    where
        T: Transport + 'static,
    {
        let configuration = SearchConfiguration::from_value_with(config, options.array_format)?;
        Ok(Self::from_configuration(
            configuration,
            Arc::new(transport),
            options,
        ))
    }

    /// Build a controller from the typed configuration builder.
    pub fn from_config<T>(config: &SearchConfig, transport: T) -> Result<Self, ConfigError>
    where
        T: Transport + 'static,
    {
        Self::with_options(config.to_value()?, transport, SearchOptions::default())
    }

    pub fn from_configuration(
        configuration: SearchConfiguration,
        transport: Arc<dyn Transport>,
        options: SearchOptions,
    ) -> Self {
        let (tx, outcomes) = mpsc::channel();
        let context = Arc::new(RequestContext {
            transport,
            configuration: configuration.clone(),
        });

        let debouncer = Debouncer::new(options.debounce, move |(ticket, query): (u64, String)| {
            let _ = tx.send(Outcome::Fired { ticket });
            spawn_request(Arc::clone(&context), query, tx.clone());
        });

        Self {
            configuration,
            dispatcher: Dispatcher::new(),
            cache: Cache::with_bucket_size(options.bucket_size),
            debouncer,
            outcomes,
            pending: Pending::default(),
            current_query: None,
            retry_after: None,
        }
    }

    /// Submit a raw query.
    ///
    /// Never fails; problems are reported through the `error` event.
    pub fn query(&mut self, query: &str) -> QueryDisposition {
        if query.is_empty() {
            return QueryDisposition::Ignored;
        }

        let normalized = normalize_query(query);
        self.current_query = Some(normalized.clone());

        if let Some(envelope) = self.cache.get(&normalized).cloned() {
            debug!(query = %normalized, "cache hit");
            self.dispatch(SearchEvent::Success(envelope));
            return QueryDisposition::Cached;
        }

        self.pending.scheduled = self.pending.scheduled.wrapping_add(1);
        self.debouncer.call((self.pending.scheduled, query.to_string()));
        QueryDisposition::Scheduled
    }

    /// Submit a dynamically typed query, validating it first.
    ///
    /// `null` and non-string values dispatch an argument error.
    pub fn query_value(&mut self, query: &Value) -> QueryDisposition {
        let err = match query {
            Value::String(text) => return self.query(text),
            Value::Null => ArgumentError::Missing,
            Value::Bool(_) => ArgumentError::NotAString { found: "boolean" },
            Value::Number(_) => ArgumentError::NotAString { found: "number" },
            Value::Array(_) => ArgumentError::NotAString { found: "array" },
            Value::Object(_) => ArgumentError::NotAString { found: "object" },
        };

        debug!(error = %err, "rejected query input");
        self.dispatch(SearchEvent::Error(err.into()));
        QueryDisposition::Invalid
    }

    pub fn on(
        &mut self,
        kind: SearchEventKind,
        callback: impl Fn(&SearchEvent) + 'static,
    ) -> ListenerId {
        self.dispatcher.on(kind, callback)
    }

    pub fn off(&mut self, kind: SearchEventKind, id: ListenerId) -> bool {
        self.dispatcher.off(kind, id)
    }

    pub fn on_success(&mut self, callback: impl Fn(&ResultEnvelope) + 'static) -> ListenerId {
        self.on(SearchEventKind::Success, move |event| {
            if let SearchEvent::Success(envelope) = event {
                callback(envelope);
            }
        })
    }

    pub fn on_error(&mut self, callback: impl Fn(&SearchError) + 'static) -> ListenerId {
        self.on(SearchEventKind::Error, move |event| {
            if let SearchEvent::Error(err) = event {
                callback(err);
            }
        })
    }

    /// Apply every outcome that has already arrived.
    ///
    /// Returns the number of completed requests applied.
    pub fn pump(&mut self) -> usize {
        let mut completed = 0;
        while let Ok(outcome) = self.outcomes.try_recv() {
            if self.apply(outcome) {
                completed += 1;
            }
        }
        completed
    }

    /// Wait up to `timeout` for one outcome, then apply whatever else is ready.
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        match self.outcomes.recv_timeout(timeout) {
            Ok(outcome) => usize::from(self.apply(outcome)) + self.pump(),
            Err(_) => 0,
        }
    }

    /// Pump until no call is waiting on the debouncer and no request is in
    /// flight. Returns `false` if `timeout` elapsed first.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if self.pending.is_idle() {
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.pump_timeout(deadline - now);
        }
    }

    /// Whether every scheduled request has completed and been applied.
    pub fn is_idle(&self) -> bool {
        self.pending.is_idle()
    }

    /// Requests that were fired but whose outcome has not been applied.
    pub fn in_flight(&self) -> usize {
        self.pending.in_flight
    }

    /// Seconds the endpoint asked callers to wait, from the last throttled
    /// response. Cleared by the next dispatched network success.
    pub fn retry_after(&self) -> Option<u64> {
        self.retry_after
    }

    /// Normalized form of the latest non-empty query.
    pub fn current_query(&self) -> Option<&str> {
        self.current_query.as_deref()
    }

    pub fn cache(&self) -> &Cache<String, Arc<ResultEnvelope>> {
        &self.cache
    }

    pub fn configuration(&self) -> &SearchConfiguration {
        &self.configuration
    }

    fn apply(&mut self, outcome: Outcome) -> bool {
        match outcome {
            Outcome::Fired { ticket } => {
                self.pending.fired = self.pending.fired.max(ticket);
                self.pending.in_flight += 1;
                false
            }
            Outcome::Finished(result) => {
                self.pending.in_flight = self.pending.in_flight.saturating_sub(1);
                match result {
                    Ok(envelope) => self.resolve(envelope),
                    Err(err) => self.reject(err),
                }
                true
            }
        }
    }

    fn resolve(&mut self, envelope: ResultEnvelope) {
        let key = normalize_query(envelope.query());
        let envelope = Arc::new(envelope);
        self.cache.set(key.clone(), Arc::clone(&envelope));

        if self.current_query.as_deref() == Some(key.as_str()) {
            self.retry_after = None;
            self.dispatch(SearchEvent::Success(envelope));
        } else {
            debug!(
                query = %key,
                current = ?self.current_query,
                "discarding stale response"
            );
        }
    }

    fn reject(&mut self, err: RequestError) {
        if let Some(seconds) = err.retry_after {
            warn!(retry_after = seconds, status = err.status, "suggest endpoint throttled");
            self.retry_after = Some(seconds);
        }
        self.dispatch(SearchEvent::Error(err.into()));
    }

    fn dispatch(&self, event: SearchEvent) {
        let fired = self.dispatcher.dispatch(&event);
        debug!(event = %event.kind(), listeners = fired, "dispatched");
    }
}

impl fmt::Debug for PredictiveSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictiveSearch")
            .field("configuration", &self.configuration)
            .field("listeners", &self.dispatcher)
            .field("cached", &self.cache.count())
            .field("pending", &self.pending)
            .field("current_query", &self.current_query)
            .field("retry_after", &self.retry_after)
            .finish_non_exhaustive()
    }
}

fn spawn_request(context: Arc<RequestContext>, query: String, tx: Sender<Outcome>) {
    let fallback = tx.clone();
    let spawned = thread::Builder::new()
        .name("predictive-search-request".to_string())
        .spawn(move || {
            let configuration = &context.configuration;
            let result = request::request(
                context.transport.as_ref(),
                configuration.search_path(),
                configuration.config_params(),
                &query,
            );
            let _ = tx.send(Outcome::Finished(result));
        });

    if let Err(err) = spawned {
        let err = TransportError::Other(format!("failed to spawn request thread: {err}"));
        let _ = fallback.send(Outcome::Finished(Err(err.into())));
    }
}

#[cfg(test)]
mod tests;
