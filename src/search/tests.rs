use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::sync::{Arc, Mutex};

use serde_json::json;

use predictive_search_utils::encode_uri_component;

use super::*;
use crate::config::{ResourceType, SearchConfig};
use crate::request::{ErrorKind, RawResponse};

const FIXTURE: &str = include_str!("../../tests/fixtures/search_as_you_type_the_calling.json");
const PATIENCE: Duration = Duration::from_secs(5);

enum Reply {
    Now(RawResponse),
    Gated(Receiver<()>, RawResponse),
}

/// In-memory transport keyed by the encoded `s` parameter.
#[derive(Clone, Default)]
struct ScriptedTransport {
    calls: Arc<Mutex<Vec<String>>>,
    replies: Arc<Mutex<HashMap<String, Reply>>>,
}

impl ScriptedTransport {
    fn reply(&self, query: &str, response: RawResponse) {
        self.replies
            .lock()
            .unwrap()
            .insert(encode_uri_component(query), Reply::Now(response));
    }

    /// Hold the response for `query` until the returned sender is used.
    fn gate(&self, query: &str, response: RawResponse) -> SyncSender<()> {
        let (tx, rx) = sync_channel(1);
        self.replies
            .lock()
            .unwrap()
            .insert(encode_uri_component(query), Reply::Gated(rx, response));
        tx
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn queries(&self) -> Vec<String> {
        self.calls().iter().map(|url| s_param(url).to_string()).collect()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, path_and_query: &str) -> Result<RawResponse, TransportError> {
        self.calls.lock().unwrap().push(path_and_query.to_string());
        let key = s_param(path_and_query).to_string();
        let reply = self.replies.lock().unwrap().remove(&key);

        match reply {
            Some(Reply::Now(response)) => Ok(response),
            Some(Reply::Gated(release, response)) => {
                release
                    .recv_timeout(PATIENCE)
                    .map_err(|_| TransportError::Timeout("gate never opened".into()))?;
                Ok(response)
            }
            None => Ok(RawResponse::json(
                200,
                json!({ "resources": { "results": {} } }).to_string(),
            )),
        }
    }
}

fn s_param(url: &str) -> &str {
    let start = url.find("?s=").map_or(0, |index| index + 3);
    let rest = &url[start..];
    rest.split('&').next().unwrap_or_default()
}

fn options(debounce: Duration) -> SearchOptions {
    SearchOptions {
        debounce,
        ..SearchOptions::default()
    }
}

fn controller(transport: &ScriptedTransport) -> PredictiveSearch {
    PredictiveSearch::with_options(
        json!({ "resources": { "type": ["product"] } }),
        transport.clone(),
        options(Duration::ZERO),
    )
    .expect("controller")
}

#[derive(Default)]
struct Recorded {
    successes: Rc<RefCell<Vec<String>>>,
    errors: Rc<RefCell<Vec<SearchError>>>,
}

fn record(search: &mut PredictiveSearch) -> Recorded {
    let recorded = Recorded::default();
    let successes = Rc::clone(&recorded.successes);
    search.on_success(move |envelope| successes.borrow_mut().push(envelope.query().to_string()));
    let errors = Rc::clone(&recorded.errors);
    search.on_error(move |err| errors.borrow_mut().push(err.clone()));
    recorded
}

fn wait_for_calls(search: &mut PredictiveSearch, transport: &ScriptedTransport, count: usize) {
    let deadline = Instant::now() + PATIENCE;
    while transport.calls().len() < count {
        assert!(Instant::now() < deadline, "expected {count} requests");
        search.pump_timeout(Duration::from_millis(5));
    }
}

#[test]
fn construction_without_config_fails() {
    let err = PredictiveSearch::new(Value::Null, ScriptedTransport::default()).unwrap_err();
    assert!(matches!(err, ConfigError::Missing));
    assert_eq!(err.to_string(), "No config object was specified");
}

#[test]
fn search_path_is_stripped_from_params() {
    let transport = ScriptedTransport::default();
    let mut search = PredictiveSearch::with_options(
        json!({ "search_path": "/en-ca/search", "resources": { "limit": 4 } }),
        transport.clone(),
        options(Duration::ZERO),
    )
    .expect("controller");

    search.query("tea");
    assert!(search.settle(PATIENCE));

    assert_eq!(
        transport.calls(),
        vec!["/en-ca/search/suggest.json?s=tea&resources[limit]=4&"]
    );
}

#[test]
fn missing_query_dispatches_argument_error() {
    let transport = ScriptedTransport::default();
    let mut search = controller(&transport);
    let recorded = record(&mut search);

    assert_eq!(search.query_value(&Value::Null), QueryDisposition::Invalid);
    assert_eq!(search.query_value(&json!(42)), QueryDisposition::Invalid);

    let errors = recorded.errors.borrow();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].message(), "'query' is missing");
    assert_eq!(errors[0].kind(), "argument");
    assert_eq!(errors[1].message(), "'query' is not a string");
    assert!(transport.calls().is_empty());
    assert_eq!(search.current_query(), None);
}

#[test]
fn empty_query_is_ignored() {
    let transport = ScriptedTransport::default();
    let mut search = controller(&transport);
    let recorded = record(&mut search);

    assert_eq!(search.query(""), QueryDisposition::Ignored);
    assert_eq!(search.query_value(&json!("")), QueryDisposition::Ignored);
    assert!(search.settle(PATIENCE));

    assert!(transport.calls().is_empty());
    assert!(recorded.successes.borrow().is_empty());
    assert!(recorded.errors.borrow().is_empty());
    assert_eq!(search.current_query(), None);
}

#[test]
fn success_is_cached_under_normalized_query() {
    let transport = ScriptedTransport::default();
    transport.reply("The Calling", RawResponse::json(200, FIXTURE));
    let mut search = controller(&transport);

    let titles = Rc::new(RefCell::new(Vec::new()));
    {
        let titles = Rc::clone(&titles);
        search.on_success(move |envelope| {
            let title = envelope
                .resources()
                .and_then(|resources| resources.get("results"))
                .and_then(|results| results.pointer("/products/0/title"))
                .and_then(Value::as_str)
                .map(str::to_string);
            titles.borrow_mut().push((envelope.query().to_string(), title));
        });
    }

    assert_eq!(search.query("The Calling"), QueryDisposition::Scheduled);
    assert_eq!(search.current_query(), Some("the-calling"));
    assert!(search.settle(PATIENCE));

    assert_eq!(
        *titles.borrow(),
        vec![("The Calling".to_string(), Some("The Calling".to_string()))]
    );
    assert!(search.cache().has("the-calling"));
    assert_eq!(search.retry_after(), None);
}

#[test]
fn cache_hit_dispatches_without_network() {
    let transport = ScriptedTransport::default();
    let mut search = controller(&transport);
    let recorded = record(&mut search);

    search.query("The Calling");
    assert!(search.settle(PATIENCE));
    assert_eq!(transport.calls().len(), 1);

    assert_eq!(search.query("the calling"), QueryDisposition::Cached);
    assert_eq!(transport.calls().len(), 1);
    assert_eq!(
        *recorded.successes.borrow(),
        vec!["The Calling", "The Calling"]
    );
}

#[test]
fn repeated_cached_queries_never_refetch() {
    let transport = ScriptedTransport::default();
    let mut search = controller(&transport);
    let recorded = record(&mut search);

    search.query("shirt");
    assert!(search.settle(PATIENCE));

    for _ in 0..5 {
        assert_eq!(search.query("shirt"), QueryDisposition::Cached);
    }
    assert!(search.settle(PATIENCE));

    assert_eq!(transport.calls().len(), 1);
    assert_eq!(recorded.successes.borrow().len(), 6);
}

#[test]
fn burst_of_queries_issues_one_request() {
    let transport = ScriptedTransport::default();
    let mut search = PredictiveSearch::with_options(
        json!({}),
        transport.clone(),
        options(Duration::from_millis(100)),
    )
    .expect("controller");
    let recorded = record(&mut search);

    for query in ["s", "sh", "shi", "shir", "shirt"] {
        assert_eq!(search.query(query), QueryDisposition::Scheduled);
    }
    assert!(!search.is_idle());
    assert!(search.settle(PATIENCE));

    assert_eq!(transport.queries(), vec!["shirt"]);
    assert_eq!(*recorded.successes.borrow(), vec!["shirt"]);
    assert!(search.is_idle());
}

#[test]
fn stale_response_is_cached_but_not_dispatched() {
    let transport = ScriptedTransport::default();
    let release = transport.gate(
        "slow",
        RawResponse::json(200, json!({ "resources": {} }).to_string()),
    );
    let mut search = controller(&transport);
    let recorded = record(&mut search);

    search.query("slow");
    wait_for_calls(&mut search, &transport, 1);

    search.query("fast");
    wait_for_calls(&mut search, &transport, 2);
    release.send(()).expect("release gate");
    assert!(search.settle(PATIENCE));

    assert_eq!(*recorded.successes.borrow(), vec!["fast"]);
    assert!(search.cache().has("slow"));
    assert!(search.cache().has("fast"));
    assert_eq!(search.current_query(), Some("fast"));
}

#[test]
fn throttling_records_retry_after_until_next_success() {
    let transport = ScriptedTransport::default();
    transport.reply(
        "tea",
        RawResponse::json(
            429,
            json!({ "message": "Throttled", "description": "Too Many Requests" }).to_string(),
        )
        .with_retry_after("1"),
    );
    let mut search = controller(&transport);
    let recorded = record(&mut search);

    search.query("tea");
    assert!(search.settle(PATIENCE));

    {
        let errors = recorded.errors.borrow();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].name(), "Throttled");
        assert_eq!(errors[0].message(), "Too Many Requests");
        assert_eq!(errors[0].status(), Some(429));
        assert_eq!(errors[0].retry_after(), Some(1));
    }
    assert_eq!(search.retry_after(), Some(1));
    assert!(!search.cache().has("tea"));

    search.query("coffee");
    assert!(search.settle(PATIENCE));
    assert_eq!(search.retry_after(), None);
}

#[test]
fn errors_are_dispatched_even_when_stale() {
    let transport = ScriptedTransport::default();
    let release = transport.gate("missing", RawResponse::json(404, ""));
    let mut search = controller(&transport);
    let recorded = record(&mut search);

    search.query("missing");
    wait_for_calls(&mut search, &transport, 1);
    search.query("found");
    wait_for_calls(&mut search, &transport, 2);
    release.send(()).expect("release gate");
    assert!(search.settle(PATIENCE));

    let errors = recorded.errors.borrow();
    assert_eq!(errors.len(), 1);
    let request = errors[0].as_request().expect("request error");
    assert_eq!(request.kind, ErrorKind::NotFound);
    assert_eq!(request.status, 404);
    assert_eq!(*recorded.successes.borrow(), vec!["found"]);
}

#[test]
fn transport_failure_surfaces_as_network_error() {
    struct Refusing;

    impl Transport for Refusing {
        fn get(&self, _: &str) -> Result<RawResponse, TransportError> {
            Err(TransportError::Connect("connection refused".into()))
        }
    }

    let mut search =
        PredictiveSearch::with_options(json!({}), Refusing, options(Duration::ZERO))
            .expect("controller");
    let recorded = record(&mut search);

    search.query("tea");
    assert!(search.settle(PATIENCE));

    let errors = recorded.errors.borrow();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), "network");
    assert_eq!(errors[0].status(), Some(0));
}

#[test]
fn off_stops_delivery() {
    let transport = ScriptedTransport::default();
    let mut search = controller(&transport);
    let calls = Rc::new(RefCell::new(0));

    let id = {
        let calls = Rc::clone(&calls);
        search.on(SearchEventKind::Success, move |_| *calls.borrow_mut() += 1)
    };

    search.query("tea");
    assert!(search.settle(PATIENCE));
    assert_eq!(*calls.borrow(), 1);

    assert!(search.off(SearchEventKind::Success, id));
    assert!(!search.off(SearchEventKind::Success, id));
    search.query("tea");
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn cache_is_bounded_by_bucket_size() {
    let transport = ScriptedTransport::default();
    let mut search = PredictiveSearch::with_options(
        json!({}),
        transport.clone(),
        SearchOptions {
            debounce: Duration::ZERO,
            bucket_size: 2,
            ..SearchOptions::default()
        },
    )
    .expect("controller");

    for query in ["a", "b", "c"] {
        search.query(query);
        assert!(search.settle(PATIENCE));
    }

    assert_eq!(search.cache().count(), 2);
    assert!(!search.cache().has("a"));
}

#[test]
fn builder_config_reaches_the_endpoint() {
    let transport = ScriptedTransport::default();
    let config = SearchConfig::new()
        .resource_type(ResourceType::Product)
        .resource_type(ResourceType::Page)
        .limit(3);
    let mut search = PredictiveSearch::from_config(&config, transport.clone()).expect("controller");

    search.query("The Calling");
    assert!(search.settle(PATIENCE));

    assert_eq!(
        transport.calls(),
        vec![
            "/search/suggest.json?s=The%20Calling&resources[type][]=product&resources[type][]=page&resources[limit]=3&"
        ]
    );
    assert_eq!(search.configuration().search_path(), "/search");
}
