use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use predictive_search::{
    HttpTransport, PredictiveSearch, SearchConfiguration, SearchEvent, SearchEventKind,
};
use tracing::warn;

use crate::settings::ResolvedConfig;

/// Drives queries through a controller and collects the events they produce.
pub(crate) struct SuggestWorkflow {
    search: PredictiveSearch,
    events: Rc<RefCell<Vec<SearchEvent>>>,
    patience: Duration,
    type_ahead: bool,
}

impl SuggestWorkflow {
    pub(crate) fn from_config(config: ResolvedConfig, type_ahead: bool) -> Result<Self> {
        let ResolvedConfig {
            store_url,
            timeout,
            search,
            options,
        } = config;

        let transport = HttpTransport::with_timeout(&store_url, timeout)
            .with_context(|| format!("failed to create HTTP client for {store_url}"))?;
        let configuration = SearchConfiguration::from_config(&search, options.array_format)
            .context("invalid search configuration")?;
        let mut search =
            PredictiveSearch::from_configuration(configuration, Arc::new(transport), options);

        let events = Rc::new(RefCell::new(Vec::new()));
        for kind in [SearchEventKind::Success, SearchEventKind::Error] {
            let events = Rc::clone(&events);
            search.on(kind, move |event| events.borrow_mut().push(event.clone()));
        }

        Ok(Self {
            search,
            events,
            patience: timeout + options.debounce + Duration::from_secs(1),
            type_ahead,
        })
    }

    /// Run one query to completion and return the events it produced.
    pub(crate) fn run(&mut self, query: &str) -> Vec<SearchEvent> {
        if self.type_ahead {
            for (index, _) in query.char_indices().skip(1) {
                self.search.query(&query[..index]);
            }
        }
        self.search.query(query);

        if !self.search.settle(self.patience) {
            warn!(query, in_flight = self.search.in_flight(), "gave up waiting for responses");
        }

        self.events.borrow_mut().drain(..).collect()
    }

    pub(crate) fn retry_after(&self) -> Option<u64> {
        self.search.retry_after()
    }
}
