use std::time::Duration;

use anyhow::{Result, bail, ensure};
use serde::Deserialize;

use predictive_search::{
    ArrayFormat, DEFAULT_SEARCH_PATH, Resources, SearchConfig, SearchOptions,
    request::DEFAULT_TIMEOUT,
};

use crate::cli::CliArgs;

use super::resolved::ResolvedConfig;

/// Mirror of the configuration file representation before CLI overrides and
/// validation are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawConfig {
    pub(super) store: StoreSection,
    pub(super) search: SearchSection,
    pub(super) resources: Resources,
}

/// Storefront connection settings as read from disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct StoreSection {
    pub(super) url: Option<String>,
    pub(super) timeout_ms: Option<u64>,
}

/// Controller tunables prior to validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct SearchSection {
    pub(super) path: Option<String>,
    pub(super) debounce_ms: Option<u64>,
    pub(super) bucket_size: Option<usize>,
    pub(super) array_format: Option<String>,
}

impl RawConfig {
    /// Apply CLI overrides on top of the raw configuration values.
    pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
        if let Some(url) = cli.store_url.clone() {
            self.store.url = Some(url);
        }
        if let Some(value) = cli.timeout_ms {
            self.store.timeout_ms = Some(value);
        }
        if let Some(path) = cli.search_path.clone() {
            self.search.path = Some(path);
        }
        if let Some(value) = cli.debounce_ms {
            self.search.debounce_ms = Some(value);
        }
        if !cli.types.is_empty() {
            self.resources.types = cli.types.iter().map(|&arg| arg.into()).collect();
        }
        if !cli.fields.is_empty() {
            self.resources.options.fields = cli.fields.iter().map(|&arg| arg.into()).collect();
        }
        if let Some(limit) = cli.limit {
            self.resources.limit = Some(limit);
        }
        if let Some(policy) = cli.unavailable_products {
            self.resources.options.unavailable_products = Some(policy.into());
        }
    }

    /// Convert the raw configuration into a [`ResolvedConfig`], validating and
    /// filling defaults where required.
    pub(super) fn resolve(self) -> Result<ResolvedConfig> {
        let Some(store_url) = self.store.url.filter(|url| !url.trim().is_empty()) else {
            bail!("no store URL configured; pass --store-url or set store.url");
        };
        let store_url = store_url.trim().to_string();
        ensure!(
            store_url.starts_with("http://") || store_url.starts_with("https://"),
            "store URL must start with http:// or https:// (got {store_url})"
        );

        let search_path = match self.search.path {
            Some(path) if !path.is_empty() => {
                ensure!(path.starts_with('/'), "search path must start with '/' (got {path})");
                path
            }
            _ => DEFAULT_SEARCH_PATH.to_string(),
        };

        let defaults = SearchOptions::default();
        let bucket_size = self.search.bucket_size.unwrap_or(defaults.bucket_size);
        ensure!(bucket_size > 0, "search.bucket_size must be at least 1");

        let array_format = match self.search.array_format.as_deref() {
            None | Some("brackets") => ArrayFormat::Brackets,
            Some("comma") => ArrayFormat::Comma,
            Some(other) => {
                bail!("unknown search.array_format '{other}' (expected brackets or comma)")
            }
        };

        let options = SearchOptions {
            debounce: self
                .search
                .debounce_ms
                .map_or(defaults.debounce, Duration::from_millis),
            bucket_size,
            array_format,
        };
        let timeout = self
            .store
            .timeout_ms
            .map_or(DEFAULT_TIMEOUT, Duration::from_millis);

        let search = SearchConfig {
            search_path: Some(search_path),
            resources: self.resources,
            ..SearchConfig::default()
        };

        Ok(ResolvedConfig {
            store_url,
            timeout,
            search,
            options,
        })
    }
}

#[cfg(test)]
mod tests;
