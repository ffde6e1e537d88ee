use clap::Parser;
use serde_json::json;

use predictive_search::{ResourceType, SearchField, UnavailableProducts};

use super::RawConfig;
use crate::cli::CliArgs;

#[test]
fn cli_overrides_take_precedence() {
    let cli = CliArgs::parse_from([
        "suggest",
        "--store-url",
        "https://cli.example",
        "--search-path",
        "/fr/search",
        "--type",
        "page",
        "--field",
        "title",
        "--limit",
        "7",
        "--unavailable-products",
        "hide",
        "--debounce-ms",
        "0",
        "--timeout-ms",
        "250",
    ]);

    let mut config = RawConfig::default();
    config.store.url = Some("https://file.example".into());
    config.resources.types = vec![ResourceType::Product];
    config.resources.limit = Some(3);
    config.apply_cli_overrides(&cli);

    assert_eq!(config.store.url.as_deref(), Some("https://cli.example"));
    assert_eq!(config.store.timeout_ms, Some(250));
    assert_eq!(config.search.path.as_deref(), Some("/fr/search"));
    assert_eq!(config.search.debounce_ms, Some(0));
    assert_eq!(config.resources.types, vec![ResourceType::Page]);
    assert_eq!(config.resources.options.fields, vec![SearchField::Title]);
    assert_eq!(config.resources.limit, Some(7));
    assert_eq!(
        config.resources.options.unavailable_products,
        Some(UnavailableProducts::Hide)
    );
}

#[test]
fn absent_cli_values_keep_file_values() {
    let cli = CliArgs::parse_from(["suggest"]);

    let mut config = RawConfig::default();
    config.store.url = Some("https://file.example".into());
    config.resources.types = vec![ResourceType::Collection];
    config.apply_cli_overrides(&cli);

    assert_eq!(config.store.url.as_deref(), Some("https://file.example"));
    assert_eq!(config.resources.types, vec![ResourceType::Collection]);
}

#[test]
fn resources_section_deserializes_with_passthrough_keys() {
    let raw: RawConfig = serde_json::from_value(json!({
        "store": { "url": "https://shop.example" },
        "resources": {
            "type": ["product", "article"],
            "limit": 5,
            "options": { "fields": ["title", "variants.barcode"] },
            "fuzzy": true
        }
    }))
    .expect("deserialize");

    assert_eq!(
        raw.resources.types,
        vec![ResourceType::Product, ResourceType::Article]
    );
    assert_eq!(raw.resources.limit, Some(5));
    assert_eq!(
        raw.resources.options.fields,
        vec![SearchField::Title, SearchField::VariantsBarcode]
    );
    assert_eq!(raw.resources.extra.get("fuzzy"), Some(&json!(true)));
}

fn with_url() -> RawConfig {
    let mut config = RawConfig::default();
    config.store.url = Some("https://shop.example".into());
    config
}

#[test]
fn resolve_fills_defaults() {
    let resolved = with_url().resolve().expect("resolve");

    assert_eq!(resolved.store_url, "https://shop.example");
    assert_eq!(resolved.timeout, predictive_search::request::DEFAULT_TIMEOUT);
    assert_eq!(resolved.search.search_path.as_deref(), Some("/search"));
    assert_eq!(resolved.options, predictive_search::SearchOptions::default());
}

#[test]
fn resolve_requires_a_store_url() {
    let err = RawConfig::default().resolve().unwrap_err();
    assert!(err.to_string().contains("no store URL configured"));

    let mut config = RawConfig::default();
    config.store.url = Some("shop.example".into());
    assert!(config.resolve().is_err());
}

#[test]
fn resolve_rejects_bad_tunables() {
    let mut config = with_url();
    config.search.array_format = Some("pipes".into());
    assert!(config.resolve().is_err());

    let mut config = with_url();
    config.search.bucket_size = Some(0);
    assert!(config.resolve().is_err());

    let mut config = with_url();
    config.search.path = Some("search".into());
    assert!(config.resolve().is_err());
}

#[test]
fn resolve_reads_comma_format_and_timings() {
    let mut config = with_url();
    config.search.array_format = Some("comma".into());
    config.search.debounce_ms = Some(0);
    config.store.timeout_ms = Some(1500);

    let resolved = config.resolve().expect("resolve");

    assert_eq!(
        resolved.options.array_format,
        predictive_search::ArrayFormat::Comma
    );
    assert_eq!(resolved.options.debounce, std::time::Duration::ZERO);
    assert_eq!(resolved.timeout, std::time::Duration::from_millis(1500));
}
