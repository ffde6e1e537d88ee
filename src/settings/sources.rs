use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use config::{Config, ConfigError, Environment, File, Map};

use crate::app_dirs;
use crate::cli::CliArgs;

const ENV_PREFIX: &str = "predictive_search";

/// Keys whose environment values are comma-separated lists.
const ENV_LIST_KEYS: [&str; 2] = ["resources.type", "resources.options.fields"];

/// Build a [`Config`] instance by combining default locations with CLI overrides.
pub(super) fn build_config(cli: &CliArgs) -> Result<Config> {
    build_config_with_env(cli, None)
}

/// Same as [`build_config`], reading variables from `vars` instead of the
/// process environment when given.
pub(super) fn build_config_with_env(
    cli: &CliArgs,
    vars: Option<Map<String, String>>,
) -> Result<Config> {
    let mut builder = Config::builder();

    if !cli.no_config {
        for path in default_config_files() {
            builder = builder.add_source(File::from(path).required(false));
        }
    }

    for path in &cli.config {
        builder = builder.add_source(File::from(path.clone()).required(true));
    }

    builder = builder.add_source(environment().source(vars));

    builder.build().map_err(|err| match err {
        ConfigError::Frozen => anyhow!("configuration builder is frozen"),
        other => other.into(),
    })
}

fn environment() -> Environment {
    ENV_LIST_KEYS.into_iter().fold(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(","),
        |source, key| source.with_list_parse_key(key),
    )
}

/// Discover the default configuration file locations that should be consulted.
pub(super) fn default_config_files() -> Vec<PathBuf> {
    let mut files = Vec::new();

    if let Ok(dir) = app_dirs::get_config_dir() {
        files.push(dir.join("config.toml"));
    }

    if let Ok(current_dir) = env::current_dir() {
        files.push(current_dir.join(".predictive-search.toml"));
        files.push(current_dir.join("predictive-search.toml"));
    }

    files
}
