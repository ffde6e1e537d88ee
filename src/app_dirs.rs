//! Resolve configuration and cache directories for `suggest`.
//!
//! The helpers in this module respect environment overrides while falling back
//! to platform-appropriate locations provided by the `directories` crate.

use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use directories::ProjectDirs;

const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "storefront-tools";
const APPLICATION: &str = "predictive-search";

const CONFIG_DIR_ENV: &str = "PREDICTIVE_SEARCH_CONFIG_DIR";
const CACHE_DIR_ENV: &str = "PREDICTIVE_SEARCH_CACHE_DIR";

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .ok_or_else(|| anyhow!("unable to determine project directories for predictive-search"))
}

/// Resolve an override directory from an environment variable.
///
/// An empty string is treated the same as an unset value.
fn dir_from_env(name: &str) -> Option<PathBuf> {
    let value = env::var_os(name)?;
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

/// Directory holding the user's `config.toml`.
pub(crate) fn get_config_dir() -> Result<PathBuf> {
    if let Some(dir) = dir_from_env(CONFIG_DIR_ENV) {
        return Ok(dir);
    }

    Ok(project_dirs()?.config_local_dir().to_path_buf())
}

/// Cache directory, reported in the long version banner.
pub(crate) fn get_cache_dir() -> Result<PathBuf> {
    if let Some(dir) = dir_from_env(CACHE_DIR_ENV) {
        return Ok(dir);
    }

    Ok(project_dirs()?.cache_dir().to_path_buf())
}
