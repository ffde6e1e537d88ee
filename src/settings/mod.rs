//! Configuration loading and resolution for the `suggest` binary.
//!
//! `load` layers default files, `--config` files and environment variables,
//! applies CLI overrides and returns a validated [`ResolvedConfig`].

mod loader;
mod raw;
mod resolved;
mod sources;

pub(crate) use loader::load;
pub(crate) use resolved::ResolvedConfig;
