//! `GlobalOpts`-aware wrappers over `tago_config`.

use std::path::PathBuf;

use tago_config::{Config, ConfigError};
use tago_core::IntegrationConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// `--config` if given, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(tago_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(tago_config::load_config_from(&config_path(global))?)
}

/// Resolve the runtime config: file + env, then `--host`.
pub fn integration_config(global: &GlobalOpts) -> Result<IntegrationConfig, CliError> {
    let cfg = load(global)?;
    cfg.to_integration_config(global.host.as_deref())
        .map_err(|e| match e {
            ConfigError::NoHost => CliError::NoHost {
                path: config_path(global).display().to_string(),
            },
            other => other.into(),
        })
}
