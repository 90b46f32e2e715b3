//! Configuration for the Tago bridge tools.
//!
//! A single flat TOML file layered under `TAGO_*` environment variables,
//! plus translation to `tago_core::IntegrationConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tago_core::{BridgeAddress, CONTROL_PORT, EVENT_PORT, IntegrationConfig};

/// Prefix for environment overrides, e.g. `TAGO_HOST`, `TAGO_EVENT_PORT`.
pub const ENV_PREFIX: &str = "TAGO_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no bridge host configured")]
    NoHost,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Bridge hostname or IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub event_port: u16,
    pub control_port: u16,
    pub retry_interval_secs: u64,
    pub enumeration_timeout_secs: u64,
    pub command_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: None,
            event_port: EVENT_PORT,
            control_port: CONTROL_PORT,
            retry_interval_secs: 5,
            enumeration_timeout_secs: 10,
            command_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Build the runtime config. `host_override` (e.g. a CLI flag) wins over
    /// the configured host.
    pub fn to_integration_config(
        &self,
        host_override: Option<&str>,
    ) -> Result<IntegrationConfig, ConfigError> {
        let host = host_override
            .or(self.host.as_deref())
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::NoHost)?;

        for (field, secs) in [
            ("retry_interval_secs", self.retry_interval_secs),
            ("enumeration_timeout_secs", self.enumeration_timeout_secs),
            ("command_timeout_secs", self.command_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must be at least 1 second".into(),
                });
            }
        }

        let address = BridgeAddress::new(host).with_ports(self.event_port, self.control_port);
        let mut config = IntegrationConfig::new(address);
        config.retry_interval = Duration::from_secs(self.retry_interval_secs);
        config.enumeration_timeout = Duration::from_secs(self.enumeration_timeout_secs);
        config.command_timeout = Duration::from_secs(self.command_timeout_secs);
        Ok(config)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "tago", "tago").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("tago");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then `TAGO_*` variables.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Load config from an explicit file + environment. A missing file is
/// not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
