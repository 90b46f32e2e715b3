//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use tago_config::ConfigError;
use tago_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const SETUP: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to bridge at {url}")]
    #[diagnostic(
        code(tago::connection_failed),
        help(
            "Check that the bridge is powered and reachable.\n\
             URL: {url}\n\
             Try: tago devices --host <bridge-ip>"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(
        "Bridge did not answer{}",
        .seconds.map_or_else(String::new, |s| format!(" within {s}s"))
    )]
    #[diagnostic(
        code(tago::timeout),
        help("Raise enumeration_timeout_secs / command_timeout_secs or check the bridge.")
    )]
    Timeout { seconds: Option<u64> },

    #[error("Setup incomplete: could not enumerate bridge {host}")]
    #[diagnostic(
        code(tago::setup_incomplete),
        help("The bridge was unreachable or reported no devices. Run with -v for details.")
    )]
    SetupIncomplete { host: String },

    // ── Lights ───────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(tago::not_found),
        help("Run: tago {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Command to light '{unique_id}' failed: {reason}")]
    #[diagnostic(code(tago::command_failed))]
    CommandFailed { unique_id: String, reason: String },

    #[error("Bridge error: {message}")]
    #[diagnostic(code(tago::api_error))]
    ApiError { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No bridge host configured")]
    #[diagnostic(
        code(tago::no_host),
        help(
            "Pass --host <HOST>, set TAGO_HOST, or run: tago config init --host <HOST>\n\
             Config file: {path}"
        )
    )]
    NoHost { path: String },

    #[error("Config file already exists: {path}")]
    #[diagnostic(code(tago::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tago::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(tago::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(tago::render))]
    Render(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(tago::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::SetupIncomplete { .. } => exit_code::SETUP,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::NoHost { .. } | Self::ConfigExists { .. } | Self::Validation { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::SetupIncomplete { host } => CliError::SetupIncomplete { host },

            CoreError::LightNotFound { unique_id } => CliError::NotFound {
                resource_type: "light".into(),
                identifier: unique_id,
                list_command: "devices".into(),
            },

            CoreError::CommandFailed { unique_id, reason } => {
                CliError::CommandFailed { unique_id, reason }
            }

            CoreError::Api { message } => CliError::ApiError { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoHost => CliError::NoHost {
                path: tago_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Serialization(e) => CliError::Render(e.to_string()),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
