// ── Core error types ──
//
// Integration-level errors from tago-core. Callers never see HTTP or
// WebSocket details directly; the `From<tago_api::Error>` impl folds
// transport failures into a handful of actionable variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to bridge at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// `timeout_secs` is `None` when the limit that fired is not known.
    #[error(
        "Bridge timed out{}",
        .timeout_secs.map_or_else(String::new, |s| format!(" after {s}s"))
    )]
    Timeout { timeout_secs: Option<u64> },

    // ── Setup errors ─────────────────────────────────────────────────
    /// Device enumeration failed; the host may retry setup later.
    #[error("Setup incomplete: no devices found on bridge {host}")]
    SetupIncomplete { host: String },

    // ── Light errors ─────────────────────────────────────────────────
    #[error("Light not found: {unique_id}")]
    LightNotFound { unique_id: String },

    #[error("Command to light {unique_id} failed: {reason}")]
    CommandFailed { unique_id: String, reason: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Bridge API error: {message}")]
    Api { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` for failures that a later retry might resolve.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::SetupIncomplete { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<tago_api::Error> for CoreError {
    fn from(err: tago_api::Error) -> Self {
        match err {
            tago_api::Error::Transport(ref e) => {
                let url = e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: None }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                    }
                }
            }
            tago_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid bridge URL: {e}"),
            },
            tago_api::Error::Timeout { timeout_secs } => CoreError::Timeout {
                timeout_secs: Some(timeout_secs),
            },
            tago_api::Error::ClientBuild(reason) => CoreError::Config {
                message: format!("Cannot build HTTP client: {reason}"),
            },
            tago_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            tago_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Unexpected bridge response: {message}"),
            },
        }
    }
}
