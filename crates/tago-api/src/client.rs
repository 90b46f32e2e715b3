// Bridge HTTP control client
//
// Wraps `reqwest::Client` with bridge-specific URL construction. Two
// endpoints matter: the one-shot device listing used at startup, and the
// per-device `do` endpoint that accepts ramp commands.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::address::BridgeAddress;
use crate::error::{Error, whole_secs};
use crate::models::{CommandAction, DeviceListing, RampCommand};
use crate::transport::TransportConfig;

/// Ramp rate the bridge is always asked to use.
pub const RAMP_RATE: u32 = 50;

/// Convert a 0-255 brightness into the bridge's 0-100 scale, truncating.
pub fn to_native_level(level: u8) -> u8 {
    let native = u32::from(level) * 100 / 255;
    // native <= 100 by construction
    u8::try_from(native).unwrap_or(100)
}

/// Stateless HTTP client for a bridge's control API.
///
/// Commands are sent exactly once; retrying is the caller's decision.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: Url,
    // Request timeout baked into `http`, when known.
    request_timeout: Option<Duration>,
}

impl BridgeClient {
    /// Create a client for the bridge's control port.
    pub fn new(address: &BridgeAddress, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: address.control_url()?,
            request_timeout: Some(transport.timeout),
        })
    }

    /// Create a client with a pre-built `reqwest::Client` against an
    /// arbitrary base URL (e.g. a mock server).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            request_timeout: None,
        }
    }

    /// The control API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("api/{path}"))?)
    }

    // ── Device enumeration ───────────────────────────────────────────

    /// List every device the bridge knows about.
    ///
    /// `GET /api/list_devices`, bounded by `timeout` end to end (connect,
    /// headers and body).
    pub async fn list_devices(&self, timeout: Duration) -> Result<DeviceListing, Error> {
        let url = self.api_url("list_devices")?;
        debug!(%url, timeout_ms = timeout.as_millis(), "listing bridge devices");

        match tokio::time::timeout(timeout, self.get_json::<DeviceListing>(url)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                timeout_secs: whole_secs(timeout),
            }),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Ramp one dimmer channel to `level` (0-255).
    ///
    /// `POST /api/{device_id}/do` with a single `RAMP_TO` command. Succeeds
    /// once any response arrives; the status code is not interpreted.
    pub async fn set_level(
        &self,
        device_id: &str,
        channel: u32,
        level: u8,
        transition: Duration,
    ) -> Result<(), Error> {
        let native = to_native_level(level);
        info!(
            device_id,
            channel,
            level,
            native,
            transition_ms = transition.as_millis(),
            "set light level"
        );

        let url = self.api_url(&format!("{device_id}/do"))?;
        let body = [RampCommand {
            action: CommandAction::RampTo,
            value: native,
            rate: RAMP_RATE,
            ch: channel,
        }];

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        debug!(status = %resp.status(), "bridge acknowledged command");
        Ok(())
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// A request that ran into the client timeout becomes
    /// [`Error::Timeout`] carrying that timeout.
    fn request_error(&self, err: reqwest::Error) -> Error {
        match self.request_timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                timeout_secs: whole_secs(timeout),
            },
            _ => Error::Transport(err),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;
        let body = resp.text().await.map_err(|e| self.request_error(e))?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
