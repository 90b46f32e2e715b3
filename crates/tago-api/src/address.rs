// Bridge network address.
//
// A bridge exposes two services on the same host: a WebSocket event stream
// and an HTTP control API. Both ports are fixed by the firmware.

use std::fmt;

use url::Url;

use crate::error::Error;

/// Port of the bridge's WebSocket event stream.
pub const EVENT_PORT: u16 = 8000;

/// Port of the bridge's HTTP control API.
pub const CONTROL_PORT: u16 = 5000;

/// Where to reach a single bridge. Set once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeAddress {
    pub host: String,
    pub event_port: u16,
    pub control_port: u16,
}

impl BridgeAddress {
    /// Address on the standard bridge ports.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            event_port: EVENT_PORT,
            control_port: CONTROL_PORT,
        }
    }

    /// Same host, different ports.
    pub fn with_ports(mut self, event_port: u16, control_port: u16) -> Self {
        self.event_port = event_port;
        self.control_port = control_port;
        self
    }

    /// `ws://{host}:{event_port}/`
    pub fn event_url(&self) -> Result<Url, Error> {
        Ok(Url::parse(&format!("ws://{}:{}/", self.host, self.event_port))?)
    }

    /// `http://{host}:{control_port}`
    pub fn control_url(&self) -> Result<Url, Error> {
        Ok(Url::parse(&format!(
            "http://{}:{}",
            self.host, self.control_port
        ))?)
    }
}

impl fmt::Display for BridgeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (events :{}, control :{})",
            self.host, self.event_port, self.control_port
        )
    }
}
