// ── Runtime integration configuration ──
//
// Describes *which* bridge to talk to and how patiently. Never touches
// disk; tago-config or the host builds one and hands it in.

use std::time::Duration;

use tago_api::{BridgeAddress, ListenerConfig, TransportConfig};

/// Configuration for one integration instance (one bridge).
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    pub address: BridgeAddress,
    /// Delay between event-stream reconnect attempts.
    pub retry_interval: Duration,
    /// Bound on the startup device listing.
    pub enumeration_timeout: Duration,
    /// Bound on each light command.
    pub command_timeout: Duration,
}

impl IntegrationConfig {
    /// Standard timings for the bridge at `address`.
    pub fn new(address: BridgeAddress) -> Self {
        Self {
            address,
            retry_interval: Duration::from_secs(5),
            enumeration_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(10),
        }
    }

    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            retry_interval: self.retry_interval,
            ..ListenerConfig::default()
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::default().with_timeout(self.command_timeout)
    }
}
