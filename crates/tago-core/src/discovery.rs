use std::time::Duration;

use tracing::{info, warn};

use tago_api::{BridgeClient, Error};

use crate::model::{DimmerChannel, channels_from_listing};

/// Enumerate the bridge's dimmer channels.
///
/// Returns `None` when the bridge can't be listed (unreachable, too slow,
/// garbled reply) or reports no devices at all. Never fails harder than
/// that: the caller decides whether to retry setup later.
pub async fn discover_channels(
    client: &BridgeClient,
    timeout: Duration,
) -> Option<Vec<DimmerChannel>> {
    let listing = match client.list_devices(timeout).await {
        Ok(listing) => listing,
        Err(Error::Timeout { .. }) => {
            warn!(url = %client.base_url(), "Timeout waiting for bridge");
            return None;
        }
        Err(e) if e.is_unreachable() => {
            warn!(url = %client.base_url(), error = %e, "Can't connect to bridge");
            return None;
        }
        Err(e) => {
            warn!(url = %client.base_url(), error = %e, "Bridge device listing failed");
            return None;
        }
    };

    if listing.is_empty() {
        warn!(url = %client.base_url(), "Bridge reported no devices");
        return None;
    }

    let channels = channels_from_listing(&listing);
    info!(
        devices = listing.len(),
        channels = channels.len(),
        "bridge enumeration complete"
    );
    Some(channels)
}
