use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tago_api::{DeviceListing, DimmerEntry};

/// One controllable dimmer output, discovered at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimmerChannel {
    pub bridge_device_id: String,
    pub channel_index: u32,
    /// Stable across restarts as long as the bridge configuration is.
    pub unique_id: String,
    pub display_name: String,
}

impl DimmerChannel {
    pub fn new(device_id: &str, dimmer_key: &str, entry: &DimmerEntry) -> Self {
        let display_name = entry
            .alias
            .clone()
            .unwrap_or_else(|| format!("{device_id}_ch{}", entry.ch));

        Self {
            bridge_device_id: device_id.to_string(),
            channel_index: entry.ch,
            unique_id: format!("{device_id}_{dimmer_key}"),
            display_name,
        }
    }
}

/// Flatten a device listing into dimmer channels, in listing order.
///
/// Devices without a `dimmers` section contribute nothing; malformed
/// dimmer entries are skipped.
pub fn channels_from_listing(listing: &DeviceListing) -> Vec<DimmerChannel> {
    let mut channels = Vec::new();

    for (device_id, descriptor) in listing {
        for (key, entry) in descriptor.dimmers() {
            match entry {
                Ok(entry) => channels.push(DimmerChannel::new(device_id, key, &entry)),
                Err(e) => warn!(
                    device_id = device_id.as_str(),
                    dimmer = key,
                    error = %e,
                    "skipping malformed dimmer"
                ),
            }
        }
    }

    debug!(count = channels.len(), "dimmer channels discovered");
    channels
}
