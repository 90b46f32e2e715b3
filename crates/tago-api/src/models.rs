// Wire models for the bridge's HTTP control API.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Response of `GET /api/list_devices`: device id to descriptor, in the
/// order the bridge reports them.
pub type DeviceListing = IndexMap<String, DeviceDescriptor>;

/// One bridge device as reported by `list_devices`.
///
/// Only `dimmers` is interpreted; everything else the bridge sends is kept
/// in `extra`. Dimmer entries stay raw until [`dimmers`](Self::dimmers)
/// decodes them, so one malformed entry doesn't sink the whole listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    #[serde(default)]
    pub dimmers: IndexMap<String, serde_json::Value>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeviceDescriptor {
    /// Decode each dimmer entry, keyed by its raw dimmer key.
    pub fn dimmers(
        &self,
    ) -> impl Iterator<Item = (&str, Result<DimmerEntry, serde_json::Error>)> + '_ {
        self.dimmers
            .iter()
            .map(|(key, raw)| (key.as_str(), DimmerEntry::deserialize(raw)))
    }
}

/// A single dimmer output on a bridge device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimmerEntry {
    /// Channel index on the device.
    pub ch: u32,

    /// User-assigned name, if any.
    #[serde(default)]
    pub alias: Option<String>,
}

/// Bridge command verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandAction {
    RampTo,
}

/// One element of the `POST /api/{device}/do` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RampCommand {
    pub action: CommandAction,
    /// Target level on the bridge's 0-100 scale.
    pub value: u8,
    pub rate: u32,
    pub ch: u32,
}
