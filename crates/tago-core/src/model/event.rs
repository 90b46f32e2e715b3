use serde::{Deserialize, Serialize};

use tago_api::KeypressEvent;

/// Name under which keypresses are published to the host.
pub const EVENT_TYPE: &str = "tago_event";

/// Presses held longer than this many seconds count as long.
pub const LONG_PRESS_SECS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressDuration {
    Short,
    Long,
}

impl PressDuration {
    pub fn from_secs(secs: f64) -> Self {
        if secs > LONG_PRESS_SECS {
            Self::Long
        } else {
            Self::Short
        }
    }
}

/// Payload of a `tago_event` as the host sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagoEvent {
    /// `tg-<bridge timestamp>`
    pub id: String,
    pub action: KeyAction,
    /// Keypad id as `0x` plus hex, space-padded to two digits.
    pub keypad: String,
    pub key: serde_json::Value,
    pub duration: PressDuration,
}

impl From<&KeypressEvent> for TagoEvent {
    fn from(press: &KeypressEvent) -> Self {
        Self {
            id: format!("tg-{}", press.ts),
            action: KeyAction::Single,
            keypad: format!("0x{:2x}", press.keypad),
            key: press.key.clone(),
            duration: PressDuration::from_secs(press.duration),
        }
    }
}
