//! Dimmable light entity backed by one bridge channel.
//!
//! The bridge never reports levels back, so the entity remembers what it
//! last asked for. State only changes after the bridge has accepted a
//! command; a failed command leaves it as it was.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use tago_api::BridgeClient;

use crate::error::CoreError;
use crate::model::DimmerChannel;

/// Transition used when the caller doesn't ask for one.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(50);

/// Level used for a bare "on" when there is nothing to restore.
/// Ramps the bridge to 50 on its native scale.
pub const HALF_BRIGHTNESS: u8 = 128;

/// Last commanded brightness of a light, 0-255.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LightState {
    pub brightness: u8,
    /// Most recent non-zero level, restored by a bare turn-on.
    pub previous_brightness: u8,
}

impl LightState {
    pub fn is_on(&self) -> bool {
        self.brightness > 0
    }

    /// Level a turn-on should ramp to.
    pub fn turn_on_target(&self, requested: Option<u8>) -> u8 {
        match requested {
            Some(level) => level,
            None if self.previous_brightness == 0 => HALF_BRIGHTNESS,
            None => self.previous_brightness,
        }
    }

    fn record(&mut self, level: u8) {
        self.brightness = level;
        if level > 0 {
            self.previous_brightness = level;
        }
    }
}

/// Arguments of [`DimmerLight::turn_on`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnOn {
    pub brightness: Option<u8>,
    pub transition: Option<Duration>,
}

impl TurnOn {
    pub fn brightness(level: u8) -> Self {
        Self {
            brightness: Some(level),
            transition: None,
        }
    }
}

/// Capabilities advertised to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LightFeatures {
    pub brightness: bool,
    pub transition: bool,
}

/// A light entity for one [`DimmerChannel`].
pub struct DimmerLight {
    channel: DimmerChannel,
    client: BridgeClient,
    // Held across the bridge call so commands to one light never interleave.
    state: Mutex<LightState>,
}

impl DimmerLight {
    pub fn new(channel: DimmerChannel, client: BridgeClient) -> Self {
        Self {
            channel,
            client,
            state: Mutex::new(LightState::default()),
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.channel.unique_id
    }

    pub fn name(&self) -> &str {
        &self.channel.display_name
    }

    pub fn channel(&self) -> &DimmerChannel {
        &self.channel
    }

    /// The bridge gives no reachability signal per channel.
    pub fn available(&self) -> bool {
        true
    }

    pub fn supported_features(&self) -> LightFeatures {
        LightFeatures {
            brightness: true,
            transition: true,
        }
    }

    pub async fn state(&self) -> LightState {
        *self.state.lock().await
    }

    pub async fn brightness(&self) -> u8 {
        self.state.lock().await.brightness
    }

    pub async fn is_on(&self) -> bool {
        self.state.lock().await.is_on()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Turn on at the requested level, or restore the previous one.
    pub async fn turn_on(&self, args: TurnOn) -> Result<(), CoreError> {
        let mut state = self.state.lock().await;
        let level = state.turn_on_target(args.brightness);
        info!(unique_id = self.unique_id(), level, "turn on");

        self.send(level, args.transition).await?;
        state.record(level);
        Ok(())
    }

    /// Turn off, remembering the current level for the next bare turn-on.
    pub async fn turn_off(&self, transition: Option<Duration>) -> Result<(), CoreError> {
        let mut state = self.state.lock().await;
        info!(unique_id = self.unique_id(), "turn off");

        self.send(0, transition).await?;
        state.record(0);
        Ok(())
    }

    /// Ramp to an explicit level; 0 turns the light off.
    pub async fn set_brightness(&self, level: u8) -> Result<(), CoreError> {
        if level == 0 {
            self.turn_off(None).await
        } else {
            self.turn_on(TurnOn::brightness(level)).await
        }
    }

    async fn send(&self, level: u8, transition: Option<Duration>) -> Result<(), CoreError> {
        self.client
            .set_level(
                &self.channel.bridge_device_id,
                self.channel.channel_index,
                level,
                transition.unwrap_or(DEFAULT_TRANSITION),
            )
            .await
            .map_err(|e| CoreError::CommandFailed {
                unique_id: self.channel.unique_id.clone(),
                reason: e.to_string(),
            })
    }
}

impl std::fmt::Debug for DimmerLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DimmerLight")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
