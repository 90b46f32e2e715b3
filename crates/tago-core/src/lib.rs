// tago-core: Integration logic between tago-api and an automation host.

pub mod config;
pub mod discovery;
pub mod error;
pub mod host;
pub mod integration;
pub mod light;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::IntegrationConfig;
pub use discovery::discover_channels;
pub use error::CoreError;
pub use host::Host;
pub use integration::{Integration, keypress_forwarder};
pub use light::{DEFAULT_TRANSITION, DimmerLight, HALF_BRIGHTNESS, LightFeatures, LightState, TurnOn};
pub use model::{
    DimmerChannel, EVENT_TYPE, KeyAction, PressDuration, TagoEvent, channels_from_listing,
};

// Wire-level types consumers commonly need alongside the core ones.
pub use tago_api::{
    BoxError, BridgeAddress, BridgeClient, CONTROL_PORT, EVENT_PORT, ListenerState, TransportConfig,
    to_native_level,
};
