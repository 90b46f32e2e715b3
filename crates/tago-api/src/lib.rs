// tago-api: Async Rust client for the Tago lighting bridge (events + control)

pub mod address;
pub mod client;
pub mod error;
pub mod listener;
pub mod models;
pub mod transport;

pub use address::{BridgeAddress, CONTROL_PORT, EVENT_PORT};
pub use client::{BridgeClient, RAMP_RATE, to_native_level};
pub use error::Error;
pub use listener::{
    BoxError, EventListener, KEYPRESS, KeypressEvent, KeypressHandler, ListenerConfig,
    ListenerState, ListenerStopHandle,
};
pub use models::{CommandAction, DeviceDescriptor, DeviceListing, DimmerEntry, RampCommand};
pub use transport::TransportConfig;
