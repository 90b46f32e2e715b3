// Domain types for the integration: discovered channels and host events.

pub mod channel;
pub mod event;

pub use channel::{DimmerChannel, channels_from_listing};
pub use event::{EVENT_TYPE, KeyAction, LONG_PRESS_SECS, PressDuration, TagoEvent};
