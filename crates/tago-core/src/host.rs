// ── Host seam ──
//
// The automation host owns entity registration and its event bus. The
// integration only needs these three calls; everything else about the
// host's lifecycle stays on the other side of this trait.

use std::sync::Arc;

use tago_api::BoxError;

use crate::light::DimmerLight;
use crate::model::TagoEvent;

/// What the integration needs from its host.
pub trait Host: Send + Sync {
    /// Register newly discovered lights. Called at most once per setup,
    /// and only with a non-empty list.
    fn add_lights(&self, lights: &[Arc<DimmerLight>]);

    /// Publish an event on the host's bus. Called from the listener task,
    /// so it must not block for long.
    fn fire_event(&self, event_type: &str, event: &TagoEvent) -> Result<(), BoxError>;

    /// Forget lights registered by [`add_lights`](Self::add_lights).
    fn remove_lights(&self, _lights: &[Arc<DimmerLight>]) {}
}
