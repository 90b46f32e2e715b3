// ── Integration controller ──
//
// Lifecycle of one bridge integration: enumerate channels, hand lights to
// the host, run the keypress listener, and tear it all down again.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info};

use tago_api::{BridgeClient, EventListener, KeypressEvent, KeypressHandler, ListenerState};

use crate::config::IntegrationConfig;
use crate::discovery::discover_channels;
use crate::error::CoreError;
use crate::host::Host;
use crate::light::DimmerLight;
use crate::model::{EVENT_TYPE, TagoEvent};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A running integration for one bridge.
///
/// Cheaply cloneable via `Arc<IntegrationInner>`. Dropping every clone
/// without calling [`shutdown`](Self::shutdown) still stops the listener,
/// but doesn't wait for it.
#[derive(Clone)]
pub struct Integration {
    inner: Arc<IntegrationInner>,
}

struct IntegrationInner {
    config: IntegrationConfig,
    host: Arc<dyn Host>,
    client: BridgeClient,
    lights: Vec<Arc<DimmerLight>>,
    listener: Mutex<Option<EventListener>>,
    listener_state: watch::Receiver<ListenerState>,
}

impl Integration {
    /// Set up the integration.
    ///
    /// Enumerates dimmer channels, registers one light per channel with the
    /// host, then starts the keypress listener. Fails with
    /// [`CoreError::SetupIncomplete`] if the bridge can't be enumerated.
    pub async fn setup(config: IntegrationConfig, host: Arc<dyn Host>) -> Result<Self, CoreError> {
        info!(version = VERSION, "Tago integration setup");
        info!(bridge = %config.address, "bridge address");

        let client = BridgeClient::new(&config.address, &config.transport_config())?;

        let Some(channels) = discover_channels(&client, config.enumeration_timeout).await else {
            return Err(CoreError::SetupIncomplete {
                host: config.address.host.clone(),
            });
        };

        let lights: Vec<Arc<DimmerLight>> = channels
            .into_iter()
            .map(|channel| Arc::new(DimmerLight::new(channel, client.clone())))
            .collect();

        if lights.is_empty() {
            info!("bridge has no dimmer channels");
        } else {
            host.add_lights(&lights);
            debug!(count = lights.len(), "lights registered");
        }

        let mut listener = EventListener::for_bridge(
            &config.address,
            config.listener_config(),
            keypress_forwarder(Arc::clone(&host)),
        )?;
        let listener_state = listener.state();
        listener.start();

        Ok(Self {
            inner: Arc::new(IntegrationInner {
                config,
                host,
                client,
                lights,
                listener: Mutex::new(Some(listener)),
                listener_state,
            }),
        })
    }

    /// Stop the listener, wait for it to exit, and unregister the lights.
    /// Safe to call more than once.
    pub async fn shutdown(&self) {
        let listener = self.inner.listener.lock().await.take();
        let Some(mut listener) = listener else {
            debug!("integration already shut down");
            return;
        };

        listener.shutdown().await;
        if !self.inner.lights.is_empty() {
            self.inner.host.remove_lights(&self.inner.lights);
        }
        info!(bridge = %self.inner.config.address, "Tago integration unloaded");
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &IntegrationConfig {
        &self.inner.config
    }

    /// The control client shared by every light.
    pub fn client(&self) -> &BridgeClient {
        &self.inner.client
    }

    pub fn lights(&self) -> &[Arc<DimmerLight>] {
        &self.inner.lights
    }

    pub fn light(&self, unique_id: &str) -> Result<&Arc<DimmerLight>, CoreError> {
        self.inner
            .lights
            .iter()
            .find(|light| light.unique_id() == unique_id)
            .ok_or_else(|| CoreError::LightNotFound {
                unique_id: unique_id.to_string(),
            })
    }

    /// Subscribe to the event listener's connection state.
    pub fn listener_state(&self) -> watch::Receiver<ListenerState> {
        self.inner.listener_state.clone()
    }
}

/// Listener callback that republishes keypresses on the host bus.
pub fn keypress_forwarder(host: Arc<dyn Host>) -> KeypressHandler {
    Arc::new(move |press: KeypressEvent| {
        let event = TagoEvent::from(&press);
        debug!(id = %event.id, keypad = %event.keypad, "keypress");
        host.fire_event(EVENT_TYPE, &event)
    })
}
