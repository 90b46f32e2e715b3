//! Bridge event stream with auto-reconnect.
//!
//! Connects to the bridge's WebSocket endpoint, decodes keypress records
//! from each frame and hands them to a callback in arrival order. Whenever
//! the connection closes or fails, the listener waits a fixed retry
//! interval and connects again, until [`EventListener::stop`] is called.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tago_api::{BridgeAddress, EventListener, ListenerConfig};
//!
//! let mut listener = EventListener::for_bridge(
//!     &BridgeAddress::new("192.168.1.40"),
//!     ListenerConfig::default(),
//!     Arc::new(|event| {
//!         println!("keypad {} key {}", event.keypad, event.key);
//!         Ok(())
//!     }),
//! )?;
//! listener.start();
//! // ...
//! listener.shutdown().await;
//! ```

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::address::BridgeAddress;
use crate::error::{Error, whole_secs};

/// Event type of the records this listener forwards.
pub const KEYPRESS: &str = "keypress";

/// Upper bound on sending a Close frame while stopping.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Callback invoked once per keypress, in frame order.
///
/// Errors are logged and otherwise ignored.
pub type KeypressHandler = Arc<dyn Fn(KeypressEvent) -> Result<(), BoxError> + Send + Sync>;

// ── KeypressEvent ────────────────────────────────────────────────────

/// A button press reported by the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypressEvent {
    /// Bridge timestamp, kept in its original numeric form.
    pub ts: serde_json::Number,
    pub keypad: u32,
    /// Key identifier; the bridge sends strings or numbers.
    pub key: serde_json::Value,
    /// How long the key was held, in seconds.
    pub duration: f64,
}

// ── Configuration & state ────────────────────────────────────────────

/// Reconnect timing.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Fixed delay between a lost connection and the next attempt. Default: 5s.
    pub retry_interval: Duration,

    /// Upper bound on the WebSocket handshake. Default: 10s.
    pub connect_timeout: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Connection state observable through [`EventListener::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ListenerState {
    Disconnected,
    Connecting { attempt: u32 },
    Connected,
    Closed,
    Errored,
    Stopped,
}

/// Cloneable handle that stops a listener from any task.
#[derive(Debug, Clone)]
pub struct ListenerStopHandle {
    cancel: CancellationToken,
}

impl ListenerStopHandle {
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            debug!("stop requested for event listener");
        }
        self.cancel.cancel();
    }
}

// ── EventListener ────────────────────────────────────────────────────

/// Long-lived keypress listener for one bridge.
///
/// Owns exactly one background task and at most one connection at a time.
/// A listener is single-use: once stopped it cannot be started again.
pub struct EventListener {
    url: Url,
    config: ListenerConfig,
    handler: KeypressHandler,
    cancel: CancellationToken,
    state_tx: Option<watch::Sender<ListenerState>>,
    state_rx: watch::Receiver<ListenerState>,
    task: Option<JoinHandle<()>>,
}

impl EventListener {
    /// Create a listener for an explicit WebSocket URL. Does not connect.
    pub fn new(url: Url, config: ListenerConfig, handler: KeypressHandler) -> Self {
        let (state_tx, state_rx) = watch::channel(ListenerState::Disconnected);
        Self {
            url,
            config,
            handler,
            cancel: CancellationToken::new(),
            state_tx: Some(state_tx),
            state_rx,
            task: None,
        }
    }

    /// Create a listener for `ws://{host}:{event_port}/`.
    pub fn for_bridge(
        address: &BridgeAddress,
        config: ListenerConfig,
        handler: KeypressHandler,
    ) -> Result<Self, Error> {
        Ok(Self::new(address.event_url()?, config, handler))
    }

    /// Spawn the reconnect loop. Must be called within a tokio runtime.
    pub fn start(&mut self) {
        if self.cancel.is_cancelled() {
            warn!(url = %self.url, "event listener already stopped, not restarting");
            return;
        }
        let Some(state_tx) = self.state_tx.take() else {
            warn!(url = %self.url, "event listener already started");
            return;
        };

        let url = self.url.clone();
        let config = self.config.clone();
        let handler = Arc::clone(&self.handler);
        let cancel = self.cancel.clone();

        self.task = Some(tokio::spawn(async move {
            listen_loop(url, config, handler, cancel, state_tx).await;
        }));
    }

    /// Request shutdown. Idempotent; a pending receive is interrupted.
    pub fn stop(&self) {
        self.stop_handle().stop();
    }

    /// A handle for stopping this listener from another task.
    pub fn stop_handle(&self) -> ListenerStopHandle {
        ListenerStopHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Wait for the background task to finish. Returns immediately if it
    /// was never started.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "event listener task ended abnormally");
            }
        }
    }

    /// [`stop`](Self::stop) followed by [`join`](Self::join).
    pub async fn shutdown(&mut self) {
        self.stop();
        self.join().await;
    }

    /// `true` while the background task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Subscribe to connection state changes.
    pub fn state(&self) -> watch::Receiver<ListenerState> {
        self.state_rx.clone()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// connect → read → on close or error, wait → reconnect.
async fn listen_loop(
    url: Url,
    config: ListenerConfig,
    handler: KeypressHandler,
    cancel: CancellationToken,
    state: watch::Sender<ListenerState>,
) {
    let mut attempt: u32 = 0;

    while !cancel.is_cancelled() {
        attempt = attempt.saturating_add(1);
        state.send_replace(ListenerState::Connecting { attempt });
        info!(url = %url, attempt, "connecting to bridge");

        match connect_and_read(&url, &config, &handler, &cancel, &state).await {
            Ok(()) => {
                state.send_replace(ListenerState::Closed);
                info!(url = %url, "bridge connection closed");
            }
            Err(e) => {
                state.send_replace(ListenerState::Errored);
                warn!(url = %url, error = %e, attempt, "bridge connection failed");
            }
        }

        if cancel.is_cancelled() {
            break;
        }

        info!(
            retry_secs = config.retry_interval.as_secs_f64(),
            "waiting before reconnect"
        );
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(config.retry_interval) => {}
        }
    }

    state.send_replace(ListenerState::Stopped);
    info!(url = %url, "event listener stopped");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Open one connection and read frames until it ends or the listener is
/// stopped. A stop during the read sends a Close frame before returning.
async fn connect_and_read(
    url: &Url,
    config: &ListenerConfig,
    handler: &KeypressHandler,
    cancel: &CancellationToken,
    state: &watch::Sender<ListenerState>,
) -> Result<(), Error> {
    let handshake = tokio::time::timeout(
        config.connect_timeout,
        tokio_tungstenite::connect_async(url.as_str()),
    );

    let ws_stream = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(()),
        result = handshake => match result {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
            Err(_) => {
                return Err(Error::Timeout {
                    timeout_secs: whole_secs(config.connect_timeout),
                });
            }
        },
    };

    state.send_replace(ListenerState::Connected);
    info!(url = %url, "connected to bridge event stream");

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("closing bridge connection");
                if tokio::time::timeout(CLOSE_TIMEOUT, write.send(Message::Close(None)))
                    .await
                    .is_err()
                {
                    debug!("bridge did not take the close frame in time");
                }
                return Ok(());
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => dispatch_frame(&text, handler),
                    Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                        Ok(text) => dispatch_frame(text, handler),
                        Err(e) => warn!(error = %e, "skipping non-UTF-8 binary frame"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        if let Some(cf) = frame {
                            info!(code = %cf.code, reason = %cf.reason, "bridge sent close frame");
                        } else {
                            info!("bridge sent close frame (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Ok(_)) => {
                        // Ping, Pong, raw Frame -- tungstenite answers pings itself
                        trace!("control frame");
                    }
                    Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
                    None => {
                        info!("bridge event stream ended");
                        return Ok(());
                    }
                }
            }
        }
    }
}

// ── Frame parsing ────────────────────────────────────────────────────

/// Hand each record of a frame to `handler`. A failing or panicking
/// handler costs that one event, never the connection.
fn dispatch_frame(text: &str, handler: &KeypressHandler) {
    debug!(frame = text, "bridge frame");
    for event in parse_frame(text) {
        let ts = event.ts.clone();
        match catch_unwind(AssertUnwindSafe(|| handler(event))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "keypress handler failed"),
            Err(payload) => warn!(
                ts = %ts,
                panic = panic_message(payload.as_ref()),
                "keypress handler panicked"
            ),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic>")
}

/// Decode the keypress records of one frame.
///
/// A frame is a JSON array of event records. An undecodable frame yields
/// nothing; an undecodable keypress record is skipped without affecting
/// its neighbours. Records of other event types are ignored.
pub fn parse_frame(text: &str) -> Vec<KeypressEvent> {
    let records: Vec<serde_json::Value> = match serde_json::from_str(text) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "skipping malformed bridge frame");
            return Vec::new();
        }
    };

    records
        .into_iter()
        .filter_map(|record| {
            match record.get("event").and_then(serde_json::Value::as_str) {
                Some(KEYPRESS) => match serde_json::from_value::<KeypressEvent>(record) {
                    Ok(event) => Some(event),
                    Err(e) => {
                        warn!(error = %e, "skipping malformed keypress record");
                        None
                    }
                },
                Some(other) => {
                    trace!(event = other, "ignoring bridge event");
                    None
                }
                None => {
                    warn!("skipping bridge record without event type");
                    None
                }
            }
        })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────
