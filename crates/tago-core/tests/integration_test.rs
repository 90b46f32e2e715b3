#![allow(clippy::unwrap_used)]
// End-to-end tests for `Integration`: wiremock for the control API and an
// in-process WebSocket server standing in for the bridge's event port.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tago_core::{
    BoxError, BridgeAddress, BridgeClient, CoreError, DimmerLight, EVENT_TYPE, Host, Integration,
    IntegrationConfig, ListenerState, PressDuration, TagoEvent, TurnOn,
};

const WAIT: Duration = Duration::from_secs(5);

// ── Recording host ──────────────────────────────────────────────────

#[derive(Default)]
struct RecordingHost {
    added: Mutex<Vec<String>>,
    removed: Mutex<Vec<String>>,
    events: Mutex<Option<mpsc::UnboundedSender<(String, TagoEvent)>>>,
    reject_first: Mutex<bool>,
}

impl RecordingHost {
    fn with_events() -> (Arc<Self>, mpsc::UnboundedReceiver<(String, TagoEvent)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let host = Self {
            events: Mutex::new(Some(tx)),
            ..Self::default()
        };
        (Arc::new(host), rx)
    }

    fn added(&self) -> Vec<String> {
        self.added.lock().unwrap().clone()
    }

    fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

impl Host for RecordingHost {
    fn add_lights(&self, lights: &[Arc<DimmerLight>]) {
        let mut added = self.added.lock().unwrap();
        added.extend(lights.iter().map(|l| l.unique_id().to_string()));
    }

    fn fire_event(&self, event_type: &str, event: &TagoEvent) -> Result<(), BoxError> {
        {
            let mut reject = self.reject_first.lock().unwrap();
            if *reject {
                *reject = false;
                return Err("event bus full".into());
            }
        }
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            tx.send((event_type.to_string(), event.clone()))?;
        }
        Ok(())
    }

    fn remove_lights(&self, lights: &[Arc<DimmerLight>]) {
        let mut removed = self.removed.lock().unwrap();
        removed.extend(lights.iter().map(|l| l.unique_id().to_string()));
    }
}

// ── Fake bridge ─────────────────────────────────────────────────────

/// Event port that sends `frames` to every client, then idles.
async fn event_port(frames: Vec<String>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let frames = frames.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await else {
                    return;
                };
                for frame in frames {
                    if ws.send(Message::text(frame)).await.is_err() {
                        return;
                    }
                }
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });

    addr
}

/// A local port with nothing listening on it.
async fn closed_port() -> u16 {
    let socket = TcpListener::bind("127.0.0.1:0").await.unwrap();
    socket.local_addr().unwrap().port()
}

async fn control_port(listing: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/list_devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing))
        .mount(&server)
        .await;
    server
}

fn config(event_port: u16, control_port: u16) -> IntegrationConfig {
    let mut config = IntegrationConfig::new(
        BridgeAddress::new("127.0.0.1").with_ports(event_port, control_port),
    );
    config.retry_interval = Duration::from_millis(50);
    config.enumeration_timeout = Duration::from_secs(2);
    config.command_timeout = Duration::from_secs(2);
    config
}

fn keypress(ts: u64, keypad: u32, key: &str, duration: f64) -> String {
    json!([{ "event": "keypress", "ts": ts, "keypad": keypad, "key": key, "duration": duration }])
        .to_string()
}

// ── Setup ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_setup_registers_lights_and_forwards_keypresses() {
    let control = control_port(json!({
        "dev1": { "dimmers": { "a": { "ch": 1, "alias": "Lamp" }, "b": { "ch": 2 } } },
        "dev2": { "relays": {} }
    }))
    .await;
    let events = event_port(vec![keypress(1000, 2, "A", 0.5), keypress(1001, 2, "A", 1.5)]).await;

    let (host, mut rx) = RecordingHost::with_events();
    let integration = Integration::setup(
        config(events.port(), control.address().port()),
        host.clone(),
    )
    .await
    .unwrap();

    assert_eq!(host.added(), ["dev1_a", "dev1_b"]);
    assert_eq!(integration.lights().len(), 2);
    assert_eq!(integration.light("dev1_a").unwrap().name(), "Lamp");
    assert_eq!(integration.light("dev1_b").unwrap().name(), "dev1_ch2");

    let (event_type, first) = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(event_type, EVENT_TYPE);
    assert_eq!(first.id, "tg-1000");
    assert_eq!(first.keypad, "0x 2");
    assert_eq!(first.key, "A");
    assert_eq!(first.duration, PressDuration::Short);

    let (_, second) = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(second.id, "tg-1001");
    assert_eq!(second.duration, PressDuration::Long);

    integration.shutdown().await;
    assert_eq!(host.removed(), ["dev1_a", "dev1_b"]);
    assert_eq!(*integration.listener_state().borrow(), ListenerState::Stopped);
}

#[tokio::test]
async fn test_setup_incomplete_when_bridge_unreachable() {
    let port = closed_port().await;
    let host = Arc::new(RecordingHost::default());

    let result = Integration::setup(config(port, port), host.clone()).await;

    assert!(
        matches!(result, Err(CoreError::SetupIncomplete { .. })),
        "expected SetupIncomplete"
    );
    assert!(result.err().unwrap().is_retryable());
    assert!(host.added().is_empty());
}

#[tokio::test]
async fn test_setup_incomplete_when_listing_times_out() {
    let control = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/list_devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})).set_delay(WAIT))
        .mount(&control)
        .await;

    let mut cfg = config(closed_port().await, control.address().port());
    cfg.enumeration_timeout = Duration::from_millis(100);

    let result = Integration::setup(cfg, Arc::new(RecordingHost::default())).await;
    assert!(matches!(result, Err(CoreError::SetupIncomplete { .. })));
}

#[tokio::test]
async fn test_setup_incomplete_when_bridge_reports_nothing() {
    let control = control_port(json!({})).await;

    let result = Integration::setup(
        config(closed_port().await, control.address().port()),
        Arc::new(RecordingHost::default()),
    )
    .await;

    assert!(matches!(result, Err(CoreError::SetupIncomplete { .. })));
}

#[tokio::test]
async fn test_setup_without_dimmers_still_listens() {
    let control = control_port(json!({ "dev2": { "relays": {} } })).await;
    let events = event_port(vec![keypress(7, 0x1a, "C", 0.2)]).await;

    let (host, mut rx) = RecordingHost::with_events();
    let integration = Integration::setup(
        config(events.port(), control.address().port()),
        host.clone(),
    )
    .await
    .unwrap();

    assert!(host.added().is_empty());
    assert!(integration.lights().is_empty());

    let (_, event) = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(event.keypad, "0x1a");

    integration.shutdown().await;
    assert!(host.removed().is_empty());
}

#[tokio::test]
async fn test_host_rejection_does_not_drop_connection() {
    let control = control_port(json!({ "dev1": { "dimmers": {} } })).await;
    let events = event_port(vec![keypress(1, 1, "A", 0.1), keypress(2, 1, "B", 0.1)]).await;

    let (host, mut rx) = RecordingHost::with_events();
    *host.reject_first.lock().unwrap() = true;

    let integration = Integration::setup(
        config(events.port(), control.address().port()),
        host.clone(),
    )
    .await
    .unwrap();

    let (_, event) = tokio::time::timeout(WAIT, rx.recv()).await.unwrap().unwrap();
    assert_eq!(event.id, "tg-2");

    integration.shutdown().await;
}

// ── Shutdown ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let control = control_port(json!({ "dev1": { "dimmers": { "a": { "ch": 1 } } } })).await;
    let host = Arc::new(RecordingHost::default());

    // Event port refuses connections; the listener just keeps retrying.
    let integration = Integration::setup(
        config(closed_port().await, control.address().port()),
        host.clone(),
    )
    .await
    .unwrap();

    tokio::time::timeout(Duration::from_secs(2), integration.shutdown())
        .await
        .unwrap();
    integration.shutdown().await;

    assert_eq!(host.removed(), ["dev1_a"]);
    assert_eq!(*integration.listener_state().borrow(), ListenerState::Stopped);
}

// ── Light commands ──────────────────────────────────────────────────

#[tokio::test]
async fn test_light_commands_track_state() {
    let control = control_port(json!({ "dev1": { "dimmers": { "a": { "ch": 4 } } } })).await;

    for value in [50, 0, 100] {
        Mock::given(method("POST"))
            .and(path("/api/dev1/do"))
            .and(body_json(json!([
                { "action": "RAMP_TO", "value": value, "rate": 50, "ch": 4 }
            ])))
            .respond_with(ResponseTemplate::new(200))
            .mount(&control)
            .await;
    }

    let integration = Integration::setup(
        config(closed_port().await, control.address().port()),
        Arc::new(RecordingHost::default()),
    )
    .await
    .unwrap();
    let light = integration.light("dev1_a").unwrap();

    assert!(!light.is_on().await);
    assert!(light.available());

    // Nothing to restore yet: half brightness, native 50.
    light.turn_on(TurnOn::default()).await.unwrap();
    assert_eq!(light.brightness().await, 128);

    light.turn_off(None).await.unwrap();
    assert!(!light.is_on().await);
    assert_eq!(light.state().await.previous_brightness, 128);

    // Restores the previous level.
    light.turn_on(TurnOn::default()).await.unwrap();
    assert_eq!(light.brightness().await, 128);

    light.set_brightness(255).await.unwrap();
    assert_eq!(light.brightness().await, 255);

    light.set_brightness(0).await.unwrap();
    assert_eq!(light.brightness().await, 0);
    assert_eq!(light.state().await.previous_brightness, 255);

    integration.shutdown().await;
}

#[tokio::test]
async fn test_failed_command_leaves_state_unchanged() {
    let control = control_port(json!({ "dev1": { "dimmers": { "a": { "ch": 1 } } } })).await;

    let integration = Integration::setup(
        config(closed_port().await, control.address().port()),
        Arc::new(RecordingHost::default()),
    )
    .await
    .unwrap();
    let light = integration.light("dev1_a").unwrap().clone();
    integration.shutdown().await;

    // Take the bridge away before sending a command.
    drop(control);

    let err = light.turn_on(TurnOn::brightness(200)).await.unwrap_err();
    assert!(matches!(err, CoreError::CommandFailed { .. }), "got: {err:?}");
    assert_eq!(light.brightness().await, 0);
    assert!(!light.is_on().await);
}

#[tokio::test]
async fn test_hung_command_reports_command_timeout() {
    let control = control_port(json!({ "dev1": { "dimmers": { "a": { "ch": 1 } } } })).await;
    Mock::given(method("POST"))
        .and(path("/api/dev1/do"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&control)
        .await;

    let mut config = config(closed_port().await, control.address().port());
    config.command_timeout = Duration::from_secs(1);

    // Straight through the client, folded into a core error.
    let client = BridgeClient::new(&config.address, &config.transport_config()).unwrap();
    let err = client
        .set_level("dev1", 1, 255, Duration::ZERO)
        .await
        .unwrap_err();
    let err = CoreError::from(err);
    assert!(
        matches!(err, CoreError::Timeout { timeout_secs: Some(1) }),
        "got: {err:?}"
    );
    assert_eq!(err.to_string(), "Bridge timed out after 1s");

    // And through a light entity.
    let integration = Integration::setup(config, Arc::new(RecordingHost::default()))
        .await
        .unwrap();
    let light = integration.light("dev1_a").unwrap();
    let err = light.turn_on(TurnOn::brightness(200)).await.unwrap_err();
    match err {
        CoreError::CommandFailed { reason, .. } => {
            assert!(reason.contains("after 1s"), "got: {reason}");
        }
        other => panic!("expected CommandFailed, got: {other:?}"),
    }
    assert!(!light.is_on().await);

    integration.shutdown().await;
}

#[tokio::test]
async fn test_unknown_light() {
    let control = control_port(json!({ "dev1": { "dimmers": {} } })).await;
    let integration = Integration::setup(
        config(closed_port().await, control.address().port()),
        Arc::new(RecordingHost::default()),
    )
    .await
    .unwrap();

    assert!(matches!(
        integration.light("nope"),
        Err(CoreError::LightNotFound { .. })
    ));
    integration.shutdown().await;
}
