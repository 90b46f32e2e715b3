#![allow(clippy::unwrap_used)]
// Integration tests for `BridgeClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tago_api::{BridgeAddress, BridgeClient, DimmerEntry, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BridgeClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = BridgeClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

/// A client pointed at a port nothing listens on.
async fn unreachable_client() -> BridgeClient {
    let port = {
        let socket = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        socket.local_addr().unwrap().port()
    };
    let address = BridgeAddress::new("127.0.0.1").with_ports(8000, port);
    BridgeClient::new(&address, &TransportConfig::default()).unwrap()
}

const TIMEOUT: Duration = Duration::from_secs(10);

// ── Enumeration ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/list_devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dev1": { "dimmers": { "a": { "ch": 1, "alias": "Lamp" } } },
            "dev2": { "relays": {} }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listing = client.list_devices(TIMEOUT).await.unwrap();

    assert_eq!(listing.len(), 2);
    let dimmers: Vec<_> = listing["dev1"].dimmers().collect();
    assert_eq!(dimmers.len(), 1);
    assert_eq!(dimmers[0].0, "a");
    assert_eq!(
        dimmers[0].1.as_ref().unwrap(),
        &DimmerEntry {
            ch: 1,
            alias: Some("Lamp".into())
        }
    );
    assert!(listing["dev2"].dimmers.is_empty());
}

#[tokio::test]
async fn test_list_devices_timeout() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/list_devices"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = client.list_devices(Duration::from_millis(100)).await;

    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_list_devices_invalid_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/list_devices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let result = client.list_devices(TIMEOUT).await;

    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "<html>busy</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_list_devices_connection_refused() {
    let client = unreachable_client().await;

    let err = client.list_devices(TIMEOUT).await.unwrap_err();

    assert!(err.is_unreachable(), "expected connect error, got: {err:?}");
    assert!(err.is_transient());
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_level_sends_ramp_command() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/dev1/do"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!([
            { "action": "RAMP_TO", "value": 50, "rate": 50, "ch": 3 }
        ])))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_level("dev1", 3, 128, Duration::from_millis(50))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_level_full_and_zero() {
    let (server, client) = setup().await;

    for value in [100, 0] {
        Mock::given(method("POST"))
            .and(path("/api/dev9/do"))
            .and(body_json(json!([
                { "action": "RAMP_TO", "value": value, "rate": 50, "ch": 0 }
            ])))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    client.set_level("dev9", 0, 255, Duration::ZERO).await.unwrap();
    client.set_level("dev9", 0, 0, Duration::ZERO).await.unwrap();
}

#[tokio::test]
async fn test_set_level_ignores_response_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/dev1/do"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    client
        .set_level("dev1", 1, 200, Duration::ZERO)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_level_connection_refused() {
    let client = unreachable_client().await;

    let result = client.set_level("dev1", 1, 255, Duration::ZERO).await;

    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_set_level_times_out_on_hung_bridge() {
    let server = MockServer::start().await;
    let address = BridgeAddress::new("127.0.0.1").with_ports(8000, server.address().port());
    let client = BridgeClient::new(
        &address,
        &TransportConfig::default().with_timeout(Duration::from_millis(100)),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/dev1/do"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let err = client
        .set_level("dev1", 1, 255, Duration::ZERO)
        .await
        .unwrap_err();

    assert!(err.is_transient(), "expected timeout, got: {err:?}");
}

#[tokio::test]
async fn test_set_level_timeout_reports_configured_seconds() {
    let server = MockServer::start().await;
    let address = BridgeAddress::new("127.0.0.1").with_ports(8000, server.address().port());
    let client = BridgeClient::new(
        &address,
        &TransportConfig::default().with_timeout(Duration::from_secs(1)),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/dev1/do"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let err = client
        .set_level("dev1", 1, 255, Duration::ZERO)
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Timeout { timeout_secs: 1 }),
        "expected a 1s timeout, got: {err:?}"
    );
    assert_eq!(err.to_string(), "Request timed out after 1s");
}
