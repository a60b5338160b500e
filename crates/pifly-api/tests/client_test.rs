#![allow(clippy::unwrap_used)]
// Integration tests for `PiFireClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use url::Url;
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pifly_api::{Error, ModeRequest, PiFireClient, PrimeNextMode, SystemCommand, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, PiFireClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = PiFireClient::with_client(reqwest::Client::new(), &base_url);
    (server, client)
}

async fn expect_command(server: &MockServer, http_method: &str, route: &str) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "success"})))
        .expect(1)
        .mount(server)
        .await;
}

// ── Status reads ────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_status_ignores_content_type() {
    let (server, client) = setup().await;

    let payload = json!({
        "status": { "mode": "Hold", "units": "F" },
        "current": { "PSP": 225, "P": { "Grill": 224 } }
    });

    Mock::given(method("GET"))
        .and(path("/api/current"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(payload.to_string(), "text/html"))
        .mount(&server)
        .await;

    let value = client.fetch_status().await.unwrap();

    assert_eq!(value["status"]["mode"], "Hold");
    assert_eq!(value["current"]["PSP"], 225);
}

#[tokio::test]
async fn test_fetch_status_malformed_json_is_decode_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/current"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>oops</html>", "text/html"))
        .mount(&server)
        .await;

    match client.fetch_status().await {
        Err(Error::Decode { endpoint, body, .. }) => {
            assert_eq!(endpoint, "/api/current");
            assert_eq!(body, "<html>oops</html>");
        }
        other => panic!("expected Decode error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_status_non_2xx_is_transport_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/current"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    match client.fetch_status().await {
        Err(Error::Transport {
            endpoint,
            status,
            message,
        }) => {
            assert_eq!(endpoint, "/api/current");
            assert_eq!(status, Some(503));
            assert!(message.contains("busy"), "unexpected message: {message}");
        }
        other => panic!("expected Transport error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_status_timeout_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/current"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let transport = TransportConfig::default().with_timeout(Duration::from_millis(100));
    let client = PiFireClient::new(&server.uri(), &transport).unwrap();

    match client.fetch_status().await {
        Err(Error::Transport { status, .. }) => assert_eq!(status, None),
        other => panic!("expected Transport error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop a server so the port is almost certainly closed.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let client = PiFireClient::new(&uri, &TransportConfig::default()).unwrap();

    let err = client.fetch_status().await.unwrap_err();
    assert!(matches!(err, Error::Transport { status: None, .. }));
    assert!(err.is_transient());
}

// ── Hopper ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_hopper_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/hopper"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"hopper_level": 72, "hopper_pellets": "Hickory"})),
        )
        .mount(&server)
        .await;

    let hopper = client.fetch_hopper().await.unwrap();
    assert_eq!(hopper["hopper_level"], 72);
    assert_eq!(hopper["hopper_pellets"], "Hickory");
}

#[tokio::test]
async fn test_fetch_hopper_missing_endpoint_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/hopper"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client.fetch_hopper().await.is_none());
}

#[tokio::test]
async fn test_fetch_hopper_non_object_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/hopper"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("null", "application/json"))
        .mount(&server)
        .await;

    assert!(client.fetch_hopper().await.is_none());
}

// ── Control ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_mode() {
    let (server, client) = setup().await;
    expect_command(&server, "GET", "/api/set/mode/smoke").await;

    assert_ok!(client.set_mode(ModeRequest::Smoke).await);
}

#[tokio::test]
async fn test_set_hold_mode_rounds_temperature() {
    let (server, client) = setup().await;
    expect_command(&server, "GET", "/api/set/mode/hold/225").await;

    assert_ok!(client.set_hold_mode(224.6).await);
}

#[tokio::test]
async fn test_set_p_mode_and_smoke_plus() {
    let (server, client) = setup().await;
    expect_command(&server, "GET", "/api/set/pmode/4").await;
    expect_command(&server, "GET", "/api/set/smokeplus/false").await;

    assert_ok!(client.set_p_mode(4).await);
    assert_ok!(client.set_smoke_plus(false).await);
}

#[tokio::test]
async fn test_prime_pellets() {
    let (server, client) = setup().await;
    expect_command(&server, "GET", "/api/set/mode/prime/50/startup").await;

    assert_ok!(client.prime_pellets(50, PrimeNextMode::Startup).await);
}

#[tokio::test]
async fn test_system_commands_use_post() {
    let (server, client) = setup().await;
    expect_command(&server, "POST", "/api/cmd/restart").await;
    expect_command(&server, "POST", "/api/cmd/shutdown").await;

    assert_ok!(client.system_command(SystemCommand::Restart).await);
    assert_ok!(client.system_command(SystemCommand::Shutdown).await);
}

#[tokio::test]
async fn test_command_rejected_by_device() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/set/mode/monitor"))
        .respond_with(ResponseTemplate::new(500).set_body_string("mode change failed"))
        .mount(&server)
        .await;

    let err = assert_err!(client.set_mode(ModeRequest::Monitor).await);
    assert_eq!(err.status(), Some(500));
}

// ── Validation ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_arguments_never_reach_the_device() {
    let (server, client) = setup().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(matches!(
        client.prime_pellets(0, PrimeNextMode::Stop).await,
        Err(Error::InvalidArgument { field: "grams", .. })
    ));
    assert!(matches!(
        client.set_p_mode(10).await,
        Err(Error::InvalidArgument {
            field: "p_mode",
            ..
        })
    ));
    assert!(matches!(
        client.set_hold_mode(f64::NAN).await,
        Err(Error::InvalidArgument {
            field: "temperature",
            ..
        })
    ));
    assert!(matches!(
        client.set_hold_mode(-5.0).await,
        Err(Error::InvalidArgument { .. })
    ));
}
