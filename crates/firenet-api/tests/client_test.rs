#![allow(clippy::unwrap_used)]
// Integration tests for `FirenetClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use firenet_api::{Error, FirenetClient, TransportConfig};

const STOVE: &str = "12345";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, FirenetClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = FirenetClient::new(base_url, STOVE.into(), &TransportConfig::default()).unwrap();
    (server, client)
}

fn stove_path(suffix: &str) -> String {
    format!("/api/client/{STOVE}/{suffix}")
}

fn status_body() -> serde_json::Value {
    json!({
        "name": "Living room",
        "stoveID": STOVE,
        "lastSeenMinutes": 0,
        "controls": {
            "revision": 1_700_000_000,
            "onOff": true,
            "targetTemperature": "21",
            "operatingMode": 2
        },
        "sensors": {
            "inputRoomTemperature": "20.5",
            "statusMainState": 3,
            "statusSubState": 0
        }
    })
}

fn password() -> secrecy::SecretString {
    "hunter2".to_string().into()
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success_sets_session_cookie() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/web/login"))
        .and(body_string_contains("email=me%40example.com"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "connect.sid=s%3Aabc123; Path=/")
                .set_body_string("<html><a href=\"/web/summary\">summary</a></html>"),
        )
        .mount(&server)
        .await;

    client.login("me@example.com", &password()).await.unwrap();

    let cookie = client.cookie_header().unwrap();
    assert!(cookie.contains("connect.sid"), "cookie header was {cookie}");
}

#[tokio::test]
async fn test_login_without_marker_fails() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/web/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Login</form>"))
        .mount(&server)
        .await;

    let result = client.login("me@example.com", &password()).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_session_cookie_is_sent_on_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/web/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "connect.sid=abc123; Path=/")
                .set_body_string("summary"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(stove_path("status")))
        .and(header("cookie", "connect.sid=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .expect(1)
        .mount(&server)
        .await;

    client.login("me@example.com", &password()).await.unwrap();
    client.get_status().await.unwrap();
}

// ── Status tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(stove_path("status")))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .mount(&server)
        .await;

    let status = client.get_status().await.unwrap();

    assert_eq!(status.name.as_deref(), Some("Living room"));
    assert_eq!(status.revision(), Some(&json!(1_700_000_000)));
    assert_eq!(status.sensors.get("statusMainState"), Some(&json!(3)));
}

#[tokio::test]
async fn test_status_without_stove_id_is_malformed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(stove_path("status")))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = client.get_status().await;

    assert!(
        matches!(result, Err(Error::MalformedResponse { .. })),
        "expected MalformedResponse, got: {result:?}"
    );
}

#[tokio::test]
async fn test_status_unparseable_json() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(stove_path("status")))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{{\"stoveID\":\"{STOVE}\"")))
        .mount(&server)
        .await;

    let result = client.get_status().await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.get_status().await;

    assert!(
        matches!(result, Err(Error::SessionExpired)),
        "expected SessionExpired, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(stove_path("status")))
        .respond_with(ResponseTemplate::new(500).set_body_string("stove not linked"))
        .mount(&server)
        .await;

    match client.get_status().await {
        Err(Error::RemoteServer { status, ref message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("not linked"), "got: {message}");
        }
        other => panic!("expected RemoteServer error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(stove_path("status")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client.get_status().await;

    assert!(
        matches!(result, Err(Error::UnexpectedStatus { status: 503 })),
        "expected UnexpectedStatus, got: {result:?}"
    );
}

// ── Controls tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_post_controls_sends_whole_object() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(stove_path("controls")))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let status: firenet_api::StoveStatus = serde_json::from_value(status_body()).unwrap();
    client.post_controls(&status.controls).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let form: Vec<(String, String)> = url::form_urlencoded::parse(&requests[0].body)
        .into_owned()
        .collect();
    let field = |name: &str| {
        form.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };
    assert_eq!(form.len(), 4);
    assert_eq!(field("revision").as_deref(), Some("1700000000"));
    assert_eq!(field("onOff").as_deref(), Some("true"));
    assert_eq!(field("targetTemperature").as_deref(), Some("21"));
}

#[tokio::test]
async fn test_post_controls_session_expired() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(stove_path("controls")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.post_controls(&serde_json::Map::new()).await;

    assert!(matches!(result, Err(Error::SessionExpired)), "got: {result:?}");
}
