#![allow(clippy::unwrap_used)]
// Integration tests for `CgiClient` using wiremock.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cpedash_api::{CgiClient, CgiCommand, CgiResponse, DEFAULT_CGI_PATH, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CgiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = CgiClient::with_client(reqwest::Client::new(), base_url, DEFAULT_CGI_PATH).unwrap();
    (server, client)
}

fn cmd(number: u16) -> impl wiremock::Match {
    body_partial_json(json!({ "cmd": number }))
}

// ── Session tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success_installs_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(DEFAULT_CGI_PATH))
        .and(body_partial_json(json!({
            "cmd": 100,
            "method": "POST",
            "username": "admin",
            "password": "hunter22"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "sessionId": "tok-1"})),
        )
        .mount(&server)
        .await;

    let secret: SecretString = "hunter22".to_string().into();
    let token = client.login("admin", &secret).await.unwrap();

    assert_eq!(token.expose_secret(), "tok-1");
    assert!(client.has_session());
}

#[tokio::test]
async fn test_login_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(cmd(100))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "PASSWORD_ERROR"})),
        )
        .mount(&server)
        .await;

    let secret: SecretString = "wrong".to_string().into();
    let result = client.login("admin", &secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { ref message }) if message == "PASSWORD_ERROR"),
        "expected Authentication error, got: {result:?}"
    );
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_session_bound_command_sends_session_id() {
    let (server, client) = setup().await;
    client.set_session(Some("tok-2".to_string().into()));

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"cmd": 104, "sessionId": "tok-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cmd": 104})))
        .expect(1)
        .mount(&server)
        .await;

    client.check_auth().await.unwrap();
}

#[tokio::test]
async fn test_session_bound_command_without_token_is_local_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.wifi_settings().await;
    assert!(matches!(result, Err(Error::MissingSession { cmd: 1010 })));
}

#[tokio::test]
async fn test_no_auth_body_raises_auth_lost() {
    let (server, client) = setup().await;
    client.set_session(Some("stale".to_string().into()));
    let mut events = client.auth_events();

    Mock::given(method("POST"))
        .and(cmd(1010))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": "NO_AUTH"})),
        )
        .mount(&server)
        .await;

    let before = Utc::now();
    let result = client.wifi_settings().await;
    assert!(matches!(result, Err(Error::NotAuthenticated { cmd: 1010 })));
    assert!(result.unwrap_err().is_auth_expired());

    let event = events.try_recv().unwrap();
    assert_eq!(event.cmd, 1010);
    assert!(event.at >= before && event.at <= Utc::now());
}

#[tokio::test]
async fn test_http_401_raises_auth_lost() {
    let (server, client) = setup().await;
    client.set_session(Some("stale".to_string().into()));
    let mut events = client.auth_events();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.check_auth().await;
    assert!(matches!(result, Err(Error::NotAuthenticated { cmd: 104 })));
    assert_eq!(events.try_recv().unwrap().cmd, 104);
}

#[tokio::test]
async fn test_logout_clears_token_even_on_failure() {
    let (server, client) = setup().await;
    client.set_session(Some("tok".to_string().into()));

    Mock::given(method("POST"))
        .and(cmd(101))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client.logout().await;
    assert!(matches!(result, Err(Error::Http { status: 500, .. })));
    assert!(!client.has_session());
}

// ── Device state tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_status_info_is_public_and_decoded() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(cmd(1000))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "cmd": 1000,
            "networkType": "5G SA",
            "signalStrength": "4",
            "plmn": "310260",
            "uptime": 7200
        })))
        .mount(&server)
        .await;

    let status = client.status_info().await.unwrap();
    assert_eq!(status.network_type.as_deref(), Some("5G SA"));
    assert_eq!(status.signal_strength, Some(4));
    assert_eq!(status.plmn.as_deref(), Some("310260"));
    assert_eq!(status.uptime, Some(7200));
    // Envelope keys do not leak into `extra`.
    assert!(!status.extra.contains_key("success"));
    assert!(!status.extra.contains_key("cmd"));
}

#[tokio::test]
async fn test_execute_returns_tagged_variant() {
    let (server, client) = setup().await;
    client.set_session(Some("tok".to_string().into()));

    Mock::given(method("POST"))
        .and(cmd(1041))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "dhcpList": [
                {"mac": "11:22:33:44:55:66", "ip": "192.168.0.10", "hostname": "laptop", "interface": "wlan0"}
            ]
        })))
        .mount(&server)
        .await;

    let resp = client
        .execute(CgiCommand::DhcpLeases, serde_json::Map::new())
        .await
        .unwrap();
    let CgiResponse::DhcpLeases(leases) = resp else {
        panic!("expected DhcpLeases, got {}", resp.kind());
    };
    assert_eq!(leases[0].hostname.as_deref(), Some("laptop"));
}

#[tokio::test]
async fn test_unacknowledged_reply_is_command_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cmd": 1})))
        .mount(&server)
        .await;

    let result = client.connection_settings().await;
    assert!(matches!(result, Err(Error::Command { cmd: 1001, .. })));
}

#[tokio::test]
async fn test_non_json_reply_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.status_info().await;
    assert!(matches!(result, Err(Error::Deserialization { .. })));
}

#[tokio::test]
async fn test_wrong_pin_surfaces_device_message() {
    let (server, client) = setup().await;
    client.set_session(Some("tok".to_string().into()));

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"cmd": 1051, "pin": "0000"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": "PIN_ERROR"})),
        )
        .mount(&server)
        .await;

    let result = client.verify_pin("0000").await;
    assert!(
        matches!(result, Err(Error::Command { cmd: 1051, ref message }) if message == "PIN_ERROR"),
        "got {result:?}"
    );
}
