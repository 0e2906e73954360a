#![allow(clippy::unwrap_used)]
// Integration tests for `Dashboard` and `SessionManager` against a
// wiremock router.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cpedash_core::{
    CoreError, Dashboard, DevRole, DeviceConfig, GlobalKey, GlobalValue, LoginState,
    MemoryTokenStore, StatusInfo, TokenStore,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(token: Option<&str>) -> (MockServer, Dashboard, Arc<MemoryTokenStore>) {
    setup_with_interval(token, Duration::from_secs(3600)).await
}

async fn setup_with_interval(
    token: Option<&str>,
    interval: Duration,
) -> (MockServer, Dashboard, Arc<MemoryTokenStore>) {
    let server = MockServer::start().await;
    let config = DeviceConfig {
        url: Url::parse(&server.uri()).unwrap(),
        timeout: Duration::from_secs(5),
        heartbeat_interval: interval,
        status_interval: interval,
        ..DeviceConfig::default()
    };
    let tokens = Arc::new(match token {
        Some(t) => MemoryTokenStore::with_token(t.to_string().into()),
        None => MemoryTokenStore::new(),
    });
    let dash = Dashboard::new(config, tokens.clone()).unwrap();
    (server, dash, tokens)
}

fn cmd(number: u16) -> impl wiremock::Match {
    body_partial_json(json!({ "cmd": number }))
}

fn ok(extra: serde_json::Value) -> ResponseTemplate {
    let mut body = json!({ "success": true });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }
    ResponseTemplate::new(200).set_body_json(body)
}

async fn mount(server: &MockServer, number: u16, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(cmd(number))
        .respond_with(response)
        .mount(server)
        .await;
}

#[test]
fn test_zero_interval_is_rejected() {
    for config in [
        DeviceConfig {
            heartbeat_interval: Duration::ZERO,
            ..DeviceConfig::default()
        },
        DeviceConfig {
            status_interval: Duration::ZERO,
            ..DeviceConfig::default()
        },
    ] {
        let result = Dashboard::new(config, Arc::new(MemoryTokenStore::new()));
        assert!(matches!(result, Err(CoreError::Config { .. })));
    }
}

// ── check_session ───────────────────────────────────────────────────

#[tokio::test]
async fn test_check_session_without_token_makes_no_request() {
    let (server, dash, _) = setup(None).await;

    Mock::given(method("POST"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    assert!(!dash.check_session().await);
    assert_eq!(*dash.login_state().borrow(), LoginState::LoggedOut);
}

#[tokio::test]
async fn test_check_session_valid_token() {
    let (server, dash, _) = setup(Some("tok")).await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"cmd": 104, "sessionId": "tok"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cmd": 104})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(dash.check_session().await);
    assert_eq!(dash.session().state(), LoginState::LoggedIn);
}

#[tokio::test]
async fn test_check_session_rejected_token_is_cleared() {
    let (server, dash, tokens) = setup(Some("stale")).await;
    mount(
        &server,
        104,
        ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": "NO_AUTH"})),
    )
    .await;

    assert!(!dash.check_session().await);
    assert!(tokens.load().is_none());
    assert_eq!(dash.session().state(), LoginState::LoggedOut);
    assert!(!dash.client().has_session());
}

#[tokio::test]
async fn test_check_session_transport_failure_logs_out() {
    let (server, dash, tokens) = setup(Some("tok")).await;
    mount(&server, 104, ResponseTemplate::new(502)).await;

    assert!(!dash.check_session().await);
    assert!(tokens.load().is_none());
}

// ── login / logout ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_persists_token() {
    let (server, dash, tokens) = setup(None).await;
    mount(&server, 100, ok(json!({"sessionId": "tok-1"}))).await;

    dash.login("admin", &"pw".to_string().into()).await.unwrap();

    assert_eq!(tokens.load().unwrap().expose_secret(), "tok-1");
    assert_eq!(dash.session().state(), LoginState::LoggedIn);
}

#[tokio::test]
async fn test_login_failure_is_authentication_error() {
    let (server, dash, tokens) = setup(None).await;
    mount(
        &server,
        100,
        ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": "bad password"})),
    )
    .await;

    let result = dash.login("admin", &"nope".to_string().into()).await;
    assert!(matches!(result, Err(CoreError::AuthenticationFailed { .. })));
    assert!(tokens.load().is_none());
}

#[tokio::test]
async fn test_logout_clears_token_even_if_device_fails() {
    let (server, dash, tokens) = setup(Some("tok")).await;
    mount(&server, 101, ResponseTemplate::new(500)).await;

    assert!(dash.logout().await.is_err());
    assert!(tokens.load().is_none());
    assert_eq!(dash.session().state(), LoginState::LoggedOut);
}

// ── Settings effect ─────────────────────────────────────────────────

#[tokio::test]
async fn test_settings_when_logged_out_fetch_connection_only() {
    let (server, dash, _) = setup(None).await;

    Mock::given(method("POST"))
        .and(cmd(1001))
        .respond_with(ok(json!({"connectionMode": "auto"})))
        .expect(1)
        .mount(&server)
        .await;
    for number in [1010, 1020, 1030] {
        Mock::given(method("POST"))
            .and(cmd(number))
            .respond_with(ok(json!({})))
            .expect(0)
            .mount(&server)
            .await;
    }

    let outcome = dash.refresh_settings().await;
    assert_eq!(outcome.applied, vec![GlobalKey::ConnectionSettings]);
    assert!(outcome.failed.is_empty());
    assert_eq!(
        dash.data()
            .connection_settings()
            .unwrap()
            .connection_mode
            .as_deref(),
        Some("auto")
    );
}

#[tokio::test]
async fn test_settings_sub_fetch_failure_does_not_abort_others() {
    let (server, dash, _) = setup(Some("tok")).await;
    mount(&server, 1001, ok(json!({}))).await;
    mount(&server, 1010, ResponseTemplate::new(500)).await;
    mount(&server, 1020, ok(json!({"accountLevel": 1}))).await;
    mount(&server, 1030, ok(json!({"defaultLanguage": "en"}))).await;

    let outcome = dash.refresh_settings().await;

    assert_eq!(
        outcome.applied,
        vec![
            GlobalKey::ConnectionSettings,
            GlobalKey::AccountLevel,
            GlobalKey::GlobalConfig
        ]
    );
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, GlobalKey::WifiSettings);
    assert!(dash.data().account_level().unwrap().is_admin());
    assert!(dash.data().wifi_settings().is_none());
}

#[tokio::test]
async fn test_failed_fetch_keeps_stale_value() {
    let (server, dash, _) = setup(None).await;
    dash.data().update_global_data(GlobalValue::StatusInfo(StatusInfo {
        network_type: Some("LTE".into()),
        ..StatusInfo::default()
    }));
    mount(&server, 1000, ResponseTemplate::new(503)).await;

    assert!(dash.refresh_status().await.is_err());
    assert_eq!(
        dash.data().status_info().unwrap().network_type.as_deref(),
        Some("LTE")
    );
}

// ── Background tasks ────────────────────────────────────────────────

async fn count_cmd(server: &MockServer, number: u16) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).ok())
        .filter(|body| body["cmd"] == number)
        .count()
}

async fn wait_for_count(server: &MockServer, number: u16, count: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let seen = count_cmd(server, number).await;
        if seen >= count {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "cmd {number} sent {seen} times, expected {count}"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

async fn wait_for_cmd(server: &MockServer, number: u16) {
    wait_for_count(server, number, 1).await;
}

#[tokio::test]
async fn test_start_runs_heartbeat_and_status_poll_immediately() {
    let (server, dash, _) = setup(Some("tok")).await;
    Mock::given(method("POST"))
        .and(cmd(104))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cmd": 104})))
        .expect(1)
        .mount(&server)
        .await;
    mount(&server, 1000, ok(json!({"networkType": "5G SA"}))).await;
    for number in [1001, 1010, 1020, 1030] {
        mount(&server, number, ok(json!({}))).await;
    }

    dash.start().await.unwrap();
    wait_for_cmd(&server, 104).await;
    wait_for_cmd(&server, 1000).await;

    let mut status = dash.data().subscribe_status_info();
    if status.current().is_none() {
        tokio::time::timeout(Duration::from_secs(5), status.changed())
            .await
            .unwrap();
    }
    assert_eq!(
        dash.data().status_info().unwrap().network_type.as_deref(),
        Some("5G SA")
    );

    dash.stop().await;
}

#[tokio::test]
async fn test_heartbeat_and_status_poll_repeat_each_interval() {
    let (server, dash, _) = setup_with_interval(Some("tok"), Duration::from_millis(100)).await;
    mount(
        &server,
        104,
        ResponseTemplate::new(200).set_body_json(json!({"cmd": 104})),
    )
    .await;
    for number in [1000, 1001, 1010, 1020, 1030] {
        mount(&server, number, ok(json!({}))).await;
    }

    dash.start().await.unwrap();
    wait_for_count(&server, 104, 3).await;
    wait_for_count(&server, 1000, 3).await;
    dash.stop().await;

    // Login state never changed, so the settings effect ran once.
    assert_eq!(count_cmd(&server, 1001).await, 1);
    assert_eq!(dash.session().state(), LoginState::LoggedIn);
}

#[tokio::test]
async fn test_settings_refetched_after_login_transition() {
    let (server, dash, _) = setup(None).await;
    mount(
        &server,
        104,
        ResponseTemplate::new(200).set_body_json(json!({"cmd": 104})),
    )
    .await;
    mount(&server, 100, ok(json!({"sessionId": "tok-2"}))).await;
    for number in [1000, 1001, 1010, 1020, 1030] {
        mount(&server, number, ok(json!({}))).await;
    }

    dash.start().await.unwrap();
    wait_for_cmd(&server, 1001).await;
    assert_eq!(count_cmd(&server, 1010).await, 0);

    dash.login("admin", &"pw".to_string().into()).await.unwrap();
    wait_for_count(&server, 1001, 2).await;
    wait_for_cmd(&server, 1010).await;
    wait_for_cmd(&server, 1020).await;
    wait_for_cmd(&server, 1030).await;

    dash.stop().await;
}

#[tokio::test]
async fn test_auth_lost_from_any_command_forces_logout() {
    let (server, dash, tokens) = setup(Some("tok")).await;
    mount(
        &server,
        104,
        ResponseTemplate::new(200).set_body_json(json!({"cmd": 104})),
    )
    .await;
    mount(&server, 1000, ok(json!({}))).await;
    mount(&server, 1001, ok(json!({}))).await;
    mount(
        &server,
        1010,
        ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": "NO_AUTH"})),
    )
    .await;
    mount(&server, 1020, ok(json!({}))).await;
    mount(&server, 1030, ok(json!({}))).await;

    let mut state = dash.login_state();
    dash.start().await.unwrap();

    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s == LoginState::LoggedOut),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(tokens.load().is_none());

    dash.stop().await;
}

#[tokio::test]
async fn test_stop_discards_late_responses() {
    let (server, dash, _) = setup(None).await;
    mount(&server, 1000, ok(json!({"networkType": "LTE"}))).await;

    dash.start().await.unwrap();
    dash.stop().await;
    assert!(dash.is_stopped());

    let landed = dash.refresh_status().await.unwrap();
    assert!(!landed);
    assert!(dash.start().await.is_err());
}

// ── SIM ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_wrong_pin_reports_remaining_attempts() {
    let (server, dash, _) = setup(Some("tok")).await;
    mount(
        &server,
        1051,
        ResponseTemplate::new(200).set_body_json(json!({"success": false, "message": "PIN_ERROR"})),
    )
    .await;
    mount(&server, 1050, ok(json!({"simStatus": "PIN_REQUIRED", "pinRemain": 2}))).await;

    let result = dash.verify_pin("0000").await;
    assert!(
        matches!(
            result,
            Err(CoreError::Rejected { ref message, remaining_attempts: Some(2) }) if message == "PIN_ERROR"
        ),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_invalid_pin_is_rejected_locally() {
    let (server, dash, _) = setup(Some("tok")).await;
    Mock::given(method("POST"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let result = dash.verify_pin("12").await;
    assert!(matches!(result, Err(CoreError::ValidationFailed { ref field, .. }) if field == "pin"));
}

#[tokio::test]
async fn test_correct_pin_patches_status() {
    let (server, dash, _) = setup(Some("tok")).await;
    mount(&server, 1051, ok(json!({}))).await;

    dash.verify_pin("1234").await.unwrap();
    assert_eq!(
        dash.data().status_info().unwrap().sim_status.as_deref(),
        Some("READY")
    );
}

// ── Topology ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_topology_survives_dhcp_failure() {
    let (server, dash, _) = setup(Some("tok")).await;
    mount(
        &server,
        1040,
        ok(json!({
            "topology": "{'topology information': [{'AL MAC': 'aa:bb:cc:00:00:01', 'Device role': 0, \
                'Radio Info': [{'BSSINFO': [{'SSID': 'home', 'connected sta info': \
                [{'STA MAC': '11:22:33:44:55:66', 'Medium': '2.4G', 'BH STA': False}]}]}]}]}"
        })),
    )
    .await;
    mount(&server, 1041, ResponseTemplate::new(500)).await;

    let data = dash.topology(None).await.unwrap();
    let root = data.tree_data.unwrap();
    assert_eq!(root.dev_role, DevRole::Controller);
    assert_eq!(root.children.len(), 1);
    assert!(root.children[0].ip.is_none());
}
