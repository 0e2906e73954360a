// CGI HTTP client
//
// Wraps `reqwest::Client` with the router's single-endpoint command
// protocol: every request is a JSON `POST` carrying `cmd`, `method` and
// (for session-bound commands) `sessionId`. Endpoint families (session,
// device state, SIM) are implemented as inherent methods in sibling
// files to keep this module focused on transport mechanics.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};
use url::Url;

use crate::auth::AuthLost;
use crate::cgi::commands::{CgiCommand, CgiResponse};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Default CGI path relative to the router base URL.
pub const DEFAULT_CGI_PATH: &str = "/cgi-bin/http.cgi";

/// Body marker the firmware uses for a missing or expired session.
const NO_AUTH: &str = "NO_AUTH";

const AUTH_CHANNEL_SIZE: usize = 16;

/// Raw client for the router's CGI command API.
///
/// Handles the `{ success, cmd, message, ... }` envelope, session token
/// injection, and not-authenticated detection. All methods return
/// decoded payloads; the envelope is stripped before the caller sees it.
pub struct CgiClient {
    http: reqwest::Client,
    base_url: Url,
    endpoint: Url,
    /// Session token sent as `sessionId` on session-bound commands.
    session: RwLock<Option<SecretString>>,
    /// Process-wide auth-lost signal.
    auth_tx: broadcast::Sender<AuthLost>,
}

impl CgiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the router root (e.g. `http://192.168.0.1`);
    /// `cgi_path` is joined onto it to form the command endpoint.
    pub fn new(base_url: Url, cgi_path: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, cgi_path)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, cgi_path: &str) -> Result<Self, Error> {
        let endpoint = base_url.join(cgi_path).map_err(Error::InvalidUrl)?;
        let (auth_tx, _) = broadcast::channel(AUTH_CHANNEL_SIZE);
        Ok(Self {
            http,
            base_url,
            endpoint,
            session: RwLock::new(None),
            auth_tx,
        })
    }

    /// The router base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The full command endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Subscribe to the auth-lost signal.
    pub fn auth_events(&self) -> broadcast::Receiver<AuthLost> {
        self.auth_tx.subscribe()
    }

    // ── Session token ────────────────────────────────────────────────

    /// Install (or clear) the session token used for session-bound commands.
    pub fn set_session(&self, token: Option<SecretString>) {
        trace!(present = token.is_some(), "session token updated");
        match self.session.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    /// Whether a session token is currently installed.
    pub fn has_session(&self) -> bool {
        self.session_token().is_some()
    }

    fn session_token(&self) -> Option<SecretString> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    // ── Request path ─────────────────────────────────────────────────

    /// Issue a command and decode the reply into its tagged variant.
    ///
    /// `params` are merged into the request body next to `cmd`/`method`.
    pub async fn execute(
        &self,
        cmd: CgiCommand,
        params: Map<String, Value>,
    ) -> Result<CgiResponse, Error> {
        let body = self.request(cmd, params).await?;
        CgiResponse::decode(cmd, body)
    }

    /// Issue a command and return the acknowledged body.
    pub(crate) async fn request(
        &self,
        cmd: CgiCommand,
        params: Map<String, Value>,
    ) -> Result<Map<String, Value>, Error> {
        let number = cmd.number();
        let mut body = params;
        body.insert("cmd".into(), Value::from(number));
        body.insert(
            "method".into(),
            serde_json::to_value(cmd.method()).unwrap_or(Value::Null),
        );

        if cmd.requires_auth() {
            let token = self
                .session_token()
                .ok_or(Error::MissingSession { cmd: number })?;
            body.insert(
                "sessionId".into(),
                Value::from(token.expose_secret().to_owned()),
            );
        }

        debug!(cmd = number, command = %cmd, "POST {}", self.endpoint);

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_envelope(cmd, resp).await
    }

    /// Validate the envelope, returning the body on acknowledgement.
    ///
    /// A reply is acknowledged when it carries `"success": true` or echoes
    /// the request's `cmd`. `401` and `NO_AUTH` bodies raise the auth-lost
    /// signal before returning `Error::NotAuthenticated`.
    async fn parse_envelope(
        &self,
        cmd: CgiCommand,
        resp: reqwest::Response,
    ) -> Result<Map<String, Value>, Error> {
        let number = cmd.number();
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.signal_auth_lost(number);
            return Err(Error::NotAuthenticated { cmd: number });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let text = resp.text().await.map_err(Error::Transport)?;
        let value: Value = serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: text.clone(),
            }
        })?;

        let Value::Object(map) = value else {
            return Err(Error::Deserialization {
                message: format!("cmd {number}: expected a JSON object"),
                body: text,
            });
        };

        if is_no_auth(&map) {
            self.signal_auth_lost(number);
            return Err(Error::NotAuthenticated { cmd: number });
        }

        let success = map.get("success").and_then(Value::as_bool);
        let echoed = map
            .get("cmd")
            .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
            == Some(u64::from(number));

        match success {
            Some(true) => Ok(map),
            Some(false) => Err(Error::Command {
                cmd: number,
                message: envelope_message(&map).unwrap_or_else(|| "request failed".into()),
            }),
            None if echoed => Ok(map),
            None => Err(Error::Command {
                cmd: number,
                message: "device did not acknowledge the command".into(),
            }),
        }
    }

    fn signal_auth_lost(&self, cmd: u16) {
        warn!(cmd, "device reports session not authenticated");
        // No receivers is fine: nobody is watching auth state.
        let _ = self.auth_tx.send(AuthLost::now(cmd));
    }
}

fn is_no_auth(map: &Map<String, Value>) -> bool {
    ["message", "error", "result"]
        .iter()
        .filter_map(|k| map.get(*k).and_then(Value::as_str))
        .any(|s| s.eq_ignore_ascii_case(NO_AUTH))
}

fn envelope_message(map: &Map<String, Value>) -> Option<String> {
    ["message", "error", "result"]
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
        .map(String::from)
}
