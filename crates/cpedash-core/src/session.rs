// ── Session lifecycle ──
//
// Owns the logged-in/logged-out flag and keeps it consistent with the
// token store and the API client. The device is the authority: a local
// token only makes us optimistically logged in until the next check.

use std::sync::Arc;

use cpedash_api::{AuthLost, CgiClient};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::token::TokenStore;

/// Dashboard-wide login flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoginState {
    LoggedOut,
    LoggedIn,
}

/// Session manager shared by the heartbeat, the auth-lost listener and
/// explicit login/logout calls.
pub struct SessionManager {
    client: Arc<CgiClient>,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<LoginState>,
}

impl SessionManager {
    /// Build from whatever token the store already holds. A stored token
    /// is installed on the client and counts as logged in until proven
    /// otherwise.
    pub fn new(client: Arc<CgiClient>, tokens: Arc<dyn TokenStore>) -> Self {
        let initial = match tokens.load() {
            Some(token) => {
                client.set_session(Some(token));
                LoginState::LoggedIn
            }
            None => LoginState::LoggedOut,
        };
        let (state, _) = watch::channel(initial);
        Self {
            client,
            tokens,
            state,
        }
    }

    pub fn state(&self) -> LoginState {
        *self.state.borrow()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state() == LoginState::LoggedIn
    }

    /// Receiver that fires once per login-state transition.
    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    pub fn has_token(&self) -> bool {
        self.tokens.load().is_some()
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Re-validate the session against the device.
    ///
    /// Without a local token this never touches the network. Any failure
    /// of the auth check, transport errors included, drops the token,
    /// unless a login replaced it while the check was in flight.
    pub async fn check_session(&self) -> bool {
        let Some(token) = self.tokens.load() else {
            self.drop_if_current(None);
            return false;
        };

        self.client.set_session(Some(token.clone()));
        match self.client.check_auth().await {
            Ok(()) => {
                // A logout may have raced the check.
                if !self.has_token() {
                    self.client.set_session(None);
                    return false;
                }
                self.set_state(LoginState::LoggedIn);
                true
            }
            Err(e) => {
                if e.is_auth_expired() {
                    info!("device rejected the stored session");
                } else {
                    warn!(error = %e, "session check failed");
                }
                self.drop_if_current(Some(&token));
                false
            }
        }
    }

    /// Force logged-out only if the store still holds `checked`.
    fn drop_if_current(&self, checked: Option<&SecretString>) -> bool {
        let current = self.tokens.load();
        let unchanged = match (checked, current.as_ref()) {
            (None, None) => true,
            (Some(a), Some(b)) => a.expose_secret() == b.expose_secret(),
            _ => false,
        };
        if !unchanged {
            debug!("session token replaced during check, keeping it");
            self.client.set_session(current);
            return false;
        }
        self.force_logged_out()
    }

    // ── Explicit login / logout ──────────────────────────────────────

    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), CoreError> {
        let token = self.client.login(username, password).await?;
        self.tokens.save(&token)?;
        self.set_state(LoginState::LoggedIn);
        Ok(())
    }

    /// Log out on the device. Local state is cleared whatever the device
    /// answers.
    pub async fn logout(&self) -> Result<(), CoreError> {
        let result = if self.client.has_session() {
            self.client.logout().await
        } else {
            Ok(())
        };
        self.force_logged_out();
        result.map_err(CoreError::from)
    }

    // ── Forced transitions ───────────────────────────────────────────

    /// Drop the token and flip to logged out. Returns `true` if the state
    /// actually changed; repeated calls are no-ops.
    pub fn force_logged_out(&self) -> bool {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to clear stored session token");
        }
        self.client.set_session(None);
        self.set_state(LoginState::LoggedOut)
    }

    /// React to the API layer reporting a not-authenticated reply.
    pub fn handle_auth_lost(&self, event: &AuthLost) {
        if self.force_logged_out() {
            info!(cmd = event.cmd, "session lost, logged out");
        } else {
            debug!(cmd = event.cmd, "auth-lost signal while already logged out");
        }
    }

    fn set_state(&self, next: LoginState) -> bool {
        let changed = self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
        if changed {
            info!(state = %next, "login state changed");
        }
        changed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::token::MemoryTokenStore;
    use url::Url;

    fn manager(token: Option<&str>) -> SessionManager {
        let client = CgiClient::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            cpedash_api::DEFAULT_CGI_PATH,
            &cpedash_api::TransportConfig::default(),
        )
        .unwrap();
        let tokens: Arc<dyn TokenStore> = match token {
            Some(t) => Arc::new(MemoryTokenStore::with_token(t.to_string().into())),
            None => Arc::new(MemoryTokenStore::new()),
        };
        SessionManager::new(Arc::new(client), tokens)
    }

    /// Answers the first read after construction with `stale`, every
    /// other read with what was saved, as if a login landed while a
    /// check was in flight.
    struct LoginDuringCheck {
        inner: MemoryTokenStore,
        stale: Option<&'static str>,
        reads: AtomicUsize,
    }

    impl TokenStore for LoginDuringCheck {
        fn load(&self) -> Option<SecretString> {
            if self.reads.fetch_add(1, Ordering::SeqCst) == 1 {
                return self.stale.map(|t| SecretString::from(t.to_string()));
            }
            self.inner.load()
        }

        fn save(&self, token: &SecretString) -> std::io::Result<()> {
            self.inner.save(token)
        }

        fn clear(&self) -> std::io::Result<()> {
            self.inner.clear()
        }
    }

    #[tokio::test]
    async fn failed_check_keeps_token_saved_by_concurrent_login() {
        for stale in [Some("old"), None] {
            let tokens = Arc::new(LoginDuringCheck {
                inner: MemoryTokenStore::with_token("fresh".to_string().into()),
                stale,
                reads: AtomicUsize::new(0),
            });
            let client = CgiClient::new(
                Url::parse("http://127.0.0.1:9").unwrap(),
                cpedash_api::DEFAULT_CGI_PATH,
                &cpedash_api::TransportConfig::default(),
            )
            .unwrap();
            let session = SessionManager::new(Arc::new(client), tokens.clone());

            assert!(!session.check_session().await);
            assert_eq!(tokens.inner.load().unwrap().expose_secret(), "fresh");
            assert_eq!(session.state(), LoginState::LoggedIn);
            assert!(session.client.has_session());
        }
    }

    #[test]
    fn stored_token_is_optimistically_logged_in() {
        assert_eq!(manager(Some("t")).state(), LoginState::LoggedIn);
        assert_eq!(manager(None).state(), LoginState::LoggedOut);
    }

    #[test]
    fn repeated_auth_lost_transitions_once() {
        let session = manager(Some("t"));
        let mut rx = session.subscribe();
        rx.borrow_and_update();

        let event = AuthLost {
            cmd: 1010,
            at: chrono::Utc::now(),
        };
        session.handle_auth_lost(&event);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        session.handle_auth_lost(&event);
        session.handle_auth_lost(&event);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(session.state(), LoginState::LoggedOut);
        assert!(!session.has_token());
    }
}
