// Session endpoints
//
// Login hands back an opaque `sessionId` which is then attached to every
// session-bound command. There is no refresh or rotation: a token lives
// until logout or until the device stops accepting it.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::debug;

use crate::cgi::client::CgiClient;
use crate::cgi::commands::{CgiCommand, CgiResponse};
use crate::error::Error;

impl CgiClient {
    /// Authenticate with username/password.
    ///
    /// On success the returned token is also installed on this client.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<SecretString, Error> {
        let mut params = Map::new();
        params.insert("username".into(), Value::from(username));
        params.insert("password".into(), Value::from(password.expose_secret()));

        debug!(username, "logging in");

        let resp = match self.execute(CgiCommand::Login, params).await {
            Ok(resp) => resp,
            Err(Error::Command { message, .. }) => {
                return Err(Error::Authentication { message });
            }
            Err(e) => return Err(e),
        };

        let CgiResponse::Login(login) = resp else {
            return Err(Error::UnexpectedResponse {
                cmd: CgiCommand::Login.number(),
                got: resp.kind().into(),
            });
        };

        if login.session_id.is_empty() {
            return Err(Error::Authentication {
                message: "device returned an empty session id".into(),
            });
        }

        let token = SecretString::from(login.session_id);
        self.set_session(Some(token.clone()));
        debug!("login successful");
        Ok(token)
    }

    /// End the current session.
    ///
    /// The local token is dropped even when the device call fails.
    pub async fn logout(&self) -> Result<(), Error> {
        debug!("logging out");
        let result = self.execute(CgiCommand::Logout, Map::new()).await;
        self.set_session(None);
        result.map(|_| ())
    }

    /// Ask the device whether the installed session is still valid.
    pub async fn check_auth(&self) -> Result<(), Error> {
        self.execute(CgiCommand::CheckAuth, Map::new())
            .await
            .map(|_| ())
    }
}
