// ── Core error types ──
//
// User-facing errors from cpedash-core. These are NOT transport-specific:
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<cpedash_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to device at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Device request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Operation errors ─────────────────────────────────────────────
    /// The device refused a mutation (wrong PIN, PUK lock, ...).
    #[error("Operation rejected by device: {message}")]
    Rejected {
        message: String,
        /// Attempts left before the next lock level, when the device reports it.
        remaining_attempts: Option<i64>,
    },

    /// Local input check failed; nothing was sent to the device.
    #[error("Invalid {field}: {message}")]
    ValidationFailed { field: String, message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The `cmd` number the error is attributable to.
        cmd: Option<u16>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Storage / configuration errors ───────────────────────────────
    #[error("Session storage error: {0}")]
    TokenStorage(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error means the session is gone.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. } | Self::NotLoggedIn)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cpedash_api::Error> for CoreError {
    fn from(err: cpedash_api::Error) -> Self {
        match err {
            cpedash_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            cpedash_api::Error::NotAuthenticated { .. }
            | cpedash_api::Error::MissingSession { .. } => CoreError::NotLoggedIn,
            cpedash_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        cmd: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            cpedash_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            cpedash_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            cpedash_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            cpedash_api::Error::Http { status, body } => CoreError::Api {
                message: body,
                cmd: None,
                status: Some(status),
            },
            cpedash_api::Error::Command { cmd, message } => CoreError::Rejected {
                message: format!("{message} (cmd {cmd})"),
                remaining_attempts: None,
            },
            cpedash_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            cpedash_api::Error::UnexpectedResponse { cmd, got } => CoreError::Api {
                message: format!("unexpected {got} reply"),
                cmd: Some(cmd),
                status: None,
            },
        }
    }
}
