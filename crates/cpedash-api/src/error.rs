use thiserror::Error;

/// Top-level error type for the `cpedash-api` crate.
///
/// Covers every failure mode of the CGI surface: authentication,
/// transport, device-side command rejection and response decoding.
/// `cpedash-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The device reported that the session is missing or expired.
    #[error("Not authenticated (cmd {cmd}) -- login required")]
    NotAuthenticated { cmd: u16 },

    /// A session-bound command was issued without a session token.
    #[error("No session token for cmd {cmd}")]
    MissingSession { cmd: u16 },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status from the CGI endpoint.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    // ── Device ──────────────────────────────────────────────────────
    /// The device understood the command but refused it.
    #[error("Command {cmd} rejected by device: {message}")]
    Command { cmd: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A reply decoded into a different variant than the command expects.
    #[error("Unexpected response to cmd {cmd}: {got}")]
    UnexpectedResponse { cmd: u16, got: String },
}

impl Error {
    /// Returns `true` if this error indicates the session is gone
    /// and a fresh login might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::NotAuthenticated { .. } | Self::MissingSession { .. }
        )
    }
}
