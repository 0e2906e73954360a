//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use cpedash_config::ConfigError;
use cpedash_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to router at {url}")]
    #[diagnostic(
        code(cpedash::connection_failed),
        help(
            "Check that the router is reachable and the URL is right.\n\
             Reason: {reason}\n\
             Try: cpedash --url http://192.168.0.1 status"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(cpedash::timeout),
        help("Increase the timeout with --timeout or check the router's load.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(cpedash::auth_failed),
        help(
            "Verify the username and password.\n\
             Run: cpedash config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("Not logged in")]
    #[diagnostic(
        code(cpedash::not_logged_in),
        help(
            "Run: cpedash login\n\
             Or configure a username and password for automatic login."
        )
    )]
    NotLoggedIn,

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(cpedash::no_credentials),
        help(
            "Store one with: cpedash config set-password\n\
             Or set CPEDASH_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Router rejected the request: {message}")]
    #[diagnostic(code(cpedash::rejected))]
    Rejected {
        message: String,
        #[help]
        remaining: Option<String>,
    },

    #[error("API error: {message}")]
    #[diagnostic(code(cpedash::api_error))]
    Api { message: String },

    #[error("No {resource} found for '{identifier}'")]
    #[diagnostic(code(cpedash::not_found), help("{hint}"))]
    NotFound {
        resource: String,
        identifier: String,
        hint: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(cpedash::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(cpedash::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: cpedash config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(cpedash::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(cpedash::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(cpedash::json), help("Check the file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NotLoggedIn | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::NotLoggedIn => Self::NotLoggedIn,
            CoreError::Rejected {
                message,
                remaining_attempts,
            } => Self::Rejected {
                message,
                remaining: remaining_attempts.map(|n| format!("{n} attempt(s) remaining")),
            },
            CoreError::ValidationFailed { field, message } => Self::Validation {
                field,
                reason: message,
            },
            CoreError::Api {
                message,
                cmd,
                status,
            } => Self::Api {
                message: match (cmd, status) {
                    (Some(cmd), _) => format!("{message} (cmd {cmd})"),
                    (None, Some(status)) => format!("{message} (HTTP {status})"),
                    (None, None) => message,
                },
            },
            CoreError::TokenStorage(e) => Self::Io(e),
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Api { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::ProfileNotFound { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => Self::Config(other),
        }
    }
}
