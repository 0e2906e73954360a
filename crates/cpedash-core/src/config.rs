// ── Runtime device configuration ──
//
// These types describe *how* to talk to a router. They carry credential
// data and polling cadence, but never touch disk. The CLI builds a
// `DeviceConfig` from its profile and hands it in.

use std::time::Duration;

use cpedash_api::DEFAULT_CGI_PATH;
use secrecy::SecretString;
use url::Url;

/// Factory address most CPEs answer on.
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.0.1";

/// Username/password pair used by automatic login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Routers ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for a single router.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Router base URL (e.g., `http://192.168.0.1`).
    pub url: Url,
    /// CGI command endpoint, joined onto `url`.
    pub cgi_path: String,
    /// Credentials for `Dashboard::ensure_session`. `None` means the
    /// caller drives login explicitly.
    pub credentials: Option<Credentials>,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Session re-validation cadence.
    pub heartbeat_interval: Duration,
    /// Status poll cadence.
    pub status_interval: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            url: Url::parse(DEFAULT_DEVICE_URL).expect("default device URL is valid"),
            cgi_path: DEFAULT_CGI_PATH.into(),
            credentials: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            heartbeat_interval: Duration::from_secs(10),
            status_interval: Duration::from_secs(10),
        }
    }
}

impl DeviceConfig {
    /// Transport settings for the raw API client.
    pub(crate) fn transport(&self) -> cpedash_api::TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => cpedash_api::TlsMode::System,
            TlsVerification::CustomCa(path) => cpedash_api::TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => cpedash_api::TlsMode::DangerAcceptInvalid,
        };
        cpedash_api::TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
