// cpedash-api: Async Rust client for the CPE router CGI command API

pub mod auth;
pub mod cgi;
pub mod error;
pub mod transport;

pub use auth::AuthLost;
pub use cgi::{CgiClient, DEFAULT_CGI_PATH};
pub use cgi::commands::{CgiCommand, CgiResponse, Method};
pub use cgi::models::{
    AccountLevel, ConnectionSettings, DhcpLease, EnumEntry, GlobalConfig, LoginResponse,
    PinStatus, StatusInfo, TopologyReport, WifiNetwork, WifiSettings,
};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
