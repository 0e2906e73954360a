//! Session lifecycle, reactive device state and mesh topology for
//! `cpedash`, sitting between `cpedash-api` and the CLI.
//!
//! - **[`Dashboard`]**: facade owning the background tasks. It runs the
//!   session heartbeat, status polling, the settings fetch effect that
//!   follows login-state transitions, and the auth-lost listener.
//!   [`stop()`](Dashboard::stop) cancels them and discards late responses.
//!
//! - **[`SessionManager`]**: the logged-in flag, kept consistent with the
//!   [`TokenStore`] and the device's verdict.
//!
//! - **[`GlobalData`]**: per-key reactive store (`tokio::sync::watch`)
//!   with sequence tickets, so a slow response never overwrites a newer
//!   value. Subscribe through [`SlotStream`].
//!
//! - **[`topology`]**: flat mesh report → rooted tree of
//!   Controller/Agent/station nodes.
//!
//! - Helpers: [`wifi_qr`] payloads, [`plmn`] operator help, form
//!   [`validate`]ion.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod plmn;
pub mod session;
pub mod store;
pub mod stream;
pub mod token;
pub mod topology;
pub mod validate;
pub mod wifi_qr;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{Credentials, DEFAULT_DEVICE_URL, DeviceConfig, TlsVerification};
pub use dashboard::{Dashboard, SettingsRefresh};
pub use error::CoreError;
pub use session::{LoginState, SessionManager};
pub use store::{Entry, GlobalData};
pub use stream::{SlotStream, SlotWatchStream};
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore};

pub use model::{
    AccountLevel, ConnectionSettings, DhcpLease, EnumEntry, GlobalConfig, GlobalKey, GlobalValue,
    MacAddress, PinStatus, StatusInfo, WifiNetwork, WifiSettings,
};
pub use topology::{DevRole, LinkMedium, TopologyData, TopologyNode};
