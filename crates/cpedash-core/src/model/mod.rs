// ── Domain model ──

mod global;
mod mac;

pub use global::{GlobalKey, GlobalValue};
pub use mac::MacAddress;

pub use cpedash_api::{
    AccountLevel, ConnectionSettings, DhcpLease, EnumEntry, GlobalConfig, PinStatus, StatusInfo,
    WifiNetwork, WifiSettings,
};
