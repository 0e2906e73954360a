// ── Global data keys ──
//
// The dashboard keeps exactly five device-state documents. Each key maps
// to one CGI fetch and one typed payload.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use cpedash_api::{AccountLevel, ConnectionSettings, GlobalConfig, StatusInfo, WifiSettings};

/// Name of a slot in the global data bag.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum GlobalKey {
    StatusInfo,
    ConnectionSettings,
    WifiSettings,
    AccountLevel,
    GlobalConfig,
}

impl GlobalKey {
    /// Whether the backing command needs a session.
    pub fn requires_login(self) -> bool {
        !matches!(self, Self::StatusInfo | Self::ConnectionSettings)
    }
}

/// A value destined for one slot. The variant determines the key.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalValue {
    StatusInfo(StatusInfo),
    ConnectionSettings(ConnectionSettings),
    WifiSettings(WifiSettings),
    AccountLevel(AccountLevel),
    GlobalConfig(GlobalConfig),
}

impl GlobalValue {
    pub fn key(&self) -> GlobalKey {
        match self {
            Self::StatusInfo(_) => GlobalKey::StatusInfo,
            Self::ConnectionSettings(_) => GlobalKey::ConnectionSettings,
            Self::WifiSettings(_) => GlobalKey::WifiSettings,
            Self::AccountLevel(_) => GlobalKey::AccountLevel,
            Self::GlobalConfig(_) => GlobalKey::GlobalConfig,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn keys_use_dashboard_names() {
        let names: Vec<String> = GlobalKey::iter().map(|k| k.to_string()).collect();
        assert_eq!(
            names,
            [
                "statusInfo",
                "connectionSettings",
                "wifiSettings",
                "accountLevel",
                "globalConfig"
            ]
        );
        assert_eq!(
            serde_json::to_string(&GlobalKey::WifiSettings).unwrap(),
            "\"wifiSettings\""
        );
        assert_eq!("accountLevel".parse::<GlobalKey>().unwrap(), GlobalKey::AccountLevel);
    }

    #[test]
    fn value_reports_its_key() {
        let v = GlobalValue::AccountLevel(AccountLevel::default());
        assert_eq!(v.key(), GlobalKey::AccountLevel);
    }
}
