// CGI command table and per-command response variants
//
// Every request the device understands is identified by a `cmd` number.
// The number, HTTP-level method tag and session requirement for each
// command live in one table here; replies are decoded into the
// `CgiResponse` variant matching the command that was sent.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cgi::models::{
    AccountLevel, ConnectionSettings, DhcpLease, GlobalConfig, LoginResponse, PinStatus,
    StatusInfo, TopologyReport, WifiSettings,
};
use crate::error::Error;

/// Method tag carried in the JSON body (`"method": "GET"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// All commands issued against the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum CgiCommand {
    Login,
    Logout,
    CheckAuth,
    StatusInfo,
    ConnectionSettings,
    WifiSettings,
    AccountLevel,
    GlobalConfig,
    Topology,
    DhcpLeases,
    PinStatus,
    VerifyPin,
    UnlockPuk,
    Reboot,
}

impl CgiCommand {
    /// The `cmd` number sent on the wire.
    pub const fn number(self) -> u16 {
        match self {
            Self::Login => 100,
            Self::Logout => 101,
            Self::CheckAuth => 104,
            Self::StatusInfo => 1000,
            Self::ConnectionSettings => 1001,
            Self::WifiSettings => 1010,
            Self::AccountLevel => 1020,
            Self::GlobalConfig => 1030,
            Self::Topology => 1040,
            Self::DhcpLeases => 1041,
            Self::PinStatus => 1050,
            Self::VerifyPin => 1051,
            Self::UnlockPuk => 1052,
            Self::Reboot => 1090,
        }
    }

    pub const fn method(self) -> Method {
        match self {
            Self::Login | Self::Logout | Self::VerifyPin | Self::UnlockPuk | Self::Reboot => {
                Method::Post
            }
            _ => Method::Get,
        }
    }

    /// Whether the command must carry a session token.
    ///
    /// Device status and connection settings are public; everything
    /// else is session-bound.
    pub const fn requires_auth(self) -> bool {
        !matches!(
            self,
            Self::Login | Self::StatusInfo | Self::ConnectionSettings
        )
    }

    /// Reverse lookup from a wire number.
    pub fn from_number(number: u16) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|c| c.number() == number)
    }
}

/// A decoded reply, tagged by the command that produced it.
#[derive(Debug, Clone)]
pub enum CgiResponse {
    Login(LoginResponse),
    Logout,
    CheckAuth,
    StatusInfo(StatusInfo),
    ConnectionSettings(ConnectionSettings),
    WifiSettings(WifiSettings),
    AccountLevel(AccountLevel),
    GlobalConfig(GlobalConfig),
    Topology(TopologyReport),
    DhcpLeases(Vec<DhcpLease>),
    PinStatus(PinStatus),
    VerifyPin,
    UnlockPuk,
    Reboot,
}

/// Envelope keys stripped before the body is decoded into a model.
const ENVELOPE_KEYS: &[&str] = &["success", "cmd", "method", "sessionId", "message"];

impl CgiResponse {
    /// Decode an acknowledged reply body according to the command sent.
    pub fn decode(cmd: CgiCommand, mut body: Map<String, Value>) -> Result<Self, Error> {
        for key in ENVELOPE_KEYS {
            // Login carries its token under `sessionId`.
            if *key == "sessionId" && cmd == CgiCommand::Login {
                continue;
            }
            body.remove(*key);
        }

        Ok(match cmd {
            CgiCommand::Login => Self::Login(from_body(cmd, body)?),
            CgiCommand::Logout => Self::Logout,
            CgiCommand::CheckAuth => Self::CheckAuth,
            CgiCommand::StatusInfo => Self::StatusInfo(from_body(cmd, body)?),
            CgiCommand::ConnectionSettings => Self::ConnectionSettings(from_body(cmd, body)?),
            CgiCommand::WifiSettings => Self::WifiSettings(from_body(cmd, body)?),
            CgiCommand::AccountLevel => Self::AccountLevel(from_body(cmd, body)?),
            CgiCommand::GlobalConfig => Self::GlobalConfig(from_body(cmd, body)?),
            CgiCommand::Topology => Self::Topology(from_body(cmd, body)?),
            CgiCommand::DhcpLeases => {
                // Lease tables arrive as `{"dhcpList": [...]}` or `{"data": [...]}`.
                let list = body
                    .remove("dhcpList")
                    .or_else(|| body.remove("data"))
                    .unwrap_or_else(|| Value::Array(Vec::new()));
                Self::DhcpLeases(from_value(cmd, list)?)
            }
            CgiCommand::PinStatus => Self::PinStatus(from_body(cmd, body)?),
            CgiCommand::VerifyPin => Self::VerifyPin,
            CgiCommand::UnlockPuk => Self::UnlockPuk,
            CgiCommand::Reboot => Self::Reboot,
        })
    }

    /// Short variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Logout => "logout",
            Self::CheckAuth => "check-auth",
            Self::StatusInfo(_) => "status-info",
            Self::ConnectionSettings(_) => "connection-settings",
            Self::WifiSettings(_) => "wifi-settings",
            Self::AccountLevel(_) => "account-level",
            Self::GlobalConfig(_) => "global-config",
            Self::Topology(_) => "topology",
            Self::DhcpLeases(_) => "dhcp-leases",
            Self::PinStatus(_) => "pin-status",
            Self::VerifyPin => "verify-pin",
            Self::UnlockPuk => "unlock-puk",
            Self::Reboot => "reboot",
        }
    }
}

fn from_body<T: serde::de::DeserializeOwned>(
    cmd: CgiCommand,
    body: Map<String, Value>,
) -> Result<T, Error> {
    from_value(cmd, Value::Object(body))
}

fn from_value<T: serde::de::DeserializeOwned>(cmd: CgiCommand, value: Value) -> Result<T, Error> {
    let preview = value.to_string();
    serde_json::from_value(value).map_err(|e| Error::Deserialization {
        message: format!("cmd {}: {e}", cmd.number()),
        body: preview,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use strum::IntoEnumIterator;

    #[test]
    fn command_numbers_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for cmd in CgiCommand::iter() {
            assert!(seen.insert(cmd.number()), "duplicate cmd {}", cmd.number());
        }
    }

    #[test]
    fn from_number_inverts_number() {
        for cmd in CgiCommand::iter() {
            assert_eq!(CgiCommand::from_number(cmd.number()), Some(cmd));
        }
        assert_eq!(CgiCommand::from_number(9999), None);
    }

    #[test]
    fn public_commands_need_no_session() {
        assert!(!CgiCommand::StatusInfo.requires_auth());
        assert!(!CgiCommand::ConnectionSettings.requires_auth());
        assert!(!CgiCommand::Login.requires_auth());
        assert!(CgiCommand::WifiSettings.requires_auth());
        assert!(CgiCommand::CheckAuth.requires_auth());
    }

    #[test]
    fn decode_login_keeps_session_id() {
        let body = json!({"success": true, "cmd": 100, "sessionId": "abc"});
        let Value::Object(map) = body else { unreachable!() };
        let resp = CgiResponse::decode(CgiCommand::Login, map).unwrap();
        match resp {
            CgiResponse::Login(login) => assert_eq!(login.session_id, "abc"),
            other => panic!("unexpected {}", other.kind()),
        }
    }

    #[test]
    fn decode_dhcp_list_from_either_key() {
        let Value::Object(a) = json!({"dhcpList": [{"mac": "aa:bb:cc:dd:ee:ff", "ip": "192.168.0.2"}]})
        else {
            unreachable!()
        };
        let Value::Object(b) = json!({"data": [{"mac": "aa:bb:cc:dd:ee:ff"}]}) else {
            unreachable!()
        };
        for map in [a, b] {
            match CgiResponse::decode(CgiCommand::DhcpLeases, map).unwrap() {
                CgiResponse::DhcpLeases(leases) => assert_eq!(leases.len(), 1),
                other => panic!("unexpected {}", other.kind()),
            }
        }
    }

    #[test]
    fn decode_reports_shape_drift() {
        let Value::Object(map) = json!({"dhcpList": "not-a-list"}) else {
            unreachable!()
        };
        let err = CgiResponse::decode(CgiCommand::DhcpLeases, map).unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }
}
