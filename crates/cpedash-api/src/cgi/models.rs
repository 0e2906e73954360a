// CGI response types
//
// Models for the router's CGI replies. Firmware builds disagree about
// field presence and about whether numbers arrive as JSON numbers or
// strings, so fields use `#[serde(default)]` and lenient decoders
// liberally. Anything not modelled explicitly lands in `extra`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ── Lenient scalar decoding ──────────────────────────────────────────

mod lenient {
    use super::{Deserialize, Deserializer, Value};

    /// Accept `12`, `"12"`, `""` (as `None`) or `null`.
    pub fn opt_i64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
        Ok(match Option::<Value>::deserialize(de)? {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// Accept `12`, `"12"`, `""` (as `None`) or `null`.
    pub fn opt_u64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
        Ok(match Option::<Value>::deserialize(de)? {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// Accept `true`, `1`, `"1"`, `"true"`, `"on"`, `"enable"`.
    pub fn flag<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
        Ok(match Option::<Value>::deserialize(de)? {
            Some(Value::Bool(b)) => b,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
            Some(Value::String(s)) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "enable" | "enabled" | "yes"
            ),
            _ => false,
        })
    }

    /// Accept a string or a number, rendered as a string.
    pub fn opt_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(de)? {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// Reply to the login command.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "sessionId", alias = "session_id", alias = "token")]
    pub session_id: String,
}

// ── Device status ────────────────────────────────────────────────────

/// Public device status, polled every status interval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub model_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub firmware_version: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub imei: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub iccid: Option<String>,
    /// SIM state as reported by firmware (`READY`, `PIN_REQUIRED`, `PUK_REQUIRED`, ...).
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub sim_status: Option<String>,
    /// Registered network PLMN (MCC+MNC).
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub plmn: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub operator_name: Option<String>,
    /// `5G SA`, `5G NSA`, `LTE`, ...
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub network_type: Option<String>,
    /// Signal quality in bars (0-5).
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub signal_strength: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub rsrp: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub rsrq: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub sinr: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub wan_ip: Option<String>,
    /// Seconds since boot.
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub uptime: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub rx_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub tx_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub connected_clients: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Settings ─────────────────────────────────────────────────────────

/// Public WAN connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSettings {
    /// `auto` / `manual` dial mode.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub connection_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub data_roaming: bool,
    /// Preferred RAT (`5G`, `4G`, `auto`).
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub network_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub apn: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_u64")]
    pub mtu: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One SSID as configured on the router.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiNetwork {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    /// `2.4G`, `5G`, `6G`.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub band: Option<String>,
    #[serde(default)]
    pub ssid: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub hidden: bool,
    /// Authentication type code (`"0"` open ... `"4"` WPA3-SAE).
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub auth_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", alias = "key")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub channel: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wi-Fi radio and SSID configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiSettings {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub wifi_enabled: bool,
    #[serde(default, alias = "wifiList", alias = "ssidList")]
    pub networks: Vec<WifiNetwork>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Privilege level of the logged-in account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLevel {
    /// `1` administrator, `2` regular user. Anything else is treated as
    /// the least-privileged level.
    #[serde(default, alias = "level", deserialize_with = "lenient::opt_i64")]
    pub account_level: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccountLevel {
    pub fn is_admin(&self) -> bool {
        self.account_level == Some(1)
    }
}

/// A `(value, label)` pair from an enumeration table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumEntry {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub value: Option<String>,
    #[serde(default, alias = "name")]
    pub label: String,
}

/// Enumeration tables used by dependent forms (countries, channels, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default)]
    pub country_list: Vec<EnumEntry>,
    #[serde(default)]
    pub channel_list_2g: Vec<EnumEntry>,
    #[serde(default)]
    pub channel_list_5g: Vec<EnumEntry>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub default_language: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Topology / DHCP ──────────────────────────────────────────────────

/// Raw mesh report. The payload is a Python-literal-ish string that the
/// topology transformer in `cpedash-core` sanitizes and parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyReport {
    #[serde(default, rename = "topology", alias = "topoInfo", alias = "topologyInfo")]
    pub raw: String,
}

/// One DHCP lease, used to resolve IP/hostname for topology nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpLease {
    #[serde(default)]
    pub mac: String,
    #[serde(default, alias = "ipAddress", deserialize_with = "lenient::opt_string")]
    pub ip: Option<String>,
    #[serde(default, alias = "hostName", deserialize_with = "lenient::opt_string")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub interface: Option<String>,
}

// ── SIM ──────────────────────────────────────────────────────────────

/// SIM lock state with remaining attempt counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinStatus {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub sim_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub pin_enabled: bool,
    #[serde(default, alias = "pinRemain", deserialize_with = "lenient::opt_i64")]
    pub pin_remaining: Option<i64>,
    #[serde(default, alias = "pukRemain", deserialize_with = "lenient::opt_i64")]
    pub puk_remaining: Option<i64>,
}

impl PinStatus {
    pub fn puk_locked(&self) -> bool {
        self.sim_status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("PUK_REQUIRED"))
            || self.pin_remaining == Some(0)
    }
}
