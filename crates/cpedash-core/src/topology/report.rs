// ── Raw mesh report ──
//
// Deserialization of the sanitized report and its reduction to one flat
// record per mesh device. Field names follow the mesh daemon's dump
// format; a record that does not fit is skipped, not fatal.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use super::node::{DevRole, LinkMedium};
use super::sanitize::sanitize;
use crate::model::MacAddress;

/// Top-level key holding the device list.
const TOPOLOGY_KEY: &str = "topology information";

mod lenient {
    use super::{Deserialize, Deserializer, Value};

    /// Absent or `null` list → empty.
    pub fn seq<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(de)?.unwrap_or_default())
    }

    /// Strings as-is, numbers stringified, anything else dropped.
    pub fn string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::String(s) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

// ── Wire shapes ─────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDevice {
    #[serde(rename = "AL MAC", alias = "AL_MAC", deserialize_with = "lenient::string")]
    al_mac: Option<String>,
    #[serde(rename = "Device role", alias = "Device Role")]
    role: Value,
    #[serde(
        rename = "Upstream 1905 device",
        alias = "Upstream Device",
        alias = "Uplink AL MAC",
        deserialize_with = "lenient::string"
    )]
    upstream: Option<String>,
    #[serde(rename = "Distance from controller")]
    hop: Value,
    #[serde(rename = "Radio Info", deserialize_with = "lenient::seq")]
    radios: Vec<RawRadio>,
    #[serde(
        rename = "Ethernet Info",
        alias = "Eth Client Info",
        deserialize_with = "lenient::seq"
    )]
    ethernet: Vec<RawStation>,
    #[serde(rename = "Other Clients Info", deserialize_with = "lenient::seq")]
    others: Vec<RawStation>,
    #[serde(rename = "BH Info")]
    backhaul: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRadio {
    #[serde(rename = "Band", alias = "band", deserialize_with = "lenient::string")]
    band: Option<String>,
    #[serde(rename = "BSSINFO", alias = "BSS Info", deserialize_with = "lenient::seq")]
    bss: Vec<RawBss>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBss {
    #[serde(rename = "SSID", deserialize_with = "lenient::string")]
    ssid: Option<String>,
    #[serde(
        rename = "connected sta info",
        alias = "Connected STA Info",
        deserialize_with = "lenient::seq"
    )]
    stations: Vec<RawStation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStation {
    #[serde(
        rename = "STA MAC address",
        alias = "STA MAC",
        alias = "MAC address",
        alias = "MAC",
        alias = "Client Address",
        deserialize_with = "lenient::string"
    )]
    mac: Option<String>,
    #[serde(rename = "Medium", alias = "medium", deserialize_with = "lenient::string")]
    medium: Option<String>,
    #[serde(rename = "BH STA", alias = "Backhaul STA")]
    backhaul: Value,
}

// ── Flat records ────────────────────────────────────────────────────

/// A client station seen by one mesh device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Station {
    pub mac: MacAddress,
    pub medium: Option<LinkMedium>,
    pub ssid: Option<String>,
    /// The station is another mesh device's backhaul radio.
    pub backhaul: bool,
}

/// One mesh device with its stations grouped for fragment building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FlatDevice {
    pub role: DevRole,
    pub al_mac: MacAddress,
    pub upstream: Option<MacAddress>,
    pub hop: Option<u32>,
    pub backhaul: Option<LinkMedium>,
    /// Wi-Fi stations keyed by SSID.
    pub wifi: IndexMap<String, Vec<Station>>,
    /// Wired stations keyed by medium label.
    pub ethernet: IndexMap<String, Vec<Station>>,
    pub others: Vec<Station>,
}

fn role(value: &Value) -> DevRole {
    match value {
        Value::Number(n) => n.as_i64().map_or(DevRole::NotConfigured, DevRole::from_code),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(code) = s.parse::<i64>() {
                DevRole::from_code(code)
            } else if s.eq_ignore_ascii_case("controller") {
                DevRole::Controller
            } else if s.eq_ignore_ascii_case("agent") {
                DevRole::Agent
            } else {
                DevRole::NotConfigured
            }
        }
        _ => DevRole::NotConfigured,
    }
}

fn hop(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|h| u32::try_from(h).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "yes" | "y" | "true"
        ),
        _ => false,
    }
}

/// Backhaul medium from `BH Info`, which is either one object or a list
/// whose first entry describes the active link.
fn backhaul_medium(value: &Value) -> Option<LinkMedium> {
    let entry = match value {
        Value::Array(items) => items.first()?,
        Value::Object(_) => value,
        _ => return None,
    };
    ["Backhaul Medium Type", "Backhaul Medium", "Medium"]
        .iter()
        .find_map(|k| entry.get(*k).and_then(Value::as_str))
        .and_then(LinkMedium::parse)
}

impl Station {
    fn from_raw(raw: RawStation, fallback_medium: Option<&LinkMedium>, ssid: Option<&str>) -> Option<Self> {
        let mac = MacAddress::new(raw.mac?);
        let medium = raw
            .medium
            .as_deref()
            .and_then(LinkMedium::parse)
            .or_else(|| fallback_medium.cloned());
        Some(Self {
            mac,
            medium,
            ssid: ssid.map(String::from),
            backhaul: flag(&raw.backhaul),
        })
    }

    fn medium_label(&self) -> String {
        self.medium
            .as_ref()
            .map_or_else(|| LinkMedium::Ethernet.to_string(), ToString::to_string)
    }
}

impl FlatDevice {
    fn from_raw(raw: RawDevice) -> Option<Self> {
        let al_mac = MacAddress::new(raw.al_mac?);
        let mut wifi: IndexMap<String, Vec<Station>> = IndexMap::new();
        let mut ethernet: IndexMap<String, Vec<Station>> = IndexMap::new();

        for radio in raw.radios {
            let band = radio.band.as_deref().and_then(LinkMedium::parse);
            for bss in radio.bss {
                let ssid = bss.ssid.unwrap_or_default();
                for sta in bss.stations {
                    let Some(station) = Station::from_raw(sta, band.as_ref(), Some(&ssid)) else {
                        continue;
                    };
                    if station.medium.as_ref().is_some_and(LinkMedium::is_ethernet) {
                        ethernet.entry(station.medium_label()).or_default().push(station);
                    } else {
                        wifi.entry(ssid.clone()).or_default().push(station);
                    }
                }
            }
        }

        for sta in raw.ethernet {
            if let Some(station) = Station::from_raw(sta, Some(&LinkMedium::Ethernet), None) {
                ethernet.entry(station.medium_label()).or_default().push(station);
            }
        }

        let others = raw
            .others
            .into_iter()
            .filter_map(|sta| Station::from_raw(sta, None, None))
            .collect();

        Some(Self {
            role: role(&raw.role),
            upstream: raw.upstream.map(MacAddress::new).filter(|m| m != &al_mac),
            al_mac,
            hop: hop(&raw.hop),
            backhaul: backhaul_medium(&raw.backhaul),
            wifi,
            ethernet,
            others,
        })
    }
}

/// Sanitize and parse a raw report into flat device records.
///
/// `None` when the text is not a report at all. Individual records that
/// fail to deserialize or lack an AL MAC are skipped.
pub(crate) fn parse_report(raw: &str) -> Option<Vec<FlatDevice>> {
    let json = sanitize(raw);
    let root: Value = match serde_json::from_str(&json) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "topology report is not parseable");
            return None;
        }
    };

    let records = match root {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(TOPOLOGY_KEY)? {
            Value::Array(items) => items,
            obj @ Value::Object(_) => vec![obj],
            _ => return None,
        },
        _ => return None,
    };

    let devices = records
        .into_iter()
        .enumerate()
        .filter_map(|(idx, record)| match RawDevice::deserialize(record) {
            Ok(raw) => {
                let device = FlatDevice::from_raw(raw);
                if device.is_none() {
                    warn!(record = idx, "topology record without AL MAC skipped");
                }
                device
            }
            Err(e) => {
                warn!(record = idx, error = %e, "malformed topology record skipped");
                None
            }
        })
        .collect();
    Some(devices)
}
