// ── MacAddress ──
//
// Topology reports, DHCP tables and validation all key on MAC addresses,
// and each source formats them differently.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// MAC address, normalized to uppercase colon-separated form
/// (`AA:BB:CC:DD:EE:FF`).
///
/// Dash-separated and bare 12-digit hex input are normalized too. Anything
/// else is kept verbatim (uppercased) so lookups stay consistent even for
/// malformed firmware output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MacAddress(String);

impl MacAddress {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let upper = raw.as_ref().trim().to_ascii_uppercase().replace('-', ":");
        if upper.len() == 12 && upper.bytes().all(|b| b.is_ascii_hexdigit()) {
            let pairs: Vec<&str> = (0..6).filter_map(|i| upper.get(i * 2..i * 2 + 2)).collect();
            return Self(pairs.join(":"));
        }
        Self(upper)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Six colon-separated hex octets.
    pub fn is_well_formed(&self) -> bool {
        let octets: Vec<&str> = self.0.split(':').collect();
        octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.bytes().all(|b| b.is_ascii_hexdigit()))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for MacAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        String::deserialize(de).map(Self::new)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_formats() {
        let expected = "AA:BB:CC:00:11:22";
        assert_eq!(MacAddress::new("aa:bb:cc:00:11:22").as_str(), expected);
        assert_eq!(MacAddress::new("AA-BB-CC-00-11-22").as_str(), expected);
        assert_eq!(MacAddress::new("aabbcc001122").as_str(), expected);
        assert_eq!(MacAddress::new(" aa:bb:cc:00:11:22 ").as_str(), expected);
    }

    #[test]
    fn well_formed_check() {
        assert!(MacAddress::new("aa:bb:cc:00:11:22").is_well_formed());
        assert!(!MacAddress::new("aa:bb:cc").is_well_formed());
        assert!(!MacAddress::new("zz:bb:cc:00:11:22").is_well_formed());
        assert!(!MacAddress::default().is_well_formed());
    }

    #[test]
    fn deserializes_normalized() {
        let mac: MacAddress = serde_json::from_str("\"aa-bb-cc-dd-ee-ff\"").unwrap();
        assert_eq!(mac.to_string(), "AA:BB:CC:DD:EE:FF");
    }
}
