// ── Topology tree types ──

use std::fmt;

use serde::{Serialize, Serializer};

use crate::model::{DhcpLease, MacAddress};

/// Role of a node in the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DevRole {
    Controller,
    Agent,
    #[serde(rename = "Not Configured")]
    NotConfigured,
    /// Client station (leaf).
    #[serde(rename = "STA")]
    Sta,
    /// Synthetic cloud root added for display.
    Internet,
}

impl DevRole {
    /// Map the report's numeric role code.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Controller,
            1 => Self::Agent,
            _ => Self::NotConfigured,
        }
    }
}

impl fmt::Display for DevRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Controller => "Controller",
            Self::Agent => "Agent",
            Self::NotConfigured => "Not Configured",
            Self::Sta => "STA",
            Self::Internet => "Internet",
        })
    }
}

/// Physical link a node is attached over.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkMedium {
    Band2g,
    Band5g,
    Band6g,
    Ethernet,
    Other(String),
}

impl LinkMedium {
    /// Parse the firmware's medium/band label. Empty input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let key = trimmed.to_ascii_uppercase().replace(' ', "").replace("GHZ", "G");
        let medium = match key.as_str() {
            "2.4G" | "2G" | "24G" | "2.4" => Self::Band2g,
            "5G" | "5GL" | "5GH" | "5" => Self::Band5g,
            "6G" | "6" => Self::Band6g,
            k if k.starts_with("ETH") || k == "WIRED" || k == "LAN" => Self::Ethernet,
            _ => Self::Other(trimmed.to_owned()),
        };
        Some(medium)
    }

    pub fn is_ethernet(&self) -> bool {
        matches!(self, Self::Ethernet)
    }
}

impl fmt::Display for LinkMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Band2g => f.write_str("2.4G"),
            Self::Band5g => f.write_str("5G"),
            Self::Band6g => f.write_str("6G"),
            Self::Ethernet => f.write_str("Ethernet"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

impl Serialize for LinkMedium {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One node of the mesh tree. Children are owned and ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyNode {
    pub dev_role: DevRole,
    pub mac: MacAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<LinkMedium>,
    /// SSID a Wi-Fi station is associated with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,
    /// Distance from the controller (mesh devices only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hop: Option<u32>,
    pub children: Vec<TopologyNode>,
}

impl TopologyNode {
    pub fn new(dev_role: DevRole, mac: MacAddress) -> Self {
        Self {
            dev_role,
            mac,
            ip: None,
            hostname: None,
            interface: None,
            medium: None,
            ssid: None,
            hop: None,
            children: Vec::new(),
        }
    }

    /// Fill address details from a DHCP lease.
    pub(crate) fn apply_lease(&mut self, lease: &DhcpLease) {
        self.ip = lease.ip.clone().filter(|s| !s.is_empty());
        self.hostname = lease.hostname.clone().filter(|s| !s.is_empty());
        self.interface = lease.interface.clone().filter(|s| !s.is_empty());
    }

    /// Copy fields this node lacks from another record of the same MAC.
    pub(crate) fn fill_missing(&mut self, other: &Self) {
        if self.ip.is_none() {
            self.ip.clone_from(&other.ip);
        }
        if self.hostname.is_none() {
            self.hostname.clone_from(&other.hostname);
        }
        if self.interface.is_none() {
            self.interface.clone_from(&other.interface);
        }
        if self.medium.is_none() {
            self.medium.clone_from(&other.medium);
        }
        if self.ssid.is_none() {
            self.ssid.clone_from(&other.ssid);
        }
        if self.hop.is_none() {
            self.hop = other.hop;
        }
    }

    /// Total nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Depth-first search by MAC.
    pub fn find(&self, mac: &MacAddress) -> Option<&Self> {
        if &self.mac == mac {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(mac))
    }
}

/// Result of the topology transform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyData {
    /// Rooted mesh tree; `None` when the report was empty or unparseable.
    pub tree_data: Option<TopologyNode>,
    /// AL MAC of every mesh device, in report order.
    pub mac_list: Vec<MacAddress>,
    /// MAC of the device serving this dashboard.
    pub local_host_mac: Option<MacAddress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medium_labels() {
        assert_eq!(LinkMedium::parse("2.4G"), Some(LinkMedium::Band2g));
        assert_eq!(LinkMedium::parse("2.4 GHz"), Some(LinkMedium::Band2g));
        assert_eq!(LinkMedium::parse("5GH"), Some(LinkMedium::Band5g));
        assert_eq!(LinkMedium::parse("eth0"), Some(LinkMedium::Ethernet));
        assert_eq!(LinkMedium::parse(""), None);
        assert_eq!(
            LinkMedium::parse("MoCA"),
            Some(LinkMedium::Other("MoCA".into()))
        );
        assert_eq!(LinkMedium::Band2g.to_string(), "2.4G");
    }

    #[test]
    fn role_codes() {
        assert_eq!(DevRole::from_code(0), DevRole::Controller);
        assert_eq!(DevRole::from_code(1), DevRole::Agent);
        assert_eq!(DevRole::from_code(2), DevRole::NotConfigured);
        assert_eq!(DevRole::from_code(-1), DevRole::NotConfigured);
    }

    #[test]
    fn serializes_camel_case_without_empty_fields() {
        let mut node = TopologyNode::new(DevRole::Sta, MacAddress::new("11:22:33:44:55:66"));
        node.medium = Some(LinkMedium::Band5g);
        let json = serde_json::to_value(&node).unwrap_or_default();
        assert_eq!(json["devRole"], "STA");
        assert_eq!(json["medium"], "5G");
        assert!(json.get("ip").is_none());
        assert_eq!(json["children"], serde_json::json!([]));
    }
}
