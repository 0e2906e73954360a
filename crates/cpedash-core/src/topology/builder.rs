// ── Tree builder ──
//
// Flat device records → parent/children fragments → merged fragment
// table → one rooted tree. Fragments let every relationship source
// (uplink edges, Wi-Fi tables, wired tables) contribute independently;
// merging by MAC is what makes a device reported by two sources show up
// once under a given parent.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use super::node::{DevRole, LinkMedium, TopologyData, TopologyNode};
use super::report::{FlatDevice, Station, parse_report};
use crate::model::{DhcpLease, MacAddress};

type LeaseIndex<'a> = HashMap<MacAddress, &'a DhcpLease>;

/// One parent MAC with a batch of children. `node` carries the parent's
/// own details when this fragment came from the parent's record; edge
/// fragments only know the parent's MAC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fragment {
    pub mac: MacAddress,
    pub node: Option<TopologyNode>,
    pub children: Vec<TopologyNode>,
}

fn index_leases(leases: &[DhcpLease]) -> LeaseIndex<'_> {
    leases
        .iter()
        .map(|lease| (MacAddress::new(&lease.mac), lease))
        .collect()
}

fn device_node(device: &FlatDevice, leases: &LeaseIndex<'_>) -> TopologyNode {
    let mut node = TopologyNode::new(device.role, device.al_mac.clone());
    node.hop = device.hop;
    node.medium.clone_from(&device.backhaul);
    if let Some(lease) = leases.get(&device.al_mac) {
        node.apply_lease(lease);
    }
    node
}

fn station_node(station: &Station, leases: &LeaseIndex<'_>) -> TopologyNode {
    let mut node = TopologyNode::new(DevRole::Sta, station.mac.clone());
    node.medium.clone_from(&station.medium);
    node.ssid.clone_from(&station.ssid);
    if let Some(lease) = leases.get(&station.mac) {
        node.apply_lease(lease);
    }
    node
}

/// A backhaul STA on a wireless link is another mesh node's radio, not a
/// client; its device already appears through the uplink edge.
fn is_wireless_backhaul(station: &Station) -> bool {
    station.backhaul && !station.medium.as_ref().is_some_and(LinkMedium::is_ethernet)
}

/// Break every device into fragments.
pub(crate) fn fragments(devices: &[FlatDevice], leases: &[DhcpLease]) -> Vec<Fragment> {
    let leases = index_leases(leases);
    let mut out = Vec::new();

    for device in devices {
        // Singleton: keeps the device visible and carries its details.
        out.push(Fragment {
            mac: device.al_mac.clone(),
            node: Some(device_node(device, &leases)),
            children: Vec::new(),
        });

        if device.role == DevRole::Agent {
            if let Some(upstream) = &device.upstream {
                out.push(Fragment {
                    mac: upstream.clone(),
                    node: None,
                    children: vec![TopologyNode::new(device.role, device.al_mac.clone())],
                });
            }
        }

        let wifi: Vec<TopologyNode> = device
            .wifi
            .values()
            .flatten()
            .filter(|s| !is_wireless_backhaul(s))
            .map(|s| station_node(s, &leases))
            .collect();
        if !wifi.is_empty() {
            out.push(Fragment {
                mac: device.al_mac.clone(),
                node: None,
                children: wifi,
            });
        }

        let wired: Vec<TopologyNode> = device
            .ethernet
            .values()
            .flatten()
            .chain(&device.others)
            .map(|s| station_node(s, &leases))
            .collect();
        if !wired.is_empty() {
            out.push(Fragment {
                mac: device.al_mac.clone(),
                node: None,
                children: wired,
            });
        }
    }
    out
}

/// Merge fragments sharing a MAC. Children are concatenated in arrival
/// order; a child MAC already present under the parent is folded into the
/// existing entry.
pub(crate) fn merge(fragments: Vec<Fragment>) -> IndexMap<MacAddress, Fragment> {
    let mut merged: IndexMap<MacAddress, Fragment> = IndexMap::new();

    for fragment in fragments {
        let Fragment {
            mac,
            node,
            children,
        } = fragment;
        let entry = merged.entry(mac.clone()).or_insert_with(|| Fragment {
            mac,
            node: None,
            children: Vec::new(),
        });
        if entry.node.is_none() {
            entry.node = node;
        }
        for child in children {
            match entry.children.iter_mut().find(|c| c.mac == child.mac) {
                Some(existing) => existing.fill_missing(&child),
                None => entry.children.push(child),
            }
        }
    }
    merged
}

/// Controller, else the first Agent, else the first record.
fn select_root(devices: &[FlatDevice]) -> Option<&FlatDevice> {
    devices
        .iter()
        .find(|d| d.role == DevRole::Controller)
        .or_else(|| devices.iter().find(|d| d.role == DevRole::Agent))
        .or_else(|| devices.first())
}

struct Attach<'a> {
    merged: &'a IndexMap<MacAddress, Fragment>,
    ancestors: Vec<MacAddress>,
    placed: HashSet<MacAddress>,
}

impl Attach<'_> {
    /// Build the subtree for `mac`. `seen_as` is how the parent listed this
    /// node and is used when no fragment carries the node's own details.
    fn build(&mut self, mac: &MacAddress, seen_as: Option<&TopologyNode>) -> TopologyNode {
        let merged = self.merged;
        let fragment = merged.get(mac);
        let mut node = fragment
            .and_then(|f| f.node.clone())
            .or_else(|| seen_as.cloned())
            .unwrap_or_else(|| TopologyNode::new(DevRole::NotConfigured, mac.clone()));
        node.children.clear();
        if let Some(seen) = seen_as {
            node.fill_missing(seen);
        }

        self.placed.insert(mac.clone());
        let Some(fragment) = fragment else {
            return node;
        };

        self.ancestors.push(mac.clone());
        for child in &fragment.children {
            if self.ancestors.contains(&child.mac) {
                debug!(mac = %child.mac, parent = %mac, "cycle in topology, edge dropped");
                continue;
            }
            let built = if merged.contains_key(&child.mac) {
                self.build(&child.mac, Some(child))
            } else {
                self.placed.insert(child.mac.clone());
                child.clone()
            };
            node.children.push(built);
        }
        self.ancestors.pop();
        node
    }
}

/// Transform a raw mesh report into a rooted tree.
///
/// Never fails: an unparseable or empty report yields `tree_data: None`.
/// `al_mac` names the device serving the dashboard when the caller knows
/// it; otherwise the Controller is assumed.
pub fn create_data(raw: &str, dhcp: &[DhcpLease], al_mac: Option<&MacAddress>) -> TopologyData {
    let Some(devices) = parse_report(raw) else {
        return TopologyData {
            local_host_mac: al_mac.cloned(),
            ..TopologyData::default()
        };
    };

    let mut mac_list: Vec<MacAddress> = Vec::with_capacity(devices.len());
    for device in &devices {
        if !mac_list.contains(&device.al_mac) {
            mac_list.push(device.al_mac.clone());
        }
    }

    let local_host_mac = al_mac.cloned().or_else(|| {
        devices
            .iter()
            .find(|d| d.role == DevRole::Controller)
            .map(|d| d.al_mac.clone())
    });

    let Some(root) = select_root(&devices) else {
        return TopologyData {
            tree_data: None,
            mac_list,
            local_host_mac,
        };
    };

    let merged = merge(fragments(&devices, dhcp));
    let mut attach = Attach {
        merged: &merged,
        ancestors: Vec::new(),
        placed: HashSet::new(),
    };
    let mut tree = attach.build(&root.al_mac, None);

    // Devices whose uplink never reached the root still get shown.
    attach.ancestors.push(root.al_mac.clone());
    for device in &devices {
        if attach.placed.contains(&device.al_mac) {
            continue;
        }
        debug!(mac = %device.al_mac, "orphan mesh device attached to root");
        let orphan = attach.build(&device.al_mac, None);
        tree.children.push(orphan);
    }

    TopologyData {
        tree_data: Some(tree),
        mac_list,
        local_host_mac,
    }
}

/// Put a synthetic "Internet" node above `root` for display.
pub fn wrap_internet(root: TopologyNode) -> TopologyNode {
    let mut cloud = TopologyNode::new(DevRole::Internet, MacAddress::default());
    cloud.children.push(root);
    cloud
}
