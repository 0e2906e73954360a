// ── Text rendering ──
//
// Box-drawing tree for terminals: `├── ` / `└── ` connectors with `│`
// guides for ancestors that still have siblings below.

use std::fmt::Write as _;

use super::node::{DevRole, TopologyNode};

fn label(node: &TopologyNode) -> String {
    if node.dev_role == DevRole::Internet {
        return "Internet".into();
    }

    let mut out = format!("{} {}", node.dev_role, node.mac);
    if let Some(hostname) = &node.hostname {
        let _ = write!(out, " {hostname}");
    }
    if let Some(ip) = &node.ip {
        let _ = write!(out, " ({ip})");
    }
    match (&node.medium, &node.ssid) {
        (Some(medium), Some(ssid)) => {
            let _ = write!(out, " [{medium} {ssid}]");
        }
        (Some(medium), None) => {
            let _ = write!(out, " [{medium}]");
        }
        (None, Some(ssid)) => {
            let _ = write!(out, " [{ssid}]");
        }
        (None, None) => {}
    }
    if let Some(hop) = node.hop.filter(|h| *h > 0) {
        let _ = write!(out, " hop {hop}");
    }
    out
}

fn render_children(node: &TopologyNode, guides: &str, out: &mut String) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        let _ = writeln!(out, "{guides}{connector}{}", label(child));

        let next = format!("{guides}{}", if is_last { "    " } else { "│   " });
        render_children(child, &next, out);
    }
}

/// Render `root` and its descendants, one node per line.
pub fn render_tree(root: &TopologyNode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", label(root));
    render_children(root, "", &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MacAddress;
    use crate::topology::{LinkMedium, wrap_internet};
    use pretty_assertions::assert_eq;

    #[test]
    fn draws_guides_and_connectors() {
        let mut agent = TopologyNode::new(DevRole::Agent, MacAddress::new("00:00:00:00:00:02"));
        agent.hop = Some(1);
        let mut phone = TopologyNode::new(DevRole::Sta, MacAddress::new("00:00:00:00:00:0A"));
        phone.medium = Some(LinkMedium::Band5g);
        phone.ssid = Some("home".into());
        phone.hostname = Some("phone".into());
        phone.ip = Some("192.168.0.10".into());
        agent.children.push(phone);

        let mut root = TopologyNode::new(DevRole::Controller, MacAddress::new("00:00:00:00:00:01"));
        root.children.push(agent);
        root.children
            .push(TopologyNode::new(DevRole::Sta, MacAddress::new("00:00:00:00:00:0B")));

        let text = render_tree(&wrap_internet(root));
        let expected = "\
Internet
└── Controller 00:00:00:00:00:01
    ├── Agent 00:00:00:00:00:02 hop 1
    │   └── STA 00:00:00:00:00:0A phone (192.168.0.10) [5G home]
    └── STA 00:00:00:00:00:0B
";
        assert_eq!(text, expected);
    }
}
