// ── Mesh topology ──
//
// Turns the controller's flat mesh report into a rooted tree of
// Controller/Agent/station nodes, enriched with DHCP details.

mod builder;
mod node;
mod render;
mod report;
mod sanitize;

pub use builder::{create_data, wrap_internet};
pub use node::{DevRole, LinkMedium, TopologyData, TopologyNode};
pub use render::render_tree;
pub use sanitize::sanitize;
