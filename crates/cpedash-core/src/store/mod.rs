// ── Reactive data store ──
//
// Per-key device state with push-based change notification.

mod global_data;
mod slot;

pub use global_data::GlobalData;
pub use slot::Entry;
