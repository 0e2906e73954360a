// ── Global device state ──
//
// The dashboard's shared bag of device documents: status, connection and
// Wi-Fi settings, account level and enumeration tables. Each key holds the
// most recent successful fetch. There is no TTL and no teardown of values;
// a failed fetch simply leaves the previous value in place.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, trace};

use super::slot::Slot;
use crate::model::{
    AccountLevel, ConnectionSettings, GlobalConfig, GlobalKey, GlobalValue, StatusInfo,
    WifiSettings,
};
use crate::stream::SlotStream;

/// Reactive store for the five global keys.
///
/// Every write goes through a sequence ticket. Fetches take their ticket
/// *before* issuing the request ([`next_ticket`](Self::next_ticket)) and
/// hand it back with the response ([`apply_fetched`](Self::apply_fetched));
/// local patches take a fresh one. Whichever ticket is newest wins, no
/// matter the order responses arrive in.
pub struct GlobalData {
    tickets: AtomicU64,
    closed: AtomicBool,
    status_info: Slot<StatusInfo>,
    connection_settings: Slot<ConnectionSettings>,
    wifi_settings: Slot<WifiSettings>,
    account_level: Slot<AccountLevel>,
    global_config: Slot<GlobalConfig>,
    /// Bumped on every landed write to any key.
    version: watch::Sender<u64>,
}

impl GlobalData {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            tickets: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            status_info: Slot::new(),
            connection_settings: Slot::new(),
            wifi_settings: Slot::new(),
            account_level: Slot::new(),
            global_config: Slot::new(),
            version,
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Reserve a sequence ticket for a fetch about to be issued.
    pub fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the value of one key (the variant picks the key).
    ///
    /// This is the single entry point for local writes, e.g. optimistic
    /// patches after a successful mutation. Returns `false` only once the
    /// store has been closed.
    pub fn update_global_data(&self, value: GlobalValue) -> bool {
        let ticket = self.next_ticket();
        self.write(ticket, value)
    }

    /// Apply a fetch result issued under `ticket`.
    ///
    /// Dropped when a newer write for the same key already landed, or when
    /// the store has been closed.
    pub fn apply_fetched(&self, ticket: u64, value: GlobalValue) -> bool {
        self.write(ticket, value)
    }

    /// Patch the cached status in place (starting from an empty document
    /// if nothing was fetched yet).
    pub fn patch_status_info(&self, patch: impl FnOnce(&mut StatusInfo)) -> bool {
        let mut status = self
            .status_info
            .value()
            .map(|s| StatusInfo::clone(&s))
            .unwrap_or_default();
        patch(&mut status);
        self.update_global_data(GlobalValue::StatusInfo(status))
    }

    /// Stop accepting writes. Reads and subscriptions keep working.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn write(&self, ticket: u64, value: GlobalValue) -> bool {
        let key = value.key();
        if self.is_closed() {
            debug!(%key, ticket, "store closed, discarding write");
            return false;
        }

        let landed = match value {
            GlobalValue::StatusInfo(v) => self.status_info.apply(ticket, v),
            GlobalValue::ConnectionSettings(v) => self.connection_settings.apply(ticket, v),
            GlobalValue::WifiSettings(v) => self.wifi_settings.apply(ticket, v),
            GlobalValue::AccountLevel(v) => self.account_level.apply(ticket, v),
            GlobalValue::GlobalConfig(v) => self.global_config.apply(ticket, v),
        };

        if landed {
            self.version.send_modify(|v| *v += 1);
            trace!(%key, ticket, "global data updated");
        } else {
            debug!(%key, ticket, "stale write dropped");
        }
        landed
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn status_info(&self) -> Option<Arc<StatusInfo>> {
        self.status_info.value()
    }

    pub fn connection_settings(&self) -> Option<Arc<ConnectionSettings>> {
        self.connection_settings.value()
    }

    pub fn wifi_settings(&self) -> Option<Arc<WifiSettings>> {
        self.wifi_settings.value()
    }

    pub fn account_level(&self) -> Option<Arc<AccountLevel>> {
        self.account_level.value()
    }

    pub fn global_config(&self) -> Option<Arc<GlobalConfig>> {
        self.global_config.value()
    }

    /// Ticket of the write currently held for `key` (`0` = empty).
    pub fn seq(&self, key: GlobalKey) -> u64 {
        match key {
            GlobalKey::StatusInfo => self.status_info.entry().seq,
            GlobalKey::ConnectionSettings => self.connection_settings.entry().seq,
            GlobalKey::WifiSettings => self.wifi_settings.entry().seq,
            GlobalKey::AccountLevel => self.account_level.entry().seq,
            GlobalKey::GlobalConfig => self.global_config.entry().seq,
        }
    }

    pub fn updated_at(&self, key: GlobalKey) -> Option<DateTime<Utc>> {
        match key {
            GlobalKey::StatusInfo => self.status_info.entry().updated_at,
            GlobalKey::ConnectionSettings => self.connection_settings.entry().updated_at,
            GlobalKey::WifiSettings => self.wifi_settings.entry().updated_at,
            GlobalKey::AccountLevel => self.account_level.entry().updated_at,
            GlobalKey::GlobalConfig => self.global_config.entry().updated_at,
        }
    }

    /// JSON view of one key, `null` when never fetched.
    pub fn key_to_json(&self, key: GlobalKey) -> Value {
        let value = match key {
            GlobalKey::StatusInfo => self.status_info().map(|v| serde_json::to_value(&*v)),
            GlobalKey::ConnectionSettings => self
                .connection_settings()
                .map(|v| serde_json::to_value(&*v)),
            GlobalKey::WifiSettings => self.wifi_settings().map(|v| serde_json::to_value(&*v)),
            GlobalKey::AccountLevel => self.account_level().map(|v| serde_json::to_value(&*v)),
            GlobalKey::GlobalConfig => self.global_config().map(|v| serde_json::to_value(&*v)),
        };
        value.and_then(Result::ok).unwrap_or(Value::Null)
    }

    /// The whole bag as a JSON object keyed by global key name.
    pub fn to_json(&self) -> Value {
        use strum::IntoEnumIterator;

        let map: Map<String, Value> = GlobalKey::iter()
            .map(|key| (key.to_string(), self.key_to_json(key)))
            .collect();
        Value::Object(map)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_status_info(&self) -> SlotStream<StatusInfo> {
        SlotStream::new(self.status_info.subscribe())
    }

    pub fn subscribe_connection_settings(&self) -> SlotStream<ConnectionSettings> {
        SlotStream::new(self.connection_settings.subscribe())
    }

    pub fn subscribe_wifi_settings(&self) -> SlotStream<WifiSettings> {
        SlotStream::new(self.wifi_settings.subscribe())
    }

    pub fn subscribe_account_level(&self) -> SlotStream<AccountLevel> {
        SlotStream::new(self.account_level.subscribe())
    }

    pub fn subscribe_global_config(&self) -> SlotStream<GlobalConfig> {
        SlotStream::new(self.global_config.subscribe())
    }

    /// Change counter across all keys.
    pub fn subscribe_version(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

impl Default for GlobalData {
    fn default() -> Self {
        Self::new()
    }
}
