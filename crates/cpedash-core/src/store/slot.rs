// ── Single-value reactive slot ──
//
// Holds the latest value for one global key together with the sequence
// ticket it was issued under. Writes carrying an older ticket than the
// stored one are dropped, so a slow response can never clobber a newer
// value or an optimistic patch.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

/// What a slot currently holds.
#[derive(Debug)]
pub struct Entry<T> {
    /// Ticket of the write that produced `value`. `0` = never written.
    pub seq: u64,
    pub value: Option<Arc<T>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            value: self.value.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Self {
            seq: 0,
            value: None,
            updated_at: None,
        }
    }
}

pub(crate) struct Slot<T: Send + Sync + 'static> {
    tx: watch::Sender<Entry<T>>,
}

impl<T: Send + Sync + 'static> Slot<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(Entry::default());
        Self { tx }
    }

    /// Replace the value if `seq` is newer than the stored ticket.
    /// Subscribers are notified only when the write lands.
    pub(crate) fn apply(&self, seq: u64, value: T) -> bool {
        self.tx.send_if_modified(|entry| {
            if seq <= entry.seq {
                return false;
            }
            entry.seq = seq;
            entry.value = Some(Arc::new(value));
            entry.updated_at = Some(Utc::now());
            true
        })
    }

    pub(crate) fn value(&self) -> Option<Arc<T>> {
        self.tx.borrow().value.clone()
    }

    pub(crate) fn entry(&self) -> Entry<T> {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Entry<T>> {
        self.tx.subscribe()
    }
}
