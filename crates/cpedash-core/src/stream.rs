// ── Reactive slot streams ──
//
// Subscription types for consuming global-data changes.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::Entry;

/// A subscription to one global-data key.
///
/// Provides both point-in-time access and change notification via
/// `changed()` or by converting into a `Stream`.
pub struct SlotStream<T: Send + Sync + 'static> {
    current: Option<Arc<T>>,
    receiver: watch::Receiver<Entry<T>>,
}

impl<T: Send + Sync + 'static> SlotStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<Entry<T>>) -> Self {
        let current = receiver.borrow().value.clone();
        Self { current, receiver }
    }

    /// Value captured at creation time or at the last `changed()`.
    pub fn current(&self) -> Option<&Arc<T>> {
        self.current.as_ref()
    }

    /// Latest value (may have changed since creation).
    pub fn latest(&self) -> Option<Arc<T>> {
        self.receiver.borrow().value.clone()
    }

    /// Wait for the next landed write, returning the new value.
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<T>> {
        loop {
            self.receiver.changed().await.ok()?;
            let value = self.receiver.borrow_and_update().value.clone();
            if let Some(v) = value {
                self.current = Some(Arc::clone(&v));
                return Some(v);
            }
        }
    }

    /// Convert into a `Stream`. The first item is the current value, if
    /// any.
    pub fn into_stream(self) -> SlotWatchStream<T> {
        SlotWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`, skipping empty entries.
pub struct SlotWatchStream<T: Send + Sync + 'static> {
    inner: WatchStream<Entry<T>>,
}

impl<T: Send + Sync + 'static> Stream for SlotWatchStream<T> {
    type Item = Arc<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Entry { value: Some(v), .. })) => return Poll::Ready(Some(v)),
                Poll::Ready(Some(_)) => {}
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    use crate::model::{GlobalValue, StatusInfo};
    use crate::store::GlobalData;

    fn status(plmn: &str) -> GlobalValue {
        GlobalValue::StatusInfo(StatusInfo {
            plmn: Some(plmn.into()),
            ..StatusInfo::default()
        })
    }

    #[tokio::test]
    async fn stream_waits_for_first_value_then_follows_writes() {
        let data = GlobalData::new();
        let mut stream = data.subscribe_status_info().into_stream();

        // Nothing fetched yet: the empty slot is not an item.
        assert!(timeout(Duration::from_millis(50), stream.next()).await.is_err());

        data.update_global_data(status("46000"));
        let first = timeout(Duration::from_secs(1), stream.next()).await.unwrap().unwrap();
        assert_eq!(first.plmn.as_deref(), Some("46000"));

        data.update_global_data(status("310260"));
        let second = timeout(Duration::from_secs(1), stream.next()).await.unwrap().unwrap();
        assert_eq!(second.plmn.as_deref(), Some("310260"));
    }
}
