//! Upload queue snapshots
//!
//! The queue is mutated by three independent producers: user actions,
//! pipeline step completions, and realtime events. Every mutation is a
//! pure function from the previous snapshot to the next one, published
//! atomically over a watch channel, so no consumer can observe a
//! half-applied update and no producer can interleave one.

use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use voxiq_common::upload::UploadItem;

/// Immutable view of the queue at one point in time
pub type QueueSnapshot = Arc<Vec<UploadItem>>;

/// Shared upload queue state
pub struct UploadQueue {
    tx: watch::Sender<QueueSnapshot>,
    // Serializes read-modify-write across producers
    write_lock: Mutex<()>,
}

impl UploadQueue {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(QueueSnapshot::default());
        Self {
            tx,
            write_lock: Mutex::new(()),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> QueueSnapshot {
        self.tx.borrow().clone()
    }

    /// Watch snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.tx.subscribe()
    }

    /// Compute the next snapshot from the current one and publish it
    pub fn apply(&self, f: impl FnOnce(&[UploadItem]) -> Vec<UploadItem>) -> QueueSnapshot {
        let _guard = self.write_lock.lock().expect("upload queue poisoned");
        let current = self.tx.borrow().clone();
        let next: QueueSnapshot = Arc::new(f(&current));
        self.tx.send_replace(next.clone());
        next
    }
}

impl Default for UploadQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxiq_common::upload::{update_item, UploadStatus};

    #[test]
    fn apply_publishes_whole_snapshots() {
        let queue = UploadQueue::new();
        let mut rx = queue.subscribe();

        let item = UploadItem::new("a.txt", 10, "text/plain");
        let id = item.id;
        queue.apply(|items| {
            let mut next = items.to_vec();
            next.push(item.clone());
            next
        });

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].status, UploadStatus::Queued);

        queue.apply(|items| update_item(items, id, |it| it.advance(UploadStatus::Uploading, 20)));
        let snapshot = queue.snapshot();
        assert_eq!(snapshot[0].status, UploadStatus::Uploading);
        assert_eq!(snapshot[0].progress, 20);
    }
}
