//! Upload orchestrator
//!
//! Fans out per-file pipelines concurrently and reconciles server-pushed
//! status events against local optimistic state. One file's failure
//! never blocks or fails its siblings.

use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::session::Session;
use crate::upload::{QueueSnapshot, UploadQueue};
use voxiq_common::api::{InterviewCreate, UploadUrlRequest};
use voxiq_common::events::ProcessingEvent;
use voxiq_common::upload::{
    self, all_terminal, active_count, remove_item, update_item, UploadItem, UploadStatus,
};
use voxiq_common::{Error, Result};

// Fixed progress checkpoints for the per-file pipeline steps
const PROGRESS_UPLOAD_STARTED: u8 = 20;
const PROGRESS_SLOT_READY: u8 = 40;
const PROGRESS_BYTES_SENT: u8 = 60;
const PROGRESS_REGISTERED: u8 = 70;

/// Fallback completion window when no authoritative event arrives
const FALLBACK_MIN_MS: u64 = 3000;
const FALLBACK_JITTER_MS: u64 = 2000;

/// Coordinates the upload pipeline for a batch of files
#[derive(Clone)]
pub struct UploadOrchestrator {
    api: Arc<ApiClient>,
    token: String,
    queue: Arc<UploadQueue>,
}

impl UploadOrchestrator {
    pub fn new(api: Arc<ApiClient>, session: &Session) -> Self {
        Self {
            api,
            token: session.token().to_string(),
            queue: Arc::new(UploadQueue::new()),
        }
    }

    /// Current queue snapshot
    pub fn snapshot(&self) -> QueueSnapshot {
        self.queue.snapshot()
    }

    /// Watch queue snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<QueueSnapshot> {
        self.queue.subscribe()
    }

    /// Submit a batch of files
    ///
    /// Files failing the accepted-type filter are silently excluded
    /// (logged, not an error). Returns the queued item ids immediately;
    /// per-file pipelines run concurrently and independently.
    pub fn submit(&self, paths: &[PathBuf]) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for path in paths {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            let content_type = upload::content_type_for(&file_name);
            if !upload::is_accepted_file(&file_name, content_type) {
                warn!(file = %file_name, "skipping unsupported file type");
                continue;
            }

            let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
            let item = UploadItem::new(file_name, file_size, content_type);
            let id = item.id;
            self.queue.apply(|items| {
                let mut next = items.to_vec();
                next.push(item.clone());
                next
            });

            let worker = self.clone();
            let path = path.clone();
            tokio::spawn(async move {
                worker.run_pipeline(id, &path).await;
            });
            ids.push(id);
        }
        ids
    }

    /// Fold one realtime event into the queue. Events whose interview id
    /// matches no item are a no-op; nothing is buffered or retried.
    pub fn handle_event(&self, event: &ProcessingEvent) {
        self.queue.apply(|items| upload::apply_event(items, event));
    }

    /// Consume a realtime subscription until it closes, reconciling each
    /// event in arrival order
    pub fn attach(&self, mut events: broadcast::Receiver<ProcessingEvent>) -> JoinHandle<()> {
        let queue = self.queue.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        queue.apply(|items| upload::apply_event(items, &event));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "realtime reconciliation lagging");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Remove an item from the visible queue. In-flight network work for
    /// it is not cancelled; results are discarded when they land.
    pub fn remove(&self, item_id: Uuid) {
        self.queue.apply(|items| remove_item(items, item_id));
    }

    /// Discard the whole batch. Refuses while any item is non-terminal
    /// unless forced; the caller owns the confirmation prompt.
    pub fn close(&self, force: bool) -> Result<()> {
        let active = active_count(&self.queue.snapshot());
        if active > 0 && !force {
            return Err(Error::UploadsInProgress(active));
        }
        self.queue.apply(|_| Vec::new());
        Ok(())
    }

    /// Wait until every queued item reaches a terminal state
    pub async fn wait_all_terminal(&self) {
        let mut rx = self.queue.subscribe();
        loop {
            if all_terminal(&rx.borrow_and_update()) {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Drive one file through the four pipeline steps. Each step failure
    /// is terminal for this file only.
    async fn run_pipeline(&self, item_id: Uuid, path: &Path) {
        // Snapshot the item's file facts; it may already be removed
        let Some((file_name, file_size, content_type)) = self
            .queue
            .snapshot()
            .iter()
            .find(|item| item.id == item_id)
            .map(|item| {
                (
                    item.file_name.clone(),
                    item.file_size,
                    item.content_type.clone(),
                )
            })
        else {
            return;
        };

        // Step 1: request an upload slot
        self.advance(item_id, UploadStatus::Uploading, PROGRESS_UPLOAD_STARTED);
        let slot_request = UploadUrlRequest {
            filename: file_name.clone(),
            content_type: content_type.clone(),
            file_size_bytes: file_size,
        };
        let slot = match self.api.upload_url(&self.token, &slot_request).await {
            Ok(slot) => slot,
            Err(e) => return self.fail(item_id, e),
        };
        self.advance(item_id, UploadStatus::Uploading, PROGRESS_SLOT_READY);

        // Step 2: transfer the raw bytes to the write target
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => return self.fail(item_id, Error::Io(e)),
        };
        if let Err(e) = self
            .api
            .put_upload(&slot.upload_url, &content_type, bytes)
            .await
        {
            return self.fail(item_id, e);
        }
        self.advance(item_id, UploadStatus::Uploading, PROGRESS_BYTES_SENT);

        // Step 3: register the interview record (triggers processing)
        let file_type = file_name
            .rsplit('.')
            .next()
            .map(|ext| ext.to_lowercase())
            .unwrap_or_else(|| "txt".to_string());
        let create = InterviewCreate {
            filename: file_name.clone(),
            file_type,
            file_size_bytes: file_size,
            storage_path: slot.storage_path,
            file_hash: None,
        };
        let interview = match self.api.create_interview(&self.token, &create).await {
            Ok(interview) => interview,
            Err(e) => return self.fail(item_id, e),
        };
        debug!(file = %file_name, backend_id = %interview.id, "interview registered");

        // The item becomes addressable by the realtime channel here
        self.queue.apply(|items| {
            update_item(items, item_id, |item| {
                item.with_backend_id(&interview.id)
                    .advance(UploadStatus::Analyzing, PROGRESS_REGISTERED)
            })
        });

        // Step 4: await terminal status. The realtime feed is
        // authoritative; if nothing arrives within the window, mark the
        // item done locally. complete_local never downgrades a terminal
        // item, so a racing authoritative event always wins.
        let jitter = rand::thread_rng().gen_range(0..FALLBACK_JITTER_MS);
        tokio::time::sleep(Duration::from_millis(FALLBACK_MIN_MS + jitter)).await;
        self.queue
            .apply(|items| update_item(items, item_id, |item| item.complete_local()));
    }

    fn advance(&self, item_id: Uuid, status: UploadStatus, progress: u8) {
        self.queue
            .apply(|items| update_item(items, item_id, |item| item.advance(status, progress)));
    }

    fn fail(&self, item_id: Uuid, error: Error) {
        debug!(item = %item_id, error = %error, "upload pipeline step failed");
        self.queue
            .apply(|items| update_item(items, item_id, |item| item.fail(error.to_string())));
    }
}
