//! Upload queue data model
//!
//! `UploadItem` tracks one selected file through upload and analysis.
//! Three independent producers mutate the queue (user actions, pipeline
//! step completions, realtime events), so every update is expressed as a
//! pure transformation of the previous snapshot; consumers never observe
//! a half-applied update.
//!
//! Terminal states (`done`, `error`) are absorbing: once reached, no
//! later transition changes the status or decreases the progress.

use crate::events::{ProcessingEvent, ProcessingStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File extensions accepted by the upload pipeline
pub const ACCEPTED_EXTENSIONS: &[&str] =
    &[".txt", ".md", ".pdf", ".docx", ".mp3", ".wav", ".mp4"];

/// MIME types accepted by the upload pipeline
pub const ACCEPTED_MIME_TYPES: &[&str] = &[
    "text/plain",
    "text/markdown",
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "audio/mpeg",
    "audio/wav",
    "video/mp4",
];

/// Whether a file is admissible, by MIME type or extension.
/// Files failing this filter are silently excluded from a batch.
pub fn is_accepted_file(name: &str, content_type: &str) -> bool {
    let lower = name.to_lowercase();
    ACCEPTED_MIME_TYPES.iter().any(|m| *m == content_type)
        || ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// MIME type for a file name, from its extension
pub fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next().map(|ext| ext.to_lowercase()).as_deref() {
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("pdf") => "application/pdf",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Lifecycle state of an upload item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Queued,
    Uploading,
    /// Server-reported sub-phase of analysis, kept for display
    Transcribing,
    Analyzing,
    Done,
    Error,
}

impl UploadStatus {
    /// Terminal states absorb all later transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Done | UploadStatus::Error)
    }
}

impl From<ProcessingStatus> for UploadStatus {
    fn from(status: ProcessingStatus) -> Self {
        match status {
            ProcessingStatus::Queued => UploadStatus::Queued,
            ProcessingStatus::Transcribing => UploadStatus::Transcribing,
            ProcessingStatus::Analyzing => UploadStatus::Analyzing,
            ProcessingStatus::Done => UploadStatus::Done,
            ProcessingStatus::Error => UploadStatus::Error,
        }
    }
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadStatus::Queued => write!(f, "queued"),
            UploadStatus::Uploading => write!(f, "uploading"),
            UploadStatus::Transcribing => write!(f, "transcribing"),
            UploadStatus::Analyzing => write!(f, "analyzing"),
            UploadStatus::Done => write!(f, "done"),
            UploadStatus::Error => write!(f, "error"),
        }
    }
}

/// One selected file going through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadItem {
    /// Local identity, stable for the item's lifetime
    pub id: Uuid,
    pub file_name: String,
    pub file_size: u64,
    pub content_type: String,
    pub status: UploadStatus,
    /// 0-100, monotonic non-decreasing while not terminal
    pub progress: u8,
    pub error: Option<String>,
    /// Server-assigned interview id; the join key for realtime events.
    /// Until populated the item is unaddressable by the channel.
    pub backend_id: Option<String>,
}

impl UploadItem {
    pub fn new(file_name: impl Into<String>, file_size: u64, content_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            file_size,
            content_type: content_type.into(),
            status: UploadStatus::Queued,
            progress: 0,
            error: None,
            backend_id: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Advance to `status` at `progress`. No-op once terminal; progress
    /// never decreases.
    pub fn advance(&self, status: UploadStatus, progress: u8) -> Self {
        if self.is_terminal() {
            return self.clone();
        }
        Self {
            status,
            progress: progress.min(100).max(self.progress),
            ..self.clone()
        }
    }

    /// Record the server-assigned interview id
    pub fn with_backend_id(&self, backend_id: impl Into<String>) -> Self {
        Self {
            backend_id: Some(backend_id.into()),
            ..self.clone()
        }
    }

    /// Local optimistic completion (fallback timer path). No-op once
    /// terminal, so it can never downgrade an authoritative result.
    pub fn complete_local(&self) -> Self {
        if self.is_terminal() {
            return self.clone();
        }
        Self {
            status: UploadStatus::Done,
            progress: 100,
            ..self.clone()
        }
    }

    /// Terminal failure with a message. No-op once terminal.
    pub fn fail(&self, message: impl Into<String>) -> Self {
        if self.is_terminal() {
            return self.clone();
        }
        Self {
            status: UploadStatus::Error,
            error: Some(message.into()),
            ..self.clone()
        }
    }

    /// Fold one server event into this item. The caller has already
    /// matched `backend_id`; this only applies the transition rules.
    pub fn apply_event(&self, event: &ProcessingEvent) -> Self {
        if self.is_terminal() {
            return self.clone();
        }
        match event.status {
            ProcessingStatus::Done => Self {
                status: UploadStatus::Done,
                progress: 100,
                ..self.clone()
            },
            ProcessingStatus::Error => Self {
                status: UploadStatus::Error,
                error: Some(
                    event
                        .message
                        .clone()
                        .unwrap_or_else(|| "Processing failed".to_string()),
                ),
                ..self.clone()
            },
            status => Self {
                status: status.into(),
                progress: event
                    .progress
                    .map(|p| p.min(100))
                    .unwrap_or(self.progress)
                    .max(self.progress),
                ..self.clone()
            },
        }
    }
}

// ============================================================================
// Queue snapshot transforms
// ============================================================================

/// Fold a server event into the queue snapshot. An event whose
/// `interview_id` matches no item's backend id is a no-op.
pub fn apply_event(items: &[UploadItem], event: &ProcessingEvent) -> Vec<UploadItem> {
    items
        .iter()
        .map(|item| match &item.backend_id {
            Some(id) if *id == event.interview_id => item.apply_event(event),
            _ => item.clone(),
        })
        .collect()
}

/// Replace the item with local id `id` by `f(item)`; other items pass
/// through untouched. Unknown ids (e.g. the item was removed while a
/// pipeline step was in flight) are a no-op.
pub fn update_item(
    items: &[UploadItem],
    id: Uuid,
    f: impl Fn(&UploadItem) -> UploadItem,
) -> Vec<UploadItem> {
    items
        .iter()
        .map(|item| if item.id == id { f(item) } else { item.clone() })
        .collect()
}

/// Remove the item with local id `id` from the queue
pub fn remove_item(items: &[UploadItem], id: Uuid) -> Vec<UploadItem> {
    items.iter().filter(|item| item.id != id).cloned().collect()
}

/// Count of items that have not yet reached a terminal state
pub fn active_count(items: &[UploadItem]) -> usize {
    items.iter().filter(|item| !item.is_terminal()).count()
}

/// True when every item has reached a terminal state (vacuously true
/// for an empty queue)
pub fn all_terminal(items: &[UploadItem]) -> bool {
    items.iter().all(|item| item.is_terminal())
}
