//! Realtime processing event types
//!
//! Inbound frames from the `/ws/processing` feed, plus the channel
//! status signal shared between the realtime channel and its consumers.

use serde::{Deserialize, Serialize};

/// Server-reported processing phase for one interview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Queued,
    Transcribing,
    Analyzing,
    Done,
    Error,
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStatus::Queued => write!(f, "queued"),
            ProcessingStatus::Transcribing => write!(f, "transcribing"),
            ProcessingStatus::Analyzing => write!(f, "analyzing"),
            ProcessingStatus::Done => write!(f, "done"),
            ProcessingStatus::Error => write!(f, "error"),
        }
    }
}

/// Inbound realtime frame: one status update for one interview
///
/// Transient: folded into the matching upload item and otherwise
/// discarded. Unknown extra fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingEvent {
    pub interview_id: String,
    pub status: ProcessingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
}

impl ProcessingEvent {
    /// Parse a raw text frame
    ///
    /// Malformed payloads yield `None`; the caller drops them. A bad
    /// frame must never terminate the connection or reach the consumer.
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::trace!(error = %e, "dropping malformed processing frame");
                None
            }
        }
    }
}

/// Connection state of the realtime channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Initial connect in flight
    Connecting,
    /// Socket open, events flowing
    Connected,
    /// Waiting out the back-off window before reconnect `attempt`
    Reconnecting { attempt: u32 },
    /// Retry budget exhausted; no further reconnects until reopened
    GaveUp,
    /// Explicitly closed by the consumer
    Closed,
}

impl ChannelStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ChannelStatus::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_frame() {
        let event = ProcessingEvent::parse(
            r#"{"interview_id":"iv_1","status":"transcribing","message":"Transcribing audio...","progress":35}"#,
        )
        .expect("frame should parse");
        assert_eq!(event.interview_id, "iv_1");
        assert_eq!(event.status, ProcessingStatus::Transcribing);
        assert_eq!(event.message.as_deref(), Some("Transcribing audio..."));
        assert_eq!(event.progress, Some(35));
    }

    #[test]
    fn parse_minimal_frame() {
        let event = ProcessingEvent::parse(r#"{"interview_id":"iv_2","status":"done"}"#)
            .expect("frame should parse");
        assert_eq!(event.status, ProcessingStatus::Done);
        assert!(event.message.is_none());
        assert!(event.progress.is_none());
    }

    #[test]
    fn parse_ignores_unknown_fields() {
        let event = ProcessingEvent::parse(
            r#"{"interview_id":"iv_3","status":"analyzing","insights_count":3}"#,
        )
        .expect("frame should parse");
        assert_eq!(event.status, ProcessingStatus::Analyzing);
    }

    #[test]
    fn malformed_frames_yield_none() {
        assert!(ProcessingEvent::parse("not json").is_none());
        assert!(ProcessingEvent::parse("{}").is_none());
        assert!(ProcessingEvent::parse(r#"{"interview_id":"iv_4","status":"exploded"}"#).is_none());
        assert!(ProcessingEvent::parse("").is_none());
    }

    #[test]
    fn status_serde_round_trip() {
        for status in [
            ProcessingStatus::Queued,
            ProcessingStatus::Transcribing,
            ProcessingStatus::Analyzing,
            ProcessingStatus::Done,
            ProcessingStatus::Error,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
            let back: ProcessingStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }
}
