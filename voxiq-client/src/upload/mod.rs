//! Upload pipeline
//!
//! The orchestrator drives each selected file from "picked" to a
//! terminal state: request an upload slot, transfer the bytes, register
//! the interview record, then await a terminal status from the realtime
//! feed or the fallback timer. The queue holds the shared state as
//! immutable snapshots.

mod orchestrator;
mod queue;

pub use orchestrator::UploadOrchestrator;
pub use queue::{QueueSnapshot, UploadQueue};
