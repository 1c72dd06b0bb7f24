//! voxiq-client library interface
//!
//! Exposes the API client, session, realtime channel, upload
//! orchestrator, and data stores for the `voxiq` binary and for
//! integration testing.

pub mod api;
pub mod cli;
pub mod realtime;
pub mod session;
pub mod store;
pub mod upload;

pub use voxiq_common::{Error, Result};
