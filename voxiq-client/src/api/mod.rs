//! Backend API access
//!
//! Typed HTTP client for the VoxIQ backend. All request/response shapes
//! live in voxiq-common; this module owns transport and error decoding.

mod client;

pub use client::ApiClient;
