//! Realtime status channel
//!
//! Reconnecting WebSocket subscription to the backend's
//! `/ws/processing` feed. Events are delivered in transport arrival
//! order; reconciliation against the upload queue belongs to the
//! consumer. Reconnects use capped exponential back-off and give up
//! after a bounded run of consecutive failures, surfacing an explicit
//! status the consumer can show to the user.

mod backoff;
mod channel;

pub use backoff::Backoff;
pub use channel::{ChannelOptions, RealtimeChannel};
