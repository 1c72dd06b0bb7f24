//! Reconnecting WebSocket channel

use futures::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use voxiq_common::events::{ChannelStatus, ProcessingEvent};

/// Reconnect policy knobs; defaults match the production back-off
/// (3s base doubling to 60s, give up after 10 consecutive failures)
#[derive(Debug, Clone)]
pub struct ChannelOptions {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(60),
            max_attempts: 10,
        }
    }
}

/// Open subscription to the processing status feed
///
/// Holds the reconnect loop task; `close` (or drop) cancels any pending
/// reconnect. Consumers read events through `subscribe` and the
/// connection state through `status`/`watch_status`. A running log of
/// received events is kept for display; consumers may clear it.
pub struct RealtimeChannel {
    status_rx: watch::Receiver<ChannelStatus>,
    events_tx: broadcast::Sender<ProcessingEvent>,
    log: Arc<Mutex<Vec<ProcessingEvent>>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RealtimeChannel {
    /// Open the feed with the production reconnect policy
    pub fn open(ws_url: &str, token: &str) -> Self {
        Self::open_with(ws_url, token, ChannelOptions::default())
    }

    /// Open the feed with an explicit reconnect policy
    pub fn open_with(ws_url: &str, token: &str, options: ChannelOptions) -> Self {
        let url = format!("{}?token={}", ws_url, token);
        let (status_tx, status_rx) = watch::channel(ChannelStatus::Connecting);
        let (events_tx, _) = broadcast::channel(256);
        let log = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_channel(
            url,
            options,
            status_tx,
            events_tx.clone(),
            log.clone(),
            cancel.clone(),
        ));

        Self {
            status_rx,
            events_tx,
            log,
            cancel,
            task: Some(task),
        }
    }

    /// Subscribe to events in arrival order
    pub fn subscribe(&self) -> broadcast::Receiver<ProcessingEvent> {
        self.events_tx.subscribe()
    }

    /// Current connection state
    pub fn status(&self) -> ChannelStatus {
        *self.status_rx.borrow()
    }

    /// Watch connection state changes
    pub fn watch_status(&self) -> watch::Receiver<ChannelStatus> {
        self.status_rx.clone()
    }

    /// Snapshot of every event received so far
    pub fn events_log(&self) -> Vec<ProcessingEvent> {
        self.log.lock().expect("event log poisoned").clone()
    }

    /// Trim the running event log
    pub fn clear_log(&self) {
        self.log.lock().expect("event log poisoned").clear();
    }

    /// Release the socket and cancel any pending reconnect
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Connect / read / back-off loop, cancelled by `cancel`
async fn run_channel(
    url: String,
    options: ChannelOptions,
    status_tx: watch::Sender<ChannelStatus>,
    events_tx: broadcast::Sender<ProcessingEvent>,
    log: Arc<Mutex<Vec<ProcessingEvent>>>,
    cancel: CancellationToken,
) {
    let mut backoff = super::Backoff::new(options.base_delay, options.max_delay, options.max_attempts);

    loop {
        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = connect_async(url.as_str()) => result,
        };

        match connected {
            Ok((mut stream, _response)) => {
                debug!("realtime channel connected");
                let _ = status_tx.send(ChannelStatus::Connected);
                backoff.reset();

                loop {
                    let message = tokio::select! {
                        _ = cancel.cancelled() => {
                            let _ = status_tx.send(ChannelStatus::Closed);
                            return;
                        }
                        message = stream.next() => message,
                    };

                    match message {
                        Some(Ok(Message::Text(text))) => {
                            // Malformed frames are dropped; they never
                            // terminate the connection
                            if let Some(event) = ProcessingEvent::parse(&text) {
                                log.lock().expect("event log poisoned").push(event.clone());
                                let _ = events_tx.send(event);
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            debug!("realtime channel closed by server");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            debug!(error = %e, "realtime socket error");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                debug!(error = %e, "realtime connect failed");
            }
        }

        // Unexpected closure: wait out the back-off window, or give up
        // once the retry budget is spent
        match backoff.next_delay() {
            Some(delay) => {
                let _ = status_tx.send(ChannelStatus::Reconnecting {
                    attempt: backoff.attempt(),
                });
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            None => {
                warn!(
                    attempts = options.max_attempts,
                    "realtime channel giving up after consecutive failures"
                );
                let _ = status_tx.send(ChannelStatus::GaveUp);
                return;
            }
        }
    }

    let _ = status_tx.send(ChannelStatus::Closed);
}
