//! Realtime channel integration tests
//!
//! Run the channel against a local WebSocket server: delivery order,
//! malformed-frame tolerance, reconnect with back-off, the give-up
//! signal, and close() cancelling pending reconnects.

use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

use voxiq_client::realtime::{ChannelOptions, RealtimeChannel};
use voxiq_common::events::ChannelStatus;

fn fast_options() -> ChannelOptions {
    ChannelOptions {
        base_delay: Duration::from_millis(50),
        max_delay: Duration::from_millis(200),
        max_attempts: 5,
    }
}

async fn wait_status(
    channel: &RealtimeChannel,
    predicate: impl Fn(&ChannelStatus) -> bool,
) -> ChannelStatus {
    let mut rx = channel.watch_status();
    timeout(Duration::from_secs(3), async {
        loop {
            let status = *rx.borrow_and_update();
            if predicate(&status) {
                return status;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("status should be reached")
}

#[tokio::test]
async fn delivers_events_in_order_and_drops_malformed_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let request_uri = Arc::new(Mutex::new(String::new()));

    let seen_uri = request_uri.clone();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        use tokio_tungstenite::tungstenite::handshake::server::{
            ErrorResponse, Request, Response,
        };
        let callback = move |req: &Request, response: Response| -> Result<Response, ErrorResponse> {
            *seen_uri.lock().unwrap() = req.uri().to_string();
            Ok(response)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
            .await
            .unwrap();

        ws.send(Message::Text(
            r#"{"interview_id":"iv_1","status":"transcribing","progress":30}"#.to_string(),
        ))
        .await
        .unwrap();
        ws.send(Message::Text("definitely not json".to_string()))
            .await
            .unwrap();
        ws.send(Message::Text(
            r#"{"interview_id":"iv_1","status":"analyzing","progress":60}"#.to_string(),
        ))
        .await
        .unwrap();

        // Hold the connection open until the client goes away
        while let Some(message) = ws.next().await {
            if message.is_err() {
                break;
            }
        }
    });

    let channel = RealtimeChannel::open_with(
        &format!("ws://{}/ws/processing", addr),
        "tok_abc",
        fast_options(),
    );
    let mut events = channel.subscribe();

    let first = timeout(Duration::from_secs(3), events.recv())
        .await
        .unwrap()
        .unwrap();
    let second = timeout(Duration::from_secs(3), events.recv())
        .await
        .unwrap()
        .unwrap();

    // Arrival order preserved; the malformed frame vanished without
    // dropping the connection
    assert_eq!(first.progress, Some(30));
    assert_eq!(second.progress, Some(60));
    assert!(channel.status().is_connected());

    // Running log holds both; consumers may clear it
    assert_eq!(channel.events_log().len(), 2);
    channel.clear_log();
    assert!(channel.events_log().is_empty());

    // The bearer token rides the query string
    let uri = request_uri.lock().unwrap().clone();
    assert_eq!(uri, "/ws/processing?token=tok_abc");

    channel.close().await;
}

#[tokio::test]
async fn reconnects_after_unexpected_closure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        // First connection: one event, then an abrupt close
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text(
            r#"{"interview_id":"iv_1","status":"transcribing"}"#.to_string(),
        ))
        .await
        .unwrap();
        drop(ws);

        // Second connection: the channel came back on its own
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Text(
            r#"{"interview_id":"iv_1","status":"done"}"#.to_string(),
        ))
        .await
        .unwrap();
        while let Some(message) = ws.next().await {
            if message.is_err() {
                break;
            }
        }
    });

    let channel =
        RealtimeChannel::open_with(&format!("ws://{}", addr), "tok", fast_options());
    let mut events = channel.subscribe();

    let first = timeout(Duration::from_secs(3), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.interview_id, "iv_1");

    let second = timeout(Duration::from_secs(3), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        second.status,
        voxiq_common::events::ProcessingStatus::Done
    );
    assert!(channel.status().is_connected());

    channel.close().await;
}

#[tokio::test]
async fn gives_up_after_consecutive_failures() {
    // Bind then drop so the port refuses connections
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let channel = RealtimeChannel::open_with(
        &format!("ws://{}", addr),
        "tok",
        ChannelOptions {
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(40),
            max_attempts: 3,
        },
    );

    let status = wait_status(&channel, |s| *s == ChannelStatus::GaveUp).await;
    assert_eq!(status, ChannelStatus::GaveUp);
    channel.close().await;
}

#[tokio::test]
async fn close_cancels_pending_reconnect() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepts = Arc::new(AtomicUsize::new(0));

    let accept_count = accepts.clone();
    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            accept_count.fetch_add(1, Ordering::SeqCst);
            // Accept the handshake, then drop the connection immediately
            let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            drop(ws);
        }
    });

    let channel = RealtimeChannel::open_with(
        &format!("ws://{}", addr),
        "tok",
        ChannelOptions {
            base_delay: Duration::from_millis(300),
            max_delay: Duration::from_millis(300),
            max_attempts: 10,
        },
    );

    // Wait until the channel is sitting in its back-off window
    wait_status(&channel, |s| matches!(s, ChannelStatus::Reconnecting { .. })).await;
    let before = accepts.load(Ordering::SeqCst);
    channel.close().await;

    // The scheduled reconnect never fires
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(accepts.load(Ordering::SeqCst), before);
}
