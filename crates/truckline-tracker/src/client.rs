// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket push channel with bounded reconnection.
//!
//! The tracker holds one WebSocket connection and multiplexes all watched
//! bookings over it. Connection loss triggers fixed-delay reconnect
//! attempts up to a bounded maximum; after that the push channel is given
//! up for good, a [`TrackerEvent::Degraded`] is surfaced, and the polling
//! fallback carries the session alone. Push and poll are mutually
//! exclusive: the poller only runs while the channel is down, and a
//! last-write-wins check on the server's `updated_at` deduplicates the
//! handover between the two.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use truckline_core::BookingStatus;

use crate::poller;

/// Tracker connection settings, mirroring `RealtimeConfig` from
/// `truckline-config`.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// HTTP base URL of the gateway, e.g. `http://127.0.0.1:8090`.
    pub base_url: String,
    pub poll_interval: Duration,
    pub reconnect_delay: Duration,
    pub reconnect_max_attempts: u32,
}

/// How an update reached the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
    Push,
    Poll,
}

/// A deduplicated status observation for one watched booking.
#[derive(Debug, Clone)]
pub struct BookingUpdate {
    pub booking_id: String,
    pub status: BookingStatus,
    pub eta_minutes: Option<u32>,
    pub updated_at: DateTime<Utc>,
    pub source: UpdateSource,
}

/// Events surfaced to the tracker consumer.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    Update(BookingUpdate),
    /// The push channel was abandoned after repeated connect failures.
    /// Updates keep flowing through polling, at polling latency.
    Degraded { attempts: u32 },
}

/// State shared between the push channel and the poller.
pub(crate) struct Shared {
    /// Highest `updated_at` seen per booking; the last-write-wins gate.
    latest: DashMap<String, DateTime<Utc>>,
    /// True while the WebSocket is connected; silences the poller.
    channel_open: AtomicBool,
    events: mpsc::Sender<TrackerEvent>,
}

impl Shared {
    pub(crate) fn new(events: mpsc::Sender<TrackerEvent>) -> Self {
        Self {
            latest: DashMap::new(),
            channel_open: AtomicBool::new(false),
            events,
        }
    }

    pub(crate) fn channel_open(&self) -> bool {
        self.channel_open.load(Ordering::SeqCst)
    }

    fn set_channel_open(&self, open: bool) {
        self.channel_open.store(open, Ordering::SeqCst);
    }

    /// Forward the update unless an equal-or-newer one was already seen.
    /// Equal timestamps are suppressed too: that is the same server write
    /// arriving through both mechanisms.
    pub(crate) async fn emit(&self, update: BookingUpdate) {
        let newer = {
            let mut entry = self
                .latest
                .entry(update.booking_id.clone())
                .or_insert(DateTime::<Utc>::MIN_UTC);
            if update.updated_at > *entry {
                *entry = update.updated_at;
                true
            } else {
                false
            }
        };
        if newer {
            let _ = self.events.send(TrackerEvent::Update(update)).await;
        } else {
            debug!(
                booking_id = %update.booking_id,
                source = ?update.source,
                "stale update suppressed"
            );
        }
    }
}

/// Handle to a running tracking session.
///
/// Dropping the tracker without [`Tracker::shutdown`] leaves the tasks to
/// notice the closed event channel; explicit shutdown cancels them
/// promptly.
pub struct Tracker {
    events: mpsc::Receiver<TrackerEvent>,
    cancel: CancellationToken,
}

impl Tracker {
    /// Start tracking the given bookings. Spawns the push channel and the
    /// fallback poller on the current runtime.
    pub fn start(config: TrackerConfig, booking_ids: Vec<String>) -> Self {
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(64);
        let shared = Arc::new(Shared::new(tx));

        tokio::spawn(run_push_channel(
            config.clone(),
            booking_ids.clone(),
            Arc::clone(&shared),
            cancel.clone(),
        ));
        tokio::spawn(poller::run(config, booking_ids, shared, cancel.clone()));

        Self { events: rx, cancel }
    }

    /// Next tracker event; `None` once shut down.
    pub async fn next_event(&mut self) -> Option<TrackerEvent> {
        self.events.recv().await
    }

    /// Cancel both the push channel and the poller.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Derive the WebSocket endpoint from the HTTP base URL.
fn ws_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let ws = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{ws}/ws")
}

/// Server -> client frames on the push channel.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerFrame {
    StatusUpdate {
        booking_id: String,
        status: BookingStatus,
        #[serde(default)]
        eta_minutes: Option<u32>,
        updated_at: DateTime<Utc>,
    },
    Subscribed {
        booking_id: String,
    },
    Error {
        error: String,
    },
}

/// Maintain the push channel until cancelled or given up.
async fn run_push_channel(
    config: TrackerConfig,
    booking_ids: Vec<String>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) {
    let url = ws_url(&config.base_url);
    let mut attempts: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            return;
        }
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                attempts = 0;
                shared.set_channel_open(true);
                info!(url = %url, "push channel connected");
                let result = drive_connection(stream, &booking_ids, &shared, &cancel).await;
                shared.set_channel_open(false);
                if cancel.is_cancelled() {
                    return;
                }
                match result {
                    Ok(()) => info!("push channel closed by server"),
                    Err(e) => warn!("push channel error: {e}"),
                }
            }
            Err(e) => {
                warn!(url = %url, attempt = attempts + 1, "push connect failed: {e}");
            }
        }

        attempts += 1;
        if attempts >= config.reconnect_max_attempts {
            warn!(attempts, "push channel abandoned, polling only from here");
            let _ = shared.events.send(TrackerEvent::Degraded { attempts }).await;
            return;
        }
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(config.reconnect_delay) => {}
        }
    }
}

/// Subscribe to every watched booking, then pump frames until the
/// connection ends.
async fn drive_connection(
    mut stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    booking_ids: &[String],
    shared: &Shared,
    cancel: &CancellationToken,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    for booking_id in booking_ids {
        let frame = json!({"type": "subscribe", "booking_id": booking_id}).to_string();
        stream.send(Message::Text(frame.into())).await?;
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = stream.close(None).await;
                return Ok(());
            }
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(text.as_str(), shared).await;
                }
                Some(Ok(Message::Close(_))) | None => return Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
            }
        }
    }
}

async fn handle_frame(text: &str, shared: &Shared) {
    match serde_json::from_str::<ServerFrame>(text) {
        Ok(ServerFrame::StatusUpdate {
            booking_id,
            status,
            eta_minutes,
            updated_at,
        }) => {
            shared
                .emit(BookingUpdate {
                    booking_id,
                    status,
                    eta_minutes,
                    updated_at,
                    source: UpdateSource::Push,
                })
                .await;
        }
        Ok(ServerFrame::Subscribed { booking_id }) => {
            debug!(booking_id = %booking_id, "subscription acknowledged");
        }
        Ok(ServerFrame::Error { error }) => {
            warn!("server rejected a frame: {error}");
        }
        Err(e) => {
            warn!("unrecognized push frame: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_derivation() {
        assert_eq!(ws_url("http://127.0.0.1:8090"), "ws://127.0.0.1:8090/ws");
        assert_eq!(ws_url("http://127.0.0.1:8090/"), "ws://127.0.0.1:8090/ws");
        assert_eq!(
            ws_url("https://broker.example.com"),
            "wss://broker.example.com/ws"
        );
    }

    #[test]
    fn status_update_frame_parses() {
        let json = r#"{
            "type": "status_update",
            "booking_id": "b-1",
            "status": "in_transit",
            "eta_minutes": 67,
            "updated_at": "2026-08-29T12:00:00Z"
        }"#;
        let frame: ServerFrame = serde_json::from_str(json).unwrap();
        match frame {
            ServerFrame::StatusUpdate {
                booking_id,
                status,
                eta_minutes,
                ..
            } => {
                assert_eq!(booking_id, "b-1");
                assert_eq!(status, BookingStatus::InTransit);
                assert_eq!(eta_minutes, Some(67));
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn status_update_without_eta_parses() {
        let json = r#"{
            "type": "status_update",
            "booking_id": "b-1",
            "status": "delivered",
            "updated_at": "2026-08-29T12:00:00Z"
        }"#;
        let frame: ServerFrame = serde_json::from_str(json).unwrap();
        assert!(matches!(
            frame,
            ServerFrame::StatusUpdate {
                eta_minutes: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn emit_applies_last_write_wins() {
        let (tx, mut rx) = mpsc::channel(8);
        let shared = Shared::new(tx);
        let newer = Utc::now();
        let older = newer - chrono::Duration::seconds(30);

        let update = |at: DateTime<Utc>, source| BookingUpdate {
            booking_id: "b-1".into(),
            status: BookingStatus::InTransit,
            eta_minutes: None,
            updated_at: at,
            source,
        };

        shared.emit(update(newer, UpdateSource::Push)).await;
        // A poll result from before the push must be suppressed.
        shared.emit(update(older, UpdateSource::Poll)).await;
        // The same write seen again through the other mechanism too.
        shared.emit(update(newer, UpdateSource::Poll)).await;

        let first = rx.try_recv().unwrap();
        assert!(matches!(
            first,
            TrackerEvent::Update(BookingUpdate {
                source: UpdateSource::Push,
                ..
            })
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn emit_tracks_bookings_independently() {
        let (tx, mut rx) = mpsc::channel(8);
        let shared = Shared::new(tx);
        let now = Utc::now();

        for id in ["b-1", "b-2"] {
            shared
                .emit(BookingUpdate {
                    booking_id: id.into(),
                    status: BookingStatus::Assigned,
                    eta_minutes: None,
                    updated_at: now,
                    source: UpdateSource::Poll,
                })
                .await;
        }
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }
}
