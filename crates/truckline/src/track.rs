// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `truckline track` command implementation.
//!
//! Follows bookings through the tracker client: push updates while the
//! WebSocket holds, polled reads when it does not.

use std::time::Duration;

use tracing::info;

use truckline_config::model::TrucklineConfig;
use truckline_core::TrucklineError;
use truckline_tracker::{Tracker, TrackerConfig, TrackerEvent, UpdateSource};

/// Runs the `truckline track` command until interrupted or the tracker
/// gives out.
pub async fn run_track(
    config: TrucklineConfig,
    booking_ids: Vec<String>,
    server_url: Option<String>,
) -> Result<(), TrucklineError> {
    let base_url = server_url
        .unwrap_or_else(|| format!("http://{}:{}", config.server.host, config.server.port));
    info!(base_url = %base_url, bookings = booking_ids.len(), "starting tracker");

    let tracker_config = TrackerConfig {
        base_url,
        poll_interval: Duration::from_secs(config.realtime.poll_interval_secs),
        reconnect_delay: Duration::from_secs(config.realtime.reconnect_delay_secs),
        reconnect_max_attempts: config.realtime.reconnect_max_attempts,
    };
    let mut tracker = Tracker::start(tracker_config, booking_ids);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracker.shutdown();
                println!("tracking stopped");
                return Ok(());
            }
            event = tracker.next_event() => match event {
                Some(TrackerEvent::Update(update)) => {
                    let via = match update.source {
                        UpdateSource::Push => "push",
                        UpdateSource::Poll => "poll",
                    };
                    let eta = update
                        .eta_minutes
                        .map(|m| format!(", eta {m} min"))
                        .unwrap_or_default();
                    println!(
                        "[{}] {} -> {}{eta} (via {via})",
                        update.updated_at.format("%H:%M:%S"),
                        update.booking_id,
                        update.status,
                    );
                }
                Some(TrackerEvent::Degraded { attempts }) => {
                    println!(
                        "push channel lost after {attempts} attempts; polling from here on"
                    );
                }
                None => return Ok(()),
            }
        }
    }
}
