// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Polling fallback against the booking read endpoint.
//!
//! Runs on a fixed interval but stays silent while the push channel is
//! open. Poll results pass through the same last-write-wins gate as
//! pushed updates, so a poll that races a push never rewinds state.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use truckline_core::{Booking, TrucklineError};

use crate::client::{BookingUpdate, Shared, TrackerConfig, UpdateSource};

pub(crate) async fn run(
    config: TrackerConfig,
    booking_ids: Vec<String>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!("poller disabled, http client build failed: {e}");
            return;
        }
    };

    let mut interval = tokio::time::interval(config.poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The immediate first tick would race the initial WS connect.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = interval.tick() => {}
        }
        if shared.channel_open() {
            continue;
        }
        for booking_id in &booking_ids {
            match poll_once(&client, &config.base_url, booking_id).await {
                Ok(update) => shared.emit(update).await,
                Err(e) => {
                    debug!(booking_id = %booking_id, "poll failed: {e}");
                }
            }
        }
    }
}

async fn poll_once(
    client: &reqwest::Client,
    base_url: &str,
    booking_id: &str,
) -> Result<BookingUpdate, TrucklineError> {
    let url = format!(
        "{}/v1/bookings/{booking_id}",
        base_url.trim_end_matches('/')
    );
    let booking: Booking = client
        .get(&url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(poll_err)?
        .json()
        .await
        .map_err(poll_err)?;

    Ok(BookingUpdate {
        booking_id: booking.id,
        status: booking.status,
        eta_minutes: None,
        updated_at: booking.updated_at,
        source: UpdateSource::Poll,
    })
}

fn poll_err(e: reqwest::Error) -> TrucklineError {
    TrucklineError::Channel {
        message: format!("booking poll failed: {e}"),
        source: Some(Box::new(e)),
    }
}
