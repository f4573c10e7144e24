// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The booking lifecycle controller.
//!
//! [`Dispatcher`] ties the pricing engine, the quote registry, and the
//! storage layer together and is the only place that mutates bookings.
//! Every committed status mutation is announced on a broadcast channel;
//! subscribers that lag or disappear never affect the mutation itself.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use truckline_core::{
    Booking, BookingStatus, CapacityTier, CargoDetails, Location, PriceQuote, StatusEvent,
    StatusHistoryEntry, Truck, TrucklineError,
};
use truckline_pricing::{compute_quote, eta_minutes, QuoteRequest, TrackingPhase};
use truckline_storage::queries::{bookings, history, trucks};
use truckline_storage::Database;

use crate::quotes::QuoteRegistry;

/// Earliest allowed pickup, relative to booking time.
pub const MIN_PICKUP_LEAD: Duration = Duration::hours(1);

/// Latest allowed pickup, relative to booking time.
pub const MAX_PICKUP_LEAD: Duration = Duration::days(7);

/// Capacity of the status-event broadcast channel. Slow subscribers that
/// fall this far behind miss events; the polling read path covers them.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Input to booking creation. The location and cargo details must match
/// the ones the referenced quote was computed for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookingRequest {
    pub calculation_id: String,
    pub pickup: Location,
    pub delivery: Location,
    pub cargo: CargoDetails,
    pub requested_pickup_at: DateTime<Utc>,
    #[serde(default)]
    pub actor: Option<String>,
}

/// Orchestrates quotes, bookings, and the fleet against one database.
///
/// Cheap to clone; all clones share the registry, the database handle,
/// and the event channel.
#[derive(Clone)]
pub struct Dispatcher {
    db: Database,
    quotes: std::sync::Arc<QuoteRegistry>,
    events: broadcast::Sender<StatusEvent>,
}

impl Dispatcher {
    pub fn new(db: Database) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            db,
            quotes: std::sync::Arc::new(QuoteRegistry::new()),
            events,
        }
    }

    /// Subscribe to status events for all bookings. Filtering by booking
    /// is the subscriber's concern.
    pub fn subscribe_events(&self) -> broadcast::Receiver<StatusEvent> {
        self.events.subscribe()
    }

    /// Compute a quote and register it for later consumption.
    pub fn price(&self, request: QuoteRequest) -> Result<PriceQuote, TrucklineError> {
        let now = Utc::now();
        self.quotes.purge_expired(now);
        let quote = compute_quote(&request, now)?;
        debug!(
            calculation_id = %quote.calculation_id,
            distance_km = quote.distance_km,
            total = quote.breakdown.total,
            "quote computed"
        );
        self.quotes.register(quote.clone(), request);
        Ok(quote)
    }

    /// Create a booking from a previously issued quote.
    ///
    /// Consumes the quote (single-use), verifies the submitted locations
    /// and cargo are the ones that were priced, checks the pickup window,
    /// and hands the assembled row to storage for atomic insert plus truck
    /// assignment. The quote is consumed even when a later check fails;
    /// re-quoting is cheap and a rejected booking attempt should not leave
    /// a half-trusted quote behind. Transient storage failures are the one
    /// exception: the caller is told those are retryable, so the quote is
    /// reinstated and the same calculation ID works on the retry.
    pub async fn create_booking(
        &self,
        request: BookingRequest,
    ) -> Result<Booking, TrucklineError> {
        let now = Utc::now();
        let stored = self.quotes.consume(&request.calculation_id, now)?;

        if request.pickup != stored.request.pickup
            || request.delivery != stored.request.delivery
            || request.cargo != stored.request.cargo
        {
            return Err(TrucklineError::Validation(
                "booking details do not match the quoted request".into(),
            ));
        }
        if request.requested_pickup_at < now + MIN_PICKUP_LEAD {
            return Err(TrucklineError::Validation(
                "requested pickup must be at least 1 hour from now".into(),
            ));
        }
        if request.requested_pickup_at > now + MAX_PICKUP_LEAD {
            return Err(TrucklineError::Validation(
                "requested pickup must be within 7 days".into(),
            ));
        }
        let tier = CapacityTier::for_weight(request.cargo.weight_tonnes).ok_or_else(|| {
            TrucklineError::Validation(format!(
                "no capacity tier covers {} tonnes",
                request.cargo.weight_tonnes
            ))
        })?;

        let booking = Booking {
            id: Uuid::new_v4().to_string(),
            booking_number: booking_number(now),
            pickup: request.pickup,
            delivery: request.delivery,
            cargo: request.cargo,
            distance_km: stored.quote.distance_km,
            requested_pickup_at: request.requested_pickup_at,
            status: BookingStatus::Created,
            truck_id: None,
            driver_id: None,
            price: stored.quote.breakdown.clone(),
            actual_pickup_at: None,
            actual_delivery_at: None,
            cancellation_reason: None,
            cancelled_at: None,
            pod_reference: None,
            created_at: now,
            updated_at: now,
        };

        let booking =
            match bookings::create_with_assignment(&self.db, booking, tier, request.actor).await {
                Ok(booking) => booking,
                Err(err) => {
                    if err.is_retryable() {
                        self.quotes.register(stored.quote, stored.request);
                    }
                    return Err(err);
                }
            };
        match booking.status {
            BookingStatus::Assigned => info!(
                booking_id = %booking.id,
                booking_number = %booking.booking_number,
                truck_id = booking.truck_id.as_deref(),
                "booking created and truck assigned"
            ),
            _ => warn!(
                booking_id = %booking.id,
                booking_number = %booking.booking_number,
                tier = %tier,
                "booking created, no matching truck available"
            ),
        }
        self.emit(&booking);
        Ok(booking)
    }

    /// Advance a booking along the forward state machine.
    pub async fn update_status(
        &self,
        booking_id: &str,
        target: BookingStatus,
        actor: Option<String>,
        note: Option<String>,
    ) -> Result<Booking, TrucklineError> {
        let booking =
            bookings::transition_status(&self.db, booking_id, target, actor, note).await?;
        info!(booking_id = %booking.id, status = %booking.status, "status updated");
        self.emit(&booking);
        Ok(booking)
    }

    /// Cancel a booking, recording the reason. Legal only before pickup.
    pub async fn cancel(
        &self,
        booking_id: &str,
        reason: String,
        actor: Option<String>,
    ) -> Result<Booking, TrucklineError> {
        let booking = bookings::cancel(&self.db, booking_id, reason, actor).await?;
        info!(booking_id = %booking.id, "booking cancelled");
        self.emit(&booking);
        Ok(booking)
    }

    /// Attach a proof-of-delivery reference to a delivered booking.
    /// Not a status transition, so no event is emitted.
    pub async fn attach_pod(
        &self,
        booking_id: &str,
        reference: String,
    ) -> Result<Booking, TrucklineError> {
        bookings::attach_pod(&self.db, booking_id, reference).await
    }

    pub async fn get_booking(&self, booking_id: &str) -> Result<Booking, TrucklineError> {
        bookings::get(&self.db, booking_id)
            .await?
            .ok_or_else(|| TrucklineError::NotFound {
                booking_id: booking_id.to_string(),
            })
    }

    /// Full status history for a booking, oldest first.
    pub async fn history(
        &self,
        booking_id: &str,
    ) -> Result<Vec<StatusHistoryEntry>, TrucklineError> {
        // Distinguish "no history" from "no booking".
        let entries = history::list(&self.db, booking_id).await?;
        if entries.is_empty() && bookings::get(&self.db, booking_id).await?.is_none() {
            return Err(TrucklineError::NotFound {
                booking_id: booking_id.to_string(),
            });
        }
        Ok(entries)
    }

    pub async fn fleet(&self) -> Result<Vec<Truck>, TrucklineError> {
        trucks::list(&self.db).await
    }

    /// Add a truck to the fleet. Provisioning path, used by demo seeding.
    pub async fn register_truck(&self, truck: &Truck) -> Result<(), TrucklineError> {
        trucks::insert(&self.db, truck).await
    }

    /// Announce a committed mutation. Fire-and-forget: `send` only fails
    /// when nobody is subscribed, which is not an error here.
    fn emit(&self, booking: &Booking) {
        let _ = self.events.send(StatusEvent {
            booking_id: booking.id.clone(),
            booking_number: booking.booking_number.clone(),
            status: booking.status,
            eta_minutes: estimate_eta(booking),
            updated_at: booking.updated_at,
        });
    }
}

/// Highway ETA over the full trip distance while in transit. Other phases
/// have no known remaining distance, so no estimate is attached.
fn estimate_eta(booking: &Booking) -> Option<u32> {
    match TrackingPhase::for_booking_status(booking.status) {
        Some(TrackingPhase::InTransit) => {
            eta_minutes(TrackingPhase::InTransit, booking.distance_km)
        }
        _ => None,
    }
}

/// Time-ordered, human-readable booking number: `TL` + UTC timestamp +
/// 4 hex characters of entropy.
fn booking_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4().simple().to_string()[..4].to_string();
    format!("TL{}{}", now.format("%y%m%d%H%M%S"), suffix)
}
