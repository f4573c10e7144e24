// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking mutations and reads.
//!
//! Every mutation runs in a single transaction spanning the booking row,
//! the truck row where applicable, and exactly one status-history entry.
//! Partial application is never observable: any failure rolls the whole
//! transaction back and surfaces as a retryable storage error. Domain
//! rejections (unknown booking, illegal transition) are returned as values
//! from inside the transaction so they carry no rollback cost.

use chrono::Utc;
use rusqlite::{params, Transaction};

use truckline_core::{Booking, BookingStatus, CapacityTier, Truck, TrucklineError};

use crate::database::{map_tr_err, Database};
use crate::models::{booking_from_row, BOOKING_COLUMNS};
use crate::queries::{history, trucks};

/// Create a booking and attempt automatic truck assignment, atomically.
///
/// Inserts the row in `created`, reserves a matching truck when one exists,
/// and promotes the booking to `assigned` with the truck and driver IDs --
/// all in one transaction, with one history entry per transition. When no
/// truck matches, the booking stays `created` with no truck: a soft-fail
/// awaiting later assignment, not an error.
///
/// `booking.status` must be [`BookingStatus::Created`] on entry.
pub async fn create_with_assignment(
    db: &Database,
    booking: Booking,
    tier: CapacityTier,
    actor: Option<String>,
) -> Result<Booking, TrucklineError> {
    debug_assert_eq!(booking.status, BookingStatus::Created);
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let now = booking.updated_at;

            insert_row(&tx, &booking)?;
            history::append(
                &tx,
                &booking.id,
                BookingStatus::Created,
                actor.as_deref(),
                Some("booking created"),
                now,
            )?;

            let assigned = trucks::reserve_matching(&tx, tier)?;
            let booking = match assigned {
                Some(truck) => {
                    tx.execute(
                        "UPDATE bookings SET status = 'assigned', truck_id = ?1, driver_id = ?2,
                         updated_at = ?3 WHERE id = ?4",
                        params![truck.id, truck.driver_id, now.to_rfc3339(), booking.id],
                    )?;
                    history::append(
                        &tx,
                        &booking.id,
                        BookingStatus::Assigned,
                        None,
                        Some(&format!("truck {} auto-assigned", truck.registration)),
                        now,
                    )?;
                    Booking {
                        status: BookingStatus::Assigned,
                        truck_id: Some(truck.id),
                        driver_id: truck.driver_id,
                        ..booking
                    }
                }
                None => booking,
            };

            tx.commit()?;
            Ok(booking)
        })
        .await
        .map_err(map_tr_err)
}

/// Move a booking along a forward edge of the state machine.
///
/// Illegal edges are rejected with the stored status unchanged. Reaching
/// `delivered` releases the assigned truck in the same transaction;
/// `picked_up` and `delivered` stamp the actual-time fields. Cancellation
/// goes through [`cancel`], which records the reason.
pub async fn transition_status(
    db: &Database,
    id: &str,
    target: BookingStatus,
    actor: Option<String>,
    note: Option<String>,
) -> Result<Booking, TrucklineError> {
    if target == BookingStatus::Cancelled {
        return Err(TrucklineError::Validation(
            "cancellation requires a reason; use cancel".into(),
        ));
    }
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(booking) = read_row(&tx, &id)? else {
                return Ok(Err(TrucklineError::NotFound { booking_id: id }));
            };
            if !booking.status.can_transition(target) {
                return Ok(Err(TrucklineError::IllegalTransition {
                    from: booking.status,
                    to: target,
                }));
            }

            let now = Utc::now();
            let mut updated = Booking {
                status: target,
                updated_at: now,
                ..booking
            };
            tx.execute(
                "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![target.to_string(), now.to_rfc3339(), id],
            )?;

            match target {
                BookingStatus::PickedUp => {
                    tx.execute(
                        "UPDATE bookings SET actual_pickup_at = ?1 WHERE id = ?2",
                        params![now.to_rfc3339(), id],
                    )?;
                    updated.actual_pickup_at = Some(now);
                }
                BookingStatus::Delivered => {
                    tx.execute(
                        "UPDATE bookings SET actual_delivery_at = ?1 WHERE id = ?2",
                        params![now.to_rfc3339(), id],
                    )?;
                    updated.actual_delivery_at = Some(now);
                    if let Some(truck_id) = &updated.truck_id {
                        trucks::release(&tx, truck_id)?;
                    }
                }
                _ => {}
            }

            history::append(&tx, &id, target, actor.as_deref(), note.as_deref(), now)?;
            tx.commit()?;
            Ok(Ok(updated))
        })
        .await
        .map_err(map_tr_err)?
}

/// Cancel a booking, legal only from `created` or `assigned`.
///
/// Releases any reserved truck, records the reason and cancellation
/// timestamp, and writes the terminal history entry -- one transaction.
/// Cancelling an already-cancelled booking is rejected, not a silent no-op.
pub async fn cancel(
    db: &Database,
    id: &str,
    reason: String,
    actor: Option<String>,
) -> Result<Booking, TrucklineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(booking) = read_row(&tx, &id)? else {
                return Ok(Err(TrucklineError::NotFound { booking_id: id }));
            };
            if !booking.status.can_transition(BookingStatus::Cancelled) {
                return Ok(Err(TrucklineError::IllegalTransition {
                    from: booking.status,
                    to: BookingStatus::Cancelled,
                }));
            }

            let now = Utc::now();
            tx.execute(
                "UPDATE bookings SET status = 'cancelled', cancellation_reason = ?1,
                 cancelled_at = ?2, updated_at = ?2 WHERE id = ?3",
                params![reason, now.to_rfc3339(), id],
            )?;
            if let Some(truck_id) = &booking.truck_id {
                trucks::release(&tx, truck_id)?;
            }
            history::append(
                &tx,
                &id,
                BookingStatus::Cancelled,
                actor.as_deref(),
                Some(&reason),
                now,
            )?;
            tx.commit()?;

            Ok(Ok(Booking {
                status: BookingStatus::Cancelled,
                cancellation_reason: Some(reason),
                cancelled_at: Some(now),
                updated_at: now,
                ..booking
            }))
        })
        .await
        .map_err(map_tr_err)?
}

/// Attach a proof-of-delivery reference. Legal only once `delivered`;
/// does not change status.
pub async fn attach_pod(
    db: &Database,
    id: &str,
    reference: String,
) -> Result<Booking, TrucklineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let Some(booking) = read_row(&tx, &id)? else {
                return Ok(Err(TrucklineError::NotFound { booking_id: id }));
            };
            if booking.status != BookingStatus::Delivered {
                return Ok(Err(TrucklineError::Validation(format!(
                    "proof of delivery requires delivered status, booking is {}",
                    booking.status
                ))));
            }

            let now = Utc::now();
            tx.execute(
                "UPDATE bookings SET pod_reference = ?1, updated_at = ?2 WHERE id = ?3",
                params![reference, now.to_rfc3339(), id],
            )?;
            tx.commit()?;

            Ok(Ok(Booking {
                pod_reference: Some(reference),
                updated_at: now,
                ..booking
            }))
        })
        .await
        .map_err(map_tr_err)?
}

/// Read a booking by ID. This is also the polling fallback's read path.
pub async fn get(db: &Database, id: &str) -> Result<Option<Booking>, TrucklineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
            let result = conn.query_row(&sql, params![id], booking_from_row);
            match result {
                Ok(booking) => Ok(Some(booking)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

fn read_row(tx: &Transaction<'_>, id: &str) -> rusqlite::Result<Option<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1");
    match tx.query_row(&sql, params![id], booking_from_row) {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

fn insert_row(tx: &Transaction<'_>, b: &Booking) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO bookings (
            id, booking_number,
            pickup_address, pickup_lat, pickup_lng, pickup_postal_code, pickup_jurisdiction,
            delivery_address, delivery_lat, delivery_lng, delivery_postal_code, delivery_jurisdiction,
            cargo_type, cargo_weight_tonnes, cargo_volume_m3, cargo_tariff_code,
            distance_km, requested_pickup_at, status, truck_id, driver_id,
            base_price, fuel_surcharge, toll_surcharge, cgst, sgst, igst, total_price, currency,
            created_at, updated_at
         ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
            ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31
         )",
        params![
            b.id,
            b.booking_number,
            b.pickup.address,
            b.pickup.latitude,
            b.pickup.longitude,
            b.pickup.postal_code,
            b.pickup.jurisdiction,
            b.delivery.address,
            b.delivery.latitude,
            b.delivery.longitude,
            b.delivery.postal_code,
            b.delivery.jurisdiction,
            b.cargo.cargo_type,
            b.cargo.weight_tonnes,
            b.cargo.volume_m3,
            b.cargo.tariff_code,
            b.distance_km,
            b.requested_pickup_at.to_rfc3339(),
            b.status.to_string(),
            b.truck_id,
            b.driver_id,
            b.price.base_price,
            b.price.fuel_surcharge,
            b.price.toll_surcharge,
            b.price.cgst,
            b.price.sgst,
            b.price.igst,
            b.price.total,
            b.price.currency,
            b.created_at.to_rfc3339(),
            b.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;
    use truckline_core::{CargoDetails, Location, PriceBreakdown};

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn location(jurisdiction: &str) -> Location {
        Location {
            address: "Plot 12, MIDC".into(),
            latitude: 19.076,
            longitude: 72.8777,
            postal_code: "400001".into(),
            jurisdiction: jurisdiction.into(),
        }
    }

    fn make_booking(id: &str) -> Booking {
        let now = Utc::now();
        Booking {
            id: id.to_string(),
            booking_number: format!("TL-test-{id}"),
            pickup: location("MH"),
            delivery: location("MH"),
            cargo: CargoDetails {
                cargo_type: "steel coils".into(),
                weight_tonnes: 12.0,
                volume_m3: None,
                tariff_code: None,
            },
            distance_km: 50.0,
            requested_pickup_at: now + Duration::hours(4),
            status: BookingStatus::Created,
            truck_id: None,
            driver_id: None,
            price: PriceBreakdown {
                base_price: 3000.0,
                fuel_surcharge: 0.0,
                toll_surcharge: 0.0,
                cgst: 270.0,
                sgst: 270.0,
                igst: 0.0,
                total: 3540.0,
                currency: "INR".into(),
            },
            actual_pickup_at: None,
            actual_delivery_at: None,
            cancellation_reason: None,
            cancelled_at: None,
            pod_reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_truck(id: &str, capacity: CapacityTier) -> Truck {
        Truck {
            id: id.to_string(),
            registration: format!("MH04-{id}"),
            capacity,
            is_available: true,
            driver_id: Some(format!("driver-{id}")),
            created_at: Utc::now(),
        }
    }

    async fn create(db: &Database, id: &str) -> Booking {
        create_with_assignment(db, make_booking(id), CapacityTier::T15, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn creation_with_truck_assigns_and_logs_twice() {
        let (db, _dir) = setup_db().await;
        trucks::insert(&db, &make_truck("t-1", CapacityTier::T15)).await.unwrap();

        let booking = create(&db, "b-1").await;
        assert_eq!(booking.status, BookingStatus::Assigned);
        assert_eq!(booking.truck_id.as_deref(), Some("t-1"));
        assert_eq!(booking.driver_id.as_deref(), Some("driver-t-1"));

        let entries = history::list(&db, "b-1").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, BookingStatus::Created);
        assert_eq!(entries[1].status, BookingStatus::Assigned);
        // Auto-assignment is a system action.
        assert!(entries[1].actor.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn creation_without_truck_soft_fails_to_created() {
        let (db, _dir) = setup_db().await;

        let booking = create(&db, "b-1").await;
        assert_eq!(booking.status, BookingStatus::Created);
        assert!(booking.truck_id.is_none());

        let entries = history::list(&db, "b-1").await.unwrap();
        assert_eq!(entries.len(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_creations_never_share_a_truck() {
        let (db, _dir) = setup_db().await;
        trucks::insert(&db, &make_truck("t-1", CapacityTier::T15)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                create_with_assignment(
                    &db,
                    make_booking(&format!("b-{i}")),
                    CapacityTier::T15,
                    None,
                )
                .await
                .unwrap()
            }));
        }

        let mut assigned = 0;
        let mut unassigned = 0;
        for handle in handles {
            let booking = handle.await.unwrap();
            match booking.status {
                BookingStatus::Assigned => {
                    assert_eq!(booking.truck_id.as_deref(), Some("t-1"));
                    assigned += 1;
                }
                BookingStatus::Created => {
                    assert!(booking.truck_id.is_none());
                    unassigned += 1;
                }
                other => panic!("unexpected status {other}"),
            }
        }
        assert_eq!(assigned, 1, "exactly one booking wins the single truck");
        assert_eq!(unassigned, 7);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn full_forward_lifecycle() {
        let (db, _dir) = setup_db().await;
        trucks::insert(&db, &make_truck("t-1", CapacityTier::T15)).await.unwrap();
        create(&db, "b-1").await;

        let b = transition_status(&db, "b-1", BookingStatus::PickedUp, Some("driver-t-1".into()), None)
            .await
            .unwrap();
        assert!(b.actual_pickup_at.is_some());

        transition_status(&db, "b-1", BookingStatus::InTransit, None, None).await.unwrap();
        let b = transition_status(&db, "b-1", BookingStatus::Delivered, None, None).await.unwrap();
        assert!(b.actual_delivery_at.is_some());

        // Truck released on delivery.
        let truck = trucks::get(&db, "t-1").await.unwrap().unwrap();
        assert!(truck.is_available);

        let entries = history::list(&db, "b-1").await.unwrap();
        let statuses: Vec<_> = entries.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                BookingStatus::Created,
                BookingStatus::Assigned,
                BookingStatus::PickedUp,
                BookingStatus::InTransit,
                BookingStatus::Delivered,
            ]
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn skipping_to_delivered_is_rejected_and_state_unchanged() {
        let (db, _dir) = setup_db().await;
        trucks::insert(&db, &make_truck("t-1", CapacityTier::T15)).await.unwrap();
        create(&db, "b-1").await;

        let err = transition_status(&db, "b-1", BookingStatus::Delivered, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TrucklineError::IllegalTransition {
                from: BookingStatus::Assigned,
                to: BookingStatus::Delivered,
            }
        ));

        let booking = get(&db, "b-1").await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Assigned);
        // No history entry for the rejected mutation.
        assert_eq!(history::list(&db, "b-1").await.unwrap().len(), 2);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn cancel_from_assigned_releases_truck() {
        let (db, _dir) = setup_db().await;
        trucks::insert(&db, &make_truck("t-1", CapacityTier::T15)).await.unwrap();
        create(&db, "b-1").await;

        let booking = cancel(&db, "b-1", "shipper changed plans".into(), Some("shipper-9".into()))
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.cancellation_reason.as_deref(), Some("shipper changed plans"));
        assert!(booking.cancelled_at.is_some());

        let truck = trucks::get(&db, "t-1").await.unwrap().unwrap();
        assert!(truck.is_available);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn cancelling_twice_is_rejected() {
        let (db, _dir) = setup_db().await;
        create(&db, "b-1").await;
        cancel(&db, "b-1", "first".into(), None).await.unwrap();

        let err = cancel(&db, "b-1", "second".into(), None).await.unwrap_err();
        assert!(matches!(
            err,
            TrucklineError::IllegalTransition {
                from: BookingStatus::Cancelled,
                ..
            }
        ));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn cancel_after_pickup_is_rejected() {
        let (db, _dir) = setup_db().await;
        trucks::insert(&db, &make_truck("t-1", CapacityTier::T15)).await.unwrap();
        create(&db, "b-1").await;
        transition_status(&db, "b-1", BookingStatus::PickedUp, None, None).await.unwrap();

        let err = cancel(&db, "b-1", "too late".into(), None).await.unwrap_err();
        assert!(matches!(err, TrucklineError::IllegalTransition { .. }));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn transition_to_cancelled_must_use_cancel() {
        let (db, _dir) = setup_db().await;
        create(&db, "b-1").await;
        let err = transition_status(&db, "b-1", BookingStatus::Cancelled, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TrucklineError::Validation(_)));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn pod_requires_delivered() {
        let (db, _dir) = setup_db().await;
        trucks::insert(&db, &make_truck("t-1", CapacityTier::T15)).await.unwrap();
        create(&db, "b-1").await;

        let err = attach_pod(&db, "b-1", "pod-scan-7781".into()).await.unwrap_err();
        assert!(matches!(err, TrucklineError::Validation(_)));

        transition_status(&db, "b-1", BookingStatus::PickedUp, None, None).await.unwrap();
        transition_status(&db, "b-1", BookingStatus::InTransit, None, None).await.unwrap();
        transition_status(&db, "b-1", BookingStatus::Delivered, None, None).await.unwrap();

        let booking = attach_pod(&db, "b-1", "pod-scan-7781".into()).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Delivered);
        assert_eq!(booking.pod_reference.as_deref(), Some("pod-scan-7781"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn transition_on_unknown_booking_is_not_found() {
        let (db, _dir) = setup_db().await;
        let err = transition_status(&db, "no-such", BookingStatus::PickedUp, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TrucklineError::NotFound { .. }));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_round_trips_all_fields() {
        let (db, _dir) = setup_db().await;
        create(&db, "b-1").await;

        let booking = get(&db, "b-1").await.unwrap().unwrap();
        assert_eq!(booking.booking_number, "TL-test-b-1");
        assert_eq!(booking.pickup.jurisdiction, "MH");
        assert_eq!(booking.cargo.weight_tonnes, 12.0);
        assert_eq!(booking.price.total, 3540.0);
        assert!(get(&db, "nope").await.unwrap().is_none());

        db.close().await.unwrap();
    }
}
