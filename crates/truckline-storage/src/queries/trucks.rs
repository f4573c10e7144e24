// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fleet queries: matching, reservation, and release.
//!
//! Selection and reservation are free functions over an explicit
//! `rusqlite::Transaction`, so the caller decides the transaction boundary.
//! Reserving inside the same transaction that created the booking is what
//! keeps two concurrent bookings from grabbing one truck.

use rusqlite::{params, Transaction};

use truckline_core::{CapacityTier, Truck, TrucklineError};

use crate::database::{map_tr_err, Database};
use crate::models::{truck_from_row, TRUCK_COLUMNS};

/// Select and reserve one available truck for the required capacity tier.
///
/// Eligible trucks have a driver assigned and the smallest capacity tier at
/// or above the requirement. Tie-break is lowest capacity first, then
/// earliest-created record, then id -- fully deterministic. The chosen truck
/// is flipped to unavailable in the caller's transaction; `None` means no
/// eligible truck (soft-fail, not an error).
pub fn reserve_matching(
    tx: &Transaction<'_>,
    tier: CapacityTier,
) -> rusqlite::Result<Option<Truck>> {
    let tier_list = match tier {
        CapacityTier::T5 => "('5T', '15T', '50T')",
        CapacityTier::T15 => "('15T', '50T')",
        CapacityTier::T50 => "('50T')",
    };
    let sql = format!(
        "SELECT {TRUCK_COLUMNS} FROM trucks
         WHERE is_available = 1 AND driver_id IS NOT NULL AND capacity_tier IN {tier_list}
         ORDER BY CASE capacity_tier WHEN '5T' THEN 1 WHEN '15T' THEN 2 ELSE 3 END,
                  created_at, id
         LIMIT 1"
    );

    let result = tx.query_row(&sql, [], truck_from_row);
    match result {
        Ok(mut truck) => {
            tx.execute(
                "UPDATE trucks SET is_available = 0 WHERE id = ?1",
                params![truck.id],
            )?;
            truck.is_available = false;
            Ok(Some(truck))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Flip a truck back to available. Used when a booking reaches a terminal
/// state; runs in the same transaction as the booking mutation.
pub fn release(tx: &Transaction<'_>, truck_id: &str) -> rusqlite::Result<()> {
    tx.execute(
        "UPDATE trucks SET is_available = 1 WHERE id = ?1",
        params![truck_id],
    )?;
    Ok(())
}

/// Insert a truck record. Fleet provisioning is an external concern; this
/// exists for seeding and tests.
pub async fn insert(db: &Database, truck: &Truck) -> Result<(), TrucklineError> {
    let truck = truck.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO trucks (id, registration, capacity_tier, is_available, driver_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    truck.id,
                    truck.registration,
                    truck.capacity.to_string(),
                    truck.is_available,
                    truck.driver_id,
                    truck.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List the whole fleet, oldest record first.
pub async fn list(db: &Database) -> Result<Vec<Truck>, TrucklineError> {
    db.connection()
        .call(|conn| {
            let sql = format!("SELECT {TRUCK_COLUMNS} FROM trucks ORDER BY created_at, id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], truck_from_row)?;
            let mut trucks = Vec::new();
            for row in rows {
                trucks.push(row?);
            }
            Ok(trucks)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one truck by ID.
pub async fn get(db: &Database, id: &str) -> Result<Option<Truck>, TrucklineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT {TRUCK_COLUMNS} FROM trucks WHERE id = ?1");
            let result = conn.query_row(&sql, params![id], truck_from_row);
            match result {
                Ok(truck) => Ok(Some(truck)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}
