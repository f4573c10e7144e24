// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row-mapping helpers between SQLite rows and the domain types in
//! `truckline-core`.
//!
//! Timestamps are stored as RFC 3339 TEXT; enums as their string labels.
//! The `*_COLUMNS` constants keep SELECT lists and the row mappers in sync.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

use truckline_core::{
    Booking, BookingStatus, CapacityTier, CargoDetails, Location, PriceBreakdown,
    StatusHistoryEntry, Truck,
};

/// SELECT list for booking rows, in the order `booking_from_row` expects.
pub(crate) const BOOKING_COLUMNS: &str = "id, booking_number, \
     pickup_address, pickup_lat, pickup_lng, pickup_postal_code, pickup_jurisdiction, \
     delivery_address, delivery_lat, delivery_lng, delivery_postal_code, delivery_jurisdiction, \
     cargo_type, cargo_weight_tonnes, cargo_volume_m3, cargo_tariff_code, \
     distance_km, requested_pickup_at, status, truck_id, driver_id, \
     base_price, fuel_surcharge, toll_surcharge, cgst, sgst, igst, total_price, currency, \
     actual_pickup_at, actual_delivery_at, cancellation_reason, cancelled_at, pod_reference, \
     created_at, updated_at";

/// SELECT list for truck rows.
pub(crate) const TRUCK_COLUMNS: &str =
    "id, registration, capacity_tier, is_available, driver_id, created_at";

/// SELECT list for status-history rows.
pub(crate) const HISTORY_COLUMNS: &str = "id, booking_id, status, actor, note, created_at";

pub(crate) fn booking_from_row(row: &Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        booking_number: row.get(1)?,
        pickup: Location {
            address: row.get(2)?,
            latitude: row.get(3)?,
            longitude: row.get(4)?,
            postal_code: row.get(5)?,
            jurisdiction: row.get(6)?,
        },
        delivery: Location {
            address: row.get(7)?,
            latitude: row.get(8)?,
            longitude: row.get(9)?,
            postal_code: row.get(10)?,
            jurisdiction: row.get(11)?,
        },
        cargo: CargoDetails {
            cargo_type: row.get(12)?,
            weight_tonnes: row.get(13)?,
            volume_m3: row.get(14)?,
            tariff_code: row.get(15)?,
        },
        distance_km: row.get(16)?,
        requested_pickup_at: parse_ts(17, row.get(17)?)?,
        status: parse_status(18, row.get(18)?)?,
        truck_id: row.get(19)?,
        driver_id: row.get(20)?,
        price: PriceBreakdown {
            base_price: row.get(21)?,
            fuel_surcharge: row.get(22)?,
            toll_surcharge: row.get(23)?,
            cgst: row.get(24)?,
            sgst: row.get(25)?,
            igst: row.get(26)?,
            total: row.get(27)?,
            currency: row.get(28)?,
        },
        actual_pickup_at: parse_opt_ts(29, row.get(29)?)?,
        actual_delivery_at: parse_opt_ts(30, row.get(30)?)?,
        cancellation_reason: row.get(31)?,
        cancelled_at: parse_opt_ts(32, row.get(32)?)?,
        pod_reference: row.get(33)?,
        created_at: parse_ts(34, row.get(34)?)?,
        updated_at: parse_ts(35, row.get(35)?)?,
    })
}

pub(crate) fn truck_from_row(row: &Row<'_>) -> rusqlite::Result<Truck> {
    let tier: String = row.get(2)?;
    Ok(Truck {
        id: row.get(0)?,
        registration: row.get(1)?,
        capacity: CapacityTier::from_str(&tier)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        is_available: row.get(3)?,
        driver_id: row.get(4)?,
        created_at: parse_ts(5, row.get(5)?)?,
    })
}

pub(crate) fn history_from_row(row: &Row<'_>) -> rusqlite::Result<StatusHistoryEntry> {
    Ok(StatusHistoryEntry {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        status: parse_status(2, row.get(2)?)?,
        actor: row.get(3)?,
        note: row.get(4)?,
        created_at: parse_ts(5, row.get(5)?)?,
    })
}

fn parse_ts(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_opt_ts(idx: usize, value: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value.map(|v| parse_ts(idx, v)).transpose()
}

fn parse_status(idx: usize, value: String) -> rusqlite::Result<BookingStatus> {
    BookingStatus::from_str(&value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
