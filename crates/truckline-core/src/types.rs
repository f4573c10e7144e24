// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain entity types shared across the Truckline crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{BookingStatus, CapacityTier};

/// A pickup or delivery point on the corridor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub postal_code: String,
    /// Tax jurisdiction code (state code). The tax split rule compares the
    /// pickup and delivery jurisdictions for equality.
    pub jurisdiction: String,
}

/// Cargo descriptor supplied by the shipper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoDetails {
    pub cargo_type: String,
    pub weight_tonnes: f64,
    #[serde(default)]
    pub volume_m3: Option<f64>,
    #[serde(default)]
    pub tariff_code: Option<String>,
}

/// Itemized price breakdown persisted with the booking.
///
/// Exactly one tax scheme is non-zero: `cgst` + `sgst` (equal halves) for
/// intra-jurisdiction trips, `igst` for interstate trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_price: f64,
    pub fuel_surcharge: f64,
    pub toll_surcharge: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub total: f64,
    pub currency: String,
}

/// A time-bounded price computation.
///
/// Usable to create a booking only while `now < valid_until`; single-use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub calculation_id: String,
    pub distance_km: f64,
    pub breakdown: PriceBreakdown,
    pub valid_until: DateTime<Utc>,
}

/// A freight booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Opaque, stable identity.
    pub id: String,
    /// Human-readable, time-ordered number.
    pub booking_number: String,
    pub pickup: Location,
    pub delivery: Location,
    pub cargo: CargoDetails,
    pub distance_km: f64,
    pub requested_pickup_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub truck_id: Option<String>,
    pub driver_id: Option<String>,
    pub price: PriceBreakdown,
    pub actual_pickup_at: Option<DateTime<Utc>>,
    pub actual_delivery_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub pod_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only status-history record. One entry is written for every status
/// transition and for truck auto-assignment, in the same transaction as the
/// booking mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: i64,
    pub booking_id: String,
    pub status: BookingStatus,
    /// Who changed it; `None` for system actions (auto-assignment).
    pub actor: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A truck in the corridor fleet.
///
/// Pre-provisioned externally; this core only flips `is_available`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
    pub id: String,
    pub registration: String,
    pub capacity: CapacityTier,
    pub is_available: bool,
    pub driver_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Status-change notification emitted after each committed mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub booking_id: String,
    pub booking_number: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub eta_minutes: Option<u32>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cargo_details_optional_fields_default() {
        let json = r#"{"cargo_type": "steel coils", "weight_tonnes": 12.0}"#;
        let cargo: CargoDetails = serde_json::from_str(json).unwrap();
        assert_eq!(cargo.weight_tonnes, 12.0);
        assert!(cargo.volume_m3.is_none());
        assert!(cargo.tariff_code.is_none());
    }

    #[test]
    fn status_serializes_snake_case_in_booking_json() {
        let event = StatusEvent {
            booking_id: "b-1".into(),
            booking_number: "TL260829120000a1b2".into(),
            status: BookingStatus::InTransit,
            eta_minutes: Some(67),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"status\":\"in_transit\""));
        assert!(json.contains("\"eta_minutes\":67"));
    }

    #[test]
    fn price_quote_round_trips() {
        let quote = PriceQuote {
            calculation_id: "calc-1".into(),
            distance_km: 50.0,
            breakdown: PriceBreakdown {
                base_price: 2500.0,
                fuel_surcharge: 0.0,
                toll_surcharge: 0.0,
                cgst: 225.0,
                sgst: 225.0,
                igst: 0.0,
                total: 2950.0,
                currency: "INR".into(),
            },
            valid_until: Utc::now(),
        };
        let json = serde_json::to_string(&quote).unwrap();
        let parsed: PriceQuote = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, quote);
    }
}
