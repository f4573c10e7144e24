// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stateless ETA heuristic.
//!
//! Movement phases estimate from remaining distance at a fixed average speed
//! for the phase; dwell phases return a fixed loading/unloading duration.
//! A status that maps to no phase yields no estimate (explicit `None`,
//! never zero).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use truckline_core::BookingStatus;

/// Average speed on the city leg to the pickup point, km/h.
pub const CITY_SPEED_KMH: f64 = 25.0;

/// Average speed on the highway leg between corridors, km/h.
pub const HIGHWAY_SPEED_KMH: f64 = 45.0;

/// Fixed loading/unloading dwell, minutes.
pub const DWELL_MINUTES: u32 = 45;

/// Movement or dwell phase of a tracked shipment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrackingPhase {
    EnRouteToPickup,
    ArrivedAtPickup,
    InTransit,
    ArrivedAtDelivery,
}

impl TrackingPhase {
    /// Phase implied by a booking status, where one is implied at all.
    ///
    /// `assigned` means the truck is heading to the pickup point;
    /// `in_transit` is the highway leg. Other statuses carry no phase.
    pub fn for_booking_status(status: BookingStatus) -> Option<TrackingPhase> {
        match status {
            BookingStatus::Assigned => Some(TrackingPhase::EnRouteToPickup),
            BookingStatus::InTransit => Some(TrackingPhase::InTransit),
            _ => None,
        }
    }
}

/// Estimate minutes remaining for a phase.
///
/// Movement phases: `ceil(remaining_km / speed x 60)`. Dwell phases: the
/// fixed [`DWELL_MINUTES`], independent of distance.
pub fn eta_minutes(phase: TrackingPhase, remaining_km: f64) -> Option<u32> {
    match phase {
        TrackingPhase::EnRouteToPickup => Some(minutes_at(remaining_km, CITY_SPEED_KMH)),
        TrackingPhase::InTransit => Some(minutes_at(remaining_km, HIGHWAY_SPEED_KMH)),
        TrackingPhase::ArrivedAtPickup | TrackingPhase::ArrivedAtDelivery => {
            Some(DWELL_MINUTES)
        }
    }
}

fn minutes_at(remaining_km: f64, speed_kmh: f64) -> u32 {
    (remaining_km.max(0.0) / speed_kmh * 60.0).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn highway_leg_rounds_up() {
        // 50 km at 45 km/h = 66.67 min, ceil to 67.
        assert_eq!(eta_minutes(TrackingPhase::InTransit, 50.0), Some(67));
    }

    #[test]
    fn city_leg_uses_city_speed() {
        // 25 km at 25 km/h = exactly 60 minutes.
        assert_eq!(eta_minutes(TrackingPhase::EnRouteToPickup, 25.0), Some(60));
    }

    #[test]
    fn dwell_phases_ignore_distance() {
        assert_eq!(
            eta_minutes(TrackingPhase::ArrivedAtPickup, 999.0),
            Some(DWELL_MINUTES)
        );
        assert_eq!(
            eta_minutes(TrackingPhase::ArrivedAtDelivery, 0.0),
            Some(DWELL_MINUTES)
        );
    }

    #[test]
    fn unknown_phase_string_does_not_parse() {
        assert!(TrackingPhase::from_str("teleporting").is_err());
    }

    #[test]
    fn statuses_without_movement_have_no_phase() {
        assert_eq!(TrackingPhase::for_booking_status(BookingStatus::Created), None);
        assert_eq!(TrackingPhase::for_booking_status(BookingStatus::Delivered), None);
        assert_eq!(TrackingPhase::for_booking_status(BookingStatus::Cancelled), None);
        assert_eq!(
            TrackingPhase::for_booking_status(BookingStatus::InTransit),
            Some(TrackingPhase::InTransit)
        );
        assert_eq!(
            TrackingPhase::for_booking_status(BookingStatus::Assigned),
            Some(TrackingPhase::EnRouteToPickup)
        );
    }

    #[test]
    fn zero_distance_movement_is_zero_minutes() {
        assert_eq!(eta_minutes(TrackingPhase::InTransit, 0.0), Some(0));
    }
}
