// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking status state machine and truck capacity tiers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle status of a booking.
///
/// Transitions only move forward through
/// `created -> assigned -> picked_up -> in_transit -> delivered`, with
/// `cancelled` reachable from `created` or `assigned` only (not once cargo
/// has moved). `delivered` and `cancelled` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Created,
    Assigned,
    PickedUp,
    InTransit,
    Delivered,
    Cancelled,
}

impl BookingStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Delivered | BookingStatus::Cancelled)
    }

    /// Whether the edge `self -> to` is legal.
    pub fn can_transition(self, to: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, to) {
            (Created, Assigned) => true,
            (Assigned, PickedUp) => true,
            (PickedUp, InTransit) => true,
            (InTransit, Delivered) => true,
            (Created, Cancelled) | (Assigned, Cancelled) => true,
            _ => false,
        }
    }
}

/// Discrete truck size classes used to match cargo weight to a truck.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
pub enum CapacityTier {
    #[strum(serialize = "5T")]
    #[serde(rename = "5T")]
    T5,
    #[strum(serialize = "15T")]
    #[serde(rename = "15T")]
    T15,
    #[strum(serialize = "50T")]
    #[serde(rename = "50T")]
    T50,
}

impl CapacityTier {
    /// Rated payload in tonnes.
    pub fn tonnage(self) -> f64 {
        match self {
            CapacityTier::T5 => 5.0,
            CapacityTier::T15 => 15.0,
            CapacityTier::T50 => 50.0,
        }
    }

    /// Smallest tier whose rated payload covers `weight_tonnes`.
    ///
    /// Returns `None` above the 50 t ceiling; weights are validated against
    /// the same ceiling at the pricing boundary, so `None` here means the
    /// caller skipped validation.
    pub fn for_weight(weight_tonnes: f64) -> Option<CapacityTier> {
        [CapacityTier::T5, CapacityTier::T15, CapacityTier::T50]
            .into_iter()
            .find(|tier| weight_tonnes <= tier.tonnage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn forward_edges_are_legal() {
        use BookingStatus::*;
        assert!(Created.can_transition(Assigned));
        assert!(Assigned.can_transition(PickedUp));
        assert!(PickedUp.can_transition(InTransit));
        assert!(InTransit.can_transition(Delivered));
    }

    #[test]
    fn cancellation_only_before_pickup() {
        use BookingStatus::*;
        assert!(Created.can_transition(Cancelled));
        assert!(Assigned.can_transition(Cancelled));
        assert!(!PickedUp.can_transition(Cancelled));
        assert!(!InTransit.can_transition(Cancelled));
        assert!(!Delivered.can_transition(Cancelled));
    }

    #[test]
    fn no_transition_out_of_terminal_states() {
        use BookingStatus::*;
        for target in [Created, Assigned, PickedUp, InTransit, Delivered, Cancelled] {
            assert!(!Delivered.can_transition(target), "delivered -> {target}");
            assert!(!Cancelled.can_transition(target), "cancelled -> {target}");
        }
    }

    #[test]
    fn skipping_states_is_illegal() {
        use BookingStatus::*;
        assert!(!Assigned.can_transition(Delivered));
        assert!(!Created.can_transition(InTransit));
        assert!(!Assigned.can_transition(InTransit));
    }

    #[test]
    fn backward_edges_are_illegal() {
        use BookingStatus::*;
        assert!(!Delivered.can_transition(PickedUp));
        assert!(!InTransit.can_transition(Assigned));
        assert!(!Assigned.can_transition(Created));
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            BookingStatus::Created,
            BookingStatus::Assigned,
            BookingStatus::PickedUp,
            BookingStatus::InTransit,
            BookingStatus::Delivered,
            BookingStatus::Cancelled,
        ] {
            let s = status.to_string();
            assert_eq!(BookingStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(BookingStatus::PickedUp.to_string(), "picked_up");
    }

    #[test]
    fn weight_maps_to_smallest_sufficient_tier() {
        assert_eq!(CapacityTier::for_weight(0.5), Some(CapacityTier::T5));
        assert_eq!(CapacityTier::for_weight(5.0), Some(CapacityTier::T5));
        assert_eq!(CapacityTier::for_weight(12.0), Some(CapacityTier::T15));
        assert_eq!(CapacityTier::for_weight(15.0), Some(CapacityTier::T15));
        assert_eq!(CapacityTier::for_weight(49.9), Some(CapacityTier::T50));
        assert_eq!(CapacityTier::for_weight(50.1), None);
    }

    #[test]
    fn tier_parses_from_label() {
        assert_eq!(CapacityTier::from_str("15T").unwrap(), CapacityTier::T15);
        assert_eq!(CapacityTier::T50.to_string(), "50T");
    }

    #[test]
    fn tier_ordering_follows_tonnage() {
        assert!(CapacityTier::T5 < CapacityTier::T15);
        assert!(CapacityTier::T15 < CapacityTier::T50);
    }
}
