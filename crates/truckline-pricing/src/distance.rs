// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Great-circle distance via the haversine formula.
//!
//! This is a closed-form calculation, not road routing. Distances are
//! rounded to one decimal place before they enter pricing.

use truckline_core::Location;

/// Mean earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two locations, rounded to one decimal place.
pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    let km = 2.0 * EARTH_RADIUS_KM * h.sqrt().asin();

    (km * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(lat: f64, lng: f64) -> Location {
        Location {
            address: "test".into(),
            latitude: lat,
            longitude: lng,
            postal_code: "000000".into(),
            jurisdiction: "XX".into(),
        }
    }

    #[test]
    fn identical_points_are_zero() {
        let a = location(19.076, 72.8777);
        assert_eq!(haversine_km(&a, &a), 0.0);
    }

    #[test]
    fn mumbai_to_pune_is_about_120km() {
        // Mumbai 19.0760N 72.8777E, Pune 18.5204N 73.8567E.
        let mumbai = location(19.076, 72.8777);
        let pune = location(18.5204, 73.8567);
        let d = haversine_km(&mumbai, &pune);
        assert!((115.0..125.0).contains(&d), "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = location(19.076, 72.8777);
        let b = location(28.6139, 77.209);
        assert_eq!(haversine_km(&a, &b), haversine_km(&b, &a));
    }

    #[test]
    fn result_has_one_decimal_place() {
        let a = location(19.076, 72.8777);
        let b = location(18.5204, 73.8567);
        let d = haversine_km(&a, &b);
        assert_eq!((d * 10.0).round() / 10.0, d);
    }
}
