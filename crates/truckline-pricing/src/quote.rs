// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quote computation: base price, surcharges, and the GST-style tax split.
//!
//! Pricing is a pure function of the request and the supplied clock -- no
//! external state. Policy constants are fixed, not configurable per call.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use truckline_core::{CargoDetails, Location, PriceBreakdown, PriceQuote, TrucklineError};

use crate::distance::haversine_km;

/// Corridor rate in currency units per tonne-kilometre.
pub const RATE_PER_TONNE_KM: f64 = 5.0;

/// Floor applied to the base price regardless of distance and weight.
pub const MIN_CHARGE: f64 = 500.0;

/// Combined tax rate applied on top of base price plus surcharges.
pub const TAX_RATE: f64 = 0.18;

/// Minimum bookable cargo weight in tonnes.
pub const MIN_WEIGHT_TONNES: f64 = 0.1;

/// Maximum bookable cargo weight in tonnes.
pub const MAX_WEIGHT_TONNES: f64 = 50.0;

/// How long a quote stays consumable after computation.
pub const QUOTE_VALIDITY_MINUTES: i64 = 15;

/// Input to the pricing engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub pickup: Location,
    pub delivery: Location,
    pub cargo: CargoDetails,
    #[serde(default)]
    pub fuel_surcharge: f64,
    #[serde(default)]
    pub toll_surcharge: f64,
}

/// Compute a time-bounded price quote.
///
/// `base = max(distance_km x weight_tonnes x RATE_PER_TONNE_KM, MIN_CHARGE)`,
/// surcharges are additive line items, and tax is [`TAX_RATE`] of
/// `base + surcharges`. The tax amount splits into two equal domestic
/// components (CGST/SGST) when pickup and delivery share a jurisdiction
/// code, otherwise it is allocated entirely to the interstate component
/// (IGST). `valid_until = now + QUOTE_VALIDITY_MINUTES`.
///
/// All rejections here are caller input errors, never retryable.
pub fn compute_quote(
    request: &QuoteRequest,
    now: DateTime<Utc>,
) -> Result<PriceQuote, TrucklineError> {
    validate_location(&request.pickup, "pickup")?;
    validate_location(&request.delivery, "delivery")?;

    let weight = request.cargo.weight_tonnes;
    if !(MIN_WEIGHT_TONNES..=MAX_WEIGHT_TONNES).contains(&weight) {
        return Err(TrucklineError::Validation(format!(
            "cargo weight must be within {MIN_WEIGHT_TONNES}-{MAX_WEIGHT_TONNES} tonnes, got {weight}"
        )));
    }
    if request.cargo.cargo_type.trim().is_empty() {
        return Err(TrucklineError::Validation(
            "cargo_type must not be empty".into(),
        ));
    }
    if request.fuel_surcharge < 0.0 || request.toll_surcharge < 0.0 {
        return Err(TrucklineError::Validation(
            "surcharges must be non-negative".into(),
        ));
    }

    let distance_km = haversine_km(&request.pickup, &request.delivery);
    if distance_km <= 0.0 {
        return Err(TrucklineError::Validation(
            "pickup and delivery must be distinct points".into(),
        ));
    }

    let base_price = round2((distance_km * weight * RATE_PER_TONNE_KM).max(MIN_CHARGE));
    let surcharges = request.fuel_surcharge + request.toll_surcharge;
    let tax = round2((base_price + surcharges) * TAX_RATE);

    // GST rule: equal CGST/SGST halves within one jurisdiction, IGST across.
    let (cgst, sgst, igst) = if request.pickup.jurisdiction == request.delivery.jurisdiction {
        (round2(tax / 2.0), round2(tax / 2.0), 0.0)
    } else {
        (0.0, 0.0, tax)
    };

    let total = round2(base_price + surcharges + cgst + sgst + igst);

    Ok(PriceQuote {
        calculation_id: uuid::Uuid::new_v4().to_string(),
        distance_km,
        breakdown: PriceBreakdown {
            base_price,
            fuel_surcharge: request.fuel_surcharge,
            toll_surcharge: request.toll_surcharge,
            cgst,
            sgst,
            igst,
            total,
            currency: "INR".to_string(),
        },
        valid_until: now + Duration::minutes(QUOTE_VALIDITY_MINUTES),
    })
}

fn validate_location(location: &Location, label: &str) -> Result<(), TrucklineError> {
    if !(-90.0..=90.0).contains(&location.latitude)
        || !(-180.0..=180.0).contains(&location.longitude)
    {
        return Err(TrucklineError::Validation(format!(
            "{label} coordinates out of range: ({}, {})",
            location.latitude, location.longitude
        )));
    }
    if location.jurisdiction.trim().is_empty() {
        return Err(TrucklineError::Validation(format!(
            "{label} jurisdiction code must not be empty"
        )));
    }
    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
