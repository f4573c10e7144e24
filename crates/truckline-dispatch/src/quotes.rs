// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory registry of unconsumed price quotes.
//!
//! Quotes are ephemeral: they live here from computation until consumed by
//! booking creation or until their validity window lapses. Consumption is a
//! single atomic `remove`, so a quote can never create two bookings.
//! This is volatile process state; a restart simply forces clients to
//! re-quote, which is cheaper than persisting something with a 15-minute
//! lifespan.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use truckline_core::{PriceQuote, TrucklineError};
use truckline_pricing::QuoteRequest;

/// A quote together with the request that produced it, kept so booking
/// creation can verify the submitted details match what was priced.
#[derive(Debug, Clone)]
pub struct StoredQuote {
    pub quote: PriceQuote,
    pub request: QuoteRequest,
}

/// Registry of quotes awaiting consumption, keyed by calculation ID.
#[derive(Default)]
pub struct QuoteRegistry {
    quotes: DashMap<String, StoredQuote>,
}

impl QuoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly computed quote.
    pub fn register(&self, quote: PriceQuote, request: QuoteRequest) {
        self.quotes
            .insert(quote.calculation_id.clone(), StoredQuote { quote, request });
    }

    /// Atomically consume a quote for booking creation.
    ///
    /// Unknown (or already consumed) IDs and lapsed validity windows are
    /// both rejected; an expired quote is dropped rather than reinserted
    /// since it can never become valid again.
    pub fn consume(
        &self,
        calculation_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StoredQuote, TrucklineError> {
        let (_, stored) =
            self.quotes
                .remove(calculation_id)
                .ok_or_else(|| TrucklineError::QuoteNotFound {
                    calculation_id: calculation_id.to_string(),
                })?;
        if now >= stored.quote.valid_until {
            return Err(TrucklineError::QuoteExpired {
                calculation_id: calculation_id.to_string(),
            });
        }
        Ok(stored)
    }

    /// Drop quotes whose validity window has lapsed.
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        self.quotes.retain(|_, stored| now < stored.quote.valid_until);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.quotes.len()
    }
}
