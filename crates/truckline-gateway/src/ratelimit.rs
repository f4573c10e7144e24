// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-window rate limiting for booking creation.
//!
//! Purely in-memory counters: the check can only ever answer allow or
//! deny, never fail, so an infrastructure problem here cannot take the
//! booking path down. Counters reset at window boundaries; a burst
//! straddling two windows can briefly see up to twice the quota, which is
//! acceptable for an abuse guard.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Per-identifier fixed-window counter.
pub struct FixedWindowLimiter {
    quota: u32,
    window_secs: i64,
    /// identifier -> (window index, count in that window)
    counters: DashMap<String, (i64, u32)>,
}

impl FixedWindowLimiter {
    pub fn new(quota: u32, window_secs: u64) -> Self {
        Self {
            quota,
            window_secs: window_secs.max(1) as i64,
            counters: DashMap::new(),
        }
    }

    /// Record one attempt for `identifier` and report whether it is within
    /// quota for the current window.
    pub fn allow(&self, identifier: &str) -> bool {
        self.allow_at(identifier, Utc::now())
    }

    fn allow_at(&self, identifier: &str, now: DateTime<Utc>) -> bool {
        let window = now.timestamp().div_euclid(self.window_secs);
        // Counters from past windows can never deny again; evict them so
        // the map stays bounded by the set of currently active identifiers.
        self.counters.retain(|_, (stored, _)| *stored >= window);
        let mut entry = self
            .counters
            .entry(identifier.to_string())
            .or_insert((window, 0));
        let (stored_window, count) = *entry;
        if stored_window != window {
            *entry = (window, 1);
            return true;
        }
        if count >= self.quota {
            return false;
        }
        *entry = (window, count + 1);
        true
    }

    #[cfg(test)]
    fn tracked_identifiers(&self) -> usize {
        self.counters.len()
    }
}
