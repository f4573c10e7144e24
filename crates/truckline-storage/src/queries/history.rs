// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only status-history log.
//!
//! `append` is a free function over the caller's transaction: every booking
//! mutation writes its history entry in the same transaction, so history
//! and booking state can never diverge.

use chrono::{DateTime, Utc};
use rusqlite::{params, Transaction};

use truckline_core::{BookingStatus, StatusHistoryEntry, TrucklineError};

use crate::database::{map_tr_err, Database};
use crate::models::{history_from_row, HISTORY_COLUMNS};

/// Append one history entry inside the caller's transaction.
///
/// `actor` is `None` for system actions such as truck auto-assignment.
pub fn append(
    tx: &Transaction<'_>,
    booking_id: &str,
    status: BookingStatus,
    actor: Option<&str>,
    note: Option<&str>,
    at: DateTime<Utc>,
) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO status_history (booking_id, status, actor, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![booking_id, status.to_string(), actor, note, at.to_rfc3339()],
    )?;
    Ok(())
}

/// List a booking's history in insertion order (strictly ordered per booking).
pub async fn list(
    db: &Database,
    booking_id: &str,
) -> Result<Vec<StatusHistoryEntry>, TrucklineError> {
    let booking_id = booking_id.to_string();
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT {HISTORY_COLUMNS} FROM status_history WHERE booking_id = ?1 ORDER BY id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![booking_id], history_from_row)?;
            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
        .map_err(map_tr_err)
}
