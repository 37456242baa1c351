// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only activity log attached to quotes.

use rusqlite::params;

use livery_core::LiveryError;

use crate::database::{map_tr_err, Database};
use crate::models::QuoteActivity;

/// Append one activity entry. `details` is an opaque JSON payload.
pub async fn record_activity(
    db: &Database,
    quote_id: &str,
    action_type: &str,
    details: serde_json::Value,
    created_at: &str,
) -> Result<(), LiveryError> {
    let quote_id = quote_id.to_string();
    let action_type = action_type.to_string();
    let created_at = created_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO quote_activities (quote_id, action_type, details, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![quote_id, action_type, details.to_string(), created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All activity for a quote, oldest first.
pub async fn list_for_quote(
    db: &Database,
    quote_id: &str,
) -> Result<Vec<QuoteActivity>, LiveryError> {
    let quote_id = quote_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, quote_id, action_type, details, created_at
                 FROM quote_activities WHERE quote_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![quote_id], |row| {
                let details_raw: String = row.get(3)?;
                let details = serde_json::from_str(&details_raw).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(QuoteActivity {
                    id: row.get(0)?,
                    quote_id: row.get(1)?,
                    action_type: row.get(2)?,
                    details,
                    created_at: row.get(4)?,
                })
            })?;
            let mut activities = Vec::new();
            for row in rows {
                activities.push(row?);
            }
            Ok(activities)
        })
        .await
        .map_err(map_tr_err)
}
