// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted audience definitions.

use rusqlite::{params, Row};

use livery_core::types::{CustomFilter, Segment};
use livery_core::LiveryError;

use crate::database::{map_tr_err, Database};
use crate::models::Audience;

const AUDIENCE_COLUMNS: &str = "id, name, description, segment_id, custom_filter, contact_count, \
     external_audience_ref, created_at, updated_at";

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn audience_from_row(row: &Row<'_>) -> rusqlite::Result<Audience> {
    let segment_raw: String = row.get(3)?;
    let segment_id: Segment = segment_raw.parse().map_err(|e| conversion_err(3, e))?;
    let custom_filter: Option<CustomFilter> = match row.get::<_, Option<String>>(4)? {
        Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| conversion_err(4, e))?),
        None => None,
    };
    Ok(Audience {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        segment_id,
        custom_filter,
        contact_count: row.get(5)?,
        external_audience_ref: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Insert an audience and return the stored row.
pub async fn create(db: &Database, audience: &Audience) -> Result<Audience, LiveryError> {
    let audience = audience.clone();
    db.connection()
        .call(move |conn| {
            let filter_json = match &audience.custom_filter {
                Some(f) => Some(serde_json::to_string(f).map_err(|e| conversion_err(4, e))?),
                None => None,
            };
            conn.execute(
                "INSERT INTO marketing_audiences (id, name, description, segment_id, \
                 custom_filter, contact_count, external_audience_ref, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    audience.id,
                    audience.name,
                    audience.description,
                    audience.segment_id.to_string(),
                    filter_json,
                    audience.contact_count,
                    audience.external_audience_ref,
                    audience.created_at,
                    audience.updated_at,
                ],
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {AUDIENCE_COLUMNS} FROM marketing_audiences WHERE id = ?1"
            ))?;
            let created = stmt.query_row(params![audience.id], audience_from_row)?;
            Ok(created)
        })
        .await
        .map_err(map_tr_err)
}

/// Get an audience by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<Audience>, LiveryError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {AUDIENCE_COLUMNS} FROM marketing_audiences WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], audience_from_row) {
                Ok(audience) => Ok(Some(audience)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All audiences, newest first.
pub async fn list(db: &Database) -> Result<Vec<Audience>, LiveryError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {AUDIENCE_COLUMNS} FROM marketing_audiences ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map([], audience_from_row)?;
            let mut audiences = Vec::new();
            for row in rows {
                audiences.push(row?);
            }
            Ok(audiences)
        })
        .await
        .map_err(map_tr_err)
}

/// Refresh the cached contact count.
pub async fn update_contact_count(
    db: &Database,
    id: &str,
    contact_count: i64,
    updated_at: &str,
) -> Result<(), LiveryError> {
    let id = id.to_string();
    let updated_at = updated_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE marketing_audiences SET contact_count = ?1, updated_at = ?2 WHERE id = ?3",
                params![contact_count, updated_at, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
