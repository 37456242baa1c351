// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign records and their send-state transitions.

use rusqlite::{params, Row};

use livery_core::types::CampaignStatus;
use livery_core::LiveryError;

use crate::database::{map_tr_err, Database};
use crate::models::Campaign;

const CAMPAIGN_COLUMNS: &str = "id, audience_id, subject, template_type, html_content, status, \
     sent_count, open_count, click_count, sent_at, created_at, updated_at";

fn campaign_from_row(row: &Row<'_>) -> rusqlite::Result<Campaign> {
    let status_raw: String = row.get(5)?;
    let status: CampaignStatus = status_raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Campaign {
        id: row.get(0)?,
        audience_id: row.get(1)?,
        subject: row.get(2)?,
        template_type: row.get(3)?,
        html_content: row.get(4)?,
        status,
        sent_count: row.get(6)?,
        open_count: row.get(7)?,
        click_count: row.get(8)?,
        sent_at: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

/// Insert a draft campaign and return the stored row.
pub async fn create(db: &Database, campaign: &Campaign) -> Result<Campaign, LiveryError> {
    let campaign = campaign.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO marketing_campaigns (id, audience_id, subject, template_type, \
                 html_content, status, sent_count, open_count, click_count, sent_at, \
                 created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    campaign.id,
                    campaign.audience_id,
                    campaign.subject,
                    campaign.template_type,
                    campaign.html_content,
                    campaign.status.to_string(),
                    campaign.sent_count,
                    campaign.open_count,
                    campaign.click_count,
                    campaign.sent_at,
                    campaign.created_at,
                    campaign.updated_at,
                ],
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {CAMPAIGN_COLUMNS} FROM marketing_campaigns WHERE id = ?1"
            ))?;
            let created = stmt.query_row(params![campaign.id], campaign_from_row)?;
            Ok(created)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a campaign by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<Campaign>, LiveryError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CAMPAIGN_COLUMNS} FROM marketing_campaigns WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], campaign_from_row) {
                Ok(campaign) => Ok(Some(campaign)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All campaigns, newest first.
pub async fn list(db: &Database) -> Result<Vec<Campaign>, LiveryError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CAMPAIGN_COLUMNS} FROM marketing_campaigns ORDER BY created_at DESC"
            ))?;
            let rows = stmt.query_map([], campaign_from_row)?;
            let mut campaigns = Vec::new();
            for row in rows {
                campaigns.push(row?);
            }
            Ok(campaigns)
        })
        .await
        .map_err(map_tr_err)
}

/// Conditionally move a draft campaign to `sending`.
///
/// Only a draft may start sending, so concurrent send requests for the
/// same campaign resolve to one winner. Returns `true` when this call
/// claimed the campaign.
pub async fn mark_sending_if_draft(
    db: &Database,
    id: &str,
    updated_at: &str,
) -> Result<bool, LiveryError> {
    let id = id.to_string();
    let updated_at = updated_at.to_string();
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE marketing_campaigns SET status = 'sending', updated_at = ?1
                 WHERE id = ?2 AND status = 'draft'",
                params![updated_at, id],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Record the outcome of a finished send run.
pub async fn finalize(
    db: &Database,
    id: &str,
    status: CampaignStatus,
    sent_count: i64,
    sent_at: Option<&str>,
    updated_at: &str,
) -> Result<(), LiveryError> {
    let id = id.to_string();
    let sent_at = sent_at.map(str::to_string);
    let updated_at = updated_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE marketing_campaigns
                 SET status = ?1, sent_count = ?2, sent_at = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![status.to_string(), sent_count, sent_at, updated_at, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
