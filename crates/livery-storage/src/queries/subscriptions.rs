// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marketing email subscription lifecycle.
//!
//! Rows are keyed by lowercased email and never deleted; unsubscribe
//! flips `is_active` off so the unique row survives resubscription.

use rusqlite::{params, Row};

use livery_core::types::Contact;
use livery_core::LiveryError;

use crate::database::{map_tr_err, Database};
use crate::models::EmailSubscription;

fn subscription_from_row(row: &Row<'_>) -> rusqlite::Result<EmailSubscription> {
    Ok(EmailSubscription {
        id: row.get(0)?,
        email: row.get(1)?,
        is_active: row.get(2)?,
        discount_code: row.get(3)?,
        source: row.get(4)?,
        subscribed_at: row.get(5)?,
        unsubscribed_at: row.get(6)?,
    })
}

const SUBSCRIPTION_COLUMNS: &str =
    "id, email, is_active, discount_code, source, subscribed_at, unsubscribed_at";

/// Look a subscription up by email. The caller lowercases the address.
pub async fn get_by_email(
    db: &Database,
    email: &str,
) -> Result<Option<EmailSubscription>, LiveryError> {
    let email = email.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBSCRIPTION_COLUMNS} FROM email_subscriptions WHERE email = ?1"
            ))?;
            match stmt.query_row(params![email], subscription_from_row) {
                Ok(sub) => Ok(Some(sub)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a fresh active subscription and return the stored row.
pub async fn insert(
    db: &Database,
    email: &str,
    discount_code: &str,
    source: Option<&str>,
    subscribed_at: &str,
) -> Result<EmailSubscription, LiveryError> {
    let email = email.to_string();
    let discount_code = discount_code.to_string();
    let source = source.map(str::to_string);
    let subscribed_at = subscribed_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO email_subscriptions (email, is_active, discount_code, source, subscribed_at)
                 VALUES (?1, 1, ?2, ?3, ?4)",
                params![email, discount_code, source, subscribed_at],
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBSCRIPTION_COLUMNS} FROM email_subscriptions WHERE email = ?1"
            ))?;
            let sub = stmt.query_row(params![email], subscription_from_row)?;
            Ok(sub)
        })
        .await
        .map_err(map_tr_err)
}

/// Reactivate a lapsed subscription with a newly issued discount code.
pub async fn reactivate(
    db: &Database,
    email: &str,
    discount_code: &str,
    subscribed_at: &str,
) -> Result<EmailSubscription, LiveryError> {
    let email = email.to_string();
    let discount_code = discount_code.to_string();
    let subscribed_at = subscribed_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE email_subscriptions
                 SET is_active = 1, discount_code = ?1, subscribed_at = ?2, unsubscribed_at = NULL
                 WHERE email = ?3",
                params![discount_code, subscribed_at, email],
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBSCRIPTION_COLUMNS} FROM email_subscriptions WHERE email = ?1"
            ))?;
            let sub = stmt.query_row(params![email], subscription_from_row)?;
            Ok(sub)
        })
        .await
        .map_err(map_tr_err)
}

/// Deactivate a subscription. Returns `false` when no active row matched.
pub async fn deactivate(
    db: &Database,
    email: &str,
    unsubscribed_at: &str,
) -> Result<bool, LiveryError> {
    let email = email.to_string();
    let unsubscribed_at = unsubscribed_at.to_string();
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE email_subscriptions SET is_active = 0, unsubscribed_at = ?1
                 WHERE email = ?2 AND is_active = 1",
                params![unsubscribed_at, email],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// All active subscribers as email-only marketing contacts.
pub async fn list_active_contacts(db: &Database) -> Result<Vec<Contact>, LiveryError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT email FROM email_subscriptions WHERE is_active = 1 ORDER BY subscribed_at DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(Contact {
                    email: row.get(0)?,
                    name: None,
                    phone: None,
                })
            })?;
            let mut contacts = Vec::new();
            for row in rows {
                contacts.push(row?);
            }
            Ok(contacts)
        })
        .await
        .map_err(map_tr_err)
}

/// Count active subscribers without fetching rows.
pub async fn count_active(db: &Database) -> Result<i64, LiveryError> {
    db.connection()
        .call(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM email_subscriptions WHERE is_active = 1",
                [],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}
