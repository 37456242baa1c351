// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRUD and filter operations on the quotes table.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

use livery_core::types::{BookingStatus, Contact, Destinations, TripLeg};
use livery_core::LiveryError;

use crate::database::{map_tr_err, Database};
use crate::models::Quote;

const QUOTE_COLUMNS: &str = "id, confirmation_token, status, pickup_location, dropoff_location, \
     destinations, date, time, city_date_time, service_type, vehicle_name, passenger_count, \
     quoted_price, name, email, phone, trip_leg, related_booking_id, source, source_page, \
     utm_source, utm_medium, utm_campaign, created_at, updated_at, quote_accepted_at";

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn quote_from_row(row: &Row<'_>) -> rusqlite::Result<Quote> {
    let status_raw: String = row.get(2)?;
    let status: BookingStatus = status_raw.parse().map_err(|e| conversion_err(2, e))?;

    let destinations_raw: String = row.get(5)?;
    let destinations: Destinations =
        serde_json::from_str(&destinations_raw).map_err(|e| conversion_err(5, e))?;

    let trip_leg: Option<TripLeg> = match row.get::<_, Option<String>>(16)? {
        Some(raw) => Some(raw.parse().map_err(|e| conversion_err(16, e))?),
        None => None,
    };

    Ok(Quote {
        id: row.get(0)?,
        confirmation_token: row.get(1)?,
        status,
        pickup_location: row.get(3)?,
        dropoff_location: row.get(4)?,
        destinations,
        date: row.get(6)?,
        time: row.get(7)?,
        city_date_time: row.get(8)?,
        service_type: row.get(9)?,
        vehicle_name: row.get(10)?,
        passenger_count: row.get(11)?,
        quoted_price: row.get(12)?,
        name: row.get(13)?,
        email: row.get(14)?,
        phone: row.get(15)?,
        trip_leg,
        related_booking_id: row.get(17)?,
        source: row.get(18)?,
        source_page: row.get(19)?,
        utm_source: row.get(20)?,
        utm_medium: row.get(21)?,
        utm_campaign: row.get(22)?,
        created_at: row.get(23)?,
        updated_at: row.get(24)?,
        quote_accepted_at: row.get(25)?,
    })
}

fn insert_quote_stmt(conn: &rusqlite::Connection, quote: &Quote) -> rusqlite::Result<()> {
    let destinations_json =
        serde_json::to_string(&quote.destinations).map_err(|e| conversion_err(5, e))?;
    conn.execute(
        "INSERT INTO quotes (id, confirmation_token, status, pickup_location, dropoff_location, \
         destinations, date, time, city_date_time, service_type, vehicle_name, passenger_count, \
         quoted_price, name, email, phone, trip_leg, related_booking_id, source, source_page, \
         utm_source, utm_medium, utm_campaign, created_at, updated_at, quote_accepted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, \
                 ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)",
        params![
            quote.id,
            quote.confirmation_token,
            quote.status.to_string(),
            quote.pickup_location,
            quote.dropoff_location,
            destinations_json,
            quote.date,
            quote.time,
            quote.city_date_time,
            quote.service_type,
            quote.vehicle_name,
            quote.passenger_count,
            quote.quoted_price,
            quote.name,
            quote.email,
            quote.phone,
            quote.trip_leg.map(|l| l.to_string()),
            quote.related_booking_id,
            quote.source,
            quote.source_page,
            quote.utm_source,
            quote.utm_medium,
            quote.utm_campaign,
            quote.created_at,
            quote.updated_at,
            quote.quote_accepted_at,
        ],
    )?;
    Ok(())
}

/// Insert a quote and read the persisted row back in the same call.
///
/// The returned record is what intake hands to the notification step,
/// so it must reflect exactly what the store now holds.
pub async fn create_quote(db: &Database, quote: &Quote) -> Result<Quote, LiveryError> {
    let quote = quote.clone();
    db.connection()
        .call(move |conn| {
            insert_quote_stmt(conn, &quote)?;
            let mut stmt = conn
                .prepare(&format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?1"))?;
            let created = stmt.query_row(params![quote.id], quote_from_row)?;
            Ok(created)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a quote by id.
pub async fn get_quote(db: &Database, id: &str) -> Result<Option<Quote>, LiveryError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn
                .prepare(&format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], quote_from_row);
            match result {
                Ok(quote) => Ok(Some(quote)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Look a quote up by its confirmation token.
pub async fn get_quote_by_token(
    db: &Database,
    token: &str,
) -> Result<Option<Quote>, LiveryError> {
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUOTE_COLUMNS} FROM quotes WHERE confirmation_token = ?1"
            ))?;
            let result = stmt.query_row(params![token], quote_from_row);
            match result {
                Ok(quote) => Ok(Some(quote)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Conditionally transition a quote to `confirmed`.
///
/// The update applies only while the record is still unconfirmed, so
/// concurrent confirmation attempts for the same token resolve to
/// exactly one winner. Returns `true` when this call won the
/// transition.
pub async fn confirm_if_unconfirmed(
    db: &Database,
    id: &str,
    accepted_at: &str,
) -> Result<bool, LiveryError> {
    let id = id.to_string();
    let accepted_at = accepted_at.to_string();
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE quotes SET status = 'confirmed', quote_accepted_at = ?1, updated_at = ?1
                 WHERE id = ?2 AND status IN ('pending', 'contacted', 'quoted')",
                params![accepted_at, id],
            )?;
            Ok(affected == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Field rewrite applied to the original record of a split return trip.
#[derive(Debug, Clone)]
pub struct OutboundRewrite {
    pub pickup_location: String,
    pub dropoff_location: Option<String>,
    pub destinations: Destinations,
    pub date: String,
    pub time: String,
    pub city_date_time: Option<String>,
}

/// Rewrite a confirmed return-trip record in place as its outbound leg.
pub async fn rewrite_as_outbound_leg(
    db: &Database,
    id: &str,
    rewrite: &OutboundRewrite,
    updated_at: &str,
) -> Result<(), LiveryError> {
    let id = id.to_string();
    let rewrite = rewrite.clone();
    let updated_at = updated_at.to_string();
    db.connection()
        .call(move |conn| {
            let destinations_json =
                serde_json::to_string(&rewrite.destinations).map_err(|e| conversion_err(0, e))?;
            conn.execute(
                "UPDATE quotes SET trip_leg = 'outbound', pickup_location = ?1, \
                 dropoff_location = ?2, destinations = ?3, date = ?4, time = ?5, \
                 city_date_time = ?6, updated_at = ?7
                 WHERE id = ?8",
                params![
                    rewrite.pickup_location,
                    rewrite.dropoff_location,
                    destinations_json,
                    rewrite.date,
                    rewrite.time,
                    rewrite.city_date_time,
                    updated_at,
                    id,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Dynamic AND-composed predicate over the quotes table.
///
/// The segmentation engine maps segment ids and custom filters onto
/// this struct; absolute timestamps are computed by the caller so the
/// SQL stays parameter-only.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    /// `status IN (...)` when non-empty.
    pub statuses: Vec<BookingStatus>,
    /// `created_at < ?` (canonical timestamp).
    pub created_before: Option<String>,
    /// `created_at >= ?` (canonical timestamp).
    pub created_after: Option<String>,
    /// `quoted_price > ?` (strict, for the high-value segment).
    pub price_over: Option<f64>,
    /// `quoted_price >= ?` (inclusive, from custom filters).
    pub min_price: Option<f64>,
    /// `quoted_price <= ?` (inclusive, from custom filters).
    pub max_price: Option<f64>,
    /// Case-insensitive substring match on `service_type` only.
    pub service_contains: Option<String>,
    /// Exclude rows without an email address.
    pub require_email: bool,
}

fn filter_clauses(filter: &QuoteFilter) -> (Vec<String>, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if !filter.statuses.is_empty() {
        let placeholders = vec!["?"; filter.statuses.len()].join(", ");
        clauses.push(format!("status IN ({placeholders})"));
        for status in &filter.statuses {
            values.push(Value::Text(status.to_string()));
        }
    }
    if let Some(before) = &filter.created_before {
        clauses.push("created_at < ?".to_string());
        values.push(Value::Text(before.clone()));
    }
    if let Some(after) = &filter.created_after {
        clauses.push("created_at >= ?".to_string());
        values.push(Value::Text(after.clone()));
    }
    if let Some(over) = filter.price_over {
        clauses.push("quoted_price > ?".to_string());
        values.push(Value::Real(over));
    }
    if let Some(min) = filter.min_price {
        clauses.push("quoted_price >= ?".to_string());
        values.push(Value::Real(min));
    }
    if let Some(max) = filter.max_price {
        clauses.push("quoted_price <= ?".to_string());
        values.push(Value::Real(max));
    }
    if let Some(keyword) = &filter.service_contains {
        clauses.push("LOWER(COALESCE(service_type, '')) LIKE ?".to_string());
        values.push(Value::Text(format!("%{}%", keyword.to_lowercase())));
    }
    if filter.require_email {
        clauses.push("email IS NOT NULL AND email != ''".to_string());
    }

    (clauses, values)
}

fn where_sql(clauses: &[String]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

/// List marketing contacts matching the filter.
pub async fn list_contacts(
    db: &Database,
    filter: &QuoteFilter,
) -> Result<Vec<Contact>, LiveryError> {
    let (clauses, values) = filter_clauses(filter);
    db.connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT name, email, phone FROM quotes{} ORDER BY created_at DESC",
                where_sql(&clauses)
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values), |row| {
                Ok(Contact {
                    name: row.get::<_, Option<String>>(0)?,
                    email: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    phone: row.get::<_, Option<String>>(2)?,
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

/// Count matching rows without fetching them.
pub async fn count_matching(db: &Database, filter: &QuoteFilter) -> Result<i64, LiveryError> {
    let (clauses, values) = filter_clauses(filter);
    db.connection()
        .call(move |conn| {
            let sql = format!("SELECT COUNT(*) FROM quotes{}", where_sql(&clauses));
            let mut stmt = conn.prepare(&sql)?;
            let count: i64 = stmt.query_row(params_from_iter(values), |row| row.get(0))?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}
