// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead intake: validate a quote form, persist it, and trigger the
//! "booking received" notices.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use livery_core::types::Destinations;
use livery_core::{ids, phone, time, LiveryError};
use livery_notify::templates::{self, QuoteView};
use livery_notify::Notifier;
use livery_storage::queries::quotes;
use livery_storage::{Database, Quote};

/// Raw quote form payload.
///
/// Every field defaults so that a partial payload deserializes and
/// validation can report all problems per field in one pass.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub dropoff_location: Option<String>,
    #[serde(default = "default_destinations")]
    pub destinations: Destinations,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub city_date_time: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub vehicle_name: Option<String>,
    #[serde(default = "default_passenger_count")]
    pub passenger_count: i64,
    #[serde(default)]
    pub quoted_price: f64,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_page: Option<String>,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_campaign: Option<String>,
}

fn default_destinations() -> Destinations {
    Destinations::SingleLeg(Vec::new())
}

fn default_passenger_count() -> i64 {
    1
}

/// Intake failure: either a per-field validation map or a store error.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(BTreeMap<String, String>),

    #[error("persistence failed: {0}")]
    Persistence(#[from] LiveryError),
}

/// Validate the form, returning the normalized phone on success or a
/// field-to-message map listing every problem found.
fn validate(form: &LeadForm) -> Result<String, BTreeMap<String, String>> {
    let mut errors = BTreeMap::new();

    if form.name.trim().is_empty() {
        errors.insert("name".to_string(), "name is required".to_string());
    }
    if form.pickup_location.trim().is_empty() {
        errors.insert(
            "pickup_location".to_string(),
            "pickup location is required".to_string(),
        );
    }
    if form.date.trim().is_empty() {
        errors.insert("date".to_string(), "date is required".to_string());
    }
    if form.time.trim().is_empty() {
        errors.insert("time".to_string(), "time is required".to_string());
    }
    if let Some(email) = &form.email
        && !email.trim().is_empty()
        && !email.contains('@')
    {
        errors.insert(
            "email".to_string(),
            "email address is not valid".to_string(),
        );
    }

    let normalized = match phone::normalize_phone(&form.phone) {
        Ok(p) => Some(p),
        Err(e) => {
            errors.insert("phone".to_string(), e.to_string());
            None
        }
    };

    match (normalized, errors.is_empty()) {
        (Some(p), true) => Ok(p),
        _ => Err(errors),
    }
}

/// Submit a lead: validate, persist with a fresh confirmation token,
/// and fire the "booking received" notices in the background.
///
/// The create is the only awaited step; notices never affect the
/// returned result.
pub async fn submit_lead(
    db: &Database,
    notifier: &Notifier,
    confirm_base: &str,
    form: LeadForm,
) -> Result<Quote, SubmissionError> {
    let normalized_phone = validate(&form).map_err(SubmissionError::Validation)?;

    let now = time::now_utc();
    let email = form
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);
    let quote = Quote {
        id: ids::new_record_id(),
        confirmation_token: Some(ids::new_confirmation_token()),
        status: livery_core::BookingStatus::Pending,
        pickup_location: form.pickup_location.trim().to_string(),
        dropoff_location: form.dropoff_location,
        destinations: form.destinations,
        date: form.date,
        time: form.time,
        city_date_time: form.city_date_time,
        service_type: form.service_type,
        vehicle_name: form.vehicle_name,
        passenger_count: form.passenger_count,
        quoted_price: form.quoted_price,
        name: form.name.trim().to_string(),
        email,
        phone: normalized_phone,
        trip_leg: None,
        related_booking_id: None,
        source: form.source,
        source_page: form.source_page,
        utm_source: form.utm_source,
        utm_medium: form.utm_medium,
        utm_campaign: form.utm_campaign,
        created_at: now.clone(),
        updated_at: now,
        quote_accepted_at: None,
    };

    let created = quotes::create_quote(db, &quote).await?;

    let confirm_url = match &created.confirmation_token {
        Some(token) => format!("{confirm_base}/confirm?token={token}"),
        None => String::new(),
    };
    let notifier = notifier.clone();
    let notice_quote = created.clone();
    tokio::spawn(async move {
        send_received_notices(&notifier, &notice_quote, &confirm_url).await;
    });

    Ok(created)
}

/// Send the "booking received" notices: customer (when an email is on
/// file) and the staff inbox. Best-effort; outcomes are logged per
/// channel by the dispatcher.
pub async fn send_received_notices(notifier: &Notifier, quote: &Quote, confirm_url: &str) {
    let view = QuoteView::from_quote(quote);

    if let Some(email) = &quote.email {
        let (subject, html) =
            templates::booking_received_customer(&view, confirm_url, &notifier.service_name);
        notifier
            .email("email-customer", &quote.id, email, subject, html)
            .await;
    } else {
        warn!(booking_id = %quote.id, "no customer email on lead, skipping received notice");
    }

    let (subject, html) = templates::booking_received_admin(&view, &notifier.service_name);
    let admin_address = notifier.admin_address.clone();
    notifier
        .email("email-admin", &quote.id, &admin_address, subject, html)
        .await;
}
