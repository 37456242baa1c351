// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for the storage tests.

use tempfile::TempDir;

use livery_core::types::{BookingStatus, Destinations};

use crate::database::Database;
use crate::models::Quote;

pub async fn setup_db() -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = Database::open(path.to_str().unwrap()).await.unwrap();
    (db, dir)
}

pub fn make_quote(id: &str, token: &str) -> Quote {
    Quote {
        id: id.to_string(),
        confirmation_token: Some(token.to_string()),
        status: BookingStatus::Pending,
        pickup_location: "Kings Cross Station".to_string(),
        dropoff_location: Some("Heathrow Terminal 5".to_string()),
        destinations: Destinations::SingleLeg(vec!["Heathrow Terminal 5".to_string()]),
        date: "2026-09-10".to_string(),
        time: "14:30".to_string(),
        city_date_time: None,
        service_type: None,
        vehicle_name: Some("Executive Saloon".to_string()),
        passenger_count: 2,
        quoted_price: 120.0,
        name: "Alex Rider".to_string(),
        email: Some("rider@example.com".to_string()),
        phone: "+447700900123".to_string(),
        trip_leg: None,
        related_booking_id: None,
        source: Some("website".to_string()),
        source_page: Some("/quote".to_string()),
        utm_source: None,
        utm_medium: None,
        utm_campaign: None,
        created_at: "2026-08-27T09:00:00.000Z".to_string(),
        updated_at: "2026-08-27T09:00:00.000Z".to_string(),
        quote_accepted_at: None,
    }
}
