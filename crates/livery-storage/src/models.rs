// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the five persisted tables.
//!
//! Cross-crate domain types (statuses, the polymorphic destinations
//! union, segments) live in `livery-core::types`; these structs are
//! their persisted composition.

use serde::{Deserialize, Serialize};

use livery_core::types::{BookingStatus, CampaignStatus, CustomFilter, Destinations, TripLeg};

/// The central quote/booking record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    /// Opaque confirmation secret. Retained after confirmation so the
    /// link stays idempotently clickable.
    pub confirmation_token: Option<String>,
    pub status: BookingStatus,
    pub pickup_location: String,
    pub dropoff_location: Option<String>,
    pub destinations: Destinations,
    pub date: String,
    pub time: String,
    pub city_date_time: Option<String>,
    pub service_type: Option<String>,
    pub vehicle_name: Option<String>,
    pub passenger_count: i64,
    pub quoted_price: f64,
    pub name: String,
    pub email: Option<String>,
    /// Normalized dialable form; raw form input never reaches this field.
    pub phone: String,
    pub trip_leg: Option<TripLeg>,
    /// Weak reference to the sibling leg of a split return trip.
    pub related_booking_id: Option<String>,
    pub source: Option<String>,
    pub source_page: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub quote_accepted_at: Option<String>,
}

/// Append-only audit entry attached to a quote. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteActivity {
    pub id: i64,
    pub quote_id: String,
    pub action_type: String,
    pub details: serde_json::Value,
    pub created_at: String,
}

/// Marketing email subscription. Rows are deactivated, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSubscription {
    pub id: i64,
    /// Stored lowercased; unique.
    pub email: String,
    pub is_active: bool,
    pub discount_code: String,
    pub source: Option<String>,
    pub subscribed_at: String,
    pub unsubscribed_at: Option<String>,
}

/// A persisted, reusable segment definition with a cached contact count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audience {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub segment_id: livery_core::types::Segment,
    pub custom_filter: Option<CustomFilter>,
    /// Recomputed on create and update, not kept live.
    pub contact_count: i64,
    /// Set when synced to an outbound email-marketing provider.
    pub external_audience_ref: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One marketing email send job targeting an audience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub audience_id: Option<String>,
    pub subject: String,
    pub template_type: String,
    pub html_content: String,
    pub status: CampaignStatus,
    pub sent_count: i64,
    pub open_count: i64,
    pub click_count: i64,
    pub sent_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
