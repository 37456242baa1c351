// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Segmentation engine: resolve a segment id plus optional custom
//! filter into marketing contacts.
//!
//! Quote-backed segments compile to a [`QuoteFilter`]; the
//! `email_subscribers` segment draws from the subscriptions table and
//! is unified into the same `Contact` shape. Age cutoffs are computed
//! here as absolute timestamps so the storage layer stays
//! parameter-only.

use livery_core::types::{BookingStatus, Contact, CustomFilter, Segment};
use livery_core::{time, LiveryError};
use livery_storage::queries::{quotes, subscriptions};
use livery_storage::queries::quotes::QuoteFilter;
use livery_storage::Database;

/// Threshold above which a quote counts as high value.
pub const HIGH_VALUE_PRICE: f64 = 200.0;
/// A lead is "lost" once contacted/quoted for this many days.
pub const LOST_AFTER_DAYS: i64 = 7;
/// A lead is "pending old" once pending for this many days.
pub const PENDING_OLD_AFTER_DAYS: i64 = 3;

/// Contacts matching a segment, with the authoritative count.
#[derive(Debug, Clone)]
pub struct SegmentResolution {
    /// Empty in count-only mode.
    pub contacts: Vec<Contact>,
    pub count: i64,
}

/// Compile a quote-backed segment to its filter. `None` for
/// `email_subscribers`, which does not read the quotes table.
fn segment_filter(segment: Segment, custom: Option<&CustomFilter>) -> Option<QuoteFilter> {
    let mut filter = match segment {
        Segment::Cancelled => QuoteFilter {
            statuses: vec![BookingStatus::Cancelled],
            ..Default::default()
        },
        Segment::Lost => QuoteFilter {
            statuses: vec![BookingStatus::Contacted, BookingStatus::Quoted],
            created_before: Some(time::days_ago(LOST_AFTER_DAYS)),
            ..Default::default()
        },
        Segment::PendingOld => QuoteFilter {
            statuses: vec![BookingStatus::Pending],
            created_before: Some(time::days_ago(PENDING_OLD_AFTER_DAYS)),
            ..Default::default()
        },
        Segment::PastCustomers => QuoteFilter {
            statuses: vec![BookingStatus::Confirmed, BookingStatus::Completed],
            ..Default::default()
        },
        Segment::HighValue => QuoteFilter {
            price_over: Some(HIGH_VALUE_PRICE),
            ..Default::default()
        },
        Segment::Airport => QuoteFilter {
            service_contains: Some("airport".to_string()),
            ..Default::default()
        },
        Segment::Corporate => QuoteFilter {
            service_contains: Some("corporate".to_string()),
            ..Default::default()
        },
        Segment::AllLeads => QuoteFilter::default(),
        Segment::EmailSubscribers => return None,
    };

    // Marketing needs an address; every quote-backed resolution
    // excludes contacts without one.
    filter.require_email = true;

    if let Some(custom) = custom {
        filter.min_price = custom.min_price;
        filter.max_price = custom.max_price;
        filter.created_after = custom.created_after.clone();
        // The segment's own age cutoff wins over a custom upper bound
        // only if it is tighter.
        if let Some(custom_before) = &custom.created_before {
            filter.created_before = match filter.created_before.take() {
                Some(existing) if existing < *custom_before => Some(existing),
                _ => Some(custom_before.clone()),
            };
        }
    }

    Some(filter)
}

/// Resolve a segment to contacts. In count-only mode no rows are
/// fetched, only counted.
pub async fn resolve_segment(
    db: &Database,
    segment: Segment,
    custom: Option<&CustomFilter>,
    count_only: bool,
) -> Result<SegmentResolution, LiveryError> {
    match segment_filter(segment, custom) {
        Some(filter) => {
            if count_only {
                let count = quotes::count_matching(db, &filter).await?;
                Ok(SegmentResolution {
                    contacts: Vec::new(),
                    count,
                })
            } else {
                let contacts = quotes::list_contacts(db, &filter).await?;
                let count = contacts.len() as i64;
                Ok(SegmentResolution { contacts, count })
            }
        }
        None => {
            if count_only {
                let count = subscriptions::count_active(db).await?;
                Ok(SegmentResolution {
                    contacts: Vec::new(),
                    count,
                })
            } else {
                let contacts = subscriptions::list_active_contacts(db).await?;
                let count = contacts.len() as i64;
                Ok(SegmentResolution { contacts, count })
            }
        }
    }
}
