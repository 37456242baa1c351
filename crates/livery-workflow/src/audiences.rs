// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audience management: persisted segment definitions with a cached
//! contact count, recomputed on create and on demand.

use livery_core::types::{CustomFilter, Segment};
use livery_core::{ids, time, LiveryError};
use livery_storage::queries::audiences;
use livery_storage::{Audience, Database};

use crate::segments;

/// Create an audience; the contact count is resolved (count-only) at
/// creation time and cached on the row.
pub async fn create_audience(
    db: &Database,
    name: &str,
    description: Option<&str>,
    segment: Segment,
    custom_filter: Option<CustomFilter>,
) -> Result<Audience, LiveryError> {
    let custom = custom_filter.filter(|f| !f.is_empty());
    let resolution = segments::resolve_segment(db, segment, custom.as_ref(), true).await?;

    let now = time::now_utc();
    let audience = Audience {
        id: ids::new_record_id(),
        name: name.to_string(),
        description: description.map(str::to_string),
        segment_id: segment,
        custom_filter: custom,
        contact_count: resolution.count,
        external_audience_ref: None,
        created_at: now.clone(),
        updated_at: now,
    };
    audiences::create(db, &audience).await
}

/// All audiences, newest first.
pub async fn list_audiences(db: &Database) -> Result<Vec<Audience>, LiveryError> {
    audiences::list(db).await
}

/// Fetch one audience with its contact count recomputed against the
/// current store, refreshing the cache as a side effect.
pub async fn get_audience_refreshed(
    db: &Database,
    id: &str,
) -> Result<Option<Audience>, LiveryError> {
    let Some(mut audience) = audiences::get(db, id).await? else {
        return Ok(None);
    };
    let resolution = segments::resolve_segment(
        db,
        audience.segment_id,
        audience.custom_filter.as_ref(),
        true,
    )
    .await?;
    if resolution.count != audience.contact_count {
        let now = time::now_utc();
        audiences::update_contact_count(db, id, resolution.count, &now).await?;
        audience.contact_count = resolution.count;
        audience.updated_at = now;
    }
    Ok(Some(audience))
}

#[cfg(test)]
mod tests {
    use super::*;
    use livery_core::types::{BookingStatus, Destinations};
    use livery_storage::queries::quotes;
    use livery_storage::Quote;

    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("audiences.db").to_str().unwrap())
            .await
            .unwrap();
        (db, dir)
    }

    async fn seed_cancelled_lead(db: &Database, id: &str) {
        let quote = Quote {
            id: id.to_string(),
            confirmation_token: Some(format!("tok-{id}")),
            status: BookingStatus::Cancelled,
            pickup_location: "Paddington".to_string(),
            dropoff_location: None,
            destinations: Destinations::SingleLeg(vec![]),
            date: "2026-09-10".to_string(),
            time: "08:00".to_string(),
            city_date_time: None,
            service_type: None,
            vehicle_name: None,
            passenger_count: 1,
            quoted_price: 50.0,
            name: format!("Customer {id}"),
            email: Some(format!("{id}@example.com")),
            phone: "+447700900123".to_string(),
            trip_leg: None,
            related_booking_id: None,
            source: None,
            source_page: None,
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            created_at: time::now_utc(),
            updated_at: time::now_utc(),
            quote_accepted_at: None,
        };
        quotes::create_quote(db, &quote).await.unwrap();
    }

    #[tokio::test]
    async fn create_caches_the_contact_count() {
        let (db, _dir) = setup().await;
        seed_cancelled_lead(&db, "q-1").await;
        seed_cancelled_lead(&db, "q-2").await;

        let audience = create_audience(&db, "Win-back", None, Segment::Cancelled, None)
            .await
            .unwrap();
        assert_eq!(audience.contact_count, 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn empty_custom_filter_is_stored_as_none() {
        let (db, _dir) = setup().await;
        let audience = create_audience(
            &db,
            "Everyone",
            Some("all leads"),
            Segment::AllLeads,
            Some(CustomFilter::default()),
        )
        .await
        .unwrap();
        assert!(audience.custom_filter.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn refresh_updates_a_stale_count() {
        let (db, _dir) = setup().await;
        seed_cancelled_lead(&db, "q-1").await;
        let audience = create_audience(&db, "Win-back", None, Segment::Cancelled, None)
            .await
            .unwrap();
        assert_eq!(audience.contact_count, 1);

        seed_cancelled_lead(&db, "q-2").await;
        let refreshed = get_audience_refreshed(&db, &audience.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.contact_count, 2);

        // The cache itself was rewritten.
        let stored = audiences::get(&db, &audience.id).await.unwrap().unwrap();
        assert_eq!(stored.contact_count, 2);
        db.close().await.unwrap();
    }
}
