// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign creation and the batch send run.

use std::collections::HashSet;

use tracing::{info, warn};

use livery_core::traits::EmailMessage;
use livery_core::types::CampaignStatus;
use livery_core::{ids, time, LiveryError};
use livery_notify::Notifier;
use livery_storage::queries::{audiences, campaigns};
use livery_storage::{Campaign, Database};

use crate::segments;

/// Fixed transmission batch size.
pub const BATCH_SIZE: usize = 50;

/// Create a draft campaign targeting an audience.
pub async fn create_campaign(
    db: &Database,
    audience_id: Option<&str>,
    subject: &str,
    html_content: &str,
) -> Result<Campaign, LiveryError> {
    let now = time::now_utc();
    let campaign = Campaign {
        id: ids::new_record_id(),
        audience_id: audience_id.map(str::to_string),
        subject: subject.to_string(),
        template_type: "custom".to_string(),
        html_content: html_content.to_string(),
        status: CampaignStatus::Draft,
        sent_count: 0,
        open_count: 0,
        click_count: 0,
        sent_at: None,
        created_at: now.clone(),
        updated_at: now,
    };
    campaigns::create(db, &campaign).await
}

/// Summary of a finished send run.
#[derive(Debug, Clone, PartialEq)]
pub struct SendReport {
    pub status: CampaignStatus,
    pub sent_count: i64,
    pub recipient_count: usize,
}

/// Send a campaign to its audience in batches of [`BATCH_SIZE`].
///
/// Only a draft may be sent; anything else is a conflict rejected
/// before any transmission. A failed batch is logged and skipped, the
/// remaining batches still go out, and the campaign ends `sent` as
/// long as at least one batch was delivered.
pub async fn send_campaign(
    db: &Database,
    notifier: &Notifier,
    campaign_id: &str,
) -> Result<SendReport, LiveryError> {
    let Some(campaign) = campaigns::get(db, campaign_id).await? else {
        return Err(LiveryError::Conflict(format!(
            "campaign {campaign_id} does not exist"
        )));
    };
    if campaign.status != CampaignStatus::Draft {
        return Err(LiveryError::Conflict(format!(
            "campaign {campaign_id} is {}, only a draft can be sent",
            campaign.status
        )));
    }
    if !campaigns::mark_sending_if_draft(db, campaign_id, &time::now_utc()).await? {
        // Lost the claim to a concurrent send request.
        return Err(LiveryError::Conflict(format!(
            "campaign {campaign_id} is already being sent"
        )));
    }

    let recipients = resolve_recipients(db, &campaign).await?;
    if recipients.is_empty() {
        warn!(campaign_id, "campaign has no recipients, marking failed");
        let now = time::now_utc();
        campaigns::finalize(db, campaign_id, CampaignStatus::Failed, 0, None, &now).await?;
        return Ok(SendReport {
            status: CampaignStatus::Failed,
            sent_count: 0,
            recipient_count: 0,
        });
    }

    let mut sent_count: i64 = 0;
    if let Some(mailer) = notifier.mailer() {
        for (batch_index, batch) in recipients.chunks(BATCH_SIZE).enumerate() {
            let msgs: Vec<EmailMessage> = batch
                .iter()
                .map(|to| EmailMessage {
                    to: to.clone(),
                    from: notifier.from_address.clone(),
                    subject: campaign.subject.clone(),
                    html: campaign.html_content.clone(),
                })
                .collect();
            match mailer.send_batch(&msgs).await {
                Ok(()) => {
                    sent_count += batch.len() as i64;
                }
                Err(e) => {
                    warn!(
                        campaign_id,
                        batch_index,
                        batch_size = batch.len(),
                        error = %e,
                        "campaign batch failed, continuing"
                    );
                }
            }
        }
    } else {
        warn!(campaign_id, "email channel unconfigured, no batches sent");
    }

    let status = if sent_count > 0 {
        CampaignStatus::Sent
    } else {
        CampaignStatus::Failed
    };
    let now = time::now_utc();
    campaigns::finalize(db, campaign_id, status, sent_count, Some(&now), &now).await?;
    info!(campaign_id, %status, sent_count, "campaign send finished");

    Ok(SendReport {
        status,
        sent_count,
        recipient_count: recipients.len(),
    })
}

/// Resolve the deduplicated recipient list for a campaign.
async fn resolve_recipients(
    db: &Database,
    campaign: &Campaign,
) -> Result<Vec<String>, LiveryError> {
    let Some(audience_id) = &campaign.audience_id else {
        return Ok(Vec::new());
    };
    let Some(audience) = audiences::get(db, audience_id).await? else {
        warn!(campaign_id = %campaign.id, audience_id, "campaign audience missing");
        return Ok(Vec::new());
    };

    let resolution = segments::resolve_segment(
        db,
        audience.segment_id,
        audience.custom_filter.as_ref(),
        false,
    )
    .await?;

    // Set semantics over addresses, preserving first-seen order.
    let mut seen = HashSet::new();
    let mut recipients = Vec::new();
    for contact in resolution.contacts {
        let email = contact.email.to_lowercase();
        if !email.is_empty() && seen.insert(email.clone()) {
            recipients.push(email);
        }
    }
    Ok(recipients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use livery_core::types::{BookingStatus, Destinations, Segment};
    use livery_storage::queries::quotes;
    use livery_storage::{Audience, Quote};
    use livery_test_utils::MockMailer;

    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("campaigns.db").to_str().unwrap())
            .await
            .unwrap();
        (db, dir)
    }

    fn notifier(mailer: Arc<MockMailer>) -> Notifier {
        Notifier::new(
            Some(mailer),
            None,
            "marketing@livery.example",
            "dispatch@livery.example",
            None,
            "Livery Chauffeurs",
        )
    }

    async fn seed_audience(db: &Database, id: &str, segment: Segment) {
        let now = time::now_utc();
        audiences::create(
            db,
            &Audience {
                id: id.to_string(),
                name: "All leads".to_string(),
                description: None,
                segment_id: segment,
                custom_filter: None,
                contact_count: 0,
                external_audience_ref: None,
                created_at: now.clone(),
                updated_at: now,
            },
        )
        .await
        .unwrap();
    }

    async fn seed_leads(db: &Database, n: usize) {
        for i in 0..n {
            let quote = Quote {
                id: format!("q-{i}"),
                confirmation_token: Some(format!("tok-{i}")),
                status: BookingStatus::Pending,
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
                name: format!("Customer {i}"),
                email: Some(format!("c{i}@example.com")),
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
    }

    #[tokio::test]
    async fn successful_send_marks_sent_with_full_count() {
        let (db, _dir) = setup().await;
        seed_leads(&db, 3).await;
        seed_audience(&db, "aud-1", Segment::AllLeads).await;
        let campaign = create_campaign(&db, Some("aud-1"), "Offer", "<p>10% off</p>")
            .await
            .unwrap();
        let mailer = Arc::new(MockMailer::new());

        let report = send_campaign(&db, &notifier(mailer.clone()), &campaign.id)
            .await
            .unwrap();
        assert_eq!(report.status, CampaignStatus::Sent);
        assert_eq!(report.sent_count, 3);
        assert_eq!(mailer.sent_count(), 3);

        let stored = campaigns::get(&db, &campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Sent);
        assert_eq!(stored.sent_count, 3);
        assert!(stored.sent_at.is_some());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn non_draft_campaign_is_rejected_before_any_transmission() {
        let (db, _dir) = setup().await;
        seed_leads(&db, 2).await;
        seed_audience(&db, "aud-1", Segment::AllLeads).await;
        let campaign = create_campaign(&db, Some("aud-1"), "Offer", "<p>x</p>")
            .await
            .unwrap();
        let mailer = Arc::new(MockMailer::new());
        let n = notifier(mailer.clone());

        send_campaign(&db, &n, &campaign.id).await.unwrap();
        let err = send_campaign(&db, &n, &campaign.id).await.unwrap_err();
        assert!(matches!(err, LiveryError::Conflict(_)));
        // No extra transmissions beyond the first run.
        assert_eq!(mailer.sent_count(), 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn empty_recipient_list_marks_failed_with_zero_sends() {
        let (db, _dir) = setup().await;
        seed_audience(&db, "aud-empty", Segment::Cancelled).await;
        let campaign = create_campaign(&db, Some("aud-empty"), "Offer", "<p>x</p>")
            .await
            .unwrap();
        let mailer = Arc::new(MockMailer::new());

        let report = send_campaign(&db, &notifier(mailer.clone()), &campaign.id)
            .await
            .unwrap();
        assert_eq!(report.status, CampaignStatus::Failed);
        assert_eq!(report.sent_count, 0);
        assert_eq!(mailer.sent_count(), 0);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn partial_batch_failure_still_ends_sent() {
        let (db, _dir) = setup().await;
        // 120 unique recipients: batches of 50/50/20.
        seed_leads(&db, 120).await;
        seed_audience(&db, "aud-big", Segment::AllLeads).await;
        let campaign = create_campaign(&db, Some("aud-big"), "Offer", "<p>x</p>")
            .await
            .unwrap();
        // One of the three batches fails; the others still go out.
        let mailer = Arc::new(MockMailer::failing_batches(vec![2]));

        let report = send_campaign(&db, &notifier(mailer.clone()), &campaign.id)
            .await
            .unwrap();
        assert_eq!(report.recipient_count, 120);
        assert_eq!(report.status, CampaignStatus::Sent);
        assert_eq!(report.sent_count, 100);
        assert_eq!(mailer.sent_count(), 100);

        let stored = campaigns::get(&db, &campaign.id).await.unwrap().unwrap();
        assert_eq!(stored.status, CampaignStatus::Sent);
        assert_eq!(stored.sent_count, 100);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recipients_are_deduplicated_case_insensitively() {
        let (db, _dir) = setup().await;
        seed_leads(&db, 1).await;
        // Second lead with the same address in different case.
        let dup = Quote {
            id: "q-dup".to_string(),
            confirmation_token: Some("tok-dup".to_string()),
            status: BookingStatus::Pending,
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
            name: "Dup".to_string(),
            email: Some("C0@EXAMPLE.COM".to_string()),
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
        quotes::create_quote(&db, &dup).await.unwrap();

        seed_audience(&db, "aud-dup", Segment::AllLeads).await;
        let campaign = create_campaign(&db, Some("aud-dup"), "Offer", "<p>x</p>")
            .await
            .unwrap();
        let mailer = Arc::new(MockMailer::new());

        let report = send_campaign(&db, &notifier(mailer.clone()), &campaign.id)
            .await
            .unwrap();
        assert_eq!(report.sent_count, 1);
        assert_eq!(mailer.sent()[0].to, "c0@example.com");
        db.close().await.unwrap();
    }
}
