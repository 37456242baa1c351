// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token-based confirmation protocol.
//!
//! Split in two: [`confirm_transition`] is the only part the caller
//! awaits (lookup, idempotency guard, conditional status update);
//! [`post_confirmation`] carries every side effect (activity log,
//! notices, return-trip split) and is fired detached by the gateway.
//! The guard lives in the UPDATE's WHERE clause, so concurrent clicks
//! on the same link resolve to exactly one winner and side effects keep
//! at-most-once semantics.

use futures::join;
use tracing::{info, warn};

use livery_core::types::Destinations;
use livery_core::{ids, time, LiveryError};
use livery_notify::templates::{self, QuoteView};
use livery_notify::Notifier;
use livery_storage::queries::{activities, quotes};
use livery_storage::{Database, Quote};

/// Outcome of the awaited confirmation step.
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// This call won the transition; the snapshot reflects the
    /// committed confirmed state and side effects should run.
    Confirmed(Box<Quote>),
    /// The record is already confirmed/completed (or was confirmed by a
    /// concurrent click, or is no longer confirmable). No side effects.
    AlreadyConfirmed,
    /// No record carries this token.
    InvalidToken,
    /// The status update itself failed against the store.
    UpdateFailed,
}

/// Look up the token and attempt the pending→confirmed transition.
///
/// Returns `Err` only for a store failure during lookup; update
/// failures map to [`ConfirmOutcome::UpdateFailed`] so the caller can
/// redirect with a precise reason.
pub async fn confirm_transition(
    db: &Database,
    token: &str,
) -> Result<ConfirmOutcome, LiveryError> {
    let Some(quote) = quotes::get_quote_by_token(db, token).await? else {
        return Ok(ConfirmOutcome::InvalidToken);
    };

    if !quote.status.is_unconfirmed() {
        info!(booking_id = %quote.id, status = %quote.status, "confirm link re-clicked, skipping side effects");
        return Ok(ConfirmOutcome::AlreadyConfirmed);
    }

    let accepted_at = time::now_utc();
    match quotes::confirm_if_unconfirmed(db, &quote.id, &accepted_at).await {
        Ok(true) => {
            let mut confirmed = quote;
            confirmed.status = livery_core::BookingStatus::Confirmed;
            confirmed.quote_accepted_at = Some(accepted_at.clone());
            confirmed.updated_at = accepted_at;
            info!(booking_id = %confirmed.id, "booking confirmed");
            Ok(ConfirmOutcome::Confirmed(Box::new(confirmed)))
        }
        // Zero rows: a concurrent request won, or the record left the
        // unconfirmed states between lookup and update.
        Ok(false) => Ok(ConfirmOutcome::AlreadyConfirmed),
        Err(e) => {
            warn!(booking_id = %quote.id, error = %e, "status transition failed");
            Ok(ConfirmOutcome::UpdateFailed)
        }
    }
}

/// Run every post-transition side effect concurrently.
///
/// Activity log, both emails, the SMS, and the return-trip split are
/// all independent and best-effort: each failure is logged and none
/// blocks or fails the others. Callers spawn this detached from the
/// redirect.
pub async fn post_confirmation(db: &Database, notifier: &Notifier, quote: &Quote) {
    let view = QuoteView::from_quote(quote);

    let activity = async {
        let details = serde_json::json!({
            "accepted_at": quote.quote_accepted_at,
            "quoted_price": quote.quoted_price,
        });
        if let Err(e) = activities::record_activity(
            db,
            &quote.id,
            "customer_confirmed",
            details,
            &time::now_utc(),
        )
        .await
        {
            warn!(booking_id = %quote.id, error = %e, "failed to record confirmation activity");
        }
    };

    let customer_email = async {
        if let Some(email) = &quote.email {
            let (subject, html) =
                templates::booking_confirmed_customer(&view, &notifier.service_name);
            notifier
                .email("email-customer", &quote.id, email, subject, html)
                .await;
        }
    };

    let admin_email = async {
        let (subject, html) = templates::booking_confirmed_admin(&view, &notifier.service_name);
        notifier
            .email(
                "email-admin",
                &quote.id,
                &notifier.admin_address.clone(),
                subject,
                html,
            )
            .await;
    };

    let sms = async {
        if notifier.sms_configured() && !quote.phone.is_empty() {
            let body = templates::booking_confirmed_sms(&view, &notifier.service_name);
            notifier.sms(&quote.id, &quote.phone, body).await;
        }
    };

    let split = split_return_trip(db, quote);

    join!(activity, customer_email, admin_email, sms, split);
}

/// Split a confirmed return trip into outbound and return records.
///
/// The original record is rewritten in place as the outbound leg and a
/// fresh record is created for the return leg. The two writes are
/// independent; a failure in one is logged and does not roll back the
/// other.
async fn split_return_trip(db: &Database, quote: &Quote) {
    let Destinations::ReturnTrip(rt) = &quote.destinations else {
        return;
    };

    let now = time::now_utc();

    let outbound_dropoff = rt
        .outbound
        .last_destination()
        .map(str::to_string)
        .or_else(|| quote.dropoff_location.clone());
    let rewrite = quotes::OutboundRewrite {
        pickup_location: rt.outbound.pickup.clone(),
        dropoff_location: outbound_dropoff,
        destinations: Destinations::SingleLeg(rt.outbound.destinations.clone()),
        date: rt.outbound.date.clone(),
        time: rt.outbound.time.clone(),
        city_date_time: rt.outbound.city_date_time.clone(),
    };
    if let Err(e) = quotes::rewrite_as_outbound_leg(db, &quote.id, &rewrite, &now).await {
        warn!(booking_id = %quote.id, error = %e, "outbound leg rewrite failed");
    }

    // Return leg: copy of the pre-split original minus identity,
    // token, and price; staff price the return manually.
    let return_quote = Quote {
        id: ids::new_record_id(),
        confirmation_token: None,
        status: livery_core::BookingStatus::Confirmed,
        pickup_location: rt.return_leg.pickup.clone(),
        dropoff_location: rt.return_leg.last_destination().map(str::to_string),
        destinations: Destinations::SingleLeg(rt.return_leg.destinations.clone()),
        date: rt.return_leg.date.clone(),
        time: rt.return_leg.time.clone(),
        city_date_time: rt.return_leg.city_date_time.clone(),
        service_type: quote.service_type.clone(),
        vehicle_name: quote.vehicle_name.clone(),
        passenger_count: quote.passenger_count,
        quoted_price: 0.0,
        name: quote.name.clone(),
        email: quote.email.clone(),
        phone: quote.phone.clone(),
        trip_leg: Some(livery_core::TripLeg::Return),
        related_booking_id: Some(quote.id.clone()),
        source: quote.source.clone(),
        source_page: quote.source_page.clone(),
        utm_source: quote.utm_source.clone(),
        utm_medium: quote.utm_medium.clone(),
        utm_campaign: quote.utm_campaign.clone(),
        created_at: now.clone(),
        updated_at: now.clone(),
        quote_accepted_at: Some(now),
    };
    match quotes::create_quote(db, &return_quote).await {
        Ok(created) => {
            info!(booking_id = %quote.id, return_id = %created.id, "return trip split");
        }
        Err(e) => {
            warn!(booking_id = %quote.id, error = %e, "return leg create failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use livery_core::types::{BookingStatus, LegDetails, ReturnTrip, TripLeg};
    use livery_test_utils::{MockMailer, MockSms};

    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("confirm.db").to_str().unwrap())
            .await
            .unwrap();
        (db, dir)
    }

    fn notifier(mailer: Arc<MockMailer>, sms: Arc<MockSms>) -> Notifier {
        Notifier::new(
            Some(mailer),
            Some(sms),
            "bookings@livery.example",
            "dispatch@livery.example",
            Some("+15550001111".to_string()),
            "Livery Chauffeurs",
        )
    }

    fn pending_quote(id: &str, token: &str) -> Quote {
        Quote {
            id: id.to_string(),
            confirmation_token: Some(token.to_string()),
            status: BookingStatus::Pending,
            pickup_location: "Paddington".to_string(),
            dropoff_location: Some("Gatwick".to_string()),
            destinations: Destinations::SingleLeg(vec!["Gatwick".to_string()]),
            date: "2026-09-10".to_string(),
            time: "08:00".to_string(),
            city_date_time: None,
            service_type: Some("airport transfer".to_string()),
            vehicle_name: Some("Executive Saloon".to_string()),
            passenger_count: 2,
            quoted_price: 95.0,
            name: "Sam Carter".to_string(),
            email: Some("sam@example.com".to_string()),
            phone: "+447700900123".to_string(),
            trip_leg: None,
            related_booking_id: None,
            source: Some("website".to_string()),
            source_page: None,
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            created_at: "2026-08-27T09:00:00.000Z".to_string(),
            updated_at: "2026-08-27T09:00:00.000Z".to_string(),
            quote_accepted_at: None,
        }
    }

    fn return_trip_quote(id: &str, token: &str) -> Quote {
        let mut quote = pending_quote(id, token);
        quote.destinations = Destinations::ReturnTrip(ReturnTrip::new(
            LegDetails {
                pickup: "Paddington".into(),
                destinations: vec!["Victoria".into(), "Gatwick".into()],
                date: "2026-09-10".into(),
                time: "08:00".into(),
                city_date_time: Some("2026-09-10 08:00".into()),
            },
            LegDetails {
                pickup: "Gatwick".into(),
                destinations: vec!["Paddington".into()],
                date: "2026-09-14".into(),
                time: "17:30".into(),
                city_date_time: Some("2026-09-14 17:30".into()),
            },
        ));
        quote
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let (db, _dir) = setup().await;
        let outcome = confirm_transition(&db, "no-such-token").await.unwrap();
        assert!(matches!(outcome, ConfirmOutcome::InvalidToken));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn first_confirm_wins_second_is_already_confirmed() {
        let (db, _dir) = setup().await;
        quotes::create_quote(&db, &pending_quote("q-1", "tok-1"))
            .await
            .unwrap();

        let first = confirm_transition(&db, "tok-1").await.unwrap();
        let ConfirmOutcome::Confirmed(confirmed) = first else {
            panic!("expected confirmed outcome");
        };
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert!(confirmed.quote_accepted_at.is_some());

        let second = confirm_transition(&db, "tok-1").await.unwrap();
        assert!(matches!(second, ConfirmOutcome::AlreadyConfirmed));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_booking_cannot_be_confirmed() {
        let (db, _dir) = setup().await;
        let mut quote = pending_quote("q-c", "tok-c");
        quote.status = BookingStatus::Cancelled;
        quotes::create_quote(&db, &quote).await.unwrap();

        let outcome = confirm_transition(&db, "tok-c").await.unwrap();
        assert!(matches!(outcome, ConfirmOutcome::AlreadyConfirmed));
        let stored = quotes::get_quote(&db, "q-c").await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn side_effects_fan_out_to_all_channels() {
        let (db, _dir) = setup().await;
        quotes::create_quote(&db, &pending_quote("q-fx", "tok-fx"))
            .await
            .unwrap();
        let mailer = Arc::new(MockMailer::new());
        let sms = Arc::new(MockSms::new());
        let n = notifier(mailer.clone(), sms.clone());

        let ConfirmOutcome::Confirmed(confirmed) =
            confirm_transition(&db, "tok-fx").await.unwrap()
        else {
            panic!("expected confirmed outcome");
        };
        post_confirmation(&db, &n, &confirmed).await;

        let recipients: Vec<String> = mailer.sent().iter().map(|m| m.to.clone()).collect();
        assert!(recipients.contains(&"sam@example.com".to_string()));
        assert!(recipients.contains(&"dispatch@livery.example".to_string()));

        let texts = sms.sent();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].to, "+447700900123");
        assert!(texts[0].body.contains("Q-FX"), "sms must carry the short ref");

        let log = activities::list_for_quote(&db, "q-fx").await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action_type, "customer_confirmed");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn notification_failures_do_not_block_activity_or_split() {
        let (db, _dir) = setup().await;
        quotes::create_quote(&db, &return_trip_quote("q-fail", "tok-fail"))
            .await
            .unwrap();
        let n = notifier(Arc::new(MockMailer::failing()), Arc::new(MockSms::failing()));

        let ConfirmOutcome::Confirmed(confirmed) =
            confirm_transition(&db, "tok-fail").await.unwrap()
        else {
            panic!("expected confirmed outcome");
        };
        post_confirmation(&db, &n, &confirmed).await;

        // Activity and split both landed despite every channel failing.
        let log = activities::list_for_quote(&db, "q-fail").await.unwrap();
        assert_eq!(log.len(), 1);
        let outbound = quotes::get_quote(&db, "q-fail").await.unwrap().unwrap();
        assert_eq!(outbound.trip_leg, Some(TripLeg::Outbound));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn single_leg_confirmation_never_creates_a_second_record() {
        let (db, _dir) = setup().await;
        quotes::create_quote(&db, &pending_quote("q-single", "tok-single"))
            .await
            .unwrap();
        let n = notifier(Arc::new(MockMailer::new()), Arc::new(MockSms::new()));

        let ConfirmOutcome::Confirmed(confirmed) =
            confirm_transition(&db, "tok-single").await.unwrap()
        else {
            panic!("expected confirmed outcome");
        };
        post_confirmation(&db, &n, &confirmed).await;

        let filter = quotes::QuoteFilter::default();
        assert_eq!(quotes::count_matching(&db, &filter).await.unwrap(), 1);
        let stored = quotes::get_quote(&db, "q-single").await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
        assert!(stored.trip_leg.is_none(), "single-leg record keeps no leg marker");
        assert!(stored.related_booking_id.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn return_trip_splits_into_two_records() {
        let (db, _dir) = setup().await;
        quotes::create_quote(&db, &return_trip_quote("q-rt", "tok-rt"))
            .await
            .unwrap();
        let n = notifier(Arc::new(MockMailer::new()), Arc::new(MockSms::new()));

        let ConfirmOutcome::Confirmed(confirmed) =
            confirm_transition(&db, "tok-rt").await.unwrap()
        else {
            panic!("expected confirmed outcome");
        };
        post_confirmation(&db, &n, &confirmed).await;

        // Original rewritten as the outbound leg.
        let outbound = quotes::get_quote(&db, "q-rt").await.unwrap().unwrap();
        assert_eq!(outbound.trip_leg, Some(TripLeg::Outbound));
        assert_eq!(outbound.pickup_location, "Paddington");
        assert_eq!(outbound.dropoff_location.as_deref(), Some("Gatwick"));
        assert_eq!(outbound.date, "2026-09-10");
        assert_eq!(
            outbound.destinations.single_leg().unwrap(),
            &["Victoria".to_string(), "Gatwick".to_string()]
        );
        assert_eq!(outbound.quoted_price, 95.0, "outbound keeps the quoted price");

        // New confirmed, unpriced return leg pointing back.
        let filter = quotes::QuoteFilter::default();
        assert_eq!(quotes::count_matching(&db, &filter).await.unwrap(), 2);
        let return_leg = quotes::get_quote_by_token(&db, "tok-rt").await.unwrap().unwrap();
        assert_eq!(return_leg.id, "q-rt", "token stays on the original record");

        let all = quotes::list_contacts(&db, &filter).await.unwrap();
        assert_eq!(all.len(), 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn return_leg_record_fields_are_correct() {
        let (db, _dir) = setup().await;
        quotes::create_quote(&db, &return_trip_quote("q-rl", "tok-rl"))
            .await
            .unwrap();
        let n = notifier(Arc::new(MockMailer::new()), Arc::new(MockSms::new()));

        let ConfirmOutcome::Confirmed(confirmed) =
            confirm_transition(&db, "tok-rl").await.unwrap()
        else {
            panic!("expected confirmed outcome");
        };
        post_confirmation(&db, &n, &confirmed).await;

        // Find the return leg via its back reference.
        let return_leg = db
            .connection()
            .call(|conn| {
                let id: String = conn.query_row(
                    "SELECT id FROM quotes WHERE related_booking_id = 'q-rl'",
                    [],
                    |row| row.get(0),
                )?;
                Ok::<_, rusqlite::Error>(id)
            })
            .await
            .unwrap();
        let leg = quotes::get_quote(&db, &return_leg).await.unwrap().unwrap();
        assert_eq!(leg.status, BookingStatus::Confirmed);
        assert_eq!(leg.trip_leg, Some(TripLeg::Return));
        assert_eq!(leg.pickup_location, "Gatwick");
        assert_eq!(leg.dropoff_location.as_deref(), Some("Paddington"));
        assert_eq!(leg.date, "2026-09-14");
        assert_eq!(leg.quoted_price, 0.0, "return leg is unpriced");
        assert!(leg.confirmation_token.is_none());
        assert!(leg.quote_accepted_at.is_some());
        assert_eq!(leg.name, "Sam Carter");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn repeated_confirmation_never_splits_twice() {
        let (db, _dir) = setup().await;
        quotes::create_quote(&db, &return_trip_quote("q-once", "tok-once"))
            .await
            .unwrap();
        let n = notifier(Arc::new(MockMailer::new()), Arc::new(MockSms::new()));

        let ConfirmOutcome::Confirmed(confirmed) =
            confirm_transition(&db, "tok-once").await.unwrap()
        else {
            panic!("expected confirmed outcome");
        };
        post_confirmation(&db, &n, &confirmed).await;

        // Second click: guard short-circuits, no side effects re-run.
        let second = confirm_transition(&db, "tok-once").await.unwrap();
        assert!(matches!(second, ConfirmOutcome::AlreadyConfirmed));

        let filter = quotes::QuoteFilter::default();
        assert_eq!(quotes::count_matching(&db, &filter).await.unwrap(), 2);
        db.close().await.unwrap();
    }
}
