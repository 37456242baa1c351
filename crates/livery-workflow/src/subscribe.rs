// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Marketing subscription lifecycle.
//!
//! Addresses are case-normalized before any lookup so the unique row
//! per subscriber survives unsubscribe/resubscribe cycles.

use tracing::info;

use livery_core::{ids, time, LiveryError};
use livery_notify::templates;
use livery_notify::Notifier;
use livery_storage::queries::subscriptions;
use livery_storage::{Database, EmailSubscription};

/// How an inbound subscribe request resolved.
#[derive(Debug)]
pub enum SubscribeOutcome {
    /// First-time subscriber; welcome email with a fresh code sent.
    Created(EmailSubscription),
    /// Previously unsubscribed; reactivated with a fresh code.
    Reactivated(EmailSubscription),
    /// Already active; nothing changed, no email sent.
    AlreadyActive(EmailSubscription),
}

impl SubscribeOutcome {
    pub fn subscription(&self) -> &EmailSubscription {
        match self {
            SubscribeOutcome::Created(s)
            | SubscribeOutcome::Reactivated(s)
            | SubscribeOutcome::AlreadyActive(s) => s,
        }
    }
}

fn normalize_email(raw: &str) -> Result<String, LiveryError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(LiveryError::Conflict(format!(
            "not a valid email address: {raw:?}"
        )));
    }
    Ok(email)
}

/// Subscribe an address, issuing a discount code and a welcome email
/// for new and reactivated subscribers. The welcome email is
/// best-effort.
pub async fn subscribe(
    db: &Database,
    notifier: &Notifier,
    raw_email: &str,
    source: Option<&str>,
) -> Result<SubscribeOutcome, LiveryError> {
    let email = normalize_email(raw_email)?;
    let now = time::now_utc();

    let outcome = match subscriptions::get_by_email(db, &email).await? {
        Some(existing) if existing.is_active => SubscribeOutcome::AlreadyActive(existing),
        Some(_) => {
            let code = ids::new_discount_code();
            let revived = subscriptions::reactivate(db, &email, &code, &now).await?;
            info!(email, "subscription reactivated");
            SubscribeOutcome::Reactivated(revived)
        }
        None => {
            let code = ids::new_discount_code();
            let created = subscriptions::insert(db, &email, &code, source, &now).await?;
            info!(email, "subscription created");
            SubscribeOutcome::Created(created)
        }
    };

    if !matches!(outcome, SubscribeOutcome::AlreadyActive(_)) {
        let sub = outcome.subscription();
        let (subject, html) =
            templates::subscription_welcome(&sub.discount_code, &notifier.service_name);
        notifier
            .email("email-subscriber", &email, &email, subject, html)
            .await;
    }

    Ok(outcome)
}

/// Unsubscribe an address. Returns `false` when no active subscription
/// matched; the row, if any, is kept for future reactivation.
pub async fn unsubscribe(db: &Database, raw_email: &str) -> Result<bool, LiveryError> {
    let email = normalize_email(raw_email)?;
    let deactivated = subscriptions::deactivate(db, &email, &time::now_utc()).await?;
    if deactivated {
        info!(email, "subscription deactivated");
    }
    Ok(deactivated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use livery_test_utils::MockMailer;

    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("subscribe.db").to_str().unwrap())
            .await
            .unwrap();
        (db, dir)
    }

    fn test_notifier(mailer: Arc<MockMailer>) -> Notifier {
        Notifier::new(
            Some(mailer),
            None,
            "marketing@livery.example",
            "dispatch@livery.example",
            None,
            "Livery Chauffeurs",
        )
    }

    #[tokio::test]
    async fn first_subscribe_creates_and_sends_welcome() {
        let (db, _dir) = setup().await;
        let mailer = Arc::new(MockMailer::new());
        let n = test_notifier(mailer.clone());

        let outcome = subscribe(&db, &n, "  Rider@Example.COM ", Some("footer"))
            .await
            .unwrap();
        let SubscribeOutcome::Created(sub) = outcome else {
            panic!("expected created outcome");
        };
        assert_eq!(sub.email, "rider@example.com");
        assert!(sub.discount_code.starts_with("RIDE10-"));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "rider@example.com");
        assert!(sent[0].html.contains(&sub.discount_code));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn resubscribe_while_active_changes_nothing() {
        let (db, _dir) = setup().await;
        let mailer = Arc::new(MockMailer::new());
        let n = test_notifier(mailer.clone());

        let first = subscribe(&db, &n, "a@example.com", None).await.unwrap();
        let original_code = first.subscription().discount_code.clone();

        let again = subscribe(&db, &n, "a@example.com", None).await.unwrap();
        let SubscribeOutcome::AlreadyActive(sub) = again else {
            panic!("expected already-active outcome");
        };
        assert_eq!(sub.discount_code, original_code);
        // No second welcome email.
        assert_eq!(mailer.sent_count(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unsubscribe_then_resubscribe_reactivates_with_fresh_code() {
        let (db, _dir) = setup().await;
        let n = test_notifier(Arc::new(MockMailer::new()));

        let first = subscribe(&db, &n, "b@example.com", None).await.unwrap();
        let original = first.subscription().clone();

        assert!(unsubscribe(&db, "b@example.com").await.unwrap());
        assert!(!unsubscribe(&db, "b@example.com").await.unwrap());

        let revived = subscribe(&db, &n, "b@example.com", None).await.unwrap();
        let SubscribeOutcome::Reactivated(sub) = revived else {
            panic!("expected reactivated outcome");
        };
        assert_eq!(sub.id, original.id, "no duplicate subscription row");
        assert!(sub.is_active);
        assert_ne!(sub.discount_code, original.discount_code);
        assert!(sub.unsubscribed_at.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_address_is_rejected() {
        let (db, _dir) = setup().await;
        let n = test_notifier(Arc::new(MockMailer::new()));
        assert!(subscribe(&db, &n, "   ", None).await.is_err());
        assert!(subscribe(&db, &n, "nobody", None).await.is_err());
        assert!(unsubscribe(&db, "").await.is_err());
        db.close().await.unwrap();
    }
}
