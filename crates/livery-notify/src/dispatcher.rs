// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel notification dispatch.
//!
//! Each dispatch call is independent: the outcome is logged per channel
//! and never propagated, so a provider outage cannot fail a booking
//! workflow. Unconfigured channels are skipped silently.

use std::sync::Arc;

use tracing::{debug, info, warn};

use livery_core::traits::{EmailMessage, EmailSender, SmsMessage, SmsSender};

/// Dispatcher over the configured outbound channels.
#[derive(Clone)]
pub struct Notifier {
    mailer: Option<Arc<dyn EmailSender>>,
    sms: Option<Arc<dyn SmsSender>>,
    pub from_address: String,
    pub admin_address: String,
    pub sms_from: Option<String>,
    pub service_name: String,
}

impl Notifier {
    pub fn new(
        mailer: Option<Arc<dyn EmailSender>>,
        sms: Option<Arc<dyn SmsSender>>,
        from_address: impl Into<String>,
        admin_address: impl Into<String>,
        sms_from: Option<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            mailer,
            sms,
            from_address: from_address.into(),
            admin_address: admin_address.into(),
            sms_from,
            service_name: service_name.into(),
        }
    }

    /// The raw email capability, for callers that need batch semantics
    /// and per-batch outcomes (the campaign sender).
    pub fn mailer(&self) -> Option<&Arc<dyn EmailSender>> {
        self.mailer.as_ref()
    }

    /// True when the SMS channel is usable.
    pub fn sms_configured(&self) -> bool {
        self.sms.is_some() && self.sms_from.is_some()
    }

    /// Send one email on a named channel. Returns whether it was
    /// delivered to the provider; failures are logged, not raised.
    pub async fn email(
        &self,
        channel: &str,
        booking_id: &str,
        to: &str,
        subject: String,
        html: String,
    ) -> bool {
        let Some(mailer) = &self.mailer else {
            debug!(channel, booking_id, "email channel unconfigured, skipping");
            return false;
        };
        let msg = EmailMessage {
            to: to.to_string(),
            from: self.from_address.clone(),
            subject,
            html,
        };
        match mailer.send(&msg).await {
            Ok(()) => {
                info!(channel, booking_id, to, "email dispatched");
                true
            }
            Err(e) => {
                warn!(channel, booking_id, to, error = %e, "email dispatch failed");
                false
            }
        }
    }

    /// Send one SMS. Returns whether it was delivered to the provider;
    /// failures are logged, not raised.
    pub async fn sms(&self, booking_id: &str, to: &str, body: String) -> bool {
        let (Some(sms), Some(from)) = (&self.sms, &self.sms_from) else {
            debug!(booking_id, "sms channel unconfigured, skipping");
            return false;
        };
        let msg = SmsMessage {
            to: to.to_string(),
            from: from.clone(),
            body,
        };
        match sms.send(&msg).await {
            Ok(()) => {
                info!(channel = "sms", booking_id, to, "sms dispatched");
                true
            }
            Err(e) => {
                warn!(channel = "sms", booking_id, to, error = %e, "sms dispatch failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livery_test_utils::{MockMailer, MockSms};

    fn notifier(
        mailer: Option<Arc<dyn EmailSender>>,
        sms: Option<Arc<dyn SmsSender>>,
    ) -> Notifier {
        Notifier::new(
            mailer,
            sms,
            "bookings@livery.example",
            "dispatch@livery.example",
            Some("+15550001111".to_string()),
            "Livery Chauffeurs",
        )
    }

    #[tokio::test]
    async fn email_goes_out_with_configured_from_address() {
        let mailer = Arc::new(MockMailer::new());
        let n = notifier(Some(mailer.clone()), None);

        let ok = n
            .email(
                "email-customer",
                "q-1",
                "rider@example.com",
                "subject".to_string(),
                "<p>hi</p>".to_string(),
            )
            .await;
        assert!(ok);
        let sent = mailer.sent();
        assert_eq!(sent[0].from, "bookings@livery.example");
        assert_eq!(sent[0].to, "rider@example.com");
    }

    #[tokio::test]
    async fn unconfigured_channels_skip_silently() {
        let n = notifier(None, None);
        assert!(
            !n.email(
                "email-admin",
                "q-1",
                "dispatch@livery.example",
                "s".to_string(),
                "h".to_string()
            )
            .await
        );
        assert!(!n.sms("q-1", "+447700900123", "body".to_string()).await);
    }

    #[tokio::test]
    async fn provider_failure_is_swallowed() {
        let n = notifier(Some(Arc::new(MockMailer::failing())), Some(Arc::new(MockSms::failing())));
        assert!(
            !n.email("email-customer", "q-1", "a@example.com", "s".into(), "h".into())
                .await
        );
        assert!(!n.sms("q-1", "+447700900123", "body".into()).await);
    }

    #[tokio::test]
    async fn sms_uses_configured_sender_number() {
        let sms = Arc::new(MockSms::new());
        let n = notifier(None, Some(sms.clone()));
        assert!(n.sms("q-1", "+447700900123", "confirmed".into()).await);
        assert!(n.sms_configured());
        let sent = sms.sent();
        assert_eq!(sent[0].from, "+15550001111");
    }
}
