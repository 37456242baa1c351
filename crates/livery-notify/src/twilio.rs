// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio-compatible SMS implementation of the SMS capability.

use async_trait::async_trait;

use livery_config::SmsConfig;
use livery_core::traits::{SmsMessage, SmsSender};
use livery_core::LiveryError;

/// SMS sender speaking the Twilio Messages REST API.
pub struct TwilioSms {
    client: reqwest::Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
}

impl TwilioSms {
    /// Build a sender from config. Returns `None` unless all three
    /// credentials are present, which disables the SMS channel.
    pub fn from_config(config: &SmsConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        Some(Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone()?,
            auth_token: config.auth_token.clone()?,
        })
    }
}

#[async_trait]
impl SmsSender for TwilioSms {
    async fn send(&self, msg: &SmsMessage) -> Result<(), LiveryError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        );
        let params = [("To", &msg.to), ("From", &msg.from), ("Body", &msg.body)];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| LiveryError::Notify {
                message: format!("sms request to {} failed", msg.to),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LiveryError::Notify {
                message: format!("sms provider returned {status} for {}: {body}", msg.to),
                source: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sms_config(api_base: &str) -> SmsConfig {
        SmsConfig {
            account_sid: Some("AC0123456789".to_string()),
            auth_token: Some("token-secret".to_string()),
            from_number: Some("+15550001111".to_string()),
            api_base: api_base.to_string(),
        }
    }

    fn message() -> SmsMessage {
        SmsMessage {
            to: "+447700900123".to_string(),
            from: "+15550001111".to_string(),
            body: "Livery Chauffeurs: your booking A1B2C3D4 is confirmed.".to_string(),
        }
    }

    #[test]
    fn missing_credentials_disable_the_channel() {
        let mut config = sms_config("https://api.twilio.com");
        config.auth_token = None;
        assert!(TwilioSms::from_config(&config).is_none());
    }

    #[tokio::test]
    async fn send_posts_form_encoded_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/2010-04-01/Accounts/AC0123456789/Messages.json"))
            .and(body_string_contains("To=%2B447700900123"))
            .and(body_string_contains("Body=Livery"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sid": "SM123",
                "status": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sms = TwilioSms::from_config(&sms_config(&server.uri())).unwrap();
        sms.send(&message()).await.unwrap();
    }

    #[tokio::test]
    async fn provider_rejection_maps_to_notify_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": 21211,
                "message": "Invalid 'To' phone number"
            })))
            .mount(&server)
            .await;

        let sms = TwilioSms::from_config(&sms_config(&server.uri())).unwrap();
        let err = sms.send(&message()).await.unwrap_err();
        assert!(matches!(err, LiveryError::Notify { .. }));
        assert!(err.to_string().contains("400"));
    }
}
