// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP implementation of the email capability.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use livery_config::SmtpConfig;
use livery_core::traits::{EmailMessage, EmailSender};
use livery_core::LiveryError;

/// Email sender backed by an SMTP relay via lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build a mailer from config. Returns `None` when no relay host is
    /// configured, which disables the email channel.
    pub fn from_config(config: &SmtpConfig) -> Result<Option<Self>, LiveryError> {
        let Some(host) = &config.host else {
            return Ok(None);
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| LiveryError::Notify {
                message: format!("invalid SMTP relay {host}"),
                source: Some(Box::new(e)),
            })?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Some(Self {
            transport: builder.build(),
        }))
    }

    fn build_message(msg: &EmailMessage) -> Result<Message, LiveryError> {
        Message::builder()
            .from(msg.from.parse().map_err(|e| LiveryError::Notify {
                message: format!("invalid from address {}", msg.from),
                source: Some(Box::new(e)),
            })?)
            .to(msg.to.parse().map_err(|e| LiveryError::Notify {
                message: format!("invalid recipient address {}", msg.to),
                source: Some(Box::new(e)),
            })?)
            .subject(&msg.subject)
            .header(ContentType::TEXT_HTML)
            .body(msg.html.clone())
            .map_err(|e| LiveryError::Notify {
                message: "failed to assemble email".to_string(),
                source: Some(Box::new(e)),
            })
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send(&self, msg: &EmailMessage) -> Result<(), LiveryError> {
        let message = Self::build_message(msg)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| LiveryError::Notify {
                message: format!("smtp send to {} failed", msg.to),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    async fn send_batch(&self, msgs: &[EmailMessage]) -> Result<(), LiveryError> {
        // SMTP has no true batch submit; the batch fails on the first
        // rejected message so callers observe it as a unit.
        for msg in msgs {
            self.send(msg).await?;
        }
        Ok(())
    }
}
