// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email capability trait.

use async_trait::async_trait;

use crate::error::LiveryError;

/// A single outbound email.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
}

/// Capability to transmit email through an external provider.
///
/// Callers fire and observe per-call success; they never retry and
/// never block a primary workflow on the outcome.
#[async_trait]
pub trait EmailSender: Send + Sync + 'static {
    /// Send one message.
    async fn send(&self, msg: &EmailMessage) -> Result<(), LiveryError>;

    /// Send a batch of messages in one provider call.
    ///
    /// The batch succeeds or fails as a unit; partial-batch delivery is
    /// not observable through this interface.
    async fn send_batch(&self, msgs: &[EmailMessage]) -> Result<(), LiveryError>;
}
