// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS capability trait.

use async_trait::async_trait;

use crate::error::LiveryError;

/// A single outbound SMS.
#[derive(Debug, Clone, PartialEq)]
pub struct SmsMessage {
    pub to: String,
    pub from: String,
    pub body: String,
}

/// Capability to transmit SMS through an external provider.
///
/// The SMS channel is optional end to end: when no provider is
/// configured the dispatcher skips the channel silently rather than
/// failing.
#[async_trait]
pub trait SmsSender: Send + Sync + 'static {
    async fn send(&self, msg: &SmsMessage) -> Result<(), LiveryError>;
}
