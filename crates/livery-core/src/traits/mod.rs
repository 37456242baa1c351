// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits for outbound providers.
//!
//! The workflow crates depend on these traits only; concrete SMTP and
//! SMS implementations live in `livery-notify`, and test doubles in
//! `livery-test-utils`. All use `#[async_trait]` for dynamic dispatch.

pub mod mailer;
pub mod sms;

pub use mailer::{EmailMessage, EmailSender};
pub use sms::{SmsMessage, SmsSender};
