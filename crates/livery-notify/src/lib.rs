// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound notification providers and dispatch.
//!
//! Concrete SMTP and SMS implementations of the `livery-core`
//! capability traits, the pure HTML templating functions, and the
//! per-channel dispatcher that the workflows fire and forget into.

pub mod dispatcher;
pub mod smtp;
pub mod templates;
pub mod twilio;

pub use dispatcher::Notifier;
pub use smtp::SmtpMailer;
pub use twilio::TwilioSms;
