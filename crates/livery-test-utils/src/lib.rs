// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory test doubles for the outbound capability traits.
//!
//! `MockMailer` and `MockSms` capture every message handed to them so
//! tests can assert on exact recipients, subjects, and bodies. Both
//! support scripted failures for exercising the partial-failure paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use livery_core::traits::{EmailMessage, EmailSender, SmsMessage, SmsSender};
use livery_core::LiveryError;

/// Email double that records sent messages.
///
/// `fail_batches` holds zero-based indexes of `send_batch` calls that
/// must fail; counting is per-mailer, across its lifetime.
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<EmailMessage>>,
    batch_calls: AtomicUsize,
    fail_batches: Vec<usize>,
    fail_all: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Fail the Nth (zero-based) `send_batch` call.
    pub fn failing_batches(indexes: Vec<usize>) -> Self {
        Self {
            fail_batches: indexes,
            ..Self::default()
        }
    }

    /// Everything successfully sent so far, in order.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl EmailSender for MockMailer {
    async fn send(&self, msg: &EmailMessage) -> Result<(), LiveryError> {
        if self.fail_all {
            return Err(LiveryError::notify("mock mailer failure"));
        }
        self.sent.lock().unwrap().push(msg.clone());
        Ok(())
    }

    async fn send_batch(&self, msgs: &[EmailMessage]) -> Result<(), LiveryError> {
        let call = self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all || self.fail_batches.contains(&call) {
            return Err(LiveryError::notify(format!(
                "mock mailer batch {call} failure"
            )));
        }
        self.sent.lock().unwrap().extend_from_slice(msgs);
        Ok(())
    }
}

/// SMS double that records sent messages.
#[derive(Default)]
pub struct MockSms {
    sent: Mutex<Vec<SmsMessage>>,
    fail_all: bool,
}

impl MockSms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SmsMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl SmsSender for MockSms {
    async fn send(&self, msg: &SmsMessage) -> Result<(), LiveryError> {
        if self.fail_all {
            return Err(LiveryError::notify("mock sms failure"));
        }
        self.sent.lock().unwrap().push(msg.clone());
        Ok(())
    }
}
