// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking and marketing workflows.
//!
//! Every operation here is request-scoped and stateless: it reads
//! current state from the store, decides, and writes back. Side
//! effects (notifications, the return-trip split) are best-effort and
//! never fail the primary path.

pub mod audiences;
pub mod campaigns;
pub mod confirm;
pub mod intake;
pub mod segments;
pub mod subscribe;

pub use confirm::{confirm_transition, post_confirmation, ConfirmOutcome};
pub use intake::{submit_lead, LeadForm, SubmissionError};
pub use segments::{resolve_segment, SegmentResolution};
pub use subscribe::{subscribe, unsubscribe, SubscribeOutcome};
