// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Livery booking backend.
//!
//! This crate provides the error type, domain types (booking lifecycle,
//! polymorphic destinations, contacts), the phone normalizer, and the
//! outbound capability traits implemented by `livery-notify`.

pub mod error;
pub mod ids;
pub mod phone;
pub mod time;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LiveryError;
pub use types::{
    BookingStatus, CampaignStatus, Contact, CustomFilter, Destinations, LegDetails, Segment,
    TripLeg,
};

pub use traits::{EmailSender, SmsSender};
