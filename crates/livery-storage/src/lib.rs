// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Livery booking service.
//!
//! A single tokio-rusqlite connection serializes all access; the
//! `queries` modules are thin async wrappers over plain SQL.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

#[cfg(test)]
pub(crate) mod test_support;

pub use database::Database;
pub use models::{Audience, Campaign, EmailSubscription, Quote, QuoteActivity};
