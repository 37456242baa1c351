// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async query modules, one per table.

pub mod activities;
pub mod audiences;
pub mod campaigns;
pub mod quotes;
pub mod subscriptions;
