// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp formatting.
//!
//! All persisted timestamps use the same millisecond UTC string format
//! so that SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ', ...)` output and
//! Rust-generated values compare lexicographically.

use chrono::{Duration, Utc};

const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time in the canonical persisted format,
/// e.g. `2026-08-27T14:03:22.190Z`.
pub fn now_utc() -> String {
    Utc::now().format(CANONICAL_FORMAT).to_string()
}

/// The canonical timestamp `days` days before now. Used for
/// segmentation age cutoffs.
pub fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days))
        .format(CANONICAL_FORMAT)
        .to_string()
}
