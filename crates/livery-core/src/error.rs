// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Livery booking backend.

use thiserror::Error;

/// The primary error type used across Livery crates.
#[derive(Debug, Error)]
pub enum LiveryError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Record-store errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound notification errors (SMTP rejection, SMS API failure).
    #[error("notification error: {message}")]
    Notify {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation not valid in the entity's current state
    /// (e.g. sending a campaign that is no longer a draft).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LiveryError {
    /// Wrap an arbitrary error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        LiveryError::Storage {
            source: Box::new(source),
        }
    }

    /// Build a notification failure with no underlying source.
    pub fn notify(message: impl Into<String>) -> Self {
        LiveryError::Notify {
            message: message.into(),
            source: None,
        }
    }
}
