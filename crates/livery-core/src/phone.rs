// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone normalization.
//!
//! Pure and deterministic: no I/O, same input always yields the same
//! output. Raw form input is reduced to a canonical dialable form
//! before it is persisted or handed to the SMS channel.

use thiserror::Error;

/// Rejection reasons for raw phone input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("invalid phone format: {0}")]
    InvalidPhoneFormat(String),
}

/// Minimum plausible length of raw phone input.
const MIN_RAW_LEN: usize = 6;

/// Normalize a raw phone string to a canonical dialable form.
///
/// Formatting characters (spaces, dashes, dots, parentheses) are
/// stripped, a leading `00` international prefix becomes `+`, and a
/// leading `+` is preserved. Fails when the input is empty, a bare
/// `+`, shorter than six characters, or contains no digits.
pub fn normalize_phone(raw: &str) -> Result<String, PhoneError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(PhoneError::InvalidPhoneFormat("empty".into()));
    }
    if trimmed == "+" {
        return Err(PhoneError::InvalidPhoneFormat("bare plus".into()));
    }
    if trimmed.len() < MIN_RAW_LEN {
        return Err(PhoneError::InvalidPhoneFormat(format!(
            "too short: {trimmed:?}"
        )));
    }

    let has_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(PhoneError::InvalidPhoneFormat(format!(
            "no digits: {trimmed:?}"
        )));
    }

    let normalized = if has_plus {
        format!("+{digits}")
    } else if let Some(rest) = digits.strip_prefix("00") {
        format!("+{rest}")
    } else {
        digits
    };

    Ok(normalized)
}
