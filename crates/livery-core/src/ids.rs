// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifier and secret generation.

use rand::RngCore;

/// Generate a fresh record id (UUID v4, lowercase hyphenated).
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Generate an opaque confirmation token: 128 bits of CSPRNG output,
/// hex-encoded. Collision probability is negligible and the token is
/// the sole credential for the confirm-booking transition.
pub fn new_confirmation_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a subscriber discount code, e.g. `RIDE10-3F9A2C`.
pub fn new_discount_code() -> String {
    let mut bytes = [0u8; 3];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    format!("RIDE10-{}", hex::encode_upper(bytes))
}

/// Human-readable short reference for a record id: the first 8
/// characters, uppercased. Used in SMS bodies and staff emails.
pub fn short_ref(id: &str) -> String {
    id.chars().take(8).collect::<String>().to_uppercase()
}
