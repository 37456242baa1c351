// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./livery.toml` > `~/.config/livery/livery.toml`
//! > `/etc/livery/livery.toml` with environment variable overrides via
//! the `LIVERY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LiveryConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/livery/livery.toml` (system-wide)
/// 3. `~/.config/livery/livery.toml` (user XDG config)
/// 4. `./livery.toml` (local directory)
/// 5. `LIVERY_*` environment variables
pub fn load_config() -> Result<LiveryConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LiveryConfig::default()))
        .merge(Toml::file("/etc/livery/livery.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("livery/livery.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("livery.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<LiveryConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LiveryConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LiveryConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LiveryConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `LIVERY_SMTP_FROM_ADDRESS` must map
/// to `smtp.from_address`, not `smtp.from.address`.
fn env_provider() -> Env {
    Env::prefixed("LIVERY_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: LIVERY_SMTP_FROM_ADDRESS -> "smtp_from_address"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("server_", "server.", 1)
            .replacen("site_", "site.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("smtp_", "smtp.", 1)
            .replacen("sms_", "sms.", 1);
        mapped.into()
    })
}
