// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses and coherent provider
//! credential sets.

use crate::diagnostic::ConfigError;
use crate::model::LiveryConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &LiveryConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // server.host must be a valid IP or hostname
    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !config.site.base_url.starts_with("http://") && !config.site.base_url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "site.base_url must start with http:// or https://, got `{}`",
                config.site.base_url
            ),
        });
    }

    if !config.site.confirm_path.starts_with('/') {
        errors.push(ConfigError::Validation {
            message: format!(
                "site.confirm_path must start with `/`, got `{}`",
                config.site.confirm_path
            ),
        });
    }

    // SMTP: a configured host requires a non-empty from address.
    if config.smtp.host.is_some() && config.smtp.from_address.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "smtp.from_address must not be empty when smtp.host is set".to_string(),
        });
    }

    // SMS credentials are all-or-nothing; a partial set is a likely
    // deployment mistake, not an intentional disable.
    let sms_fields_set = [
        config.sms.account_sid.is_some(),
        config.sms.auth_token.is_some(),
        config.sms.from_number.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();
    if sms_fields_set != 0 && sms_fields_set != 3 {
        errors.push(ConfigError::Validation {
            message:
                "sms requires all of account_sid, auth_token, and from_number, or none of them"
                    .to_string(),
        });
    }

    if let Some(token) = &config.server.admin_token
        && token.trim().len() < 16
    {
        errors.push(ConfigError::Validation {
            message: "server.admin_token must be at least 16 characters".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
