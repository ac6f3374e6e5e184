// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses and well-formed API base URLs.

use crate::diagnostic::ConfigError;
use crate::model::WeftConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &WeftConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let addr = config.server.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.bind_address must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "server.bind_address `{addr}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must not be 0".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if let Some(token) = &config.webhook.verify_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "webhook.verify_token must not be empty when set".to_string(),
        });
    }

    let api_bases = [
        ("telegram", &config.telegram.api_base, config.telegram.timeout_secs),
        ("whatsapp", &config.whatsapp.api_base, config.whatsapp.timeout_secs),
        ("messenger", &config.messenger.api_base, config.messenger.timeout_secs),
        ("signal", &config.signal.api_base, config.signal.timeout_secs),
    ];
    for (section, api_base, timeout_secs) in api_bases {
        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            errors.push(ConfigError::Validation {
                message: format!(
                    "{section}.api_base `{api_base}` must start with http:// or https://"
                ),
            });
        }
        if timeout_secs == 0 {
            errors.push(ConfigError::Validation {
                message: format!("{section}.timeout_secs must be at least 1"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
