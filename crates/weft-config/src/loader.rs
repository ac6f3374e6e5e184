// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./weft.toml` > `~/.config/weft/weft.toml` >
//! `/etc/weft/weft.toml` with environment variable overrides via `WEFT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::WeftConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/weft/weft.toml` (system-wide)
/// 3. `~/.config/weft/weft.toml` (user XDG config)
/// 4. `./weft.toml` (local directory)
/// 5. `WEFT_*` environment variables
pub fn load_config() -> Result<WeftConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WeftConfig::default()))
        .merge(Toml::file("/etc/weft/weft.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("weft/weft.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("weft.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<WeftConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WeftConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WeftConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WeftConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `WEFT_STORAGE_DATABASE_PATH` must map to
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("WEFT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: WEFT_TELEGRAM_API_BASE -> "telegram_api_base"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("webhook_", "webhook.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("whatsapp_", "whatsapp.", 1)
            .replacen("messenger_", "messenger.", 1)
            .replacen("signal_", "signal.", 1);
        mapped.into()
    })
}
