// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Weft messaging core.

use thiserror::Error;

/// The primary error type used across all Weft crates.
#[derive(Debug, Error)]
pub enum WeftError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Platform channel errors (API failure, transport failure, malformed response).
    ///
    /// Channel adapters never let a transport or API failure escape as a panic:
    /// every non-2xx response and every reqwest error is folded into this
    /// variant so callers can decide on retry/backoff.
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// No company exists for the given identifier, or no credentials are
    /// configured for the requested platform.
    #[error("unknown company: {company_id}")]
    CompanyNotFound { company_id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
