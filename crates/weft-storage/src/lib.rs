// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Weft messaging core.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, and typed
//! operations for companies, credentials, conversations, and messages.
//! The two invariants webhook processing leans on live here:
//!
//! - at most one conversation per (company, platform, external id), enforced
//!   by a unique constraint with conflict-triggered re-fetch;
//! - at most one message per (conversation, platform message id), with
//!   duplicate appends suppressed rather than rejected.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::*;
