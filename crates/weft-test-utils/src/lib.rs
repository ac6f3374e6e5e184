// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Weft integration tests.
//!
//! A throwaway-database harness seeded with a tenant, and builders for the
//! platform webhook payloads the tests replay.

pub mod harness;
pub mod payloads;

pub use harness::TestStore;
