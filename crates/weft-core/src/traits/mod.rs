// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented by the per-platform crates.

pub mod channel;
pub mod normalizer;

pub use channel::ChannelClient;
pub use normalizer::WebhookNormalizer;
