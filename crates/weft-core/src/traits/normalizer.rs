// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook normalizer trait: platform payload in, canonical events out.

use serde_json::Value;

use crate::types::{NormalizeOutcome, Platform};

/// Converts one raw webhook delivery into canonical events.
///
/// Normalizers are infallible by contract: a shape that cannot be parsed
/// becomes [`NormalizeOutcome::Ignored`] with a reason, never an error.
/// Platform webhooks must not be driven into retry storms over payloads the
/// core will never understand.
pub trait WebhookNormalizer: Send + Sync {
    /// The platform whose payloads this normalizer understands.
    fn platform(&self) -> Platform;

    /// Normalizes a delivery. WhatsApp and Messenger batch several events
    /// into one delivery, hence the `Vec`; Telegram and Signal yield one.
    fn normalize(&self, payload: &Value) -> Vec<NormalizeOutcome>;
}
