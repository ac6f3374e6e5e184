// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound client trait for platform API integrations.

use async_trait::async_trait;

use crate::error::WeftError;
use crate::types::{MediaRef, Platform, SendOptions, SendReceipt};

/// Thin client over one platform's send API.
///
/// Implementations are built per call from company-scoped credentials, run
/// each request with a bounded timeout, and perform no retries and no
/// persistence: callers check the result and mirror the message themselves.
#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// The platform this client talks to.
    fn platform(&self) -> Platform;

    /// Sends a plain text message to the given chat.
    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        options: &SendOptions,
    ) -> Result<SendReceipt, WeftError>;

    /// Sends hosted media (image or document) with an optional caption.
    async fn send_media(
        &self,
        chat_id: &str,
        media: &MediaRef,
        caption: &str,
    ) -> Result<SendReceipt, WeftError>;

    /// Resolves a platform file id to a download URL.
    ///
    /// Returns `Ok(None)` when the platform has no such file or does not
    /// support id-based resolution (Messenger media arrives by URL).
    async fn resolve_file_url(&self, file_id: &str) -> Result<Option<String>, WeftError>;
}
