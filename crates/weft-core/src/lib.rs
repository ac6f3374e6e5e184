// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Weft messaging workspace.
//!
//! Provides the shared error type, the canonical domain types that platform
//! webhook payloads are normalized into, and the adapter traits the
//! per-platform crates implement.

pub mod error;
pub mod traits;
pub mod types;

pub use error::WeftError;
pub use traits::{ChannelClient, WebhookNormalizer};
pub use types::{
    Attachment, AttachmentKind, CallbackEvent, ChannelCredentials, Company, CompanyStatus,
    Conversation, ConversationStatus, Direction, MediaKind, MediaRef, Message, MessageKind,
    NormalizeOutcome, NormalizedInbound, Platform, SendOptions, SendReceipt, SenderInfo,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weft_error_has_all_variants() {
        let _config = WeftError::Config("test".into());
        let _storage = WeftError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = WeftError::Channel {
            message: "test".into(),
            source: None,
        };
        let _company = WeftError::CompanyNotFound {
            company_id: "c-1".into(),
        };
        let _timeout = WeftError::Timeout {
            duration: std::time::Duration::from_secs(10),
        };
        let _internal = WeftError::Internal("test".into());
    }

    #[test]
    fn channel_error_preserves_platform_message() {
        let err = WeftError::Channel {
            message: "telegram API error: Bad Request".into(),
            source: None,
        };
        assert!(err.to_string().contains("Bad Request"));
    }
}
