// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `weft-core::types` for use across
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate and adds the insert-side payload shapes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

pub use weft_core::types::{
    ChannelCredentials, Company, CompanyStatus, Conversation, ConversationStatus, Direction,
    Message, MessageKind, NormalizedInbound, Platform, SenderInfo,
};

/// Insert payload for [`crate::queries::messages::append_message`].
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: String,
    pub direction: Direction,
    pub kind: MessageKind,
    pub content: String,
    pub sender_info: SenderInfo,
    pub attachments: Vec<weft_core::types::Attachment>,
    pub metadata: serde_json::Map<String, Value>,
    /// Platform-native message id; the dedup key within the conversation.
    pub platform_message_id: String,
    /// Platform-reported event time, RFC 3339.
    pub timestamp: String,
}

impl NewMessage {
    /// Build an incoming insert payload from a normalized webhook message.
    ///
    /// The metadata map records the platform-native message id under
    /// [`Platform::message_id_key`], keeping the id numeric when the
    /// platform reports it as a number (Telegram, Signal).
    pub fn incoming(conversation_id: &str, platform: Platform, inbound: &NormalizedInbound) -> Self {
        let mut metadata = serde_json::Map::new();
        metadata.insert(
            platform.message_id_key().to_string(),
            native_message_id(&inbound.platform_message_id),
        );

        Self {
            conversation_id: conversation_id.to_string(),
            direction: Direction::Incoming,
            kind: inbound.kind,
            content: inbound.content.clone(),
            sender_info: inbound.sender.clone(),
            attachments: inbound.attachments.clone(),
            metadata,
            platform_message_id: inbound.platform_message_id.clone(),
            timestamp: format_timestamp(&inbound.timestamp),
        }
    }

    /// Build an outgoing insert payload for a message mirrored after a
    /// successful platform send. The send time stands in for the event time;
    /// platforms do not echo one for outbound messages.
    pub fn outgoing(
        conversation_id: &str,
        platform: Platform,
        kind: MessageKind,
        content: &str,
        sender_info: SenderInfo,
        attachments: Vec<weft_core::types::Attachment>,
        platform_message_id: &str,
    ) -> Self {
        let mut metadata = serde_json::Map::new();
        metadata.insert(
            platform.message_id_key().to_string(),
            native_message_id(platform_message_id),
        );

        Self {
            conversation_id: conversation_id.to_string(),
            direction: Direction::Outgoing,
            kind,
            content: content.to_string(),
            sender_info,
            attachments,
            metadata,
            platform_message_id: platform_message_id.to_string(),
            timestamp: now_timestamp(),
        }
    }
}

/// Preserve the platform's native representation of a message id.
fn native_message_id(raw: &str) -> Value {
    raw.parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(raw.to_string()))
}

/// Canonical timestamp format for stored rows: RFC 3339, millisecond
/// precision, `Z` suffix. Fixed precision keeps lexicographic order equal to
/// chronological order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current wall-clock time in the stored-row format.
pub fn now_timestamp() -> String {
    format_timestamp(&Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::types::{AttachmentKind, Attachment};

    fn sample_inbound() -> NormalizedInbound {
        NormalizedInbound {
            external_chat_id: "42".into(),
            platform_message_id: "7".into(),
            sender: SenderInfo::bare("9"),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            kind: MessageKind::Image,
            content: "look".into(),
            attachments: vec![Attachment::by_file_id(AttachmentKind::Image, "f-1")],
        }
    }

    #[test]
    fn incoming_records_numeric_native_id() {
        let new = NewMessage::incoming("conv-1", Platform::Telegram, &sample_inbound());
        assert_eq!(new.metadata["telegram_message_id"], 7);
        assert_eq!(new.platform_message_id, "7");
        assert_eq!(new.timestamp, "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn incoming_keeps_string_native_id() {
        let mut inbound = sample_inbound();
        inbound.platform_message_id = "wamid.XYZ==".into();
        let new = NewMessage::incoming("conv-1", Platform::WhatsApp, &inbound);
        assert_eq!(new.metadata["whatsapp_message_id"], "wamid.XYZ==");
    }
}
