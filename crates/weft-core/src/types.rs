// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical domain types shared across the Weft workspace.
//!
//! Platform webhook payloads are normalized into these shapes before they
//! touch storage; the outbound path speaks them as well. Timestamps on
//! stored rows are RFC 3339 strings with millisecond precision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Messaging platforms supported by the ingestion core.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    Telegram,
    WhatsApp,
    Instagram,
    Facebook,
    Signal,
}

impl Platform {
    /// Lowercase identifier used in URLs, storage rows, and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Telegram => "telegram",
            Platform::WhatsApp => "whatsapp",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Signal => "signal",
        }
    }

    /// Metadata key under which the platform-native message id is recorded.
    ///
    /// This key doubles as the dedup handle: reprocessing a delivery with the
    /// same id for the same conversation must not create a second row.
    pub fn message_id_key(&self) -> &'static str {
        match self {
            Platform::Telegram => "telegram_message_id",
            Platform::WhatsApp => "whatsapp_message_id",
            Platform::Instagram => "instagram_mid",
            Platform::Facebook => "facebook_mid",
            Platform::Signal => "signal_timestamp",
        }
    }
}

/// Direction of a stored message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// Content classification of a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Document,
    Voice,
    Audio,
    Video,
}

/// Lifecycle state of a conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Closed,
}

/// Structured snapshot of an external sender at the time a message arrived.
///
/// Stored verbatim in `Message::sender_info` and appended (once) to the
/// owning conversation's participant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderInfo {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl SenderInfo {
    /// Snapshot carrying only a platform user id.
    pub fn bare(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: None,
            first_name: None,
            last_name: None,
            phone: None,
        }
    }
}

/// Kind of a message attachment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Document,
    Voice,
    Audio,
    Video,
}

/// Descriptor for a file carried by a message.
///
/// Telegram, WhatsApp, and Signal reference media by a platform file id that
/// is later resolved to a download URL; Messenger delivers a CDN URL
/// directly. Whichever handle the platform gave us is preserved as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
}

impl Attachment {
    /// Descriptor with only a kind and file id set.
    pub fn by_file_id(kind: AttachmentKind, file_id: impl Into<String>) -> Self {
        Self {
            kind,
            file_id: Some(file_id.into()),
            url: None,
            file_size: None,
            file_name: None,
            mime_type: None,
            duration_secs: None,
        }
    }

    /// Descriptor with only a kind and CDN url set.
    pub fn by_url(kind: AttachmentKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            file_id: None,
            url: Some(url.into()),
            file_size: None,
            file_name: None,
            mime_type: None,
            duration_secs: None,
        }
    }
}

/// Canonical, platform-agnostic shape of one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInbound {
    /// Platform chat/user id identifying the conversation counterpart.
    pub external_chat_id: String,
    /// Platform-native message id, used for idempotent append.
    pub platform_message_id: String,
    pub sender: SenderInfo,
    /// Platform-reported event time, not receipt time.
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    /// Text body, or the caption / placeholder for media messages.
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Interactive action (Telegram callback query, Messenger postback).
///
/// Observed and logged, never persisted as a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Result of normalizing one event inside a webhook delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeOutcome {
    /// A message to resolve and persist.
    Message(NormalizedInbound),
    /// An interactive action to observe but not store.
    Callback(CallbackEvent),
    /// A shape the core cannot or will not handle; acknowledged without error.
    Ignored { reason: String },
}

/// Kind of media an outbound send may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Image,
    Document,
}

/// Reference to hosted media for an outbound send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub url: String,
}

/// Optional knobs for an outbound text send.
///
/// Telegram honors both fields; the other platforms ignore them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<Value>,
}

/// Acknowledgment returned by a platform API for a successful send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReceipt {
    /// Platform-assigned message id, when the API reports one.
    pub platform_message_id: Option<String>,
}

/// Lifecycle state of a tenant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CompanyStatus {
    Active,
    Suspended,
}

/// Tenant record. All conversations and credentials are scoped to a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub status: CompanyStatus,
    pub created_at: String,
}

/// Per-company, per-platform API credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelCredentials {
    pub company_id: String,
    pub platform: Platform,
    pub access_token: String,
    /// WhatsApp phone-number id or Messenger page id; unused elsewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
}

/// A conversation thread with one external counterpart on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub company_id: String,
    pub platform: Platform,
    pub external_id: String,
    pub status: ConversationStatus,
    /// Participant snapshots in first-seen order, deduplicated by user id.
    pub participants: Vec<SenderInfo>,
    pub created_at: String,
    pub updated_at: String,
}

/// One stored message within a conversation.
///
/// Immutable after creation except for `is_processed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub direction: Direction,
    pub kind: MessageKind,
    pub content: String,
    pub sender_info: SenderInfo,
    pub attachments: Vec<Attachment>,
    /// Free-form map; always contains the platform-native message id under
    /// [`Platform::message_id_key`].
    pub metadata: serde_json::Map<String, Value>,
    pub platform_message_id: String,
    pub is_processed: bool,
    /// Platform-reported event time.
    pub timestamp: String,
    pub created_at: String,
}
