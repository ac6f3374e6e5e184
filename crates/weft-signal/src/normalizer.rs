// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal envelope normalization.
//!
//! signal-cli wraps everything in an `envelope`; data messages carry text
//! and attachments, while receipts and typing indicators are acknowledged
//! without storage. The envelope timestamp (milliseconds) doubles as the
//! platform message id -- Signal has no separate message id on the wire.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use weft_core::traits::WebhookNormalizer;
use weft_core::types::{
    Attachment, AttachmentKind, MessageKind, NormalizeOutcome, NormalizedInbound, Platform,
    SenderInfo,
};

/// Normalizer for signal-cli envelopes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalNormalizer;

#[derive(Debug, Deserialize)]
struct SignalDelivery {
    envelope: Option<SignalEnvelope>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignalEnvelope {
    source: Option<String>,
    source_number: Option<String>,
    source_name: Option<String>,
    timestamp: Option<i64>,
    data_message: Option<SignalDataMessage>,
    receipt_message: Option<Value>,
    typing_message: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignalDataMessage {
    timestamp: Option<i64>,
    message: Option<String>,
    #[serde(default)]
    attachments: Vec<SignalAttachment>,
    group_info: Option<SignalGroupInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignalAttachment {
    content_type: Option<String>,
    filename: Option<String>,
    id: Option<String>,
    size: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignalGroupInfo {
    group_id: Option<String>,
}

impl WebhookNormalizer for SignalNormalizer {
    fn platform(&self) -> Platform {
        Platform::Signal
    }

    fn normalize(&self, payload: &Value) -> Vec<NormalizeOutcome> {
        let delivery: SignalDelivery = match serde_json::from_value(payload.clone()) {
            Ok(delivery) => delivery,
            Err(e) => {
                return vec![NormalizeOutcome::Ignored {
                    reason: format!("not a signal envelope: {e}"),
                }]
            }
        };
        let Some(envelope) = delivery.envelope else {
            return vec![NormalizeOutcome::Ignored {
                reason: "missing envelope".to_string(),
            }];
        };
        vec![normalize_envelope(envelope)]
    }
}

fn normalize_envelope(envelope: SignalEnvelope) -> NormalizeOutcome {
    if envelope.receipt_message.is_some() {
        return NormalizeOutcome::Ignored {
            reason: "delivery receipt".to_string(),
        };
    }
    if envelope.typing_message.is_some() {
        return NormalizeOutcome::Ignored {
            reason: "typing indicator".to_string(),
        };
    }
    let Some(data) = envelope.data_message else {
        return NormalizeOutcome::Ignored {
            reason: "envelope carries no data message".to_string(),
        };
    };

    let Some(source) = envelope.source_number.or(envelope.source) else {
        return NormalizeOutcome::Ignored {
            reason: "envelope has no source".to_string(),
        };
    };
    let Some(millis) = data.timestamp.or(envelope.timestamp) else {
        return NormalizeOutcome::Ignored {
            reason: "envelope has no timestamp".to_string(),
        };
    };
    let Some(timestamp) = DateTime::from_timestamp_millis(millis) else {
        return NormalizeOutcome::Ignored {
            reason: format!("timestamp {millis} is not a valid unix time"),
        };
    };

    // Group chats thread by group id; direct chats by the sender's number.
    let external_chat_id = data
        .group_info
        .as_ref()
        .and_then(|g| g.group_id.clone())
        .unwrap_or_else(|| source.clone());

    let attachments: Vec<Attachment> = data.attachments.iter().map(attachment_descriptor).collect();

    let (kind, content) = match (&data.message, attachments.first()) {
        (Some(text), _) if !text.is_empty() => {
            let kind = attachments
                .first()
                .map(|a| message_kind_for(a.kind))
                .unwrap_or(MessageKind::Text);
            (kind, text.clone())
        }
        (_, Some(first)) => {
            let kind = message_kind_for(first.kind);
            let content = match kind {
                MessageKind::Image => "Image received",
                MessageKind::Voice => "Voice message received",
                MessageKind::Video => "Video received",
                _ => "Attachment received",
            };
            (kind, content.to_string())
        }
        _ => {
            // Reactions, remote deletes, and similar data messages.
            return NormalizeOutcome::Ignored {
                reason: "data message has neither text nor attachments".to_string(),
            };
        }
    };

    NormalizeOutcome::Message(NormalizedInbound {
        external_chat_id,
        platform_message_id: millis.to_string(),
        sender: SenderInfo {
            user_id: source.clone(),
            username: None,
            first_name: envelope.source_name,
            last_name: None,
            phone: Some(source),
        },
        timestamp,
        kind,
        content,
        attachments,
    })
}

fn attachment_descriptor(attachment: &SignalAttachment) -> Attachment {
    let kind = match attachment.content_type.as_deref() {
        Some(ct) if ct.starts_with("image/") => AttachmentKind::Image,
        // Signal audio messages are voice notes.
        Some(ct) if ct.starts_with("audio/") => AttachmentKind::Voice,
        Some(ct) if ct.starts_with("video/") => AttachmentKind::Video,
        _ => AttachmentKind::Document,
    };
    Attachment {
        kind,
        file_id: attachment.id.clone(),
        url: None,
        file_size: attachment.size,
        file_name: attachment.filename.clone(),
        mime_type: attachment.content_type.clone(),
        duration_secs: None,
    }
}

fn message_kind_for(kind: AttachmentKind) -> MessageKind {
    match kind {
        AttachmentKind::Image => MessageKind::Image,
        AttachmentKind::Voice => MessageKind::Voice,
        AttachmentKind::Audio => MessageKind::Audio,
        AttachmentKind::Video => MessageKind::Video,
        AttachmentKind::Document => MessageKind::Document,
    }
}
