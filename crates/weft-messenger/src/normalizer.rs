// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messenger webhook normalization for Instagram and Facebook pages.
//!
//! Deliveries batch events as `entry[].messaging[]` with millisecond
//! timestamps. Postbacks surface as callbacks; read and delivery receipts
//! and the page's own echoes are acknowledged without storage.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use weft_core::traits::WebhookNormalizer;
use weft_core::types::{
    Attachment, AttachmentKind, CallbackEvent, MessageKind, NormalizeOutcome, NormalizedInbound,
    Platform, SenderInfo,
};

/// Normalizer for Messenger Platform webhook deliveries.
///
/// One instance is registered per platform so the canonical events carry the
/// right tag even though the wire shape is shared.
#[derive(Debug, Clone, Copy)]
pub struct MessengerNormalizer {
    platform: Platform,
}

impl MessengerNormalizer {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[derive(Debug, Deserialize)]
struct MessengerDelivery {
    entry: Option<Vec<MessengerEntry>>,
}

#[derive(Debug, Deserialize)]
struct MessengerEntry {
    #[serde(default)]
    messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Deserialize)]
struct MessagingEvent {
    sender: Option<MessengerParty>,
    timestamp: Option<i64>,
    message: Option<MessengerMessage>,
    postback: Option<MessengerPostback>,
    read: Option<Value>,
    delivery: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MessengerParty {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessengerMessage {
    mid: Option<String>,
    text: Option<String>,
    #[serde(default)]
    attachments: Vec<MessengerAttachment>,
    #[serde(default)]
    is_echo: bool,
}

#[derive(Debug, Deserialize)]
struct MessengerAttachment {
    #[serde(rename = "type")]
    kind: Option<String>,
    payload: Option<MessengerAttachmentPayload>,
}

#[derive(Debug, Deserialize)]
struct MessengerAttachmentPayload {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessengerPostback {
    title: Option<String>,
    payload: Option<String>,
}

impl WebhookNormalizer for MessengerNormalizer {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn normalize(&self, payload: &Value) -> Vec<NormalizeOutcome> {
        let delivery: MessengerDelivery = match serde_json::from_value(payload.clone()) {
            Ok(delivery) => delivery,
            Err(e) => {
                return vec![NormalizeOutcome::Ignored {
                    reason: format!("not a messenger delivery: {e}"),
                }]
            }
        };
        let Some(entries) = delivery.entry else {
            return vec![NormalizeOutcome::Ignored {
                reason: "missing entry field".to_string(),
            }];
        };

        let mut outcomes = Vec::new();
        for entry in entries {
            for event in entry.messaging {
                outcomes.push(normalize_event(event));
            }
        }

        if outcomes.is_empty() {
            outcomes.push(NormalizeOutcome::Ignored {
                reason: "delivery carries no messaging events".to_string(),
            });
        }
        outcomes
    }
}

fn normalize_event(event: MessagingEvent) -> NormalizeOutcome {
    let Some(sender) = event.sender else {
        return NormalizeOutcome::Ignored {
            reason: "event has no sender".to_string(),
        };
    };

    if event.read.is_some() {
        return NormalizeOutcome::Ignored {
            reason: "read receipt".to_string(),
        };
    }
    if event.delivery.is_some() {
        return NormalizeOutcome::Ignored {
            reason: "delivery receipt".to_string(),
        };
    }
    if let Some(postback) = event.postback {
        return NormalizeOutcome::Callback(CallbackEvent {
            external_chat_id: Some(sender.id.clone()),
            external_user_id: Some(sender.id),
            data: postback.payload.or(postback.title),
        });
    }

    let Some(message) = event.message else {
        return NormalizeOutcome::Ignored {
            reason: "unsupported messaging event".to_string(),
        };
    };
    if message.is_echo {
        return NormalizeOutcome::Ignored {
            reason: "echo of our own message".to_string(),
        };
    }
    let Some(mid) = message.mid else {
        return NormalizeOutcome::Ignored {
            reason: "message has no mid".to_string(),
        };
    };
    // Messenger timestamps are unix milliseconds.
    let Some(timestamp) = event.timestamp.and_then(DateTime::from_timestamp_millis) else {
        return NormalizeOutcome::Ignored {
            reason: "event has no usable timestamp".to_string(),
        };
    };

    let (kind, content, attachments) = if let Some(text) = message.text {
        (MessageKind::Text, text, Vec::new())
    } else if !message.attachments.is_empty() {
        let descriptors: Vec<Attachment> = message
            .attachments
            .iter()
            .filter_map(attachment_descriptor)
            .collect();
        let Some(first) = descriptors.first() else {
            return NormalizeOutcome::Ignored {
                reason: "attachments carry no usable payload".to_string(),
            };
        };
        let (kind, content) = match first.kind {
            AttachmentKind::Image => (MessageKind::Image, "Image received"),
            AttachmentKind::Video => (MessageKind::Video, "Video received"),
            AttachmentKind::Audio => (MessageKind::Audio, "Audio received"),
            _ => (MessageKind::Document, "Attachment received"),
        };
        (kind, content.to_string(), descriptors)
    } else {
        return NormalizeOutcome::Ignored {
            reason: "message has neither text nor attachments".to_string(),
        };
    };

    NormalizeOutcome::Message(NormalizedInbound {
        external_chat_id: sender.id.clone(),
        platform_message_id: mid,
        sender: SenderInfo::bare(sender.id),
        timestamp,
        kind,
        content,
        attachments,
    })
}

fn attachment_descriptor(attachment: &MessengerAttachment) -> Option<Attachment> {
    let url = attachment.payload.as_ref()?.url.clone()?;
    let kind = match attachment.kind.as_deref() {
        Some("image") => AttachmentKind::Image,
        Some("video") => AttachmentKind::Video,
        Some("audio") => AttachmentKind::Audio,
        // Files and anything Messenger invents later are kept as documents.
        _ => AttachmentKind::Document,
    };
    Some(Attachment::by_url(kind, url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn delivery_with(event: Value) -> Value {
        json!({
            "object": "instagram",
            "entry": [{"id": "17841400000", "time": 1678901234000i64, "messaging": [event]}]
        })
    }

    fn normalize_one(platform: Platform, payload: Value) -> NormalizeOutcome {
        let outcomes = MessengerNormalizer::new(platform).normalize(&payload);
        assert_eq!(outcomes.len(), 1);
        outcomes.into_iter().next().unwrap()
    }

    #[test]
    fn text_message_normalizes_with_millisecond_timestamp() {
        let outcome = normalize_one(
            Platform::Instagram,
            delivery_with(json!({
                "sender": {"id": "123456789"},
                "recipient": {"id": "987654321"},
                "timestamp": 1678901234000i64,
                "message": {"mid": "mid.456", "text": "Hello Instagram!"},
            })),
        );
        match outcome {
            NormalizeOutcome::Message(inbound) => {
                assert_eq!(inbound.external_chat_id, "123456789");
                assert_eq!(inbound.platform_message_id, "mid.456");
                assert_eq!(inbound.content, "Hello Instagram!");
                assert_eq!(inbound.timestamp.timestamp(), 1678901234);
            }
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[test]
    fn image_attachment_keeps_cdn_url() {
        let outcome = normalize_one(
            Platform::Instagram,
            delivery_with(json!({
                "sender": {"id": "123456789"},
                "timestamp": 1678901234000i64,
                "message": {
                    "mid": "mid.img",
                    "attachments": [
                        {"type": "image", "payload": {"url": "https://cdn.example.com/a.jpg"}},
                    ],
                },
            })),
        );
        match outcome {
            NormalizeOutcome::Message(inbound) => {
                assert_eq!(inbound.kind, MessageKind::Image);
                assert_eq!(inbound.content, "Image received");
                assert_eq!(
                    inbound.attachments[0].url.as_deref(),
                    Some("https://cdn.example.com/a.jpg")
                );
                assert!(inbound.attachments[0].file_id.is_none());
            }
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[test]
    fn video_and_unknown_types_map_sensibly() {
        let outcome = normalize_one(
            Platform::Facebook,
            delivery_with(json!({
                "sender": {"id": "555"},
                "timestamp": 1678901234000i64,
                "message": {
                    "mid": "mid.multi",
                    "attachments": [
                        {"type": "video", "payload": {"url": "https://cdn.example.com/v.mp4"}},
                        {"type": "fallback", "payload": {"url": "https://cdn.example.com/x"}},
                    ],
                },
            })),
        );
        match outcome {
            NormalizeOutcome::Message(inbound) => {
                assert_eq!(inbound.kind, MessageKind::Video);
                assert_eq!(inbound.attachments.len(), 2);
                assert_eq!(inbound.attachments[1].kind, AttachmentKind::Document);
            }
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[test]
    fn postback_becomes_callback() {
        let outcome = normalize_one(
            Platform::Facebook,
            delivery_with(json!({
                "sender": {"id": "555"},
                "timestamp": 1678901234000i64,
                "postback": {"title": "Get Started", "payload": "GET_STARTED"},
            })),
        );
        match outcome {
            NormalizeOutcome::Callback(event) => {
                assert_eq!(event.external_chat_id.as_deref(), Some("555"));
                assert_eq!(event.data.as_deref(), Some("GET_STARTED"));
            }
            other => panic!("expected Callback, got {other:?}"),
        }
    }

    #[test]
    fn read_receipt_and_echo_are_ignored() {
        let read = normalize_one(
            Platform::Instagram,
            delivery_with(json!({
                "sender": {"id": "555"},
                "timestamp": 1678901234000i64,
                "read": {"watermark": 1678901234000i64},
            })),
        );
        assert!(matches!(read, NormalizeOutcome::Ignored { reason } if reason.contains("read")));

        let echo = normalize_one(
            Platform::Instagram,
            delivery_with(json!({
                "sender": {"id": "17841400000"},
                "timestamp": 1678901234000i64,
                "message": {"mid": "mid.echo", "text": "we sent this", "is_echo": true},
            })),
        );
        assert!(matches!(echo, NormalizeOutcome::Ignored { reason } if reason.contains("echo")));
    }

    #[test]
    fn platform_tag_follows_the_instance() {
        assert_eq!(
            MessengerNormalizer::new(Platform::Instagram).platform(),
            Platform::Instagram
        );
        assert_eq!(
            MessengerNormalizer::new(Platform::Facebook).platform(),
            Platform::Facebook
        );
    }

    #[test]
    fn junk_payload_is_ignored_with_reason() {
        let outcome = normalize_one(Platform::Instagram, json!({"nothing": "here"}));
        assert!(matches!(outcome, NormalizeOutcome::Ignored { reason } if !reason.is_empty()));
    }

    #[test]
    fn message_without_mid_is_ignored() {
        let outcome = normalize_one(
            Platform::Instagram,
            delivery_with(json!({
                "sender": {"id": "555"},
                "timestamp": 1678901234000i64,
                "message": {"text": "no mid"},
            })),
        );
        assert!(matches!(outcome, NormalizeOutcome::Ignored { reason } if reason.contains("mid")));
    }
}
