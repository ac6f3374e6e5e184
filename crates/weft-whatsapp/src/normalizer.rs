// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Business webhook normalization.
//!
//! A delivery wraps events in `entry[].changes[].value`; one value can carry
//! several messages plus delivery-status updates. Statuses are acknowledged
//! without storage, interactive replies are surfaced as callbacks.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use weft_core::traits::WebhookNormalizer;
use weft_core::types::{
    Attachment, AttachmentKind, CallbackEvent, MessageKind, NormalizeOutcome, NormalizedInbound,
    Platform, SenderInfo,
};

/// Normalizer for WhatsApp Cloud API webhook deliveries.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatsAppNormalizer;

#[derive(Debug, Deserialize)]
struct WhatsAppDelivery {
    entry: Option<Vec<WhatsAppEntry>>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppEntry {
    #[serde(default)]
    changes: Vec<WhatsAppChange>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppChange {
    value: Option<WhatsAppValue>,
}

#[derive(Debug, Default, Deserialize)]
struct WhatsAppValue {
    #[serde(default)]
    messages: Vec<WhatsAppMessage>,
    #[serde(default)]
    contacts: Vec<WhatsAppContact>,
    #[serde(default)]
    statuses: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppMessage {
    id: Option<String>,
    from: Option<String>,
    timestamp: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<WhatsAppText>,
    image: Option<WhatsAppMedia>,
    video: Option<WhatsAppMedia>,
    document: Option<WhatsAppDocument>,
    audio: Option<WhatsAppAudio>,
    button: Option<WhatsAppButton>,
    interactive: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppText {
    body: String,
}

#[derive(Debug, Deserialize)]
struct WhatsAppMedia {
    id: String,
    caption: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppDocument {
    id: String,
    caption: Option<String>,
    filename: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppAudio {
    id: String,
    mime_type: Option<String>,
    #[serde(default)]
    voice: bool,
}

#[derive(Debug, Deserialize)]
struct WhatsAppButton {
    payload: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppContact {
    wa_id: Option<String>,
    profile: Option<WhatsAppProfile>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppProfile {
    name: Option<String>,
}

impl WebhookNormalizer for WhatsAppNormalizer {
    fn platform(&self) -> Platform {
        Platform::WhatsApp
    }

    fn normalize(&self, payload: &Value) -> Vec<NormalizeOutcome> {
        let delivery: WhatsAppDelivery = match serde_json::from_value(payload.clone()) {
            Ok(delivery) => delivery,
            Err(e) => {
                return vec![NormalizeOutcome::Ignored {
                    reason: format!("not a whatsapp delivery: {e}"),
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
            for change in entry.changes {
                let Some(value) = change.value else { continue };
                for _ in &value.statuses {
                    outcomes.push(NormalizeOutcome::Ignored {
                        reason: "status update".to_string(),
                    });
                }
                for message in &value.messages {
                    outcomes.push(normalize_message(message, &value.contacts));
                }
            }
        }

        if outcomes.is_empty() {
            outcomes.push(NormalizeOutcome::Ignored {
                reason: "delivery carries no messages".to_string(),
            });
        }
        outcomes
    }
}

fn normalize_message(
    message: &WhatsAppMessage,
    contacts: &[WhatsAppContact],
) -> NormalizeOutcome {
    let Some(from) = message.from.as_deref() else {
        return NormalizeOutcome::Ignored {
            reason: "message has no sender".to_string(),
        };
    };
    let Some(id) = message.id.as_deref() else {
        return NormalizeOutcome::Ignored {
            reason: "message has no id".to_string(),
        };
    };
    let Some(timestamp) = message
        .timestamp
        .as_deref()
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
    else {
        return NormalizeOutcome::Ignored {
            reason: "message has no usable timestamp".to_string(),
        };
    };

    if message.button.is_some() || message.interactive.is_some() {
        return NormalizeOutcome::Callback(CallbackEvent {
            external_chat_id: Some(from.to_string()),
            external_user_id: Some(from.to_string()),
            data: callback_data(message),
        });
    }

    let (kind, content, attachments) = if let Some(text) = &message.text {
        (MessageKind::Text, text.body.clone(), Vec::new())
    } else if let Some(image) = &message.image {
        let mut attachment = Attachment::by_file_id(AttachmentKind::Image, &image.id);
        attachment.mime_type = image.mime_type.clone();
        (
            MessageKind::Image,
            image
                .caption
                .clone()
                .unwrap_or_else(|| "Image received".to_string()),
            vec![attachment],
        )
    } else if let Some(document) = &message.document {
        let mut attachment = Attachment::by_file_id(AttachmentKind::Document, &document.id);
        attachment.file_name = document.filename.clone();
        attachment.mime_type = document.mime_type.clone();
        (
            MessageKind::Document,
            document
                .caption
                .clone()
                .unwrap_or_else(|| "Document received".to_string()),
            vec![attachment],
        )
    } else if let Some(audio) = &message.audio {
        // Voice notes arrive as audio with the voice flag set.
        let att_kind = if audio.voice {
            AttachmentKind::Voice
        } else {
            AttachmentKind::Audio
        };
        let mut attachment = Attachment::by_file_id(att_kind, &audio.id);
        attachment.mime_type = audio.mime_type.clone();
        let kind = if audio.voice {
            MessageKind::Voice
        } else {
            MessageKind::Audio
        };
        let content = if audio.voice {
            "Voice message received"
        } else {
            "Audio received"
        };
        (kind, content.to_string(), vec![attachment])
    } else if let Some(video) = &message.video {
        let mut attachment = Attachment::by_file_id(AttachmentKind::Video, &video.id);
        attachment.mime_type = video.mime_type.clone();
        (
            MessageKind::Video,
            video
                .caption
                .clone()
                .unwrap_or_else(|| "Video received".to_string()),
            vec![attachment],
        )
    } else {
        return NormalizeOutcome::Ignored {
            reason: format!(
                "unsupported message type: {}",
                message.kind.as_deref().unwrap_or("unknown")
            ),
        };
    };

    NormalizeOutcome::Message(NormalizedInbound {
        external_chat_id: from.to_string(),
        platform_message_id: id.to_string(),
        sender: sender_info(from, contacts),
        timestamp,
        kind,
        content,
        attachments,
    })
}

fn callback_data(message: &WhatsAppMessage) -> Option<String> {
    if let Some(button) = &message.button {
        return button.payload.clone().or_else(|| button.text.clone());
    }
    message
        .interactive
        .as_ref()
        .and_then(|interactive| {
            interactive["button_reply"]["id"]
                .as_str()
                .or_else(|| interactive["list_reply"]["id"].as_str())
        })
        .map(|id| id.to_string())
}

/// Snapshot the sender, picking up the display name from the delivery's
/// contact block when one matches the phone number.
fn sender_info(from: &str, contacts: &[WhatsAppContact]) -> SenderInfo {
    let name = contacts
        .iter()
        .find(|c| c.wa_id.as_deref() == Some(from))
        .and_then(|c| c.profile.as_ref())
        .and_then(|p| p.name.clone());
    SenderInfo {
        user_id: from.to_string(),
        username: None,
        first_name: name,
        last_name: None,
        phone: Some(from.to_string()),
    }
}
