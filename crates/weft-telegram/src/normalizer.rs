// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram webhook update normalization.
//!
//! Updates are parsed into typed structs and validated explicitly; anything
//! the core does not handle is classified `Ignored` with a reason rather
//! than raised, so Telegram never retries over an unsupported shape.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use weft_core::traits::WebhookNormalizer;
use weft_core::types::{
    Attachment, AttachmentKind, CallbackEvent, MessageKind, NormalizeOutcome, NormalizedInbound,
    Platform, SenderInfo,
};

/// Normalizer for Telegram Bot API webhook updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelegramNormalizer;

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    message: Option<TelegramMessage>,
    callback_query: Option<TelegramCallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    message_id: i64,
    date: i64,
    chat: TelegramChat,
    from: Option<TelegramUser>,
    text: Option<String>,
    caption: Option<String>,
    photo: Option<Vec<TelegramPhotoSize>>,
    document: Option<TelegramDocument>,
    voice: Option<TelegramVoice>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct TelegramUser {
    id: i64,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramPhotoSize {
    file_id: String,
    file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TelegramDocument {
    file_id: String,
    file_name: Option<String>,
    mime_type: Option<String>,
    file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TelegramVoice {
    file_id: String,
    duration: u32,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramCallbackQuery {
    from: Option<TelegramUser>,
    message: Option<TelegramCallbackMessage>,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramCallbackMessage {
    chat: TelegramChat,
}

impl From<&TelegramUser> for SenderInfo {
    fn from(user: &TelegramUser) -> Self {
        SenderInfo {
            user_id: user.id.to_string(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: None,
        }
    }
}

impl WebhookNormalizer for TelegramNormalizer {
    fn platform(&self) -> Platform {
        Platform::Telegram
    }

    fn normalize(&self, payload: &Value) -> Vec<NormalizeOutcome> {
        let update: TelegramUpdate = match serde_json::from_value(payload.clone()) {
            Ok(update) => update,
            Err(e) => {
                return vec![NormalizeOutcome::Ignored {
                    reason: format!("not a telegram update: {e}"),
                }]
            }
        };

        if let Some(message) = update.message {
            return vec![normalize_message(message)];
        }
        if let Some(callback) = update.callback_query {
            return vec![NormalizeOutcome::Callback(CallbackEvent {
                external_chat_id: callback.message.map(|m| m.chat.id.to_string()),
                external_user_id: callback.from.map(|u| u.id.to_string()),
                data: callback.data,
            })];
        }

        vec![NormalizeOutcome::Ignored {
            reason: "update contains neither message nor callback_query".to_string(),
        }]
    }
}

fn normalize_message(message: TelegramMessage) -> NormalizeOutcome {
    let Some(from) = message.from.as_ref() else {
        return NormalizeOutcome::Ignored {
            reason: "message has no sender".to_string(),
        };
    };
    let Some(timestamp) = DateTime::from_timestamp(message.date, 0) else {
        return NormalizeOutcome::Ignored {
            reason: format!("message date {} is not a valid unix time", message.date),
        };
    };

    let (kind, content, attachments) = if let Some(text) = message.text {
        (MessageKind::Text, text, Vec::new())
    } else if let Some(photos) = message.photo {
        let Some(largest) = largest_photo(&photos) else {
            return NormalizeOutcome::Ignored {
                reason: "photo array is empty".to_string(),
            };
        };
        let attachment = Attachment {
            kind: AttachmentKind::Image,
            file_id: Some(largest.file_id.clone()),
            url: None,
            file_size: largest.file_size,
            file_name: None,
            mime_type: None,
            duration_secs: None,
        };
        (
            MessageKind::Image,
            message.caption.unwrap_or_else(|| "Photo received".to_string()),
            vec![attachment],
        )
    } else if let Some(document) = message.document {
        let attachment = Attachment {
            kind: AttachmentKind::Document,
            file_id: Some(document.file_id),
            url: None,
            file_size: document.file_size,
            file_name: document.file_name,
            mime_type: document.mime_type,
            duration_secs: None,
        };
        (
            MessageKind::Document,
            message
                .caption
                .unwrap_or_else(|| "Document received".to_string()),
            vec![attachment],
        )
    } else if let Some(voice) = message.voice {
        let attachment = Attachment {
            kind: AttachmentKind::Voice,
            file_id: Some(voice.file_id),
            url: None,
            file_size: None,
            file_name: None,
            mime_type: voice.mime_type,
            duration_secs: Some(voice.duration),
        };
        (
            MessageKind::Voice,
            "Voice message received".to_string(),
            vec![attachment],
        )
    } else {
        return NormalizeOutcome::Ignored {
            reason: "unsupported message type".to_string(),
        };
    };

    NormalizeOutcome::Message(NormalizedInbound {
        external_chat_id: message.chat.id.to_string(),
        platform_message_id: message.message_id.to_string(),
        sender: from.into(),
        timestamp,
        kind,
        content,
        attachments,
    })
}

/// Pick the photo variant to keep from Telegram's resolution ladder.
///
/// Highest declared `file_size` wins; among equal or absent sizes the
/// last-listed variant wins (Telegram orders variants smallest to largest).
fn largest_photo(photos: &[TelegramPhotoSize]) -> Option<&TelegramPhotoSize> {
    photos
        .iter()
        .enumerate()
        .max_by_key(|(index, photo)| (photo.file_size.unwrap_or(0), *index))
        .map(|(_, photo)| photo)
}
