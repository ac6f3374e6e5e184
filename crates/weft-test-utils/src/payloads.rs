// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for platform webhook payloads, matching each platform's wire
//! format closely enough to replay through the normalizers.

use serde_json::{json, Value};

/// A Telegram text-message update.
pub fn telegram_text_update(chat_id: i64, message_id: i64, from_id: i64, text: &str) -> Value {
    json!({
        "update_id": 900000 + message_id,
        "message": {
            "message_id": message_id,
            "date": 1700000000i64,
            "chat": {"id": chat_id, "type": "private"},
            "from": {"id": from_id, "is_bot": false, "username": "bob", "first_name": "Bob"},
            "text": text,
        }
    })
}

/// A Telegram callback-query update (inline button press).
pub fn telegram_callback_query(chat_id: i64, from_id: i64, data: &str) -> Value {
    json!({
        "update_id": 900001,
        "callback_query": {
            "id": "cbq-1",
            "from": {"id": from_id, "is_bot": false, "username": "bob"},
            "message": {
                "message_id": 1,
                "date": 1700000000i64,
                "chat": {"id": chat_id, "type": "private"},
            },
            "data": data,
        }
    })
}

/// A WhatsApp Business delivery with a single text message.
pub fn whatsapp_text_delivery(from: &str, message_id: &str, text: &str) -> Value {
    json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "105",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "contacts": [{"wa_id": from, "profile": {"name": "Bob"}}],
                    "messages": [{
                        "id": message_id,
                        "from": from,
                        "timestamp": "1700000000",
                        "type": "text",
                        "text": {"body": text},
                    }],
                }
            }]
        }]
    })
}

/// A Messenger delivery (Instagram or Facebook page) with one text message.
pub fn messenger_text_delivery(sender_id: &str, mid: &str, text: &str) -> Value {
    json!({
        "object": "page",
        "entry": [{
            "id": "17841400000",
            "time": 1700000000000i64,
            "messaging": [{
                "sender": {"id": sender_id},
                "recipient": {"id": "17841400000"},
                "timestamp": 1700000000000i64,
                "message": {"mid": mid, "text": text},
            }]
        }]
    })
}

/// A signal-cli envelope with a text data message.
pub fn signal_text_envelope(source: &str, timestamp_millis: i64, text: &str) -> Value {
    json!({
        "envelope": {
            "source": source,
            "sourceNumber": source,
            "sourceName": "Bob",
            "timestamp": timestamp_millis,
            "dataMessage": {
                "timestamp": timestamp_millis,
                "message": text,
            },
        },
        "account": "+15550002",
    })
}
