// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end webhook flow: HTTP request in, conversation and message rows out.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use weft_core::types::{Direction, MessageKind, Platform};
use weft_gateway::{build_router, GatewayState, HealthState, WebhookDispatcher};
use weft_test_utils::{payloads, TestStore};

async fn gateway() -> (Router, TestStore) {
    let store = TestStore::new().await;
    let state = GatewayState {
        dispatcher: Arc::new(WebhookDispatcher::new(store.db.clone())),
        verify_token: Some("verify-123".to_string()),
        health: HealthState::default(),
    };
    (build_router(state), store)
}

async fn post_webhook(router: &Router, platform: &str, company: &str, payload: &Value) -> Value {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/webhooks/{platform}/{company}"))
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn telegram_text_payload_lands_in_the_store() {
    let (router, store) = gateway().await;
    let payload = json!({
        "message": {
            "chat": {"id": 42},
            "message_id": 7,
            "date": 1700000000i64,
            "from": {"id": 9, "username": "bob"},
            "text": "hi",
        }
    });

    let ack = post_webhook(&router, "telegram", &store.company_id, &payload).await;
    assert_eq!(ack["status"], "processed");

    let conversation = store
        .conversation(Platform::Telegram, "42")
        .await
        .expect("conversation exists");
    assert_eq!(conversation.external_id, "42");
    assert_eq!(conversation.platform, Platform::Telegram);

    let messages = store.messages_in(Platform::Telegram, "42").await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].direction, Direction::Incoming);
    assert_eq!(messages[0].content, "hi");
    assert_eq!(messages[0].kind, MessageKind::Text);
    assert_eq!(messages[0].metadata["telegram_message_id"], 7);
    assert_eq!(messages[0].sender_info.user_id, "9");
    assert_eq!(messages[0].sender_info.username.as_deref(), Some("bob"));
}

#[tokio::test]
async fn redelivery_over_http_keeps_one_row_and_acks_processed_twice() {
    let (router, store) = gateway().await;
    let payload = payloads::telegram_text_update(42, 7, 9, "hi");

    let first = post_webhook(&router, "telegram", &store.company_id, &payload).await;
    let second = post_webhook(&router, "telegram", &store.company_id, &payload).await;

    assert_eq!(first["status"], "processed");
    assert_eq!(second["status"], "processed");
    assert_eq!(store.messages_in(Platform::Telegram, "42").await.len(), 1);
}

#[tokio::test]
async fn callback_query_is_acknowledged_without_storage() {
    let (router, store) = gateway().await;
    let payload = payloads::telegram_callback_query(42, 9, "button_clicked");

    let ack = post_webhook(&router, "telegram", &store.company_id, &payload).await;
    assert_eq!(ack["status"], "ignored");
    assert_eq!(store.conversation_count().await, 0);
}

#[tokio::test]
async fn every_platform_reaches_its_own_conversation() {
    let (router, store) = gateway().await;

    let deliveries = [
        ("telegram", payloads::telegram_text_update(42, 7, 9, "tg")),
        (
            "whatsapp",
            payloads::whatsapp_text_delivery("+1555", "wamid.1", "wa"),
        ),
        (
            "instagram",
            payloads::messenger_text_delivery("ig-555", "mid.ig", "ig"),
        ),
        (
            "facebook",
            payloads::messenger_text_delivery("fb-555", "mid.fb", "fb"),
        ),
        (
            "signal",
            payloads::signal_text_envelope("+15550001", 1700000000123, "sg"),
        ),
    ];
    for (platform, payload) in &deliveries {
        let ack = post_webhook(&router, platform, &store.company_id, payload).await;
        assert_eq!(ack["status"], "processed", "platform {platform}");
    }

    assert_eq!(store.conversation_count().await, 5);
}

#[tokio::test]
async fn mixed_delivery_same_chat_threads_into_one_conversation() {
    let (router, store) = gateway().await;

    let text = payloads::whatsapp_text_delivery("+1555", "wamid.1", "first");
    let photo = json!({
        "entry": [{
            "changes": [{
                "value": {
                    "messages": [{
                        "id": "wamid.2",
                        "from": "+1555",
                        "timestamp": "1700000001",
                        "type": "image",
                        "image": {"id": "media-9", "caption": "second"},
                    }],
                }
            }]
        }]
    });

    post_webhook(&router, "whatsapp", &store.company_id, &text).await;
    post_webhook(&router, "whatsapp", &store.company_id, &photo).await;

    assert_eq!(store.conversation_count().await, 1);
    let messages = store.messages_in(Platform::WhatsApp, "+1555").await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].kind, MessageKind::Image);
    assert_eq!(messages[1].attachments[0].file_id.as_deref(), Some("media-9"));
}
