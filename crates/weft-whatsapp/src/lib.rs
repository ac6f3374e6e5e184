// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WhatsApp Cloud API integration for the Weft messaging core.
//!
//! Implements [`ChannelClient`] against the Graph API `/{phone_number_id}/messages`
//! endpoint and [`weft_core::WebhookNormalizer`] for Business webhook
//! deliveries. One delivery can batch several messages and statuses.

pub mod normalizer;

pub use normalizer::WhatsAppNormalizer;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use weft_config::model::WhatsAppConfig;
use weft_core::error::WeftError;
use weft_core::traits::ChannelClient;
use weft_core::types::{
    ChannelCredentials, MediaKind, MediaRef, Platform, SendOptions, SendReceipt,
};

/// Client for the WhatsApp Cloud API, scoped to one company's phone number.
pub struct WhatsAppClient {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
    phone_number_id: String,
    timeout: Duration,
}

impl WhatsAppClient {
    /// Creates a client from company credentials and the API configuration.
    ///
    /// Requires `credentials.sender_id` (the WhatsApp phone-number id).
    pub fn new(
        credentials: &ChannelCredentials,
        config: &WhatsAppConfig,
    ) -> Result<Self, WeftError> {
        if credentials.access_token.is_empty() {
            return Err(WeftError::Config(
                "whatsapp credentials have an empty access token".into(),
            ));
        }
        let phone_number_id = credentials.sender_id.clone().ok_or_else(|| {
            WeftError::Config("whatsapp credentials are missing the phone-number id".into())
        })?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeftError::Channel {
                message: format!("failed to build whatsapp HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: credentials.access_token.clone(),
            phone_number_id,
            timeout,
        })
    }

    async fn post_message(&self, payload: Value) -> Result<SendReceipt, WeftError> {
        let url = format!("{}/{}/messages", self.api_base, self.phone_number_id);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(WeftError::Channel {
                message: format!("whatsapp API error ({status}): {body}"),
                source: None,
            });
        }

        let parsed: Value = serde_json::from_str(&body).unwrap_or_default();
        let receipt = SendReceipt {
            platform_message_id: parsed["messages"][0]["id"]
                .as_str()
                .map(|id| id.to_string()),
        };
        tracing::debug!(
            message_id = receipt.platform_message_id.as_deref().unwrap_or("-"),
            "whatsapp message accepted"
        );
        Ok(receipt)
    }

    fn transport_error(&self, e: reqwest::Error) -> WeftError {
        if e.is_timeout() {
            WeftError::Timeout {
                duration: self.timeout,
            }
        } else {
            WeftError::Channel {
                message: format!("whatsapp request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

#[async_trait]
impl ChannelClient for WhatsAppClient {
    fn platform(&self) -> Platform {
        Platform::WhatsApp
    }

    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        _options: &SendOptions,
    ) -> Result<SendReceipt, WeftError> {
        self.post_message(json!({
            "messaging_product": "whatsapp",
            "to": chat_id,
            "type": "text",
            "text": {"body": text},
        }))
        .await
    }

    async fn send_media(
        &self,
        chat_id: &str,
        media: &MediaRef,
        caption: &str,
    ) -> Result<SendReceipt, WeftError> {
        let kind = match media.kind {
            MediaKind::Image => "image",
            MediaKind::Document => "document",
        };
        let mut payload = json!({
            "messaging_product": "whatsapp",
            "to": chat_id,
            "type": kind,
        });
        payload[kind] = json!({"link": media.url, "caption": caption});
        self.post_message(payload).await
    }

    /// Resolve a media id to its (short-lived) download URL.
    async fn resolve_file_url(&self, file_id: &str) -> Result<Option<String>, WeftError> {
        let url = format!("{}/{}", self.api_base, file_id);
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Ok(None);
        }
        let parsed: Value = match response.json().await {
            Ok(v) => v,
            Err(_) => return Ok(None),
        };
        Ok(parsed["url"].as_str().map(|u| u.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(api_base: &str) -> WhatsAppClient {
        let credentials = ChannelCredentials {
            company_id: "co-1".into(),
            platform: Platform::WhatsApp,
            access_token: "EAAG-token".into(),
            sender_id: Some("1055512345".into()),
        };
        let config = WhatsAppConfig {
            api_base: api_base.to_string(),
            timeout_secs: 5,
        };
        WhatsAppClient::new(&credentials, &config).unwrap()
    }

    #[test]
    fn new_requires_phone_number_id() {
        let credentials = ChannelCredentials {
            company_id: "co-1".into(),
            platform: Platform::WhatsApp,
            access_token: "EAAG-token".into(),
            sender_id: None,
        };
        assert!(WhatsAppClient::new(&credentials, &WhatsAppConfig::default()).is_err());
    }

    #[tokio::test]
    async fn send_text_posts_cloud_api_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1055512345/messages"))
            .and(header("authorization", "Bearer EAAG-token"))
            .and(body_partial_json(json!({
                "messaging_product": "whatsapp",
                "to": "+15551234567",
                "type": "text",
                "text": {"body": "Hello World"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messaging_product": "whatsapp",
                "messages": [{"id": "wamid.HBgL=="}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let receipt = client
            .send_text("+15551234567", "Hello World", &SendOptions::default())
            .await
            .unwrap();
        assert_eq!(receipt.platform_message_id.as_deref(), Some("wamid.HBgL=="));
    }

    #[tokio::test]
    async fn send_image_uses_link_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1055512345/messages"))
            .and(body_partial_json(json!({
                "type": "image",
                "image": {"link": "https://example.com/pic.jpg", "caption": "look"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": [{"id": "wamid.img=="}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let media = MediaRef {
            kind: MediaKind::Image,
            url: "https://example.com/pic.jpg".into(),
        };
        client.send_media("+15551234567", &media, "look").await.unwrap();
    }

    #[tokio::test]
    async fn api_error_is_a_channel_error_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1055512345/messages"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":{"message":"Invalid phone number"}}"#),
            )
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let err = client
            .send_text("invalid", "Hello", &SendOptions::default())
            .await
            .unwrap_err();
        match err {
            WeftError::Channel { message, .. } => {
                assert!(message.contains("Invalid phone number"))
            }
            other => panic!("expected Channel error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolve_file_url_reads_url_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media-id-1"))
            .and(header("authorization", "Bearer EAAG-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "url": "https://lookaside.example.com/m/media-id-1",
                "mime_type": "image/jpeg",
            })))
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let url = client.resolve_file_url("media-id-1").await.unwrap();
        assert_eq!(
            url.as_deref(),
            Some("https://lookaside.example.com/m/media-id-1")
        );
    }

    #[tokio::test]
    async fn resolve_file_url_miss_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        assert!(client.resolve_file_url("gone").await.unwrap().is_none());
    }
}
