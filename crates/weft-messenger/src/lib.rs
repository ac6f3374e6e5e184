// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messenger Platform integration for the Weft messaging core.
//!
//! Instagram direct messages and Facebook page messages ride the same Graph
//! API surface (`/{page_id}/messages`) and the same webhook shape, so one
//! crate serves both platforms; each instance is tagged with the platform it
//! represents so storage and logs stay distinct.

pub mod normalizer;

pub use normalizer::MessengerNormalizer;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use weft_config::model::MessengerConfig;
use weft_core::error::WeftError;
use weft_core::traits::ChannelClient;
use weft_core::types::{
    ChannelCredentials, MediaKind, MediaRef, Platform, SendOptions, SendReceipt,
};

/// Client for the Messenger Platform send API, scoped to one company's page.
pub struct MessengerClient {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
    page_id: String,
    platform: Platform,
    timeout: Duration,
}

impl MessengerClient {
    /// Creates a client from company credentials and the API configuration.
    ///
    /// `platform` must be [`Platform::Instagram`] or [`Platform::Facebook`];
    /// `credentials.sender_id` carries the page id.
    pub fn new(
        platform: Platform,
        credentials: &ChannelCredentials,
        config: &MessengerConfig,
    ) -> Result<Self, WeftError> {
        if !matches!(platform, Platform::Instagram | Platform::Facebook) {
            return Err(WeftError::Config(format!(
                "messenger client cannot serve platform `{platform}`"
            )));
        }
        if credentials.access_token.is_empty() {
            return Err(WeftError::Config(
                "messenger credentials have an empty access token".into(),
            ));
        }
        let page_id = credentials.sender_id.clone().ok_or_else(|| {
            WeftError::Config("messenger credentials are missing the page id".into())
        })?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeftError::Channel {
                message: format!("failed to build messenger HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: credentials.access_token.clone(),
            page_id,
            platform,
            timeout,
        })
    }

    async fn post_message(&self, payload: Value) -> Result<SendReceipt, WeftError> {
        let url = format!("{}/{}/messages", self.api_base, self.page_id);
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
                message: format!("{} API error ({status}): {body}", self.platform),
                source: None,
            });
        }

        let parsed: Value = serde_json::from_str(&body).unwrap_or_default();
        let receipt = SendReceipt {
            platform_message_id: parsed["message_id"].as_str().map(|id| id.to_string()),
        };
        tracing::debug!(
            platform = %self.platform,
            message_id = receipt.platform_message_id.as_deref().unwrap_or("-"),
            "messenger message accepted"
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
                message: format!("{} request failed: {e}", self.platform),
                source: Some(Box::new(e)),
            }
        }
    }
}

#[async_trait]
impl ChannelClient for MessengerClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        _options: &SendOptions,
    ) -> Result<SendReceipt, WeftError> {
        self.post_message(json!({
            "recipient": {"id": chat_id},
            "message": {"text": text},
        }))
        .await
    }

    async fn send_media(
        &self,
        chat_id: &str,
        media: &MediaRef,
        _caption: &str,
    ) -> Result<SendReceipt, WeftError> {
        // The Messenger send API has no caption field on attachments.
        let kind = match media.kind {
            MediaKind::Image => "image",
            MediaKind::Document => "file",
        };
        self.post_message(json!({
            "recipient": {"id": chat_id},
            "message": {
                "attachment": {"type": kind, "payload": {"url": media.url}},
            },
        }))
        .await
    }

    /// Messenger media already arrives as CDN URLs; there is nothing to resolve.
    async fn resolve_file_url(&self, _file_id: &str) -> Result<Option<String>, WeftError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(api_base: &str, platform: Platform) -> MessengerClient {
        let credentials = ChannelCredentials {
            company_id: "co-1".into(),
            platform,
            access_token: "IGQ-token".into(),
            sender_id: Some("17841400000".into()),
        };
        let config = MessengerConfig {
            api_base: api_base.to_string(),
            timeout_secs: 5,
        };
        MessengerClient::new(platform, &credentials, &config).unwrap()
    }

    #[test]
    fn new_rejects_non_messenger_platform() {
        let credentials = ChannelCredentials {
            company_id: "co-1".into(),
            platform: Platform::Telegram,
            access_token: "x".into(),
            sender_id: Some("page".into()),
        };
        assert!(
            MessengerClient::new(Platform::Telegram, &credentials, &MessengerConfig::default())
                .is_err()
        );
    }

    #[test]
    fn new_requires_page_id() {
        let credentials = ChannelCredentials {
            company_id: "co-1".into(),
            platform: Platform::Instagram,
            access_token: "IGQ-token".into(),
            sender_id: None,
        };
        assert!(
            MessengerClient::new(Platform::Instagram, &credentials, &MessengerConfig::default())
                .is_err()
        );
    }

    #[tokio::test]
    async fn send_text_posts_recipient_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/17841400000/messages"))
            .and(header("authorization", "Bearer IGQ-token"))
            .and(body_partial_json(json!({
                "recipient": {"id": "123456789"},
                "message": {"text": "Hello Instagram!"},
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "recipient_id": "123456789",
                "message_id": "mid.123456",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri(), Platform::Instagram);
        let receipt = client
            .send_text("123456789", "Hello Instagram!", &SendOptions::default())
            .await
            .unwrap();
        assert_eq!(receipt.platform_message_id.as_deref(), Some("mid.123456"));
    }

    #[tokio::test]
    async fn send_media_uses_attachment_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/17841400000/messages"))
            .and(body_partial_json(json!({
                "message": {
                    "attachment": {
                        "type": "image",
                        "payload": {"url": "https://example.com/image.jpg"},
                    }
                },
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message_id": "mid.img123"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri(), Platform::Facebook);
        let media = MediaRef {
            kind: MediaKind::Image,
            url: "https://example.com/image.jpg".into(),
        };
        client.send_media("123456789", &media, "").await.unwrap();
    }

    #[tokio::test]
    async fn api_error_names_the_platform() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/17841400000/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid recipient"))
            .mount(&server)
            .await;

        let client = make_client(&server.uri(), Platform::Instagram);
        let err = client
            .send_text("invalid", "Hello", &SendOptions::default())
            .await
            .unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("instagram"));
        assert!(rendered.contains("Invalid recipient"));
    }

    #[tokio::test]
    async fn resolve_file_url_is_always_none() {
        let client = make_client("http://127.0.0.1:1", Platform::Facebook);
        assert!(client.resolve_file_url("anything").await.unwrap().is_none());
    }
}
