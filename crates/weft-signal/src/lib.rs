// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal integration for the Weft messaging core.
//!
//! Talks to a signal-cli REST gateway (the usual self-hosted companion for
//! Signal automation). The account phone number is the credential; the
//! gateway itself runs unauthenticated on a private network.

pub mod normalizer;

pub use normalizer::SignalNormalizer;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use weft_config::model::SignalConfig;
use weft_core::error::WeftError;
use weft_core::traits::ChannelClient;
use weft_core::types::{
    ChannelCredentials, MediaRef, Platform, SendOptions, SendReceipt,
};

/// Client for a signal-cli REST gateway, scoped to one company's account.
pub struct SignalClient {
    http: reqwest::Client,
    api_base: String,
    account_number: String,
    timeout: Duration,
}

impl SignalClient {
    /// Creates a client from company credentials and the API configuration.
    ///
    /// `credentials.sender_id` carries the registered account number.
    pub fn new(
        credentials: &ChannelCredentials,
        config: &SignalConfig,
    ) -> Result<Self, WeftError> {
        let account_number = credentials.sender_id.clone().ok_or_else(|| {
            WeftError::Config("signal credentials are missing the account number".into())
        })?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeftError::Channel {
                message: format!("failed to build signal HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_number,
            timeout,
        })
    }

    async fn post_send(&self, message: String, recipient: &str) -> Result<SendReceipt, WeftError> {
        let payload = json!({
            "message": message,
            "number": self.account_number,
            "recipients": [recipient],
        });
        let response = self
            .http
            .post(format!("{}/v2/send", self.api_base))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(WeftError::Channel {
                message: format!("signal API error ({status}): {body}"),
                source: None,
            });
        }

        let parsed: Value = serde_json::from_str(&body).unwrap_or_default();
        let receipt = SendReceipt {
            platform_message_id: parsed["timestamp"].as_i64().map(|ts| ts.to_string()),
        };
        tracing::debug!(
            timestamp = receipt.platform_message_id.as_deref().unwrap_or("-"),
            "signal message accepted"
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
                message: format!("signal request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

#[async_trait]
impl ChannelClient for SignalClient {
    fn platform(&self) -> Platform {
        Platform::Signal
    }

    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        _options: &SendOptions,
    ) -> Result<SendReceipt, WeftError> {
        self.post_send(text.to_string(), chat_id).await
    }

    /// The REST gateway only accepts inline base64 attachments, so hosted
    /// media goes out as a link under the caption.
    async fn send_media(
        &self,
        chat_id: &str,
        media: &MediaRef,
        caption: &str,
    ) -> Result<SendReceipt, WeftError> {
        let message = if caption.is_empty() {
            media.url.clone()
        } else {
            format!("{caption}\n{}", media.url)
        };
        self.post_send(message, chat_id).await
    }

    /// Attachments received through the gateway are served under
    /// `/v1/attachments/{id}`.
    async fn resolve_file_url(&self, file_id: &str) -> Result<Option<String>, WeftError> {
        if file_id.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{}/v1/attachments/{file_id}", self.api_base)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(api_base: &str) -> SignalClient {
        let credentials = ChannelCredentials {
            company_id: "co-1".into(),
            platform: Platform::Signal,
            access_token: String::new(),
            sender_id: Some("+15550002".into()),
        };
        let config = SignalConfig {
            api_base: api_base.to_string(),
            timeout_secs: 5,
        };
        SignalClient::new(&credentials, &config).unwrap()
    }

    #[test]
    fn new_requires_account_number() {
        let credentials = ChannelCredentials {
            company_id: "co-1".into(),
            platform: Platform::Signal,
            access_token: String::new(),
            sender_id: None,
        };
        assert!(SignalClient::new(&credentials, &SignalConfig::default()).is_err());
    }

    #[tokio::test]
    async fn send_text_posts_v2_send_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .and(body_partial_json(json!({
                "message": "hello",
                "number": "+15550002",
                "recipients": ["+15550001"],
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"timestamp": 1700000001234i64})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let receipt = client
            .send_text("+15550001", "hello", &SendOptions::default())
            .await
            .unwrap();
        assert_eq!(receipt.platform_message_id.as_deref(), Some("1700000001234"));
    }

    #[tokio::test]
    async fn send_media_delivers_caption_and_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .and(body_partial_json(json!({
                "message": "the report\nhttps://example.com/q3.pdf",
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"timestamp": 1700000001235i64})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let media = MediaRef {
            kind: weft_core::types::MediaKind::Document,
            url: "https://example.com/q3.pdf".into(),
        };
        client
            .send_media("+15550001", &media, "the report")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn api_error_is_a_channel_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/send"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":"Invalid account: +15550002"}"#),
            )
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let err = client
            .send_text("+15550001", "hello", &SendOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid account"));
    }

    #[tokio::test]
    async fn resolve_file_url_points_at_gateway() {
        let client = make_client("http://127.0.0.1:8080");
        let url = client.resolve_file_url("att-3555").await.unwrap();
        assert_eq!(
            url.as_deref(),
            Some("http://127.0.0.1:8080/v1/attachments/att-3555")
        );
        assert!(client.resolve_file_url("").await.unwrap().is_none());
    }
}
