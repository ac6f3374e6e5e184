// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel integration for the Weft messaging core.
//!
//! Implements [`ChannelClient`] against the Telegram Bot API and
//! [`weft_core::WebhookNormalizer`] for webhook updates. The client is a
//! thin wrapper: bounded timeout, no retries, no persistence; every API or
//! transport failure comes back as a structured error value.

pub mod normalizer;

pub use normalizer::TelegramNormalizer;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use weft_config::model::TelegramConfig;
use weft_core::error::WeftError;
use weft_core::traits::ChannelClient;
use weft_core::types::{
    ChannelCredentials, MediaKind, MediaRef, Platform, SendOptions, SendReceipt,
};

/// Client for the Telegram Bot API, scoped to one company's bot token.
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    timeout: Duration,
}

impl TelegramClient {
    /// Creates a client from company credentials and the API configuration.
    pub fn new(
        credentials: &ChannelCredentials,
        config: &TelegramConfig,
    ) -> Result<Self, WeftError> {
        if credentials.access_token.is_empty() {
            return Err(WeftError::Config(
                "telegram credentials have an empty access token".into(),
            ));
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeftError::Channel {
                message: format!("failed to build telegram HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: credentials.access_token.clone(),
            timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// POST a Bot API method and unwrap Telegram's `{ok, result}` envelope.
    async fn call_method(&self, method: &str, payload: Value) -> Result<Value, WeftError> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(method, e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(WeftError::Channel {
                message: format!("telegram API error ({status}): {body}"),
                source: None,
            });
        }

        let envelope: Value = serde_json::from_str(&body).map_err(|e| WeftError::Channel {
            message: format!("telegram returned malformed JSON for {method}: {e}"),
            source: Some(Box::new(e)),
        })?;
        if envelope["ok"].as_bool() != Some(true) {
            return Err(WeftError::Channel {
                message: format!(
                    "telegram rejected {method}: {}",
                    envelope["description"].as_str().unwrap_or("unknown error")
                ),
                source: None,
            });
        }
        Ok(envelope["result"].clone())
    }

    fn transport_error(&self, method: &str, e: reqwest::Error) -> WeftError {
        if e.is_timeout() {
            WeftError::Timeout {
                duration: self.timeout,
            }
        } else {
            WeftError::Channel {
                message: format!("telegram {method} request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }

    /// Register the webhook URL for this bot, subscribing to messages and
    /// callback queries.
    pub async fn set_webhook(&self, webhook_url: &str) -> Result<(), WeftError> {
        let payload = json!({
            "url": webhook_url,
            "allowed_updates": ["message", "callback_query"],
        });
        self.call_method("setWebhook", payload).await?;
        tracing::info!(url = webhook_url, "telegram webhook registered");
        Ok(())
    }
}

fn receipt_from_result(result: &Value) -> SendReceipt {
    SendReceipt {
        platform_message_id: result["message_id"].as_i64().map(|id| id.to_string()),
    }
}

#[async_trait]
impl ChannelClient for TelegramClient {
    fn platform(&self) -> Platform {
        Platform::Telegram
    }

    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        options: &SendOptions,
    ) -> Result<SendReceipt, WeftError> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(parse_mode) = &options.parse_mode {
            payload["parse_mode"] = json!(parse_mode);
        }
        if let Some(reply_markup) = &options.reply_markup {
            payload["reply_markup"] = reply_markup.clone();
        }

        let result = self.call_method("sendMessage", payload).await?;
        Ok(receipt_from_result(&result))
    }

    async fn send_media(
        &self,
        chat_id: &str,
        media: &MediaRef,
        caption: &str,
    ) -> Result<SendReceipt, WeftError> {
        let (method, field) = match media.kind {
            MediaKind::Image => ("sendPhoto", "photo"),
            MediaKind::Document => ("sendDocument", "document"),
        };
        let mut payload = json!({
            "chat_id": chat_id,
            "caption": caption,
        });
        payload[field] = json!(media.url);

        let result = self.call_method(method, payload).await?;
        Ok(receipt_from_result(&result))
    }

    /// Resolve a file id to a download URL via `getFile`.
    ///
    /// An API-level miss (unknown id, expired file) is `Ok(None)`; only
    /// transport failures surface as errors.
    async fn resolve_file_url(&self, file_id: &str) -> Result<Option<String>, WeftError> {
        let url = format!("{}?file_id={}", self.method_url("getFile"), file_id);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error("getFile", e))?;

        if !response.status().is_success() {
            return Ok(None);
        }
        let envelope: Value = match response.json().await {
            Ok(v) => v,
            Err(_) => return Ok(None),
        };
        if envelope["ok"].as_bool() != Some(true) {
            return Ok(None);
        }
        match envelope["result"]["file_path"].as_str() {
            Some(file_path) => Ok(Some(format!(
                "{}/file/bot{}/{}",
                self.api_base, self.token, file_path
            ))),
            None => Ok(None),
        }
    }
}
