// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-delivery webhook dispatcher.
//!
//! Ties normalizer, conversation resolver, and message store together:
//! `received -> normalized|ignored -> (resolved -> stored) -> processed`,
//! or `received -> failed` (terminal). `handle` never errors out -- the
//! platform caller always gets a well-formed acknowledgment, and failures
//! are logged with enough context for manual replay.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use weft_core::traits::WebhookNormalizer;
use weft_core::types::{NormalizeOutcome, NormalizedInbound, Platform};
use weft_core::WeftError;
use weft_messenger::MessengerNormalizer;
use weft_signal::SignalNormalizer;
use weft_storage::queries::{companies, conversations, messages};
use weft_storage::{Database, NewMessage};
use weft_telegram::TelegramNormalizer;
use weft_whatsapp::WhatsAppNormalizer;

/// Terminal state of one webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    Processed,
    Ignored,
    Failed,
}

/// Acknowledgment returned for every webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: WebhookStatus,
    pub detail: String,
}

impl WebhookAck {
    fn processed(detail: String) -> Self {
        Self {
            status: WebhookStatus::Processed,
            detail,
        }
    }

    fn ignored(detail: String) -> Self {
        Self {
            status: WebhookStatus::Ignored,
            detail,
        }
    }

    fn failed(detail: String) -> Self {
        Self {
            status: WebhookStatus::Failed,
            detail,
        }
    }
}

/// Dispatches raw webhook deliveries for all registered platforms.
pub struct WebhookDispatcher {
    db: Database,
    normalizers: HashMap<Platform, Arc<dyn WebhookNormalizer>>,
}

impl WebhookDispatcher {
    /// Dispatcher with every supported platform registered.
    pub fn new(db: Database) -> Self {
        let mut normalizers: HashMap<Platform, Arc<dyn WebhookNormalizer>> = HashMap::new();
        normalizers.insert(Platform::Telegram, Arc::new(TelegramNormalizer));
        normalizers.insert(Platform::WhatsApp, Arc::new(WhatsAppNormalizer));
        normalizers.insert(
            Platform::Instagram,
            Arc::new(MessengerNormalizer::new(Platform::Instagram)),
        );
        normalizers.insert(
            Platform::Facebook,
            Arc::new(MessengerNormalizer::new(Platform::Facebook)),
        );
        normalizers.insert(Platform::Signal, Arc::new(SignalNormalizer));
        Self { db, normalizers }
    }

    /// The database this dispatcher persists into.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Process one webhook delivery for a company.
    ///
    /// Infallible by contract: storage failures and unknown company scopes
    /// come back as a `failed` acknowledgment, never as an error or panic.
    pub async fn handle(&self, company_id: &str, platform: Platform, payload: &Value) -> WebhookAck {
        let company = match companies::get_company(&self.db, company_id).await {
            Ok(Some(company)) => company,
            Ok(None) => {
                tracing::warn!(
                    company_id = %company_id,
                    platform = %platform,
                    "webhook for unknown company"
                );
                return WebhookAck::failed(format!("unknown company: {company_id}"));
            }
            Err(e) => {
                tracing::error!(
                    company_id = %company_id,
                    platform = %platform,
                    error = %e,
                    "company lookup failed"
                );
                return WebhookAck::failed(format!("storage failure: {e}"));
            }
        };

        let Some(normalizer) = self.normalizers.get(&platform) else {
            return WebhookAck::failed(format!("no normalizer registered for {platform}"));
        };

        let mut stored = 0usize;
        let mut duplicates = 0usize;
        let mut callbacks = 0usize;
        let mut first_ignore_reason: Option<String> = None;

        for outcome in normalizer.normalize(payload) {
            match outcome {
                NormalizeOutcome::Message(inbound) => {
                    match self.store_inbound(&company.id, platform, &inbound).await {
                        Ok(true) => duplicates += 1,
                        Ok(false) => stored += 1,
                        Err(e) => {
                            tracing::error!(
                                company_id = %company.id,
                                platform = %platform,
                                external_id = %inbound.external_chat_id,
                                platform_message_id = %inbound.platform_message_id,
                                error = %e,
                                "failed to store inbound message"
                            );
                            return WebhookAck::failed(format!("storage failure: {e}"));
                        }
                    }
                }
                NormalizeOutcome::Callback(event) => {
                    callbacks += 1;
                    tracing::info!(
                        company_id = %company.id,
                        platform = %platform,
                        external_chat_id = event.external_chat_id.as_deref().unwrap_or("-"),
                        data = event.data.as_deref().unwrap_or("-"),
                        "callback observed"
                    );
                }
                NormalizeOutcome::Ignored { reason } => {
                    tracing::debug!(
                        company_id = %company.id,
                        platform = %platform,
                        reason = %reason,
                        "webhook event ignored"
                    );
                    first_ignore_reason.get_or_insert(reason);
                }
            }
        }

        if stored + duplicates > 0 {
            let detail = if duplicates > 0 {
                format!("stored {stored} message(s), suppressed {duplicates} duplicate(s)")
            } else {
                format!("stored {stored} message(s)")
            };
            WebhookAck::processed(detail)
        } else if callbacks > 0 {
            WebhookAck::ignored(format!("observed {callbacks} callback(s)"))
        } else {
            WebhookAck::ignored(
                first_ignore_reason.unwrap_or_else(|| "nothing to process".to_string()),
            )
        }
    }

    /// Resolve the conversation and append one normalized message.
    ///
    /// Returns whether the append was suppressed as a duplicate.
    async fn store_inbound(
        &self,
        company_id: &str,
        platform: Platform,
        inbound: &NormalizedInbound,
    ) -> Result<bool, WeftError> {
        let conversation = conversations::resolve_conversation(
            &self.db,
            company_id,
            platform,
            &inbound.external_chat_id,
            &inbound.sender,
        )
        .await?;

        let new = NewMessage::incoming(&conversation.id, platform, inbound);
        let (message, duplicate) = messages::append_message(&self.db, new).await?;

        if duplicate {
            tracing::info!(
                company_id = %company_id,
                platform = %platform,
                message_id = %message.id,
                platform_message_id = %inbound.platform_message_id,
                "duplicate delivery suppressed"
            );
        } else {
            tracing::info!(
                company_id = %company_id,
                platform = %platform,
                conversation_id = %conversation.id,
                message_id = %message.id,
                kind = %message.kind,
                "inbound message stored"
            );
        }
        Ok(duplicate)
    }
}
