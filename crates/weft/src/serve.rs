// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `weft serve` -- open the store and run the webhook gateway.

use std::sync::Arc;

use weft_config::WeftConfig;
use weft_core::WeftError;
use weft_gateway::{start_server, GatewayState, HealthState, WebhookDispatcher};
use weft_storage::Database;

pub async fn run(config: &WeftConfig) -> Result<(), WeftError> {
    let db = Database::open(&config.storage).await?;
    tracing::info!(
        path = %config.storage.database_path,
        "conversation store ready"
    );

    let state = GatewayState {
        dispatcher: Arc::new(WebhookDispatcher::new(db)),
        verify_token: config.webhook.verify_token.clone(),
        health: HealthState::default(),
    };

    start_server(&config.server, state).await
}
