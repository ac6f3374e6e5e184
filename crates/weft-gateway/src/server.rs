// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use weft_config::model::ServerConfig;
use weft_core::WeftError;

use crate::dispatcher::WebhookDispatcher;
use crate::handlers;

/// State for unauthenticated health reporting.
#[derive(Clone, Copy)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Dispatcher tying normalizers, resolver, and store together.
    pub dispatcher: Arc<WebhookDispatcher>,
    /// Expected `hub.verify_token` for subscription verification GETs.
    pub verify_token: Option<String>,
    /// Health state for the /health endpoint.
    pub health: HealthState,
}

/// Build the gateway router.
///
/// Exposed separately from [`start_server`] so tests can drive the router
/// in-process.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route(
            "/webhooks/{platform}/{company_id}",
            post(handlers::post_webhook).get(handlers::verify_webhook),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the webhook server and run until ctrl-c.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), WeftError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| WeftError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .map_err(|e| WeftError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
