// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP handlers for the webhook endpoints.
//!
//! Every recognized delivery is answered `200` with a `WebhookAck` body --
//! including unparseable payloads and internal failures -- so platforms
//! never enter a retry storm over content the core will not accept. Only
//! transport-level collapse can produce a 5xx.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use weft_core::types::Platform;

use crate::dispatcher::{WebhookAck, WebhookStatus};
use crate::server::GatewayState;

/// Error response body for requests outside the webhook contract.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// POST /webhooks/{platform}/{company_id}
///
/// Receives one platform-native delivery and acknowledges it fast.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    Path((platform, company_id)): Path<(String, String)>,
    body: String,
) -> Response {
    let Ok(platform) = platform.parse::<Platform>() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("unknown platform: {platform}"),
            }),
        )
            .into_response();
    };

    // A body that is not JSON is an ignorable payload, not a client error:
    // answering 4xx would put the platform into redelivery.
    let payload: Value = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(platform = %platform, company_id = %company_id, error = %e,
                "webhook body is not JSON");
            return (
                StatusCode::OK,
                Json(WebhookAck {
                    status: WebhookStatus::Ignored,
                    detail: "request body is not valid JSON".to_string(),
                }),
            )
                .into_response();
        }
    };

    let ack = state.dispatcher.handle(&company_id, platform, &payload).await;
    (StatusCode::OK, Json(ack)).into_response()
}

/// GET /webhooks/{platform}/{company_id}
///
/// Meta-style subscription verification: echo `hub.challenge` when
/// `hub.verify_token` matches the configured token.
pub async fn verify_webhook(
    State(state): State<GatewayState>,
    Path((_platform, _company_id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let token = params.get("hub.verify_token");
    let challenge = params.get("hub.challenge");

    match (&state.verify_token, token, challenge) {
        (Some(expected), Some(got), Some(challenge)) if got == expected => {
            (StatusCode::OK, challenge.clone()).into_response()
        }
        _ => (StatusCode::FORBIDDEN, "Invalid verify token".to_string()).into_response(),
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }

    #[test]
    fn ack_serializes_lowercase_status() {
        let ack = WebhookAck {
            status: WebhookStatus::Processed,
            detail: "stored 1 message(s)".to_string(),
        };
        let json = serde_json::to_string(&ack).unwrap();
        assert!(json.contains("\"status\":\"processed\""));
    }
}
