// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook gateway for the Weft messaging core.
//!
//! The inbound path: an axum server receives per-company, per-platform
//! webhook deliveries and hands them to the [`dispatcher::WebhookDispatcher`],
//! which normalizes, resolves the conversation, and appends idempotently.
//! The outbound path lives in [`outbound`] and is called by application
//! code, not exposed over HTTP.

pub mod clients;
pub mod dispatcher;
pub mod handlers;
pub mod outbound;
pub mod server;

pub use clients::{client_for, PlatformRoutes};
pub use dispatcher::{WebhookAck, WebhookDispatcher, WebhookStatus};
pub use server::{build_router, start_server, GatewayState, HealthState};
