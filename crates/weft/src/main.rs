// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weft - multi-platform webhook-to-conversation core.
//!
//! This is the binary entry point for the Weft gateway.

mod register;
mod send;
mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use weft_core::types::Platform;
use weft_core::WeftError;

/// Weft - unified conversation store over per-company chat-platform webhooks.
#[derive(Parser, Debug)]
#[command(name = "weft", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook gateway server.
    Serve,
    /// Send an outbound text message on behalf of a company.
    Send {
        /// Company id owning the credentials.
        #[arg(long)]
        company: String,
        /// Platform to send on (telegram, whatsapp, instagram, facebook, signal).
        #[arg(long)]
        platform: String,
        /// Platform chat/user id of the recipient.
        #[arg(long)]
        chat: String,
        /// Message text.
        #[arg(long)]
        text: String,
    },
    /// Register the inbound webhook URL with a platform.
    RegisterWebhook {
        /// Company id owning the credentials.
        #[arg(long)]
        company: String,
        /// Platform to register (telegram, whatsapp, instagram, facebook, signal).
        #[arg(long)]
        platform: String,
        /// Public URL of this gateway's webhook endpoint.
        #[arg(long)]
        url: String,
    },
}

pub(crate) fn parse_platform(raw: &str) -> Result<Platform, WeftError> {
    raw.parse().map_err(|_| {
        WeftError::Config(format!(
            "unknown platform `{raw}` (expected telegram, whatsapp, instagram, facebook, or signal)"
        ))
    })
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match weft_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            weft_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.service.log_level);

    let result = match cli.command {
        None | Some(Commands::Serve) => serve::run(&config).await,
        Some(Commands::Send {
            company,
            platform,
            chat,
            text,
        }) => send::run(&config, &company, &platform, &chat, &text).await,
        Some(Commands::RegisterWebhook {
            company,
            platform,
            url,
        }) => register::run(&config, &company, &platform, &url).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}
