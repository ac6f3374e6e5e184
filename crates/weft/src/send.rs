// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `weft send` -- drive the outbound path from the command line.

use weft_config::WeftConfig;
use weft_core::types::SendOptions;
use weft_core::WeftError;
use weft_gateway::{outbound, PlatformRoutes};
use weft_storage::Database;

use crate::parse_platform;

pub async fn run(
    config: &WeftConfig,
    company: &str,
    platform: &str,
    chat: &str,
    text: &str,
) -> Result<(), WeftError> {
    let platform = parse_platform(platform)?;
    let db = Database::open(&config.storage).await?;
    let routes = PlatformRoutes::from_config(config);

    let message = outbound::send_text(
        &db,
        &routes,
        company,
        platform,
        chat,
        text,
        &SendOptions::default(),
    )
    .await?;

    println!(
        "sent {platform} message {} (platform id {})",
        message.id, message.platform_message_id
    );
    Ok(())
}
