// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `weft register-webhook` -- one-time webhook registration with a platform.
//!
//! Only Telegram exposes an API call for this; Meta subscriptions are
//! configured in the developer console and signal-cli pushes from its own
//! receive loop, so those arms just say where to point the URL.

use weft_config::WeftConfig;
use weft_core::types::Platform;
use weft_core::WeftError;
use weft_storage::queries::companies;
use weft_storage::Database;
use weft_telegram::TelegramClient;

use crate::parse_platform;

pub async fn run(
    config: &WeftConfig,
    company: &str,
    platform: &str,
    url: &str,
) -> Result<(), WeftError> {
    let platform = parse_platform(platform)?;

    match platform {
        Platform::Telegram => {
            let db = Database::open(&config.storage).await?;
            let credentials = companies::get_credentials(&db, company, platform)
                .await?
                .ok_or_else(|| WeftError::CompanyNotFound {
                    company_id: company.to_string(),
                })?;
            let client = TelegramClient::new(&credentials, &config.telegram)?;
            client.set_webhook(url).await?;
            println!("telegram webhook registered for company {company}: {url}");
        }
        Platform::WhatsApp | Platform::Instagram | Platform::Facebook => {
            println!(
                "{platform} webhooks are subscribed in the Meta developer console; \
                 point the subscription at {url}"
            );
        }
        Platform::Signal => {
            println!(
                "signal-cli pushes from its own receive loop; configure it to POST to {url}"
            );
        }
    }
    Ok(())
}
