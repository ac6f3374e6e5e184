// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform client construction from company credentials.

use weft_config::model::{
    MessengerConfig, SignalConfig, TelegramConfig, WeftConfig, WhatsAppConfig,
};
use weft_core::traits::ChannelClient;
use weft_core::types::{ChannelCredentials, Platform};
use weft_core::WeftError;
use weft_messenger::MessengerClient;
use weft_signal::SignalClient;
use weft_telegram::TelegramClient;
use weft_whatsapp::WhatsAppClient;

/// Per-platform API endpoints and timeouts, carved out of the loaded config.
///
/// Clients are built per call from these routes plus the company's
/// credentials; nothing here is company-specific.
#[derive(Debug, Clone)]
pub struct PlatformRoutes {
    pub telegram: TelegramConfig,
    pub whatsapp: WhatsAppConfig,
    pub messenger: MessengerConfig,
    pub signal: SignalConfig,
}

impl PlatformRoutes {
    pub fn from_config(config: &WeftConfig) -> Self {
        Self {
            telegram: config.telegram.clone(),
            whatsapp: config.whatsapp.clone(),
            messenger: config.messenger.clone(),
            signal: config.signal.clone(),
        }
    }
}

/// Build the outbound client for a platform from company credentials.
pub fn client_for(
    platform: Platform,
    credentials: &ChannelCredentials,
    routes: &PlatformRoutes,
) -> Result<Box<dyn ChannelClient>, WeftError> {
    let client: Box<dyn ChannelClient> = match platform {
        Platform::Telegram => Box::new(TelegramClient::new(credentials, &routes.telegram)?),
        Platform::WhatsApp => Box::new(WhatsAppClient::new(credentials, &routes.whatsapp)?),
        Platform::Instagram | Platform::Facebook => {
            Box::new(MessengerClient::new(platform, credentials, &routes.messenger)?)
        }
        Platform::Signal => Box::new(SignalClient::new(credentials, &routes.signal)?),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(platform: Platform) -> ChannelCredentials {
        ChannelCredentials {
            company_id: "co-1".into(),
            platform,
            access_token: "token".into(),
            sender_id: Some("sender-1".into()),
        }
    }

    #[test]
    fn every_platform_resolves_to_a_client() {
        let routes = PlatformRoutes::from_config(&WeftConfig::default());
        for platform in [
            Platform::Telegram,
            Platform::WhatsApp,
            Platform::Instagram,
            Platform::Facebook,
            Platform::Signal,
        ] {
            let client = client_for(platform, &credentials(platform), &routes).unwrap();
            assert_eq!(client.platform(), platform);
        }
    }
}
