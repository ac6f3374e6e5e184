// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound send service.
//!
//! Application-facing path: resolve company credentials, call the platform
//! API, and mirror the sent message into the conversation store only after
//! the platform accepted it. A failed send touches nothing; retry policy
//! belongs to the caller.

use weft_core::types::{
    Attachment, AttachmentKind, MediaKind, MediaRef, Message, MessageKind, Platform, SendOptions,
    SendReceipt, SenderInfo,
};
use weft_core::WeftError;
use weft_storage::queries::{companies, conversations, messages};
use weft_storage::{Database, NewMessage};

use crate::clients::{client_for, PlatformRoutes};

/// Send a text message on behalf of a company and mirror it locally.
pub async fn send_text(
    db: &Database,
    routes: &PlatformRoutes,
    company_id: &str,
    platform: Platform,
    chat_id: &str,
    text: &str,
    options: &SendOptions,
) -> Result<Message, WeftError> {
    let credentials = credentials_for(db, company_id, platform).await?;
    let client = client_for(platform, &credentials, routes)?;

    let receipt = client.send_text(chat_id, text, options).await?;

    mirror_outgoing(
        db,
        company_id,
        platform,
        chat_id,
        MessageKind::Text,
        text,
        Vec::new(),
        receipt,
    )
    .await
}

/// Send hosted media on behalf of a company and mirror it locally.
pub async fn send_media(
    db: &Database,
    routes: &PlatformRoutes,
    company_id: &str,
    platform: Platform,
    chat_id: &str,
    media: &MediaRef,
    caption: &str,
) -> Result<Message, WeftError> {
    let credentials = credentials_for(db, company_id, platform).await?;
    let client = client_for(platform, &credentials, routes)?;

    let receipt = client.send_media(chat_id, media, caption).await?;

    let kind = match media.kind {
        MediaKind::Image => MessageKind::Image,
        MediaKind::Document => MessageKind::Document,
    };
    let attachment_kind = match media.kind {
        MediaKind::Image => AttachmentKind::Image,
        MediaKind::Document => AttachmentKind::Document,
    };
    mirror_outgoing(
        db,
        company_id,
        platform,
        chat_id,
        kind,
        caption,
        vec![Attachment::by_url(attachment_kind, media.url.clone())],
        receipt,
    )
    .await
}

async fn credentials_for(
    db: &Database,
    company_id: &str,
    platform: Platform,
) -> Result<weft_core::types::ChannelCredentials, WeftError> {
    companies::get_credentials(db, company_id, platform)
        .await?
        .ok_or_else(|| WeftError::CompanyNotFound {
            company_id: company_id.to_string(),
        })
}

/// Persist the outgoing message after a successful platform call.
///
/// Runs only when the send succeeded; the conversation counterpart is the
/// recipient, while the stored sender snapshot is the company itself.
async fn mirror_outgoing(
    db: &Database,
    company_id: &str,
    platform: Platform,
    chat_id: &str,
    kind: MessageKind,
    content: &str,
    attachments: Vec<Attachment>,
    receipt: SendReceipt,
) -> Result<Message, WeftError> {
    let conversation = conversations::resolve_conversation(
        db,
        company_id,
        platform,
        chat_id,
        &SenderInfo::bare(chat_id),
    )
    .await?;

    // Platforms that report no id still need a unique dedup key per row.
    let platform_message_id = receipt
        .platform_message_id
        .unwrap_or_else(|| format!("out-{}", uuid::Uuid::new_v4()));

    let new = NewMessage::outgoing(
        &conversation.id,
        platform,
        kind,
        content,
        SenderInfo::bare(company_id),
        attachments,
        &platform_message_id,
    );
    let (message, duplicate) = messages::append_message(db, new).await?;
    if !duplicate {
        tracing::info!(
            company_id = %company_id,
            platform = %platform,
            conversation_id = %conversation.id,
            message_id = %message.id,
            "outbound message mirrored"
        );
    }
    Ok(message)
}
