// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation resolution and lifecycle operations.
//!
//! Resolution is atomic get-or-create: the `UNIQUE (company_id, platform,
//! external_id)` constraint arbitrates concurrent creates and the loser
//! re-fetches the winning row. No in-process locking; the same guarantees
//! hold across multiple worker processes sharing the database file.

use rusqlite::{params, OptionalExtension, Row};
use weft_core::WeftError;

use crate::database::{map_tr_err, Database};
use crate::models::{now_timestamp, Conversation, ConversationStatus, Platform, SenderInfo};
use crate::queries::{decode_enum, decode_json, json_err};

const CONVERSATION_COLUMNS: &str =
    "id, company_id, platform, external_id, status, participants, created_at, updated_at";

fn row_to_conversation(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        company_id: row.get(1)?,
        platform: decode_enum(2, row.get(2)?)?,
        external_id: row.get(3)?,
        status: decode_enum(4, row.get(4)?)?,
        participants: decode_json(5, row.get(5)?)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Find or create the conversation for (company, platform, external id) and
/// record the sender as a participant.
///
/// The participant list keeps first-seen order and never holds two entries
/// with the same `user_id`. Insert and participant update run in one
/// transaction.
pub async fn resolve_conversation(
    db: &Database,
    company_id: &str,
    platform: Platform,
    external_id: &str,
    sender: &SenderInfo,
) -> Result<Conversation, WeftError> {
    let company_id = company_id.to_string();
    let external_id = external_id.to_string();
    let sender = sender.clone();
    let candidate_id = uuid::Uuid::new_v4().to_string();
    let now = now_timestamp();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let seed = serde_json::to_string(&[sender.clone()]).map_err(json_err)?;
            // Losing a concurrent create is fine: DO NOTHING, then read the
            // row that won.
            tx.execute(
                "INSERT INTO conversations
                     (id, company_id, platform, external_id, status, participants, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 'active', ?5, ?6, ?6)
                 ON CONFLICT (company_id, platform, external_id) DO NOTHING",
                params![
                    candidate_id,
                    company_id,
                    platform.as_str(),
                    external_id,
                    seed,
                    now
                ],
            )?;

            let mut conversation = tx.query_row(
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations
                     WHERE company_id = ?1 AND platform = ?2 AND external_id = ?3"
                ),
                params![company_id, platform.as_str(), external_id],
                row_to_conversation,
            )?;

            if !conversation
                .participants
                .iter()
                .any(|p| p.user_id == sender.user_id)
            {
                conversation.participants.push(sender);
                let encoded =
                    serde_json::to_string(&conversation.participants).map_err(json_err)?;
                tx.execute(
                    "UPDATE conversations SET participants = ?1, updated_at = ?2 WHERE id = ?3",
                    params![encoded, now, conversation.id],
                )?;
                conversation.updated_at = now.clone();
            }

            tx.commit()?;
            Ok(conversation)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a conversation by ID.
pub async fn get_conversation(db: &Database, id: &str) -> Result<Option<Conversation>, WeftError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn
                .query_row(
                    &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?1"),
                    params![id],
                    row_to_conversation,
                )
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(map_tr_err)
}

/// Find a conversation by its natural key without creating it.
pub async fn find_conversation(
    db: &Database,
    company_id: &str,
    platform: Platform,
    external_id: &str,
) -> Result<Option<Conversation>, WeftError> {
    let company_id = company_id.to_string();
    let external_id = external_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn
                .query_row(
                    &format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations
                         WHERE company_id = ?1 AND platform = ?2 AND external_id = ?3"
                    ),
                    params![company_id, platform.as_str(), external_id],
                    row_to_conversation,
                )
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(map_tr_err)
}

/// List a company's conversations, optionally filtered by status, most
/// recently active first.
pub async fn list_conversations(
    db: &Database,
    company_id: &str,
    status: Option<ConversationStatus>,
) -> Result<Vec<Conversation>, WeftError> {
    let company_id = company_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut conversations = Vec::new();
            match status {
                Some(status) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations
                         WHERE company_id = ?1 AND status = ?2 ORDER BY updated_at DESC"
                    ))?;
                    let rows =
                        stmt.query_map(params![company_id, status.to_string()], row_to_conversation)?;
                    for row in rows {
                        conversations.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {CONVERSATION_COLUMNS} FROM conversations
                         WHERE company_id = ?1 ORDER BY updated_at DESC"
                    ))?;
                    let rows = stmt.query_map(params![company_id], row_to_conversation)?;
                    for row in rows {
                        conversations.push(row?);
                    }
                }
            }
            Ok(conversations)
        })
        .await
        .map_err(map_tr_err)
}

/// Update a conversation's status (active <-> closed).
pub async fn update_conversation_status(
    db: &Database,
    id: &str,
    status: ConversationStatus,
) -> Result<(), WeftError> {
    let id = id.to_string();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE conversations SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.to_string(), now, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
