// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idempotent message append and retrieval.
//!
//! `UNIQUE (conversation_id, platform_message_id)` backs at-least-once
//! webhook delivery: re-appending a message that is already stored returns
//! the original row flagged duplicate-suppressed instead of erroring.

use rusqlite::{params, OptionalExtension, Row};
use weft_core::WeftError;

use crate::database::{map_tr_err, Database};
use crate::models::{now_timestamp, Message, NewMessage};
use crate::queries::{decode_enum, decode_json, json_err};

const MESSAGE_COLUMNS: &str = "id, conversation_id, direction, kind, content, sender_info, \
     attachments, metadata, platform_message_id, is_processed, timestamp, created_at";

fn row_to_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        direction: decode_enum(2, row.get(2)?)?,
        kind: decode_enum(3, row.get(3)?)?,
        content: row.get(4)?,
        sender_info: decode_json(5, row.get(5)?)?,
        attachments: decode_json(6, row.get(6)?)?,
        metadata: decode_json(7, row.get(7)?)?,
        platform_message_id: row.get(8)?,
        is_processed: row.get(9)?,
        timestamp: row.get(10)?,
        created_at: row.get(11)?,
    })
}

/// Append a message to its conversation, idempotently.
///
/// Returns `(message, duplicate_suppressed)`. When a row with the same
/// (conversation, platform message id) already exists, the existing row is
/// returned with the flag set and nothing is written. The processed flag is
/// persisted in the same transaction as the row itself, so it is true iff
/// the insert committed.
pub async fn append_message(
    db: &Database,
    new: NewMessage,
) -> Result<(Message, bool), WeftError> {
    let id = uuid::Uuid::new_v4().to_string();
    let created_at = now_timestamp();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing = tx
                .query_row(
                    &format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages
                         WHERE conversation_id = ?1 AND platform_message_id = ?2"
                    ),
                    params![new.conversation_id, new.platform_message_id],
                    row_to_message,
                )
                .optional()?;
            if let Some(found) = existing {
                return Ok((found, true));
            }

            let sender_info = serde_json::to_string(&new.sender_info).map_err(json_err)?;
            let attachments = serde_json::to_string(&new.attachments).map_err(json_err)?;
            let metadata = serde_json::to_string(&new.metadata).map_err(json_err)?;

            tx.execute(
                "INSERT INTO messages
                     (id, conversation_id, direction, kind, content, sender_info,
                      attachments, metadata, platform_message_id, is_processed, timestamp, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, ?10, ?11)",
                params![
                    id,
                    new.conversation_id,
                    new.direction.to_string(),
                    new.kind.to_string(),
                    new.content,
                    sender_info,
                    attachments,
                    metadata,
                    new.platform_message_id,
                    new.timestamp,
                    created_at,
                ],
            )?;
            tx.commit()?;

            Ok((
                Message {
                    id,
                    conversation_id: new.conversation_id,
                    direction: new.direction,
                    kind: new.kind,
                    content: new.content,
                    sender_info: new.sender_info,
                    attachments: new.attachments,
                    metadata: new.metadata,
                    platform_message_id: new.platform_message_id,
                    is_processed: true,
                    timestamp: new.timestamp,
                    created_at,
                },
                false,
            ))
        })
        .await
        .map_err(map_tr_err)
}

/// Get a message by ID.
pub async fn get_message(db: &Database, id: &str) -> Result<Option<Message>, WeftError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn
                .query_row(
                    &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                    params![id],
                    row_to_message,
                )
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(map_tr_err)
}

/// Get messages for a conversation in event-time order.
pub async fn get_messages_for_conversation(
    db: &Database,
    conversation_id: &str,
    limit: Option<i64>,
) -> Result<Vec<Message>, WeftError> {
    let conversation_id = conversation_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut messages = Vec::new();
            match limit {
                Some(lim) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE conversation_id = ?1
                         ORDER BY timestamp ASC LIMIT ?2"
                    ))?;
                    let rows = stmt.query_map(params![conversation_id, lim], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {MESSAGE_COLUMNS} FROM messages WHERE conversation_id = ?1
                         ORDER BY timestamp ASC"
                    ))?;
                    let rows = stmt.query_map(params![conversation_id], row_to_message)?;
                    for row in rows {
                        messages.push(row?);
                    }
                }
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Flip a message's processed flag. The only mutation allowed after insert.
pub async fn set_processed(db: &Database, id: &str, processed: bool) -> Result<(), WeftError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE messages SET is_processed = ?1 WHERE id = ?2",
                params![processed, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Company, CompanyStatus, Direction, MessageKind, Platform, SenderInfo,
    };
    use crate::queries::companies::create_company;
    use crate::queries::conversations::resolve_conversation;
    use tempfile::tempdir;

    async fn setup_db_with_conversation() -> (Database, String, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open_at(db_path.to_str().unwrap()).await.unwrap();

        create_company(
            &db,
            &Company {
                id: "co-1".to_string(),
                name: "Acme Support".to_string(),
                status: CompanyStatus::Active,
                created_at: "2026-01-01T00:00:00.000Z".to_string(),
            },
        )
        .await
        .unwrap();

        let conv = resolve_conversation(
            &db,
            "co-1",
            Platform::Telegram,
            "42",
            &SenderInfo::bare("9"),
        )
        .await
        .unwrap();
        (db, conv.id, dir)
    }

    fn make_new(conversation_id: &str, platform_message_id: &str, content: &str) -> NewMessage {
        NewMessage {
            conversation_id: conversation_id.to_string(),
            direction: Direction::Incoming,
            kind: MessageKind::Text,
            content: content.to_string(),
            sender_info: SenderInfo::bare("9"),
            attachments: Vec::new(),
            metadata: serde_json::Map::new(),
            platform_message_id: platform_message_id.to_string(),
            timestamp: "2026-01-02T10:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn append_persists_and_marks_processed() {
        let (db, conv_id, _dir) = setup_db_with_conversation().await;

        let (msg, duplicate) = append_message(&db, make_new(&conv_id, "7", "hi"))
            .await
            .unwrap();
        assert!(!duplicate);
        assert!(msg.is_processed);

        let fetched = get_message(&db, &msg.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "hi");
        assert_eq!(fetched.direction, Direction::Incoming);
        assert_eq!(fetched.platform_message_id, "7");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_append_is_suppressed() {
        let (db, conv_id, _dir) = setup_db_with_conversation().await;

        let (first, _) = append_message(&db, make_new(&conv_id, "7", "hi"))
            .await
            .unwrap();
        // Redelivery carries identical content; only the key matters.
        let (second, duplicate) = append_message(&db, make_new(&conv_id, "7", "hi"))
            .await
            .unwrap();

        assert!(duplicate);
        assert_eq!(second.id, first.id);

        let all = get_messages_for_conversation(&db, &conv_id, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_platform_id_in_another_conversation_is_not_a_duplicate() {
        let (db, conv_id, _dir) = setup_db_with_conversation().await;
        let other = resolve_conversation(
            &db,
            "co-1",
            Platform::Telegram,
            "43",
            &SenderInfo::bare("10"),
        )
        .await
        .unwrap();

        append_message(&db, make_new(&conv_id, "7", "hi")).await.unwrap();
        let (_, duplicate) = append_message(&db, make_new(&other.id, "7", "hello"))
            .await
            .unwrap();
        assert!(!duplicate);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn messages_come_back_in_event_time_order() {
        let (db, conv_id, _dir) = setup_db_with_conversation().await;

        let mut m2 = make_new(&conv_id, "2", "second");
        m2.timestamp = "2026-01-02T10:00:02.000Z".to_string();
        let mut m1 = make_new(&conv_id, "1", "first");
        m1.timestamp = "2026-01-02T10:00:01.000Z".to_string();

        // Inserted out of order; retrieval sorts by event time.
        append_message(&db, m2).await.unwrap();
        append_message(&db, m1).await.unwrap();

        let all = get_messages_for_conversation(&db, &conv_id, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].content, "first");
        assert_eq!(all[1].content, "second");

        let limited = get_messages_for_conversation(&db, &conv_id, Some(1))
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].content, "first");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn processed_flag_can_be_cleared_and_set() {
        let (db, conv_id, _dir) = setup_db_with_conversation().await;
        let (msg, _) = append_message(&db, make_new(&conv_id, "9", "hi"))
            .await
            .unwrap();

        set_processed(&db, &msg.id, false).await.unwrap();
        assert!(!get_message(&db, &msg.id).await.unwrap().unwrap().is_processed);

        set_processed(&db, &msg.id, true).await.unwrap();
        assert!(get_message(&db, &msg.id).await.unwrap().unwrap().is_processed);
        db.close().await.unwrap();
    }
}
