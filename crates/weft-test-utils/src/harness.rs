// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-database harness with a seeded company.

use tempfile::TempDir;
use weft_core::types::{
    ChannelCredentials, Company, CompanyStatus, Conversation, Message, Platform,
};
use weft_storage::queries::{companies, conversations, messages};
use weft_storage::Database;

/// A migrated SQLite database in a temp directory, seeded with one company.
///
/// The temp directory lives as long as the harness; dropping the harness
/// removes the database file.
pub struct TestStore {
    pub db: Database,
    pub company_id: String,
    _dir: TempDir,
}

impl TestStore {
    /// Open a fresh store with company `co-test` ("Test Company") seeded.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db_path = dir.path().join("weft-test.db");
        let db = Database::open_at(db_path.to_str().expect("utf-8 temp path"))
            .await
            .expect("open test database");

        let company_id = "co-test".to_string();
        companies::create_company(
            &db,
            &Company {
                id: company_id.clone(),
                name: "Test Company".to_string(),
                status: CompanyStatus::Active,
                created_at: "2026-01-01T00:00:00.000Z".to_string(),
            },
        )
        .await
        .expect("seed company");

        Self {
            db,
            company_id,
            _dir: dir,
        }
    }

    /// Store credentials for the seeded company on the given platform.
    pub async fn add_credentials(
        &self,
        platform: Platform,
        access_token: &str,
        sender_id: Option<&str>,
    ) {
        companies::upsert_credentials(
            &self.db,
            &ChannelCredentials {
                company_id: self.company_id.clone(),
                platform,
                access_token: access_token.to_string(),
                sender_id: sender_id.map(|s| s.to_string()),
            },
        )
        .await
        .expect("seed credentials");
    }

    /// Find the seeded company's conversation for (platform, external id).
    pub async fn conversation(
        &self,
        platform: Platform,
        external_id: &str,
    ) -> Option<Conversation> {
        conversations::find_conversation(&self.db, &self.company_id, platform, external_id)
            .await
            .expect("query conversation")
    }

    /// All messages in the conversation for (platform, external id), oldest first.
    pub async fn messages_in(&self, platform: Platform, external_id: &str) -> Vec<Message> {
        match self.conversation(platform, external_id).await {
            Some(conversation) => {
                messages::get_messages_for_conversation(&self.db, &conversation.id, None)
                    .await
                    .expect("query messages")
            }
            None => Vec::new(),
        }
    }

    /// Number of conversations the seeded company has.
    pub async fn conversation_count(&self) -> usize {
        conversations::list_conversations(&self.db, &self.company_id, None)
            .await
            .expect("list conversations")
            .len()
    }
}
