// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Company and channel-credential operations.
//!
//! Tenant management proper lives outside this core; these queries cover
//! what webhook dispatch and outbound send need: looking up the tenant
//! scope and the per-(company, platform) API credentials.

use rusqlite::{params, OptionalExtension};
use weft_core::WeftError;

use crate::database::{map_tr_err, Database};
use crate::models::{now_timestamp, ChannelCredentials, Company, Platform};
use crate::queries::decode_enum;

/// Create a new company.
pub async fn create_company(db: &Database, company: &Company) -> Result<(), WeftError> {
    let company = company.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO companies (id, name, status, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    company.id,
                    company.name,
                    company.status.to_string(),
                    company.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a company by ID.
pub async fn get_company(db: &Database, id: &str) -> Result<Option<Company>, WeftError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn
                .query_row(
                    "SELECT id, name, status, created_at FROM companies WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(Company {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            status: decode_enum(2, row.get(2)?)?,
                            created_at: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace the credentials for a (company, platform) pair.
pub async fn upsert_credentials(
    db: &Database,
    credentials: &ChannelCredentials,
) -> Result<(), WeftError> {
    let credentials = credentials.clone();
    let now = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO channel_credentials (company_id, platform, access_token, sender_id, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (company_id, platform) DO UPDATE SET
                     access_token = excluded.access_token,
                     sender_id = excluded.sender_id,
                     updated_at = excluded.updated_at",
                params![
                    credentials.company_id,
                    credentials.platform.as_str(),
                    credentials.access_token,
                    credentials.sender_id,
                    now,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Look up the credentials a company has configured for a platform.
pub async fn get_credentials(
    db: &Database,
    company_id: &str,
    platform: Platform,
) -> Result<Option<ChannelCredentials>, WeftError> {
    let company_id = company_id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn
                .query_row(
                    "SELECT company_id, platform, access_token, sender_id
                     FROM channel_credentials WHERE company_id = ?1 AND platform = ?2",
                    params![company_id, platform.as_str()],
                    |row| {
                        Ok(ChannelCredentials {
                            company_id: row.get(0)?,
                            platform: decode_enum(1, row.get(1)?)?,
                            access_token: row.get(2)?,
                            sender_id: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompanyStatus;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open_at(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_company(id: &str) -> Company {
        Company {
            id: id.to_string(),
            name: "Acme Support".to_string(),
            status: CompanyStatus::Active,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_get_company_roundtrips() {
        let (db, _dir) = setup_db().await;
        create_company(&db, &make_company("co-1")).await.unwrap();

        let fetched = get_company(&db, "co-1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Acme Support");
        assert_eq!(fetched.status, CompanyStatus::Active);

        assert!(get_company(&db, "co-missing").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn credentials_upsert_replaces_token() {
        let (db, _dir) = setup_db().await;
        create_company(&db, &make_company("co-1")).await.unwrap();

        let creds = ChannelCredentials {
            company_id: "co-1".to_string(),
            platform: Platform::Telegram,
            access_token: "111:aaa".to_string(),
            sender_id: None,
        };
        upsert_credentials(&db, &creds).await.unwrap();

        let rotated = ChannelCredentials {
            access_token: "222:bbb".to_string(),
            ..creds
        };
        upsert_credentials(&db, &rotated).await.unwrap();

        let fetched = get_credentials(&db, "co-1", Platform::Telegram)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.access_token, "222:bbb");

        assert!(get_credentials(&db, "co-1", Platform::Signal)
            .await
            .unwrap()
            .is_none());
        db.close().await.unwrap();
    }
}
