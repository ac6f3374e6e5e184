// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use weft_config::model::StorageConfig;
use weft_core::WeftError;

use crate::migrations::run_migrations;

/// Handle to the Weft SQLite database.
///
/// Cloning is cheap: clones share the same single-writer background thread.
/// Opening runs all pending migrations before returning.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at the configured path.
    ///
    /// Applies PRAGMAs, optionally enables WAL mode, and runs migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, WeftError> {
        let path = config.database_path.clone();

        if let Some(parent) = std::path::Path::new(&path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| WeftError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        let wal_mode = config.wal_mode;
        conn.call(move |conn| {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            run_migrations(conn)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        tracing::debug!(path = %path, wal = wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Open a database at an explicit path with WAL enabled.
    ///
    /// Convenience for tests and tooling.
    pub async fn open_at(path: &str) -> Result<Self, WeftError> {
        let config = StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        };
        Self::open(&config).await
    }

    /// The underlying single-writer connection handle.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the database, flushing pending writes.
    pub async fn close(self) -> Result<(), WeftError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

/// Convert a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(err: tokio_rusqlite::Error) -> WeftError {
    WeftError::Storage {
        source: Box::new(err),
    }
}
