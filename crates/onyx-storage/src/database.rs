// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use onyx_config::model::StorageConfig;
use onyx_core::OnyxError;
use tracing::debug;

use crate::migrations;

/// Handle to the vault database.
///
/// Wraps a single `tokio_rusqlite::Connection`; cloning the handle shares
/// the same background writer thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` with WAL mode enabled and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, OnyxError> {
        Self::open_with(path, true).await
    }

    /// Open using settings from [`StorageConfig`].
    pub async fn open_from_config(config: &StorageConfig) -> Result<Self, OnyxError> {
        Self::open_with(&config.database_path, config.wal_mode).await
    }

    async fn open_with(path: &str, wal_mode: bool) -> Result<Self, OnyxError> {
        // Create the parent directory on first run.
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| OnyxError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| OnyxError::Storage {
                source: Box::new(e),
            })?;

        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "busy_timeout", 5000)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| -> Result<(), rusqlite::Error> {
            // Refinery reports its own error type; surface it through a
            // rusqlite wrapper so the call signature stays uniform.
            migrations::run_migrations(conn)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path = %path, wal_mode, "vault database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying connection. All queries go through
    /// `connection().call(...)` on the single writer thread.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), OnyxError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Convert tokio-rusqlite errors to `OnyxError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> OnyxError {
    OnyxError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_database_file_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/data/onyx.db");
        let _db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn migrations_create_vault_meta_table() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("migrate.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let count: i64 = db
            .connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'vault_meta'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("reopen.db");
        {
            let _db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        }
        // Second open re-runs the migration runner, which must be a no-op.
        let _db = Database::open(db_path.to_str().unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn checkpoint_succeeds_on_fresh_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("ckpt.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.checkpoint().await.unwrap();
    }
}
