// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value operations on the `vault_meta` table.

use onyx_core::OnyxError;
use rusqlite::params;

use crate::database::Database;

/// Read a single meta value. Returns `None` when the key is absent.
pub async fn get(db: &Database, key: &str) -> Result<Option<Vec<u8>>, OnyxError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Vec<u8>>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT value FROM vault_meta WHERE key = ?1")?;
            let result = stmt.query_row(params![key], |row| row.get(0));
            match result {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or replace a single meta value.
pub async fn put(db: &Database, key: &str, value: Vec<u8>) -> Result<(), OnyxError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT OR REPLACE INTO vault_meta (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or replace several meta values in one transaction.
///
/// The salt, blob, and timestamp must move together; a torn write here would
/// leave an undecryptable vault.
pub async fn put_many(db: &Database, entries: Vec<(String, Vec<u8>)>) -> Result<(), OnyxError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            for (key, value) in &entries {
                tx.execute(
                    "INSERT OR REPLACE INTO vault_meta (key, value) VALUES (?1, ?2)",
                    params![key, value],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a meta value. Absent keys are ignored.
pub async fn delete(db: &Database, key: &str) -> Result<(), OnyxError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute("DELETE FROM vault_meta WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
