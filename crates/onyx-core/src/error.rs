// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the OnyxVault workspace.

use thiserror::Error;

/// The primary error type used across all OnyxVault crates.
///
/// Cryptographic and storage failures crossing the backend boundary are
/// wrapped opaquely: an authentication failure during unlock is always
/// reported as [`OnyxError::WrongPassword`], and a bad password is never
/// distinguishable from a corrupted vault.
#[derive(Debug, Error)]
pub enum OnyxError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Unlock failed. The message is deliberately generic so that a wrong
    /// password and a tampered vault blob render identically.
    #[error("invalid master password or corrupted vault")]
    WrongPassword,

    /// The backend could not be reached. Transient; retry the same operation.
    #[error("backend unavailable: {message}")]
    BackendUnavailable {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A mutation was applied in memory but did not reach durable storage.
    ///
    /// The in-memory state is kept, not rolled back; an explicit retry is
    /// the recovery path.
    #[error("persist failure: {message}")]
    PersistFailure {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A mutation referenced a record id that is not in the store.
    #[error("record not found: {id}")]
    NotFound { id: String },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Cryptographic primitive errors outside the unlock path.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Cloud sync errors (OAuth flow, backup transfer).
    #[error("sync error: {0}")]
    Sync(String),

    /// The operation requires an unlocked vault session.
    #[error("vault is locked")]
    Locked,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
