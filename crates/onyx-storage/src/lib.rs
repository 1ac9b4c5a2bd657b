// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the OnyxVault password vault.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer concurrency model via `tokio-rusqlite`. The only persisted
//! state is the `vault_meta` table: one opaque KDF salt, one
//! authenticated-encrypted vault blob, and a last-write timestamp.

pub mod database;
pub mod keys;
pub mod migrations;
pub mod queries;
pub mod writer;

pub use database::Database;
