// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cryptographic backend for the OnyxVault password vault.
//!
//! Implements the [`onyx_core::CryptoBackend`] command interface: Argon2id
//! key derivation from the master password and AES-256-GCM sealing of the
//! vault blob, persisted through `onyx-storage`.

pub mod backend;
pub mod blob;
pub mod kdf;

pub use backend::LocalCryptoBackend;
pub use kdf::KdfParams;
