// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The narrow command interface to the crypto/storage backend.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::OnyxError;
use crate::types::DerivedKey;

/// Crypto and vault persistence commands.
///
/// The persisted layout behind this trait is exactly one opaque salt value
/// and one authenticated-encrypted blob whose plaintext is a JSON array of
/// credential records. Implementations are trusted black boxes; callers
/// treat their errors as opaque pass/fail signals.
#[async_trait]
pub trait CryptoBackend: Send + Sync {
    /// Fetch the stored KDF salt. `None` signals first run: no vault exists yet.
    async fn vault_salt(&self) -> Result<Option<Vec<u8>>, OnyxError>;

    /// Derive the session key from the master password and a salt.
    ///
    /// When `salt` is `None` a fresh salt is generated and returned alongside
    /// the key. Deterministic for the same (password, salt) pair, and
    /// expensive by design (target roughly 0.5 s) to throttle brute force.
    async fn derive_key(
        &self,
        password: &SecretString,
        salt: Option<&[u8]>,
    ) -> Result<(DerivedKey, Vec<u8>), OnyxError>;

    /// Decrypt and return the vault plaintext.
    ///
    /// Any authentication failure maps to [`OnyxError::WrongPassword`]; a
    /// wrong key and a corrupted blob are indistinguishable to callers.
    async fn load_vault(&self, key: &DerivedKey) -> Result<String, OnyxError>;

    /// Encrypt `plaintext` under `key` and persist it together with `salt`.
    async fn save_vault(
        &self,
        key: &DerivedKey,
        salt: &[u8],
        plaintext: &str,
    ) -> Result<(), OnyxError>;
}
