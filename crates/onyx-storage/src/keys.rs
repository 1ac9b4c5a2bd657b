// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Well-known `vault_meta` keys shared by the crypto backend and cloud sync.

/// The Argon2id salt bound to the master password at vault creation.
pub const KDF_SALT: &str = "kdf_salt";

/// The AEAD-sealed vault blob: 12-byte nonce, ciphertext, 16-byte tag.
pub const VAULT_BLOB: &str = "vault_blob";

/// RFC 3339 timestamp of the last local vault write, compared against the
/// remote copy during startup reconciliation.
pub const VAULT_UPDATED_AT: &str = "vault_updated_at";
