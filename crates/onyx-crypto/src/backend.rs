// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The local [`CryptoBackend`] implementation: Argon2id + AES-256-GCM over
//! the `vault_meta` table.

use async_trait::async_trait;
use onyx_config::model::VaultConfig;
use onyx_core::{CryptoBackend, DerivedKey, OnyxError};
use onyx_storage::{keys, queries, Database};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use zeroize::Zeroizing;

use crate::blob;
use crate::kdf::{self, KdfParams};

/// Crypto/storage backend backed by the local SQLite vault database.
pub struct LocalCryptoBackend {
    db: Database,
    params: KdfParams,
}

impl LocalCryptoBackend {
    pub fn new(db: Database, config: &VaultConfig) -> Self {
        Self {
            db,
            params: KdfParams::from(config),
        }
    }
}

#[async_trait]
impl CryptoBackend for LocalCryptoBackend {
    async fn vault_salt(&self) -> Result<Option<Vec<u8>>, OnyxError> {
        queries::meta::get(&self.db, keys::KDF_SALT).await
    }

    async fn derive_key(
        &self,
        password: &SecretString,
        salt: Option<&[u8]>,
    ) -> Result<(DerivedKey, Vec<u8>), OnyxError> {
        let salt = match salt {
            Some(existing) => existing.to_vec(),
            None => kdf::generate_salt()?.to_vec(),
        };

        // Argon2id burns ~0.5 s of CPU by design; run it off the async
        // executor so the caller stays responsive.
        let password_bytes = Zeroizing::new(password.expose_secret().as_bytes().to_vec());
        let params = self.params;
        let salt_for_task = salt.clone();
        let key = tokio::task::spawn_blocking(move || {
            kdf::derive(&password_bytes, &salt_for_task, &params)
        })
        .await
        .map_err(|e| OnyxError::Internal(format!("key derivation task failed: {e}")))??;

        debug!("session key derived");
        Ok((DerivedKey::new(*key), salt))
    }

    async fn load_vault(&self, key: &DerivedKey) -> Result<String, OnyxError> {
        // A salt without a blob means a corrupted vault; by policy that is
        // the same signal as a wrong password.
        let sealed = queries::meta::get(&self.db, keys::VAULT_BLOB)
            .await?
            .ok_or(OnyxError::WrongPassword)?;

        let plaintext = blob::open(key, &sealed)?;
        String::from_utf8(plaintext).map_err(|_| OnyxError::WrongPassword)
    }

    async fn save_vault(
        &self,
        key: &DerivedKey,
        salt: &[u8],
        plaintext: &str,
    ) -> Result<(), OnyxError> {
        let sealed = blob::seal(key, plaintext.as_bytes())?;
        let stamp = chrono::Utc::now().to_rfc3339();

        queries::meta::put_many(
            &self.db,
            vec![
                (keys::KDF_SALT.to_string(), salt.to_vec()),
                (keys::VAULT_BLOB.to_string(), sealed),
                (keys::VAULT_UPDATED_AT.to_string(), stamp.into_bytes()),
            ],
        )
        .await?;

        debug!("vault blob sealed and persisted");
        Ok(())
    }
}
