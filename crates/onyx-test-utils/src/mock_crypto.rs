// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock crypto backend for deterministic testing.
//!
//! `MockCryptoBackend` implements `CryptoBackend` with an instant SHA-256
//! stand-in for the (deliberately slow) Argon2id derivation, and an
//! in-memory "vault" that models AEAD authentication: loading with a key
//! other than the one that saved fails exactly like a wrong password.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use onyx_core::{CryptoBackend, DerivedKey, OnyxError};
use ring::digest;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

#[derive(Default)]
struct VaultState {
    salt: Option<Vec<u8>>,
    sealing_key: Option<[u8; 32]>,
    plaintext: Option<String>,
}

/// A scripted crypto backend with failure injection.
#[derive(Default)]
pub struct MockCryptoBackend {
    state: Mutex<VaultState>,
    save_count: AtomicUsize,
    unavailable: AtomicBool,
    fail_next_save: AtomicBool,
}

/// Deterministic stand-in for the KDF: SHA-256 over password || salt.
pub fn derive_key_bytes(password: &str, salt: &[u8]) -> [u8; 32] {
    let mut ctx = digest::Context::new(&digest::SHA256);
    ctx.update(password.as_bytes());
    ctx.update(salt);
    let hash = ctx.finish();
    let mut key = [0u8; 32];
    key.copy_from_slice(hash.as_ref());
    key
}

impl MockCryptoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an "existing vault" sealed under `password`, as if a
    /// prior session had created it.
    pub async fn with_existing_vault(password: &str, plaintext: &str) -> Self {
        let backend = Self::new();
        let salt = vec![0x5A; 16];
        {
            let mut state = backend.state.lock().await;
            state.sealing_key = Some(derive_key_bytes(password, &salt));
            state.plaintext = Some(plaintext.to_string());
            state.salt = Some(salt);
        }
        backend
    }

    /// The most recently saved plaintext, if any.
    pub async fn saved_plaintext(&self) -> Option<String> {
        self.state.lock().await.plaintext.clone()
    }

    /// Number of successful `save_vault` calls.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Simulate the backend being unreachable for every subsequent call.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make exactly the next `save_vault` call fail.
    pub fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), OnyxError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(OnyxError::BackendUnavailable {
                message: "mock backend offline".to_string(),
                source: None,
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CryptoBackend for MockCryptoBackend {
    async fn vault_salt(&self) -> Result<Option<Vec<u8>>, OnyxError> {
        self.check_available()?;
        Ok(self.state.lock().await.salt.clone())
    }

    async fn derive_key(
        &self,
        password: &SecretString,
        salt: Option<&[u8]>,
    ) -> Result<(DerivedKey, Vec<u8>), OnyxError> {
        self.check_available()?;
        let salt = salt.map(<[u8]>::to_vec).unwrap_or_else(|| vec![0x5A; 16]);
        let key = derive_key_bytes(password.expose_secret(), &salt);
        Ok((DerivedKey::new(key), salt))
    }

    async fn load_vault(&self, key: &DerivedKey) -> Result<String, OnyxError> {
        self.check_available()?;
        let state = self.state.lock().await;
        match (&state.sealing_key, &state.plaintext) {
            (Some(sealing_key), Some(plaintext)) if sealing_key == key.expose() => {
                Ok(plaintext.clone())
            }
            // Wrong key and missing/corrupt blob are the same signal.
            _ => Err(OnyxError::WrongPassword),
        }
    }

    async fn save_vault(
        &self,
        key: &DerivedKey,
        salt: &[u8],
        plaintext: &str,
    ) -> Result<(), OnyxError> {
        self.check_available()?;
        if self.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(OnyxError::Storage {
                source: "mock write failure".into(),
            });
        }

        let mut state = self.state.lock().await;
        state.salt = Some(salt.to_vec());
        state.sealing_key = Some(*key.expose());
        state.plaintext = Some(plaintext.to_string());
        drop(state);

        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn derive_is_deterministic() {
        let backend = MockCryptoBackend::new();
        let password = SecretString::from("pw".to_string());
        let (k1, s1) = backend.derive_key(&password, None).await.unwrap();
        let (k2, _) = backend.derive_key(&password, Some(&s1)).await.unwrap();
        assert_eq!(k1.expose(), k2.expose());
    }

    #[tokio::test]
    async fn wrong_key_fails_like_wrong_password() {
        let backend = MockCryptoBackend::with_existing_vault("right", "[]").await;
        let wrong = SecretString::from("wrong".to_string());
        let salt = backend.vault_salt().await.unwrap().unwrap();
        let (key, _) = backend.derive_key(&wrong, Some(&salt)).await.unwrap();
        assert!(matches!(
            backend.load_vault(&key).await.unwrap_err(),
            OnyxError::WrongPassword
        ));
    }

    #[tokio::test]
    async fn fail_next_save_fails_exactly_once() {
        let backend = MockCryptoBackend::new();
        let password = SecretString::from("pw".to_string());
        let (key, salt) = backend.derive_key(&password, None).await.unwrap();

        backend.fail_next_save();
        assert!(backend.save_vault(&key, &salt, "[]").await.is_err());
        assert!(backend.save_vault(&key, &salt, "[]").await.is_ok());
        assert_eq!(backend.save_count(), 1);
    }
}
