// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Refresh-token custody.
//!
//! Tokens live in the OS credential store and never cross the
//! [`CloudBackend`](onyx_core::CloudBackend) boundary: the coordinator above
//! only ever sees a boolean link status.

use onyx_core::OnyxError;

/// Storage for the OAuth refresh token.
pub trait TokenStore: Send + Sync {
    /// The stored refresh token, or `None` when no account is linked.
    fn get_refresh_token(&self) -> Result<Option<String>, OnyxError>;

    /// Store (or replace) the refresh token.
    fn set_refresh_token(&self, token: &str) -> Result<(), OnyxError>;
}

/// OS-credential-store backed token storage (Keychain, Credential Manager,
/// Secret Service).
pub struct KeyringTokenStore {
    service: String,
    user: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self {
            service: "OnyxVault".to_string(),
            user: "google_refresh_token".to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, OnyxError> {
        keyring::Entry::new(&self.service, &self.user)
            .map_err(|e| OnyxError::Sync(format!("credential store unavailable: {e}")))
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn get_refresh_token(&self) -> Result<Option<String>, OnyxError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(OnyxError::Sync(format!("credential store read failed: {e}"))),
        }
    }

    fn set_refresh_token(&self, token: &str) -> Result<(), OnyxError> {
        self.entry()?
            .set_password(token)
            .map_err(|e| OnyxError::Sync(format!("credential store write failed: {e}")))
    }
}

/// In-memory token storage for tests and keyring-less environments.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: std::sync::Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: std::sync::Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get_refresh_token(&self) -> Result<Option<String>, OnyxError> {
        Ok(self.token.lock().expect("token lock poisoned").clone())
    }

    fn set_refresh_token(&self, token: &str) -> Result<(), OnyxError> {
        *self.token.lock().expect("token lock poisoned") = Some(token.to_string());
        Ok(())
    }
}
