// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Drive [`CloudBackend`] implementation.
//!
//! The remote side is a single backup object: a JSON manifest carrying the
//! base64 salt, the base64 encrypted blob, and a last-write timestamp. The
//! blob crosses the wire exactly as it sits on disk; nothing here can read
//! its plaintext.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use onyx_config::model::SyncConfig;
use onyx_core::{CloudBackend, OnyxError};
use onyx_storage::{keys, queries, Database};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::token::TokenStore;

/// The remote backup object.
#[derive(Debug, Serialize, Deserialize)]
pub struct VaultManifest {
    /// RFC 3339 timestamp of the write that produced this backup.
    pub updated_at: String,
    /// Base64 KDF salt.
    pub salt: String,
    /// Base64 sealed vault blob (nonce || ciphertext || tag).
    pub blob: String,
}

/// Token response from the OAuth token endpoint. Only the fields we use.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Drive-backed cloud backend: OAuth code flow plus manifest up/download.
pub struct DriveCloudBackend {
    http: reqwest::Client,
    config: SyncConfig,
    db: Database,
    tokens: Box<dyn TokenStore>,
}

impl DriveCloudBackend {
    pub fn new(
        config: SyncConfig,
        db: Database,
        tokens: Box<dyn TokenStore>,
    ) -> Result<Self, OnyxError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| OnyxError::Internal(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            db,
            tokens,
        })
    }

    fn client_id(&self) -> Result<&str, OnyxError> {
        self.config
            .client_id
            .as_deref()
            .ok_or_else(|| OnyxError::Sync("sync.client_id is not configured".to_string()))
    }

    fn backup_url(&self) -> String {
        format!("{}/vault", self.config.content_endpoint.trim_end_matches('/'))
    }

    /// Trade the stored refresh token for a short-lived access token.
    /// Internal only; the token never leaves this type.
    async fn access_token(&self) -> Result<String, OnyxError> {
        let refresh_token = self
            .tokens
            .get_refresh_token()?
            .ok_or_else(|| OnyxError::Sync("no cloud account linked".to_string()))?;

        let mut form = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id()?.to_string()),
        ];
        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret.clone()));
        }

        let response = self
            .http
            .post(&self.config.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| OnyxError::BackendUnavailable {
                message: "token endpoint unreachable".to_string(),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            return Err(OnyxError::Sync(format!(
                "token refresh rejected with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| OnyxError::Sync(format!("malformed token response: {e}")))?;
        token
            .access_token
            .ok_or_else(|| OnyxError::Sync("token response carried no access token".to_string()))
    }
}

#[async_trait]
impl CloudBackend for DriveCloudBackend {
    async fn link_status(&self) -> Result<bool, OnyxError> {
        // A credential-store hiccup reads as "not linked" rather than an
        // error; linking again is always safe.
        match self.tokens.get_refresh_token() {
            Ok(token) => Ok(token.is_some()),
            Err(e) => {
                debug!(error = %e, "credential store probe failed");
                Ok(false)
            }
        }
    }

    async fn pull_if_newer(&self) -> Result<bool, OnyxError> {
        let access_token = self.access_token().await?;
        let response = self
            .http
            .get(self.backup_url())
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(|e| OnyxError::BackendUnavailable {
                message: "backup endpoint unreachable".to_string(),
                source: Some(Box::new(e)),
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("no remote backup exists yet");
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(OnyxError::Sync(format!(
                "backup download rejected with status {}",
                response.status()
            )));
        }

        let manifest: VaultManifest = response
            .json()
            .await
            .map_err(|e| OnyxError::Sync(format!("malformed backup manifest: {e}")))?;

        let local_stamp = queries::meta::get(&self.db, keys::VAULT_UPDATED_AT)
            .await?
            .and_then(|bytes| String::from_utf8(bytes).ok());

        if !remote_is_newer(&manifest.updated_at, local_stamp.as_deref()) {
            debug!("local vault is current; remote backup ignored");
            return Ok(false);
        }

        let engine = base64::engine::general_purpose::STANDARD;
        let salt = engine
            .decode(&manifest.salt)
            .map_err(|e| OnyxError::Sync(format!("malformed backup salt: {e}")))?;
        let blob = engine
            .decode(&manifest.blob)
            .map_err(|e| OnyxError::Sync(format!("malformed backup blob: {e}")))?;

        // Overwrite the local encrypted vault in place, before any unlock.
        queries::meta::put_many(
            &self.db,
            vec![
                (keys::KDF_SALT.to_string(), salt),
                (keys::VAULT_BLOB.to_string(), blob),
                (
                    keys::VAULT_UPDATED_AT.to_string(),
                    manifest.updated_at.into_bytes(),
                ),
            ],
        )
        .await?;

        info!("local vault overwritten from remote backup");
        Ok(true)
    }

    async fn begin_authorization(&self) -> Result<(), OnyxError> {
        let url = consent_url(&self.config, self.client_id()?);
        info!("opening external consent flow");
        open_external(&url)
            .map_err(|e| OnyxError::Sync(format!("failed to open browser for consent: {e}")))
    }

    async fn exchange_code(&self, code: &str) -> Result<(), OnyxError> {
        let mut form = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("client_id", self.client_id()?.to_string()),
            ("redirect_uri", self.config.redirect_uri.clone()),
        ];
        if let Some(secret) = &self.config.client_secret {
            form.push(("client_secret", secret.clone()));
        }

        let response = self
            .http
            .post(&self.config.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| OnyxError::BackendUnavailable {
                message: "token endpoint unreachable".to_string(),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            return Err(OnyxError::Sync(format!(
                "code exchange rejected with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| OnyxError::Sync(format!("malformed token response: {e}")))?;
        let refresh_token = token
            .refresh_token
            .ok_or_else(|| OnyxError::Sync("token response carried no refresh token".to_string()))?;

        self.tokens.set_refresh_token(&refresh_token)?;
        info!("cloud account linked; refresh token stored in credential store");
        Ok(())
    }

    async fn push_current(&self) -> Result<(), OnyxError> {
        let salt = queries::meta::get(&self.db, keys::KDF_SALT).await?;
        let blob = queries::meta::get(&self.db, keys::VAULT_BLOB).await?;
        let stamp = queries::meta::get(&self.db, keys::VAULT_UPDATED_AT).await?;

        let (Some(salt), Some(blob)) = (salt, blob) else {
            return Err(OnyxError::Sync("no local vault to upload".to_string()));
        };

        let engine = base64::engine::general_purpose::STANDARD;
        let manifest = VaultManifest {
            updated_at: stamp
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
            salt: engine.encode(salt),
            blob: engine.encode(blob),
        };

        let access_token = self.access_token().await?;
        let response = self
            .http
            .put(self.backup_url())
            .bearer_auth(&access_token)
            .json(&manifest)
            .send()
            .await
            .map_err(|e| OnyxError::BackendUnavailable {
                message: "backup endpoint unreachable".to_string(),
                source: Some(Box::new(e)),
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "backup upload rejected");
            return Err(OnyxError::Sync(format!(
                "backup upload rejected with status {}",
                response.status()
            )));
        }

        info!("encrypted vault uploaded");
        Ok(())
    }
}

/// Build the OAuth consent URL for the external browser flow.
fn consent_url(config: &SyncConfig, client_id: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        config.auth_endpoint, client_id, config.redirect_uri, config.scope
    )
}

/// `true` when the remote stamp is strictly newer than the local one (or no
/// usable local stamp exists).
fn remote_is_newer(remote: &str, local: Option<&str>) -> bool {
    let Ok(remote) = chrono::DateTime::parse_from_rfc3339(remote) else {
        return false;
    };
    match local.and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok()) {
        Some(local) => remote > local,
        None => true,
    }
}

/// Hand the URL to the platform's default browser.
fn open_external(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "windows")]
    std::process::Command::new("cmd")
        .args(["/C", "start", "", url])
        .spawn()?;

    #[cfg(target_os = "macos")]
    std::process::Command::new("open").arg(url).spawn()?;

    #[cfg(all(unix, not(target_os = "macos")))]
    std::process::Command::new("xdg-open").arg(url).spawn()?;

    Ok(())
}
