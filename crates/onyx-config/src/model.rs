// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the OnyxVault password vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level OnyxVault configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OnyxConfig {
    /// Application identity and logging settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Key derivation settings for the vault master password.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Local storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cloud backup and OAuth settings.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name of the application.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "onyx".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Vault key derivation configuration.
///
/// Controls Argon2id parameters used to derive the session key from the
/// master password. Defaults follow OWASP recommendations and land near the
/// intended ~0.5 s derivation cost on commodity hardware.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub kdf_memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_memory_cost: default_kdf_memory_cost(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_kdf_memory_cost() -> u32 {
    65536 // 64 MiB per OWASP recommendation
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

/// Local storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database holding the salt and encrypted vault blob.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("onyx").join("onyx.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("onyx.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Cloud backup and OAuth configuration.
///
/// The OAuth client credentials identify this installation to the backup
/// provider; the refresh token itself is held in the OS credential store,
/// never in this file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// OAuth client id. `None` disables cloud backup.
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth client secret, if the provider requires one.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Redirect URI registered for the deep-link callback.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Authorization endpoint for the consent flow.
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,

    /// Token exchange endpoint.
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,

    /// Base URL for vault backup transfers.
    #[serde(default = "default_content_endpoint")]
    pub content_endpoint: String,

    /// OAuth scope requested for the backup storage area.
    #[serde(default = "default_scope")]
    pub scope: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: default_redirect_uri(),
            auth_endpoint: default_auth_endpoint(),
            token_endpoint: default_token_endpoint(),
            content_endpoint: default_content_endpoint(),
            scope: default_scope(),
        }
    }
}

fn default_redirect_uri() -> String {
    "onyxvault://callback".to_string()
}

fn default_auth_endpoint() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_endpoint() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_content_endpoint() -> String {
    "https://www.googleapis.com/drive/v3/onyx".to_string()
}

fn default_scope() -> String {
    "https://www.googleapis.com/auth/drive.appdata".to_string()
}
