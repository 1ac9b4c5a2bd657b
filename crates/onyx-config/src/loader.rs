// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./onyx.toml` > `~/.config/onyx/onyx.toml` >
//! `/etc/onyx/onyx.toml` with environment variable overrides via the
//! `ONYX_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::OnyxConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/onyx/onyx.toml` (system-wide)
/// 3. `~/.config/onyx/onyx.toml` (user XDG config)
/// 4. `./onyx.toml` (local directory)
/// 5. `ONYX_*` environment variables
pub fn load_config() -> Result<OnyxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OnyxConfig::default()))
        .merge(Toml::file("/etc/onyx/onyx.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("onyx/onyx.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("onyx.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<OnyxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OnyxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<OnyxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OnyxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `ONYX_VAULT_KDF_MEMORY_COST` must map to
/// `vault.kdf_memory_cost`, not `vault.kdf.memory.cost`.
fn env_provider() -> Env {
    Env::prefixed("ONYX_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        // Example: ONYX_VAULT_KDF_ITERATIONS -> "vault_kdf_iterations"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("vault_", "vault.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("sync_", "sync.", 1);
        mapped.into()
    })
}
