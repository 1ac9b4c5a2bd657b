// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as sane Argon2id parameters and non-empty paths.

use crate::diagnostic::ConfigError;
use crate::model::OnyxConfig;

/// Recognized logging levels for `app.log_level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &OnyxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` is not one of: {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Argon2id requires memory_cost >= 8 * parallelism and at least one lane
    // and one iteration.
    if config.vault.kdf_iterations == 0 {
        errors.push(ConfigError::Validation {
            message: "vault.kdf_iterations must be at least 1".to_string(),
        });
    }
    if config.vault.kdf_parallelism == 0 {
        errors.push(ConfigError::Validation {
            message: "vault.kdf_parallelism must be at least 1".to_string(),
        });
    }
    if config.vault.kdf_memory_cost < 8 * config.vault.kdf_parallelism.max(1) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_memory_cost must be at least 8 KiB per lane, got {} for {} lanes",
                config.vault.kdf_memory_cost, config.vault.kdf_parallelism
            ),
        });
    }

    if config.sync.redirect_uri.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "sync.redirect_uri must not be empty".to_string(),
        });
    }
    for (key, value) in [
        ("sync.auth_endpoint", &config.sync.auth_endpoint),
        ("sync.token_endpoint", &config.sync.token_endpoint),
        ("sync.content_endpoint", &config.sync.content_endpoint),
    ] {
        if !value.starts_with("http://") && !value.starts_with("https://") {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be an http(s) URL, got `{value}`"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
