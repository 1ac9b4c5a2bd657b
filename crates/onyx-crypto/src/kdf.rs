// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from the master password.
//!
//! Derives a 32-byte session key using Argon2id (Algorithm::Argon2id,
//! Version::V0x13). The cost parameters come from [`KdfParams`] and are
//! deliberately heavy (~0.5 s on commodity hardware) to throttle brute
//! force against the vault.

use onyx_config::model::VaultConfig;
use onyx_core::OnyxError;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Length of a freshly generated KDF salt.
pub const SALT_LEN: usize = 16;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy)]
pub struct KdfParams {
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl From<&VaultConfig> for KdfParams {
    fn from(config: &VaultConfig) -> Self {
        Self {
            memory_cost: config.kdf_memory_cost,
            iterations: config.kdf_iterations,
            parallelism: config.kdf_parallelism,
        }
    }
}

/// Derive a 32-byte key from the master password and a salt.
///
/// Deterministic for the same (password, salt, params) triple. The returned
/// key is wrapped in [`Zeroizing`] for automatic memory zeroing on drop.
pub fn derive(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; 32]>, OnyxError> {
    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| OnyxError::Crypto(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon_params,
    );

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password, salt, output.as_mut())
        .map_err(|e| OnyxError::Crypto(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random salt for Argon2id.
pub fn generate_salt() -> Result<[u8; SALT_LEN], OnyxError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| OnyxError::Crypto("failed to generate random salt".to_string()))?;
    Ok(salt)
}
