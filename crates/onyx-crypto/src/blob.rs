// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM sealing of the vault blob.
//!
//! A sealed blob is `nonce (12 bytes) || ciphertext || tag (16 bytes)`, one
//! opaque value on disk. Every call to [`seal`] generates a fresh random
//! 96-bit nonce via the system CSPRNG; nonce reuse would be catastrophic
//! for GCM security.
//!
//! [`open`] collapses every failure mode (truncated blob, wrong key,
//! tampered ciphertext) into [`OnyxError::WrongPassword`] so that callers
//! cannot distinguish a bad password from a corrupted vault.

use onyx_core::{DerivedKey, OnyxError};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};

/// Nonce length prefixed to every sealed blob.
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key`, returning the self-contained blob.
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> Result<Vec<u8>, OnyxError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.expose())
        .map_err(|_| OnyxError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    let less_safe = LessSafeKey::new(unbound);

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| OnyxError::Crypto("failed to generate random nonce".to_string()))?;

    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // Seal in place, then prefix the nonce so the blob is one opaque value.
    let mut in_out = plaintext.to_vec();
    less_safe
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| OnyxError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + in_out.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&in_out);
    Ok(blob)
}

/// Decrypt a blob produced by [`seal`].
///
/// Any failure is reported as [`OnyxError::WrongPassword`]; the cause is
/// deliberately not distinguished.
pub fn open(key: &DerivedKey, blob: &[u8]) -> Result<Vec<u8>, OnyxError> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(OnyxError::WrongPassword);
    }

    let unbound =
        UnboundKey::new(&AES_256_GCM, key.expose()).map_err(|_| OnyxError::WrongPassword)?;
    let less_safe = LessSafeKey::new(unbound);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&blob[..NONCE_LEN]);
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = blob[NONCE_LEN..].to_vec();
    let plaintext = less_safe
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| OnyxError::WrongPassword)?;

    Ok(plaintext.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(byte: u8) -> DerivedKey {
        DerivedKey::new([byte; 32])
    }

    #[test]
    fn seal_open_round_trip() {
        let key = test_key(0x11);
        let plaintext = br#"[{"id":"r1","title":"Netflix"}]"#;

        let blob = seal(&key, plaintext).unwrap();
        let decrypted = open(&key, &blob).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn seal_uses_fresh_nonce_per_call() {
        let key = test_key(0x22);
        let blob1 = seal(&key, b"same input").unwrap();
        let blob2 = seal(&key, b"same input").unwrap();
        assert_ne!(blob1[..NONCE_LEN], blob2[..NONCE_LEN]);
        assert_ne!(blob1, blob2);
    }

    #[test]
    fn blob_length_accounts_for_nonce_and_tag() {
        let key = test_key(0x33);
        let blob = seal(&key, b"hello").unwrap();
        assert_eq!(blob.len(), NONCE_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn open_with_wrong_key_reports_wrong_password() {
        let blob = seal(&test_key(0x44), b"secret data").unwrap();
        let err = open(&test_key(0x55), &blob).unwrap_err();
        assert!(matches!(err, OnyxError::WrongPassword));
    }

    #[test]
    fn tampered_blob_reports_wrong_password() {
        let key = test_key(0x66);
        let mut blob = seal(&key, b"do not tamper").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        let err = open(&key, &blob).unwrap_err();
        assert!(matches!(err, OnyxError::WrongPassword));
    }

    #[test]
    fn truncated_blob_reports_wrong_password() {
        let key = test_key(0x77);
        let err = open(&key, &[0u8; NONCE_LEN]).unwrap_err();
        assert!(matches!(err, OnyxError::WrongPassword));
    }
}
