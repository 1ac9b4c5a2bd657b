// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the OnyxVault password vault.
//!
//! This crate provides the error taxonomy, the credential data model, and
//! the backend command traits used throughout the workspace. The crypto and
//! cloud backends implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::OnyxError;
pub use traits::{CloudBackend, CryptoBackend};
pub use types::{
    Category, CategoryId, CredentialRecord, DerivedKey, RecordDraft, RecordId, RecordPatch,
    StrengthHint,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onyx_error_has_all_variants() {
        // Verify every error variant exists and can be constructed.
        let _config = OnyxError::Config("test".into());
        let _wrong = OnyxError::WrongPassword;
        let _backend = OnyxError::BackendUnavailable {
            message: "test".into(),
            source: None,
        };
        let _persist = OnyxError::PersistFailure {
            message: "test".into(),
            source: None,
        };
        let _not_found = OnyxError::NotFound { id: "r1".into() };
        let _storage = OnyxError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _crypto = OnyxError::Crypto("test".into());
        let _sync = OnyxError::Sync("test".into());
        let _locked = OnyxError::Locked;
        let _internal = OnyxError::Internal("test".into());
    }

    #[test]
    fn wrong_password_message_is_generic() {
        // The unlock failure message must not reveal whether the password was
        // wrong or the vault was corrupted.
        let message = OnyxError::WrongPassword.to_string();
        assert_eq!(message, "invalid master password or corrupted vault");
        assert!(!message.contains("decrypt"));
        assert!(!message.contains("tamper"));
    }

    #[test]
    fn backend_traits_are_object_safe() {
        // Both traits must be usable behind Arc<dyn ...>.
        fn _assert_crypto(_: &dyn CryptoBackend) {}
        fn _assert_cloud(_: &dyn CloudBackend) {}
    }
}
