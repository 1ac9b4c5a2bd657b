// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault session lifecycle and credential store for OnyxVault.
//!
//! [`VaultSession`] owns the derived encryption key and the in-memory
//! [`CredentialStore`]; every record mutation re-encrypts and persists the
//! vault blob through the crypto backend before the next mutation may begin.

pub mod session;
pub mod store;

pub use session::{SessionState, VaultSession};
pub use store::CredentialStore;
