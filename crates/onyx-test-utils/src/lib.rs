// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the OnyxVault workspace.
//!
//! Provides mock crypto and cloud backends for fast, CI-runnable tests with
//! no real key derivation, disk encryption, or network access.

pub mod mock_cloud;
pub mod mock_crypto;

pub use mock_cloud::MockCloudBackend;
pub use mock_crypto::{derive_key_bytes, MockCryptoBackend};
