// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend command traits consumed by the session manager and sync coordinator.

pub mod cloud;
pub mod crypto;

pub use cloud::CloudBackend;
pub use crypto::CryptoBackend;
