// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud backup for OnyxVault.
//!
//! [`SyncCoordinator`] reconciles the local encrypted vault with the remote
//! backup at startup and drives the single-shot OAuth login flow;
//! [`DriveCloudBackend`] implements the provider side over reqwest with
//! refresh-token custody in the OS credential store.

pub mod coordinator;
pub mod drive;
pub mod token;

pub use coordinator::{LoginAttempt, StartupReport, SyncCoordinator};
pub use drive::DriveCloudBackend;
pub use token::{KeyringTokenStore, MemoryTokenStore, TokenStore};
