// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of the backend, session, and coordinator from configuration.

use std::sync::Arc;

use onyx_config::OnyxConfig;
use onyx_core::{CloudBackend, CryptoBackend, OnyxError};
use onyx_crypto::LocalCryptoBackend;
use onyx_storage::Database;
use onyx_sync::{DriveCloudBackend, KeyringTokenStore, SyncCoordinator};
use onyx_vault::VaultSession;

/// The assembled application: one session, one coordinator, one database.
pub struct AppStack {
    pub session: Arc<VaultSession>,
    pub coordinator: Arc<SyncCoordinator>,
}

impl AppStack {
    /// Open the database and wire the crypto and cloud backends behind the
    /// session manager and sync coordinator.
    pub async fn build(config: &OnyxConfig) -> Result<Self, OnyxError> {
        let db = Database::open_from_config(&config.storage).await?;

        let crypto: Arc<dyn CryptoBackend> =
            Arc::new(LocalCryptoBackend::new(db.clone(), &config.vault));
        let cloud: Arc<dyn CloudBackend> = Arc::new(DriveCloudBackend::new(
            config.sync.clone(),
            db,
            Box::new(KeyringTokenStore::new()),
        )?);

        Ok(Self {
            session: Arc::new(VaultSession::new(crypto)),
            coordinator: Arc::new(SyncCoordinator::new(cloud)),
        })
    }
}
