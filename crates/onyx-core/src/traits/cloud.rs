// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command interface to the cloud backup provider.

use async_trait::async_trait;

use crate::error::OnyxError;

/// Cloud backup and account-link commands.
///
/// Token custody lives entirely below this boundary: implementations store
/// refresh tokens themselves and surface only a boolean link status. The
/// coordinator above never receives, stores, or inspects a token.
#[async_trait]
pub trait CloudBackend: Send + Sync {
    /// Whether a cloud account is currently linked.
    async fn link_status(&self) -> Result<bool, OnyxError>;

    /// Download the remote vault if it is newer than the local copy.
    ///
    /// Returns `true` when the local encrypted vault was overwritten in place.
    async fn pull_if_newer(&self) -> Result<bool, OnyxError>;

    /// Open the external OAuth consent flow.
    async fn begin_authorization(&self) -> Result<(), OnyxError>;

    /// Exchange an authorization code for tokens, which are stored internally.
    async fn exchange_code(&self, code: &str) -> Result<(), OnyxError>;

    /// Upload the current encrypted vault ("sync now").
    async fn push_current(&self) -> Result<(), OnyxError>;
}
