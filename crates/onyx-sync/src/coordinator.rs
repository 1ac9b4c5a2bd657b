// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The cloud sync coordinator.
//!
//! Reconciles the local encrypted vault with the remote backup at process
//! start (before any unlock is meaningful), tracks link status, and drives
//! the single-shot OAuth code flow: each login attempt awaits exactly one
//! authorization code on a oneshot channel, with cancellation on teardown.

use std::sync::Arc;

use onyx_core::{CloudBackend, OnyxError};
use tokio::sync::{oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Result of startup reconciliation.
#[derive(Debug, Clone, Copy)]
pub struct StartupReport {
    pub linked: bool,
    /// `true` when the local encrypted vault was overwritten from the remote.
    pub vault_refreshed: bool,
}

/// One in-flight login attempt, consumed by [`SyncCoordinator::finish_login`].
pub struct LoginAttempt {
    rx: oneshot::Receiver<String>,
}

/// Orchestrates cloud reconciliation and the OAuth login flow.
///
/// Never touches tokens: the backend keeps custody, and only the boolean
/// link status surfaces here.
pub struct SyncCoordinator {
    cloud: Arc<dyn CloudBackend>,
    linked: Mutex<bool>,
    pending_login: Mutex<Option<oneshot::Sender<String>>>,
    cancel: CancellationToken,
}

impl SyncCoordinator {
    pub fn new(cloud: Arc<dyn CloudBackend>) -> Self {
        Self {
            cloud,
            linked: Mutex::new(false),
            pending_login: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    /// Query link status and, if linked, download the remote vault when it
    /// is newer than the local copy.
    ///
    /// Must complete (success or failure) before the unlock prompt becomes
    /// meaningful; unlocking against a stale local file would silently
    /// diverge from the remote copy.
    pub async fn reconcile_on_startup(&self) -> Result<StartupReport, OnyxError> {
        let linked = self.cloud.link_status().await?;
        *self.linked.lock().await = linked;

        let vault_refreshed = if linked {
            self.cloud.pull_if_newer().await?
        } else {
            false
        };

        info!(linked, vault_refreshed, "startup reconciliation complete");
        Ok(StartupReport {
            linked,
            vault_refreshed,
        })
    }

    /// Start a login attempt: opens the external consent flow and arms the
    /// single-shot channel for the callback code. Starting a new attempt
    /// supersedes any previous one.
    pub async fn begin_login(&self) -> Result<LoginAttempt, OnyxError> {
        let (tx, rx) = oneshot::channel();
        if self.pending_login.lock().await.replace(tx).is_some() {
            warn!("previous login attempt superseded");
        }
        self.cloud.begin_authorization().await?;
        Ok(LoginAttempt { rx })
    }

    /// Deliver the authorization code from the deep-link callback. Returns
    /// `false` when no attempt is waiting for it.
    pub async fn deliver_code(&self, code: String) -> bool {
        match self.pending_login.lock().await.take() {
            Some(tx) => tx.send(code).is_ok(),
            None => {
                warn!("authorization code arrived with no login attempt pending");
                false
            }
        }
    }

    /// Await the code for this attempt and hand it straight to the backend
    /// for token exchange. The code is consumed here; the resulting tokens
    /// never surface.
    pub async fn finish_login(&self, attempt: LoginAttempt) -> Result<(), OnyxError> {
        let code = tokio::select! {
            _ = self.cancel.cancelled() => {
                return Err(OnyxError::Sync("login cancelled".to_string()));
            }
            code = attempt.rx => {
                code.map_err(|_| OnyxError::Sync("login attempt superseded".to_string()))?
            }
        };

        self.cloud.exchange_code(&code).await?;
        *self.linked.lock().await = true;
        info!("cloud account linked");
        Ok(())
    }

    /// User-triggered upload of the current encrypted vault. Does not alter
    /// unlocked in-memory state.
    pub async fn sync_now(&self) -> Result<(), OnyxError> {
        self.cloud.push_current().await
    }

    pub async fn is_linked(&self) -> bool {
        *self.linked.lock().await
    }

    /// Re-probe the backend's link status without pulling.
    pub async fn refresh_link_status(&self) -> Result<bool, OnyxError> {
        let linked = self.cloud.link_status().await?;
        *self.linked.lock().await = linked;
        Ok(linked)
    }

    /// Cancel any pending login awaits; called on coordinator teardown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onyx_test_utils::MockCloudBackend;

    #[tokio::test]
    async fn reconcile_skips_pull_when_not_linked() {
        let cloud = Arc::new(MockCloudBackend::new());
        let coordinator = SyncCoordinator::new(cloud.clone());

        let report = coordinator.reconcile_on_startup().await.unwrap();
        assert!(!report.linked);
        assert!(!report.vault_refreshed);
        assert_eq!(cloud.pull_count(), 0);
    }

    #[tokio::test]
    async fn reconcile_pulls_when_linked() {
        let cloud = Arc::new(MockCloudBackend::linked());
        cloud.set_pull_overwrites(true);
        let coordinator = SyncCoordinator::new(cloud.clone());

        let report = coordinator.reconcile_on_startup().await.unwrap();
        assert!(report.linked);
        assert!(report.vault_refreshed);
        assert_eq!(cloud.pull_count(), 1);
        assert!(coordinator.is_linked().await);
    }

    #[tokio::test]
    async fn full_login_flow_exchanges_the_delivered_code() {
        let cloud = Arc::new(MockCloudBackend::new());
        let coordinator = SyncCoordinator::new(cloud.clone());

        let attempt = coordinator.begin_login().await.unwrap();
        assert_eq!(cloud.authorization_count(), 1);

        assert!(coordinator.deliver_code("auth-code-7".to_string()).await);
        coordinator.finish_login(attempt).await.unwrap();

        assert_eq!(cloud.exchanged_codes().await, vec!["auth-code-7"]);
        assert!(coordinator.is_linked().await);
    }

    #[tokio::test]
    async fn code_without_pending_attempt_is_dropped() {
        let cloud = Arc::new(MockCloudBackend::new());
        let coordinator = SyncCoordinator::new(cloud);
        assert!(!coordinator.deliver_code("stray".to_string()).await);
    }

    #[tokio::test]
    async fn new_attempt_supersedes_the_previous_one() {
        let cloud = Arc::new(MockCloudBackend::new());
        let coordinator = SyncCoordinator::new(cloud.clone());

        let first = coordinator.begin_login().await.unwrap();
        let second = coordinator.begin_login().await.unwrap();

        // The first attempt's sender was dropped; finishing it errors.
        let err = coordinator.finish_login(first).await.unwrap_err();
        assert!(matches!(err, OnyxError::Sync(_)));

        // The second attempt still completes normally.
        assert!(coordinator.deliver_code("code-2".to_string()).await);
        coordinator.finish_login(second).await.unwrap();
        assert_eq!(cloud.exchanged_codes().await, vec!["code-2"]);
    }

    #[tokio::test]
    async fn shutdown_cancels_a_pending_login() {
        let cloud = Arc::new(MockCloudBackend::new());
        let coordinator = SyncCoordinator::new(cloud.clone());

        let attempt = coordinator.begin_login().await.unwrap();
        coordinator.shutdown();

        let err = coordinator.finish_login(attempt).await.unwrap_err();
        assert!(matches!(err, OnyxError::Sync(_)));
        assert!(cloud.exchanged_codes().await.is_empty());
    }

    #[tokio::test]
    async fn failed_exchange_leaves_coordinator_unlinked() {
        let cloud = Arc::new(MockCloudBackend::new());
        cloud.fail_exchange();
        let coordinator = SyncCoordinator::new(cloud);

        let attempt = coordinator.begin_login().await.unwrap();
        coordinator.deliver_code("bad-code".to_string()).await;
        assert!(coordinator.finish_login(attempt).await.is_err());
        assert!(!coordinator.is_linked().await);
    }

    #[tokio::test]
    async fn sync_now_uploads_through_the_backend() {
        let cloud = Arc::new(MockCloudBackend::linked());
        let coordinator = SyncCoordinator::new(cloud.clone());
        coordinator.sync_now().await.unwrap();
        assert_eq!(cloud.push_count(), 1);
    }
}
