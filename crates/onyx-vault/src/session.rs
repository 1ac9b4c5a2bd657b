// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault session lifecycle: unlock, lock, and the re-encrypt-after-every-
//! mutation persist policy.
//!
//! The session owns the derived key and the credential store behind one
//! async mutex. Holding the mutex across the persist await is what
//! serializes mutations: each mutation's persist completes (or fails)
//! before the next begins, so writes to the last-writer-wins blob never
//! interleave. No partially-unlocked state is observable from outside.

use std::sync::Arc;

use chrono::Utc;
use onyx_core::{
    Category, CategoryId, CredentialRecord, CryptoBackend, DerivedKey, OnyxError, RecordDraft,
    RecordId, RecordPatch,
};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::store::CredentialStore;

/// Observable session states. `Unlocking` exists only while an unlock call
/// is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked,
    Unlocking,
    Unlocked,
}

struct Inner {
    state: SessionState,
    /// Exists if and only if `state == Unlocked`.
    key: Option<DerivedKey>,
    cloud_linked: bool,
    store: CredentialStore,
}

/// The vault session: sole owner of the derived key and the credential store.
pub struct VaultSession {
    backend: Arc<dyn CryptoBackend>,
    inner: tokio::sync::Mutex<Inner>,
}

impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession").finish_non_exhaustive()
    }
}

impl VaultSession {
    pub fn new(backend: Arc<dyn CryptoBackend>) -> Self {
        Self {
            backend,
            inner: tokio::sync::Mutex::new(Inner {
                state: SessionState::Locked,
                key: None,
                cloud_linked: false,
                store: CredentialStore::new(),
            }),
        }
    }

    /// Unlock the vault with the master password, or create it on first run.
    ///
    /// An absent salt signals first run: the password is bound as the
    /// permanent master password by persisting an empty encrypted vault
    /// under a fresh salt. Otherwise the persisted blob is decrypted and
    /// replaces the store contents. A decryption failure leaves the session
    /// locked and the store untouched, reported as the generic
    /// [`OnyxError::WrongPassword`].
    ///
    /// The plaintext password is consumed by value and dropped when this
    /// call returns; it is never retained in any state structure or log.
    pub async fn unlock(&self, password: SecretString) -> Result<(), OnyxError> {
        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Unlocked {
            return Ok(());
        }
        inner.state = SessionState::Unlocking;

        match Self::run_unlock(self.backend.as_ref(), &mut inner, &password).await {
            Ok(()) => {
                inner.state = SessionState::Unlocked;
                info!(records = inner.store.records().len(), "vault unlocked");
                Ok(())
            }
            Err(e) => {
                inner.key = None;
                inner.state = SessionState::Locked;
                Err(e)
            }
        }
    }

    async fn run_unlock(
        backend: &dyn CryptoBackend,
        inner: &mut Inner,
        password: &SecretString,
    ) -> Result<(), OnyxError> {
        let existing_salt = backend.vault_salt().await?;
        let (key, salt) = backend.derive_key(password, existing_salt.as_deref()).await?;

        if existing_salt.is_some() {
            let plaintext = backend.load_vault(&key).await?;
            // A blob that decrypts but does not parse is a corrupted vault;
            // same opaque signal as a wrong password.
            let records = CredentialStore::parse_records(&plaintext)
                .map_err(|_| OnyxError::WrongPassword)?;
            inner.store.replace_records(records);
        } else {
            backend.save_vault(&key, &salt, "[]").await?;
            info!("new encrypted vault created");
        }

        inner.key = Some(key);
        Ok(())
    }

    /// Discard the derived key and all decrypted records. Callable at any
    /// time and idempotent.
    pub async fn lock(&self) {
        let mut inner = self.inner.lock().await;
        let was_unlocked = inner.state == SessionState::Unlocked;
        inner.key = None;
        inner.store.clear();
        inner.state = SessionState::Locked;
        if was_unlocked {
            info!("vault locked");
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    /// Whether a vault has been initialized (a salt exists on disk),
    /// regardless of lock state.
    pub async fn vault_exists(&self) -> Result<bool, OnyxError> {
        Ok(self.backend.vault_salt().await?.is_some())
    }

    pub async fn is_unlocked(&self) -> bool {
        self.inner.lock().await.state == SessionState::Unlocked
    }

    /// Create a record. Persists before returning; on persist failure the
    /// record remains in the store and [`OnyxError::PersistFailure`] is
    /// surfaced ([`persist_now`](Self::persist_now) is the retry path).
    pub async fn add_record(&self, draft: RecordDraft) -> Result<RecordId, OnyxError> {
        let mut inner = self.inner.lock().await;
        Self::require_unlocked(&inner)?;
        let id = inner.store.add_record(draft, Utc::now());
        debug!(record = %id, "record added");
        Self::persist(self.backend.as_ref(), &inner).await?;
        Ok(id)
    }

    /// Merge a patch into an existing record. `NotFound` short-circuits
    /// without touching storage.
    pub async fn update_record(&self, id: &RecordId, patch: RecordPatch) -> Result<(), OnyxError> {
        let mut inner = self.inner.lock().await;
        Self::require_unlocked(&inner)?;
        inner.store.update_record(id, patch, Utc::now())?;
        debug!(record = %id, "record updated");
        Self::persist(self.backend.as_ref(), &inner).await
    }

    /// Delete a record.
    pub async fn remove_record(&self, id: &RecordId) -> Result<(), OnyxError> {
        let mut inner = self.inner.lock().await;
        Self::require_unlocked(&inner)?;
        inner.store.remove_record(id)?;
        debug!(record = %id, "record removed");
        Self::persist(self.backend.as_ref(), &inner).await
    }

    /// Add a category. Categories are session-local display metadata and do
    /// not trigger a persist.
    pub async fn add_category(&self, name: String, color: String) -> Result<CategoryId, OnyxError> {
        let mut inner = self.inner.lock().await;
        Self::require_unlocked(&inner)?;
        Ok(inner.store.add_category(name, color))
    }

    /// Remove a category; referencing records keep their dangling ids.
    pub async fn remove_category(&self, id: &CategoryId) -> Result<(), OnyxError> {
        let mut inner = self.inner.lock().await;
        Self::require_unlocked(&inner)?;
        inner.store.remove_category(id);
        Ok(())
    }

    pub async fn select(&self, id: Option<RecordId>) {
        self.inner.lock().await.store.select(id);
    }

    pub async fn selected(&self) -> Option<RecordId> {
        self.inner.lock().await.store.selected().cloned()
    }

    /// A cloned snapshot of the current record set, for display and for the
    /// analysis engine (which never mutates).
    pub async fn records(&self) -> Vec<CredentialRecord> {
        self.inner.lock().await.store.records().to_vec()
    }

    pub async fn get_record(&self, id: &RecordId) -> Option<CredentialRecord> {
        self.inner.lock().await.store.get(id).cloned()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.inner.lock().await.store.categories().to_vec()
    }

    pub async fn search(&self, query: &str) -> Vec<CredentialRecord> {
        self.inner
            .lock()
            .await
            .store
            .search(query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Link status is independent of the lock state.
    pub async fn set_cloud_linked(&self, linked: bool) {
        self.inner.lock().await.cloud_linked = linked;
    }

    pub async fn cloud_linked(&self) -> bool {
        self.inner.lock().await.cloud_linked
    }

    /// Explicit re-persist of the current store ("sync now" / retry after a
    /// persist failure). No-op while locked: there is nothing to persist
    /// safely.
    pub async fn persist_now(&self) -> Result<(), OnyxError> {
        let inner = self.inner.lock().await;
        Self::persist(self.backend.as_ref(), &inner).await
    }

    fn require_unlocked(inner: &Inner) -> Result<(), OnyxError> {
        if inner.state == SessionState::Unlocked {
            Ok(())
        } else {
            Err(OnyxError::Locked)
        }
    }

    /// Re-encrypt and save the current record set under the active session
    /// key and the current salt. Failures keep the in-memory mutation and
    /// surface as [`OnyxError::PersistFailure`].
    async fn persist(backend: &dyn CryptoBackend, inner: &Inner) -> Result<(), OnyxError> {
        if inner.state != SessionState::Unlocked {
            return Ok(());
        }
        let key = inner
            .key
            .as_ref()
            .ok_or_else(|| OnyxError::Internal("session key missing while unlocked".to_string()))?;

        let plaintext = inner
            .store
            .serialize_records()
            .map_err(|e| OnyxError::Internal(format!("record serialization failed: {e}")))?;

        let result = async {
            let salt = backend
                .vault_salt()
                .await?
                .ok_or_else(|| OnyxError::Internal("vault salt missing".to_string()))?;
            backend.save_vault(key, &salt, &plaintext).await
        }
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "vault persist failed; in-memory state retained");
                Err(OnyxError::PersistFailure {
                    message: e.to_string(),
                    source: Some(Box::new(e)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onyx_test_utils::MockCryptoBackend;

    fn password(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn draft(title: &str, secret: Option<&str>) -> RecordDraft {
        RecordDraft {
            title: title.to_string(),
            username: "user@example.com".to_string(),
            secret: secret.map(String::from),
            ..RecordDraft::default()
        }
    }

    async fn unlocked_session() -> (VaultSession, Arc<MockCryptoBackend>) {
        let backend = Arc::new(MockCryptoBackend::new());
        let session = VaultSession::new(backend.clone());
        session.unlock(password("master")).await.unwrap();
        (session, backend)
    }

    #[tokio::test]
    async fn first_run_unlock_creates_empty_vault() {
        let backend = Arc::new(MockCryptoBackend::new());
        let session = VaultSession::new(backend.clone());

        session.unlock(password("master")).await.unwrap();

        assert_eq!(session.state().await, SessionState::Unlocked);
        assert_eq!(backend.save_count(), 1);
        assert_eq!(backend.saved_plaintext().await.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn unlock_existing_vault_replaces_store_contents() {
        let json = r#"[{"id":"r1","title":"Netflix","username":"u","last_modified":"2026-01-01T00:00:00Z"}]"#;
        let backend = Arc::new(MockCryptoBackend::with_existing_vault("master", json).await);
        let session = VaultSession::new(backend);

        session.unlock(password("master")).await.unwrap();

        let records = session.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Netflix");
    }

    #[tokio::test]
    async fn wrong_password_leaves_session_locked_and_store_empty() {
        let json = r#"[{"id":"r1","title":"Netflix","username":"u","last_modified":"2026-01-01T00:00:00Z"}]"#;
        let backend = Arc::new(MockCryptoBackend::with_existing_vault("master", json).await);
        let session = VaultSession::new(backend);

        let err = session.unlock(password("wrong")).await.unwrap_err();
        assert!(matches!(err, OnyxError::WrongPassword));
        assert_eq!(session.state().await, SessionState::Locked);
        assert!(session.records().await.is_empty());
    }

    #[tokio::test]
    async fn corrupted_blob_reports_wrong_password() {
        let backend =
            Arc::new(MockCryptoBackend::with_existing_vault("master", "not valid json").await);
        let session = VaultSession::new(backend);

        let err = session.unlock(password("master")).await.unwrap_err();
        assert!(matches!(err, OnyxError::WrongPassword));
        assert_eq!(session.state().await, SessionState::Locked);
    }

    #[tokio::test]
    async fn unlock_with_backend_unavailable_stays_locked() {
        let backend = Arc::new(MockCryptoBackend::new());
        backend.set_unavailable(true);
        let session = VaultSession::new(backend);

        let err = session.unlock(password("master")).await.unwrap_err();
        assert!(matches!(err, OnyxError::BackendUnavailable { .. }));
        assert_eq!(session.state().await, SessionState::Locked);
    }

    #[tokio::test]
    async fn lock_twice_is_idempotent() {
        let (session, _backend) = unlocked_session().await;
        session.lock().await;
        session.lock().await;
        assert_eq!(session.state().await, SessionState::Locked);
        assert!(session.records().await.is_empty());
    }

    #[tokio::test]
    async fn unlock_while_unlocked_is_a_noop() {
        let (session, backend) = unlocked_session().await;
        session.unlock(password("master")).await.unwrap();
        assert_eq!(backend.save_count(), 1);
    }

    #[tokio::test]
    async fn every_record_mutation_triggers_a_persist() {
        let (session, backend) = unlocked_session().await;
        assert_eq!(backend.save_count(), 1); // vault creation

        let id = session.add_record(draft("A", Some("pw"))).await.unwrap();
        assert_eq!(backend.save_count(), 2);

        session
            .update_record(
                &id,
                RecordPatch {
                    title: Some("A2".to_string()),
                    ..RecordPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(backend.save_count(), 3);

        session.remove_record(&id).await.unwrap();
        assert_eq!(backend.save_count(), 4);
    }

    #[tokio::test]
    async fn persisted_plaintext_tracks_latest_state() {
        let (session, backend) = unlocked_session().await;
        session.add_record(draft("GitHub", Some("pw"))).await.unwrap();

        let plaintext = backend.saved_plaintext().await.unwrap();
        assert!(plaintext.contains("GitHub"));
    }

    #[tokio::test]
    async fn category_mutations_do_not_persist() {
        let (session, backend) = unlocked_session().await;
        let cat = session
            .add_category("Games".to_string(), "#ff0000".to_string())
            .await
            .unwrap();
        session.remove_category(&cat).await.unwrap();
        assert_eq!(backend.save_count(), 1); // only the vault creation
    }

    #[tokio::test]
    async fn mutations_while_locked_are_rejected() {
        let backend = Arc::new(MockCryptoBackend::new());
        let session = VaultSession::new(backend);
        let err = session.add_record(draft("A", None)).await.unwrap_err();
        assert!(matches!(err, OnyxError::Locked));
    }

    #[tokio::test]
    async fn update_missing_record_reports_not_found_without_persisting() {
        let (session, backend) = unlocked_session().await;
        let err = session
            .update_record(&RecordId("missing".to_string()), RecordPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OnyxError::NotFound { .. }));
        assert_eq!(backend.save_count(), 1);
    }

    #[tokio::test]
    async fn persist_failure_keeps_mutation_and_retry_succeeds() {
        let (session, backend) = unlocked_session().await;

        backend.fail_next_save();
        let err = session.add_record(draft("Kept", Some("pw"))).await.unwrap_err();
        assert!(matches!(err, OnyxError::PersistFailure { .. }));

        // The mutation survived in memory.
        let records = session.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Kept");

        // Explicit retry is the recovery path.
        session.persist_now().await.unwrap();
        assert!(backend.saved_plaintext().await.unwrap().contains("Kept"));
    }

    #[tokio::test]
    async fn persist_now_is_a_noop_while_locked() {
        let backend = Arc::new(MockCryptoBackend::new());
        let session = VaultSession::new(backend.clone());
        session.persist_now().await.unwrap();
        assert_eq!(backend.save_count(), 0);
    }

    #[tokio::test]
    async fn ordering_is_most_recent_first_through_the_session() {
        let (session, _backend) = unlocked_session().await;
        session.add_record(draft("A", None)).await.unwrap();
        session.add_record(draft("B", None)).await.unwrap();

        let titles: Vec<String> = session
            .records()
            .await
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn concurrent_mutations_serialize_their_persists() {
        let (session, backend) = unlocked_session().await;
        let session = Arc::new(session);

        let mut handles = Vec::new();
        for i in 0..8 {
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                session.add_record(draft(&format!("R{i}"), None)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // One persist per mutation, plus the vault creation; the mutex
        // guarantees they never interleaved.
        assert_eq!(session.records().await.len(), 8);
        assert_eq!(backend.save_count(), 9);
    }

    #[tokio::test]
    async fn cloud_linked_is_independent_of_lock_state() {
        let backend = Arc::new(MockCryptoBackend::new());
        let session = VaultSession::new(backend);
        session.set_cloud_linked(true).await;
        assert!(session.cloud_linked().await);
        session.lock().await;
        assert!(session.cloud_linked().await);
    }

    #[tokio::test]
    async fn relock_then_unlock_restores_persisted_records() {
        let (session, _backend) = unlocked_session().await;
        session.add_record(draft("Durable", Some("pw"))).await.unwrap();

        session.lock().await;
        assert!(session.records().await.is_empty());

        session.unlock(password("master")).await.unwrap();
        let records = session.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Durable");
    }
}
