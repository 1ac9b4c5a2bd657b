// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock cloud backend for coordinator tests.
//!
//! Records every call so tests can assert ordering and counts; the link
//! status flips to `true` after a successful code exchange, mirroring the
//! real backend's keyring probe.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use onyx_core::{CloudBackend, OnyxError};
use tokio::sync::Mutex;

/// A scripted cloud backend with call recording and failure injection.
#[derive(Default)]
pub struct MockCloudBackend {
    linked: AtomicBool,
    pull_overwrites: AtomicBool,
    pull_count: AtomicUsize,
    push_count: AtomicUsize,
    authorization_count: AtomicUsize,
    exchanged_codes: Mutex<Vec<String>>,
    fail_exchange: AtomicBool,
}

impl MockCloudBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start in the linked state.
    pub fn linked() -> Self {
        let backend = Self::default();
        backend.linked.store(true, Ordering::SeqCst);
        backend
    }

    /// Make the next pull report that the local vault was overwritten.
    pub fn set_pull_overwrites(&self, overwrites: bool) {
        self.pull_overwrites.store(overwrites, Ordering::SeqCst);
    }

    /// Make `exchange_code` fail.
    pub fn fail_exchange(&self) {
        self.fail_exchange.store(true, Ordering::SeqCst);
    }

    pub fn pull_count(&self) -> usize {
        self.pull_count.load(Ordering::SeqCst)
    }

    pub fn push_count(&self) -> usize {
        self.push_count.load(Ordering::SeqCst)
    }

    pub fn authorization_count(&self) -> usize {
        self.authorization_count.load(Ordering::SeqCst)
    }

    pub async fn exchanged_codes(&self) -> Vec<String> {
        self.exchanged_codes.lock().await.clone()
    }
}

#[async_trait]
impl CloudBackend for MockCloudBackend {
    async fn link_status(&self) -> Result<bool, OnyxError> {
        Ok(self.linked.load(Ordering::SeqCst))
    }

    async fn pull_if_newer(&self) -> Result<bool, OnyxError> {
        self.pull_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.pull_overwrites.load(Ordering::SeqCst))
    }

    async fn begin_authorization(&self) -> Result<(), OnyxError> {
        self.authorization_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exchange_code(&self, code: &str) -> Result<(), OnyxError> {
        if self.fail_exchange.swap(false, Ordering::SeqCst) {
            return Err(OnyxError::Sync("mock exchange failure".to_string()));
        }
        self.exchanged_codes.lock().await.push(code.to_string());
        self.linked.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn push_current(&self) -> Result<(), OnyxError> {
        self.push_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
