// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared data model: credential records, categories, and the session key handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use zeroize::Zeroizing;

/// Unique identifier for a credential record. Assigned at creation, immutable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    /// Generate a fresh random record id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub String);

impl CategoryId {
    /// Generate a fresh random category id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cached, coarse strength label carried on a record.
///
/// Advisory display metadata only. The analysis engine recomputes strength
/// from the secret itself and never reads this field for risk decisions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum StrengthHint {
    #[strum(serialize = "Very Strong")]
    VeryStrong,
    Strong,
    Medium,
    Weak,
}

/// A single stored credential.
///
/// The `secret` is plaintext only while the vault is unlocked; on disk it
/// exists solely inside the encrypted vault blob.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: RecordId,
    pub title: String,
    pub username: String,
    /// The plaintext password value. Absent for records that carry none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// Refreshed on every create or update; monotonically non-decreasing.
    pub last_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Weak reference: the category may have been deleted since assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength_hint: Option<StrengthHint>,
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("last_modified", &self.last_modified)
            .field("category_id", &self.category_id)
            .field("strength_hint", &self.strength_hint)
            .finish()
    }
}

/// A display grouping for records. `color` is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
}

/// Input for creating a record. The store assigns `id` and `last_modified`.
#[derive(Clone, Default)]
pub struct RecordDraft {
    pub title: String,
    pub username: String,
    pub secret: Option<String>,
    pub url: Option<String>,
    pub icon_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub strength_hint: Option<StrengthHint>,
}

impl std::fmt::Debug for RecordDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordDraft")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("category_id", &self.category_id)
            .finish()
    }
}

/// Merge-patch for updating a record.
///
/// `None` fields are left untouched. `category_id` is doubly optional:
/// `Some(None)` clears the association.
#[derive(Clone, Default)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub username: Option<String>,
    pub secret: Option<String>,
    pub url: Option<String>,
    pub icon_url: Option<String>,
    pub category_id: Option<Option<CategoryId>>,
    pub strength_hint: Option<StrengthHint>,
}

impl std::fmt::Debug for RecordPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordPatch")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("category_id", &self.category_id)
            .finish()
    }
}

/// Opaque handle to the session encryption key.
///
/// The raw bytes are zeroed on drop and never printed. Only the crypto
/// backend reads them back out via [`DerivedKey::expose`]. The handle is
/// owned by the session manager and never copied into persisted structures.
pub struct DerivedKey(Zeroizing<[u8; 32]>);

impl DerivedKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Expose the raw key bytes to a crypto primitive.
    pub fn expose(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DerivedKey").field(&"[REDACTED]").finish()
    }
}
