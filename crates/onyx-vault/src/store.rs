// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The in-memory credential store: the authoritative, order-preserving
//! collection of records and categories.
//!
//! All mutations flow through here; the session manager wraps every record
//! mutation with a re-encrypting persist. Record order is most-recent-first
//! by insertion ("Recently Added" relies on insertion order, not timestamp
//! sorting).

use chrono::{DateTime, Utc};
use onyx_core::{
    Category, CategoryId, CredentialRecord, OnyxError, RecordDraft, RecordId, RecordPatch,
};

/// Default categories seeded into a fresh store.
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Important", "#a855f7"),
    ("Social Media", "#f97316"),
    ("Streaming", "#22c55e"),
    ("Work Tools", "#eab308"),
];

/// Order-preserving collection of credential records and categories.
///
/// Categories are session-local display groupings: they are never written
/// into the encrypted blob, and deleting one leaves referencing records with
/// a dangling `category_id` rather than cascading.
#[derive(Debug)]
pub struct CredentialStore {
    records: Vec<CredentialRecord>,
    categories: Vec<Category>,
    selected: Option<RecordId>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, color)| Category {
                    id: CategoryId::generate(),
                    name: (*name).to_string(),
                    color: (*color).to_string(),
                })
                .collect(),
            selected: None,
        }
    }

    /// Insert a new record at the front and return its fresh id.
    pub fn add_record(&mut self, draft: RecordDraft, now: DateTime<Utc>) -> RecordId {
        let id = RecordId::generate();
        let record = CredentialRecord {
            id: id.clone(),
            title: draft.title,
            username: draft.username,
            secret: draft.secret,
            last_modified: now,
            url: draft.url,
            icon_url: draft.icon_url,
            category_id: draft.category_id,
            strength_hint: draft.strength_hint,
        };
        self.records.insert(0, record);
        id
    }

    /// Merge `patch` into the record with `id`, refreshing `last_modified`.
    ///
    /// `last_modified` never moves backwards, even against a skewed clock.
    pub fn update_record(
        &mut self,
        id: &RecordId,
        patch: RecordPatch,
        now: DateTime<Utc>,
    ) -> Result<(), OnyxError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| OnyxError::NotFound { id: id.0.clone() })?;

        if let Some(title) = patch.title {
            record.title = title;
        }
        if let Some(username) = patch.username {
            record.username = username;
        }
        if let Some(secret) = patch.secret {
            record.secret = Some(secret);
        }
        if let Some(url) = patch.url {
            record.url = Some(url);
        }
        if let Some(icon_url) = patch.icon_url {
            record.icon_url = Some(icon_url);
        }
        if let Some(category_id) = patch.category_id {
            record.category_id = category_id;
        }
        if let Some(strength_hint) = patch.strength_hint {
            record.strength_hint = Some(strength_hint);
        }
        record.last_modified = record.last_modified.max(now);
        Ok(())
    }

    /// Delete a record; clears the selection if it pointed at the record.
    pub fn remove_record(&mut self, id: &RecordId) -> Result<(), OnyxError> {
        let index = self
            .records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| OnyxError::NotFound { id: id.0.clone() })?;
        self.records.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Ok(())
    }

    /// Append a new category and return its id.
    pub fn add_category(&mut self, name: String, color: String) -> CategoryId {
        let id = CategoryId::generate();
        self.categories.push(Category {
            id: id.clone(),
            name,
            color,
        });
        id
    }

    /// Remove a category. Records referencing it keep their (now dangling)
    /// `category_id`; absent ids are ignored.
    pub fn remove_category(&mut self, id: &CategoryId) {
        self.categories.retain(|c| &c.id != id);
    }

    pub fn select(&mut self, id: Option<RecordId>) {
        self.selected = id;
    }

    pub fn selected(&self) -> Option<&RecordId> {
        self.selected.as_ref()
    }

    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    pub fn get(&self, id: &RecordId) -> Option<&CredentialRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Case-insensitive filter over title and username, preserving order.
    pub fn search(&self, query: &str) -> Vec<&CredentialRecord> {
        let needle = query.to_lowercase();
        self.records
            .iter()
            .filter(|r| {
                r.title.to_lowercase().contains(&needle)
                    || r.username.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Replace the record set wholesale (vault decryption on unlock).
    pub fn replace_records(&mut self, records: Vec<CredentialRecord>) {
        self.records = records;
        self.selected = None;
    }

    /// Drop all decrypted records (vault lock). Categories carry no secrets
    /// and survive.
    pub fn clear(&mut self) {
        self.records.clear();
        self.selected = None;
    }

    /// Serialize the record set to the vault blob plaintext (a JSON array).
    pub fn serialize_records(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.records)
    }

    /// Parse a vault blob plaintext back into records.
    pub fn parse_records(plaintext: &str) -> Result<Vec<CredentialRecord>, serde_json::Error> {
        serde_json::from_str(plaintext)
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft(title: &str, secret: Option<&str>) -> RecordDraft {
        RecordDraft {
            title: title.to_string(),
            username: "user@example.com".to_string(),
            secret: secret.map(String::from),
            ..RecordDraft::default()
        }
    }

    #[test]
    fn new_store_seeds_default_categories() {
        let store = CredentialStore::new();
        let names: Vec<&str> = store.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Important", "Social Media", "Streaming", "Work Tools"]
        );
    }

    #[test]
    fn records_are_most_recent_first() {
        let mut store = CredentialStore::new();
        let now = Utc::now();
        store.add_record(draft("A", None), now);
        store.add_record(draft("B", None), now);

        let titles: Vec<&str> = store.records().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn update_merges_patch_and_leaves_other_fields() {
        let mut store = CredentialStore::new();
        let now = Utc::now();
        let id = store.add_record(draft("GitHub", Some("old-secret")), now);

        store
            .update_record(
                &id,
                RecordPatch {
                    title: Some("GitHub Work".to_string()),
                    ..RecordPatch::default()
                },
                now + Duration::seconds(5),
            )
            .unwrap();

        let record = store.get(&id).unwrap();
        assert_eq!(record.title, "GitHub Work");
        assert_eq!(record.username, "user@example.com");
        assert_eq!(record.secret.as_deref(), Some("old-secret"));
        assert_eq!(record.last_modified, now + Duration::seconds(5));
    }

    #[test]
    fn last_modified_never_moves_backwards() {
        let mut store = CredentialStore::new();
        let now = Utc::now();
        let id = store.add_record(draft("X", None), now);

        store
            .update_record(&id, RecordPatch::default(), now - Duration::hours(1))
            .unwrap();

        assert_eq!(store.get(&id).unwrap().last_modified, now);
    }

    #[test]
    fn update_missing_record_reports_not_found() {
        let mut store = CredentialStore::new();
        let err = store
            .update_record(
                &RecordId("missing".to_string()),
                RecordPatch::default(),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, OnyxError::NotFound { .. }));
    }

    #[test]
    fn remove_clears_selection_of_removed_record() {
        let mut store = CredentialStore::new();
        let now = Utc::now();
        let id_a = store.add_record(draft("A", None), now);
        let id_b = store.add_record(draft("B", None), now);

        store.select(Some(id_a.clone()));
        store.remove_record(&id_b).unwrap();
        assert_eq!(store.selected(), Some(&id_a));

        store.remove_record(&id_a).unwrap();
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn category_removal_leaves_dangling_references() {
        let mut store = CredentialStore::new();
        let now = Utc::now();
        let cat = store.add_category("Games".to_string(), "#ff0000".to_string());
        let id = store.add_record(
            RecordDraft {
                category_id: Some(cat.clone()),
                ..draft("Steam", None)
            },
            now,
        );

        store.remove_category(&cat);
        // Record keeps its reference; the category is simply gone.
        assert_eq!(store.get(&id).unwrap().category_id, Some(cat.clone()));
        assert!(!store.categories().iter().any(|c| c.id == cat));
    }

    #[test]
    fn search_matches_title_and_username_case_insensitive() {
        let mut store = CredentialStore::new();
        let now = Utc::now();
        store.add_record(draft("Netflix", None), now);
        store.add_record(
            RecordDraft {
                username: "netops@example.com".to_string(),
                ..draft("Router", None)
            },
            now,
        );
        store.add_record(draft("Bank", None), now);

        let hits = store.search("NET");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn serialize_parse_round_trips_records() {
        let mut store = CredentialStore::new();
        let now = Utc::now();
        store.add_record(draft("A", Some("s3cret!Pw")), now);
        store.add_record(draft("B", None), now);

        let json = store.serialize_records().unwrap();
        let parsed = CredentialStore::parse_records(&json).unwrap();
        assert_eq!(parsed, store.records());
    }

    #[test]
    fn clear_drops_records_but_keeps_categories() {
        let mut store = CredentialStore::new();
        store.add_record(draft("A", None), Utc::now());
        store.clear();
        assert!(store.records().is_empty());
        assert_eq!(store.categories().len(), 4);
    }
}
