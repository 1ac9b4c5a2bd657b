// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic risk classification over a credential snapshot.
//!
//! [`analyze`] is a pure function of `(records, now)`: no hidden state, no
//! caching, safe to re-run on every store change. It recomputes strength
//! from each secret directly and ignores any cached `strength_hint` on the
//! record.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use onyx_core::{CredentialRecord, RecordId};
use serde::Serialize;

/// A record is stale once its last modification is strictly older than this.
pub const STALE_AFTER_DAYS: i64 = 365;

/// Penalty weights for the health score, per flagged record.
const WEAK_PENALTY: i64 = 10;
const REUSED_PENALTY: i64 = 5;
const OLD_PENALTY: i64 = 2;

/// Per-record risk verdict, assigned by fixed precedence weak > reused > old.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskVerdict {
    None,
    Weak,
    Reused,
    Old,
}

impl std::fmt::Display for RiskVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskVerdict::None => write!(f, "none"),
            RiskVerdict::Weak => write!(f, "weak"),
            RiskVerdict::Reused => write!(f, "reused"),
            RiskVerdict::Old => write!(f, "old"),
        }
    }
}

/// One record's classification within a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct RecordRisk {
    pub id: RecordId,
    pub title: String,
    pub username: String,
    pub verdict: RiskVerdict,
    /// Whole years since last modification, floor-divided for display.
    pub age_years: u32,
}

/// The derived security snapshot. Recomputed on demand, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SecuritySnapshot {
    /// Per-record verdicts, in the store's record order.
    pub risks: Vec<RecordRisk>,
    /// Records failing the weak test.
    pub weak_count: usize,
    /// Total membership across all reuse groups of size >= 2 (accounts, not
    /// distinct passwords).
    pub reused_account_count: usize,
    /// Records strictly older than [`STALE_AFTER_DAYS`].
    pub old_count: usize,
    /// `max(0, 100 - (weak*10 + reused_accounts*5 + old*2))`.
    pub health_score: u8,
}

impl SecuritySnapshot {
    /// Records carrying any verdict other than `None`, in store order.
    pub fn at_risk(&self) -> impl Iterator<Item = &RecordRisk> {
        self.risks.iter().filter(|r| r.verdict != RiskVerdict::None)
    }
}

/// Classify every record and compute the aggregate health score.
pub fn analyze(records: &[CredentialRecord], now: DateTime<Utc>) -> SecuritySnapshot {
    let stale_after = Duration::days(STALE_AFTER_DAYS);
    let one_year_ms = stale_after.num_milliseconds();

    // Group non-empty secrets by exact value; any value shared by >= 2
    // records marks every member as reused.
    let mut secret_uses: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if let Some(secret) = record.secret.as_deref()
            && !secret.is_empty()
        {
            *secret_uses.entry(secret).or_insert(0) += 1;
        }
    }

    let mut risks = Vec::with_capacity(records.len());
    let mut weak_count = 0;
    let mut reused_account_count = 0;
    let mut old_count = 0;

    for record in records {
        let weak = is_weak_secret(record.secret.as_deref());

        let reused = record
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .is_some_and(|s| secret_uses.get(s).copied().unwrap_or(0) >= 2);

        let age = now - record.last_modified;
        let old = age > stale_after;
        let age_years = (age.num_milliseconds().max(0) / one_year_ms) as u32;

        if weak {
            weak_count += 1;
        }
        if reused {
            reused_account_count += 1;
        }
        if old {
            old_count += 1;
        }

        // Exactly one verdict per record, by precedence.
        let verdict = if weak {
            RiskVerdict::Weak
        } else if reused {
            RiskVerdict::Reused
        } else if old {
            RiskVerdict::Old
        } else {
            RiskVerdict::None
        };

        risks.push(RecordRisk {
            id: record.id.clone(),
            title: record.title.clone(),
            username: record.username.clone(),
            verdict,
            age_years,
        });
    }

    let penalty = weak_count as i64 * WEAK_PENALTY
        + reused_account_count as i64 * REUSED_PENALTY
        + old_count as i64 * OLD_PENALTY;
    let health_score = (100 - penalty).max(0) as u8;

    SecuritySnapshot {
        risks,
        weak_count,
        reused_account_count,
        old_count,
        health_score,
    }
}

/// Weak test: too short, or missing any of {lowercase, uppercase, digit,
/// symbol}. A missing secret cannot be evaluated and defaults to weak.
fn is_weak_secret(secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        return true;
    };
    if secret.chars().count() < 8 {
        return true;
    }
    let has_lower = secret.chars().any(|c| c.is_lowercase());
    let has_upper = secret.chars().any(|c| c.is_uppercase());
    let has_digit = secret.chars().any(|c| c.is_ascii_digit());
    let has_symbol = secret.chars().any(|c| !c.is_alphanumeric());
    !(has_lower && has_upper && has_digit && has_symbol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use onyx_core::StrengthHint;

    const STRONG_UNIQUE: &str = "Unique#Pass9";

    fn record(title: &str, secret: Option<&str>, modified: DateTime<Utc>) -> CredentialRecord {
        CredentialRecord {
            id: RecordId::generate(),
            title: title.to_string(),
            username: "user@example.com".to_string(),
            secret: secret.map(String::from),
            last_modified: modified,
            url: None,
            icon_url: None,
            category_id: None,
            strength_hint: None,
        }
    }

    #[test]
    fn short_secret_is_weak() {
        assert!(is_weak_secret(Some("Ab1!")));
    }

    #[test]
    fn missing_character_classes_are_weak() {
        assert!(is_weak_secret(Some("alllowercase1!"))); // no uppercase
        assert!(is_weak_secret(Some("ALLUPPERCASE1!"))); // no lowercase
        assert!(is_weak_secret(Some("NoDigitsHere!"))); // no digit
        assert!(is_weak_secret(Some("NoSymbols123"))); // no symbol
        assert!(!is_weak_secret(Some("Str0ng!Enough")));
    }

    #[test]
    fn absent_secret_is_weak_regardless_of_hint() {
        let now = Utc::now();
        let mut r = record("Empty", None, now);
        r.strength_hint = Some(StrengthHint::VeryStrong);

        let snapshot = analyze(&[r], now);
        assert_eq!(snapshot.risks[0].verdict, RiskVerdict::Weak);
        assert_eq!(snapshot.weak_count, 1);
    }

    #[test]
    fn reuse_marks_every_member_of_a_group() {
        let now = Utc::now();
        let records = vec![
            record("A", Some("Sh4red!Pass"), now),
            record("B", Some("Sh4red!Pass"), now),
            record("C", Some("Sh4red!Pass"), now),
            record("D", Some(STRONG_UNIQUE), now),
        ];

        let snapshot = analyze(&records, now);
        assert_eq!(snapshot.reused_account_count, 3);
        assert_eq!(snapshot.risks[0].verdict, RiskVerdict::Reused);
        assert_eq!(snapshot.risks[2].verdict, RiskVerdict::Reused);
        assert_eq!(snapshot.risks[3].verdict, RiskVerdict::None);
    }

    #[test]
    fn empty_secrets_never_form_a_reuse_group() {
        let now = Utc::now();
        let records = vec![
            record("A", Some(""), now),
            record("B", Some(""), now),
        ];
        let snapshot = analyze(&records, now);
        assert_eq!(snapshot.reused_account_count, 0);
        // Both are still weak (empty is shorter than 8).
        assert_eq!(snapshot.weak_count, 2);
    }

    #[test]
    fn weak_takes_precedence_over_reused() {
        let now = Utc::now();
        let records = vec![
            record("A", Some("a"), now),
            record("B", Some("a"), now),
        ];

        let snapshot = analyze(&records, now);
        assert_eq!(snapshot.risks[0].verdict, RiskVerdict::Weak);
        assert_eq!(snapshot.risks[1].verdict, RiskVerdict::Weak);
        // Both tests still count the records independently.
        assert_eq!(snapshot.weak_count, 2);
        assert_eq!(snapshot.reused_account_count, 2);
    }

    #[test]
    fn reused_takes_precedence_over_old() {
        let now = Utc::now();
        let stale = now - Duration::days(400);
        let records = vec![
            record("A", Some("Sh4red!Pass"), stale),
            record("B", Some("Sh4red!Pass"), now),
        ];

        let snapshot = analyze(&records, now);
        assert_eq!(snapshot.risks[0].verdict, RiskVerdict::Reused);
        assert_eq!(snapshot.old_count, 1);
    }

    #[test]
    fn staleness_boundary_is_strictly_greater_than_365_days() {
        let now = Utc::now();
        let exactly = record("Exact", Some(STRONG_UNIQUE), now - Duration::days(365));
        let over = record("Over", Some("0ther#Pass1"), now - Duration::days(366));

        let snapshot = analyze(&[exactly, over], now);
        assert_eq!(snapshot.risks[0].verdict, RiskVerdict::None);
        assert_eq!(snapshot.risks[1].verdict, RiskVerdict::Old);
        assert_eq!(snapshot.old_count, 1);
    }

    #[test]
    fn age_in_years_is_floor_divided() {
        let now = Utc::now();
        let records = vec![
            record("Young", Some(STRONG_UNIQUE), now - Duration::days(300)),
            record("One", Some("0ther#Pass1"), now - Duration::days(500)),
            record("Two", Some("Th1rd#Pass2"), now - Duration::days(800)),
        ];

        let snapshot = analyze(&records, now);
        assert_eq!(snapshot.risks[0].age_years, 0);
        assert_eq!(snapshot.risks[1].age_years, 1);
        assert_eq!(snapshot.risks[2].age_years, 2);
    }

    #[test]
    fn worked_health_score_example() {
        // 6 records: 2 weak, 1 reused pair (2 accounts), 1 old, 1 fine.
        // Penalty = 2*10 + 2*5 + 1*2 = 32 => score 68.
        let now = Utc::now();
        let records = vec![
            record("Weak1", Some("short"), now),
            record("Weak2", None, now),
            record("Pair1", Some("Sh4red!Pass"), now),
            record("Pair2", Some("Sh4red!Pass"), now),
            record("Old", Some(STRONG_UNIQUE), now - Duration::days(400)),
            record("Fine", Some("An0ther!One2"), now),
        ];

        let snapshot = analyze(&records, now);
        assert_eq!(snapshot.weak_count, 2);
        assert_eq!(snapshot.reused_account_count, 2);
        assert_eq!(snapshot.old_count, 1);
        assert_eq!(snapshot.health_score, 68);
    }

    #[test]
    fn health_score_clamps_at_zero() {
        let now = Utc::now();
        let records: Vec<_> = (0..15).map(|i| record(&format!("W{i}"), None, now)).collect();

        let snapshot = analyze(&records, now);
        assert_eq!(snapshot.health_score, 0);
    }

    #[test]
    fn empty_vault_scores_a_clean_hundred() {
        let snapshot = analyze(&[], Utc::now());
        assert_eq!(snapshot.health_score, 100);
        assert!(snapshot.at_risk().next().is_none());
    }

    #[test]
    fn analyze_is_deterministic() {
        let now = Utc::now();
        let records = vec![
            record("A", Some("short"), now),
            record("B", Some(STRONG_UNIQUE), now - Duration::days(400)),
        ];

        let first = analyze(&records, now);
        let second = analyze(&records, now);
        assert_eq!(first.health_score, second.health_score);
        assert_eq!(first.weak_count, second.weak_count);
        assert_eq!(
            first.risks.iter().map(|r| r.verdict).collect::<Vec<_>>(),
            second.risks.iter().map(|r| r.verdict).collect::<Vec<_>>()
        );
    }

    #[test]
    fn snapshot_serializes_for_json_output() {
        let now = Utc::now();
        let snapshot = analyze(&[record("A", Some("short"), now)], now);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"verdict\":\"weak\""));
        assert!(json.contains("\"health_score\":90"));
    }
}
