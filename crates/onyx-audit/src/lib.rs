// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Security analysis engine for OnyxVault.
//!
//! A pure, deterministic classification of the current credential snapshot:
//! weak, reused, and stale secrets, plus an aggregate health score. Reads a
//! snapshot, never mutates, and holds no state between calls.

pub mod analyzer;

pub use analyzer::{analyze, RecordRisk, RiskVerdict, SecuritySnapshot, STALE_AFTER_DAYS};
