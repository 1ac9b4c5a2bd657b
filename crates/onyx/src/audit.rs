// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `onyx audit` command implementation.
//!
//! Unlocks the vault, runs the security analysis over the decrypted
//! snapshot, prints the report, and locks again. `--json` emits the
//! snapshot for scripting.

use chrono::Utc;
use colored::Colorize;
use onyx_audit::{analyze, RiskVerdict, SecuritySnapshot};
use onyx_config::OnyxConfig;
use onyx_core::OnyxError;
use tracing::warn;

use crate::prompt;
use crate::stack::AppStack;

/// Run the `onyx audit` command.
pub async fn run_audit(config: OnyxConfig, json: bool) -> Result<(), OnyxError> {
    let stack = AppStack::build(&config).await?;

    // Reconcile before unlock so the scan sees the freshest vault.
    if let Err(e) = stack.coordinator.reconcile_on_startup().await {
        warn!(error = %e, "cloud reconciliation failed; auditing the local vault");
    }

    if !stack.session.vault_exists().await? {
        return Err(OnyxError::Internal(
            "no vault exists yet; run `onyx shell` to create one".to_string(),
        ));
    }

    let password = prompt::master_password()?;
    stack.session.unlock(password).await?;

    let records = stack.session.records().await;
    let snapshot = analyze(&records, Utc::now());
    render(&snapshot, json);

    stack.session.lock().await;
    stack.coordinator.shutdown();
    Ok(())
}

/// Print the security report to stdout.
pub fn render(snapshot: &SecuritySnapshot, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string())
        );
        return;
    }

    let score = snapshot.health_score;
    let score_text = format!("{score}/100");
    let score_colored = if score >= 80 {
        score_text.green()
    } else if score >= 50 {
        score_text.yellow()
    } else {
        score_text.red()
    };

    println!("{} {}", "health score:".bold(), score_colored);
    println!(
        "weak: {}  reused accounts: {}  old: {}",
        snapshot.weak_count, snapshot.reused_account_count, snapshot.old_count
    );

    let at_risk: Vec<_> = snapshot.at_risk().collect();
    if at_risk.is_empty() {
        println!("{}", "no accounts at risk".green());
        return;
    }

    println!();
    println!("{}", "at-risk accounts".bold());
    for risk in at_risk {
        let label = verdict_label(risk.verdict, risk.age_years);
        println!("  {:<24} {:<28} {label}", risk.title, risk.username);
    }
}

fn verdict_label(verdict: RiskVerdict, age_years: u32) -> String {
    match verdict {
        RiskVerdict::Weak => "weak".red().to_string(),
        RiskVerdict::Reused => "reused".yellow().to_string(),
        RiskVerdict::Old => format!("old ({age_years}y)").blue().to_string(),
        RiskVerdict::None => "ok".normal().to_string(),
    }
}
