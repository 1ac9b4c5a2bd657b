// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `onyx shell` command implementation.
//!
//! Launches an interactive REPL over the vault session: unlock (or first-run
//! creation) after the startup cloud reconciliation, then record CRUD,
//! security auditing, and cloud login/sync commands with readline history.

use std::sync::Arc;

use chrono::Utc;
use colored::Colorize;
use onyx_audit::analyze;
use onyx_config::OnyxConfig;
use onyx_core::{OnyxError, RecordDraft, RecordId, RecordPatch};
use onyx_sync::SyncCoordinator;
use onyx_vault::VaultSession;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::audit;
use crate::prompt;
use crate::stack::AppStack;

/// Unlock attempts before the shell gives up.
const MAX_UNLOCK_ATTEMPTS: u32 = 3;

/// Runs the `onyx shell` interactive REPL.
pub async fn run_shell(config: OnyxConfig) -> Result<(), OnyxError> {
    let stack = AppStack::build(&config).await?;

    // Reconciliation must finish (success or failure) before the unlock
    // prompt; unlocking a stale local vault would diverge from the remote.
    match stack.coordinator.reconcile_on_startup().await {
        Ok(report) => {
            stack.session.set_cloud_linked(report.linked).await;
            if report.vault_refreshed {
                println!("{}", "local vault updated from cloud backup".dimmed());
            }
        }
        Err(e) => {
            eprintln!("{}: {e}", "cloud reconciliation failed".yellow());
        }
    }

    unlock_interactive(&stack.session).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| OnyxError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "onyx shell".bold().green());
    println!("Type {} for commands, {} to exit.\n", "help".yellow(), "quit".yellow());

    let prompt_line = format!("{}> ", "onyx".green());
    loop {
        match rl.readline(&prompt_line) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "quit" || trimmed == "exit" {
                    break;
                }

                let _ = rl.add_history_entry(&line);

                if let Err(e) =
                    handle_command(&stack.session, &stack.coordinator, &mut rl, trimmed).await
                {
                    match &e {
                        OnyxError::PersistFailure { .. } => {
                            eprintln!(
                                "{}: {e}; the change is kept in memory, run {} to retry",
                                "warning".yellow(),
                                "save".yellow()
                            );
                        }
                        _ => eprintln!("{}: {e}", "error".red()),
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    stack.coordinator.shutdown();
    stack.session.lock().await;
    println!("{}", "vault locked".dimmed());
    Ok(())
}

/// Prompt for the master password and unlock, retrying on a wrong password.
/// A missing salt means first run: prompt with confirmation and create.
async fn unlock_interactive(session: &Arc<VaultSession>) -> Result<(), OnyxError> {
    let first_run = !session.vault_exists().await?;
    if first_run {
        println!("No vault found; creating one. This password cannot be recovered.");
    }

    for attempt in 1..=MAX_UNLOCK_ATTEMPTS {
        let password = if first_run {
            prompt::master_password_with_confirm()?
        } else {
            prompt::master_password()?
        };

        match session.unlock(password).await {
            Ok(()) => {
                let count = session.records().await.len();
                println!("{} ({count} records)", "vault unlocked".green());
                return Ok(());
            }
            Err(OnyxError::WrongPassword) if attempt < MAX_UNLOCK_ATTEMPTS => {
                eprintln!("{}", OnyxError::WrongPassword.to_string().red());
            }
            Err(e) => return Err(e),
        }
    }
    Err(OnyxError::WrongPassword)
}

async fn handle_command(
    session: &Arc<VaultSession>,
    coordinator: &Arc<SyncCoordinator>,
    rl: &mut DefaultEditor,
    input: &str,
) -> Result<(), OnyxError> {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let rest: Vec<&str> = parts.collect();

    match command {
        "help" => print_help(),
        "list" => {
            for (index, record) in session.records().await.iter().enumerate() {
                println!("  [{index}] {:<24} {}", record.title, record.username.dimmed());
            }
        }
        "search" => {
            let query = rest.join(" ");
            for record in session.search(&query).await {
                println!("  {:<24} {}", record.title, record.username.dimmed());
            }
        }
        "show" => {
            let id = resolve_index(session, rest.first()).await?;
            session.select(Some(id.clone())).await;
            let record = session
                .get_record(&id)
                .await
                .ok_or(OnyxError::NotFound { id: id.0.clone() })?;
            println!("title:    {}", record.title);
            println!("username: {}", record.username);
            println!(
                "secret:   {}",
                record.secret.as_deref().unwrap_or("(none)")
            );
            println!("modified: {}", record.last_modified.to_rfc3339().dimmed());
        }
        "add" => {
            let title = read_field(rl, "title: ")?;
            let username = read_field(rl, "username: ")?;
            eprint!("secret (empty for none): ");
            let secret = rpassword::read_password()
                .map_err(|e| OnyxError::Internal(format!("failed to read secret: {e}")))?;
            let draft = RecordDraft {
                title,
                username,
                secret: (!secret.is_empty()).then_some(secret),
                ..RecordDraft::default()
            };
            session.add_record(draft).await?;
            println!("{}", "record added".green());
        }
        "edit" => {
            let id = resolve_index(session, rest.first()).await?;
            let title = read_field(rl, "title (empty keeps current): ")?;
            let username = read_field(rl, "username (empty keeps current): ")?;
            eprint!("secret (empty keeps current): ");
            let secret = rpassword::read_password()
                .map_err(|e| OnyxError::Internal(format!("failed to read secret: {e}")))?;
            let patch = RecordPatch {
                title: (!title.is_empty()).then_some(title),
                username: (!username.is_empty()).then_some(username),
                secret: (!secret.is_empty()).then_some(secret),
                ..RecordPatch::default()
            };
            session.update_record(&id, patch).await?;
            println!("{}", "record updated".green());
        }
        "rm" => {
            let id = resolve_index(session, rest.first()).await?;
            session.remove_record(&id).await?;
            println!("{}", "record removed".green());
        }
        "categories" => {
            for category in session.categories().await {
                println!("  {:<16} {}", category.name, category.color.dimmed());
            }
        }
        "addcat" => {
            let [name, color] = rest.as_slice() else {
                return Err(OnyxError::Internal("usage: addcat <name> <color>".to_string()));
            };
            session
                .add_category((*name).to_string(), (*color).to_string())
                .await?;
            println!("{}", "category added".green());
        }
        "rmcat" => {
            let name = rest.join(" ");
            let category = session
                .categories()
                .await
                .into_iter()
                .find(|c| c.name.eq_ignore_ascii_case(&name))
                .ok_or(OnyxError::NotFound { id: name })?;
            session.remove_category(&category.id).await?;
            println!("{}", "category removed".green());
        }
        "audit" => {
            let snapshot = analyze(&session.records().await, Utc::now());
            audit::render(&snapshot, false);
        }
        "save" => {
            session.persist_now().await?;
            println!("{}", "vault persisted".green());
        }
        "sync" => {
            if !coordinator.is_linked().await {
                return Err(OnyxError::Sync(
                    "no cloud account linked; run `login` first".to_string(),
                ));
            }
            coordinator.sync_now().await?;
            println!("{}", "encrypted vault uploaded".green());
        }
        "login" => {
            let attempt = coordinator.begin_login().await?;
            println!("A browser window opened for consent.");
            let code = read_field(rl, "paste the authorization code: ")?;
            coordinator.deliver_code(code).await;
            coordinator.finish_login(attempt).await?;
            session.set_cloud_linked(true).await;
            println!("{}", "cloud account linked".green());
        }
        "lock" => {
            session.lock().await;
            println!("{}", "vault locked".dimmed());
        }
        "unlock" => {
            unlock_interactive(session).await?;
        }
        "status" => {
            let state = format!("{:?}", session.state().await).to_lowercase();
            let linked = coordinator.is_linked().await;
            let count = session.records().await.len();
            println!("session: {state}  records: {count}  cloud: {linked}");
        }
        other => {
            eprintln!("unknown command `{other}`; type {} for commands", "help".yellow());
        }
    }

    Ok(())
}

/// Resolve a `list` index argument into a record id.
async fn records_index(session: &Arc<VaultSession>, index: usize) -> Result<RecordId, OnyxError> {
    session
        .records()
        .await
        .get(index)
        .map(|r| r.id.clone())
        .ok_or(OnyxError::NotFound {
            id: index.to_string(),
        })
}

fn parse_index(argument: Option<&&str>) -> Result<usize, OnyxError> {
    argument
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| OnyxError::Internal("expected a record index from `list`".to_string()))
}

async fn resolve_index(
    session: &Arc<VaultSession>,
    argument: Option<&&str>,
) -> Result<RecordId, OnyxError> {
    records_index(session, parse_index(argument)?).await
}

fn read_field(rl: &mut DefaultEditor, prompt: &str) -> Result<String, OnyxError> {
    rl.readline(prompt)
        .map(|line| line.trim().to_string())
        .map_err(|e| OnyxError::Internal(format!("input aborted: {e}")))
}

fn print_help() {
    println!("  list                 list records (most recent first)");
    println!("  search <query>       filter by title or username");
    println!("  show <index>         display a record");
    println!("  add                  create a record");
    println!("  edit <index>         update fields of a record");
    println!("  rm <index>           delete a record");
    println!("  categories           list categories");
    println!("  addcat <name> <hex>  add a category");
    println!("  rmcat <name>         remove a category");
    println!("  audit                run the security analysis");
    println!("  save                 re-persist the vault (retry after a failed save)");
    println!("  login                link a cloud account (OAuth)");
    println!("  sync                 upload the encrypted vault now");
    println!("  lock / unlock        end or resume the session");
    println!("  status               session and cloud state");
    println!("  quit                 exit");
}
