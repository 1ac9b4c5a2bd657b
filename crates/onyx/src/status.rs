// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `onyx status` command implementation.
//!
//! Reports vault presence and cloud link status without unlocking. With
//! `--json`, outputs structured JSON for scripting.

use colored::Colorize;
use onyx_config::OnyxConfig;
use onyx_core::OnyxError;
use serde::Serialize;

use crate::stack::AppStack;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub vault_exists: bool,
    pub cloud_linked: bool,
    pub database_path: String,
}

/// Run the `onyx status` command.
pub async fn run_status(config: OnyxConfig, json: bool) -> Result<(), OnyxError> {
    let stack = AppStack::build(&config).await?;

    let vault_exists = stack.session.vault_exists().await?;
    let cloud_linked = stack.coordinator.refresh_link_status().await?;

    let response = StatusResponse {
        vault_exists,
        cloud_linked,
        database_path: config.storage.database_path.clone(),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let vault = if vault_exists {
            "initialized".green()
        } else {
            "not created".yellow()
        };
        let cloud = if cloud_linked {
            "linked".green()
        } else {
            "not linked".dimmed()
        };
        println!("vault:  {vault}");
        println!("cloud:  {cloud}");
        println!("store:  {}", response.database_path.dimmed());
    }

    stack.coordinator.shutdown();
    Ok(())
}
