// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OnyxVault - a local-first password vault.
//!
//! This is the binary entry point for the `onyx` CLI.

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod audit;
mod prompt;
mod shell;
mod stack;
mod status;

/// OnyxVault - a local-first password vault.
#[derive(Parser, Debug)]
#[command(name = "onyx", version, about, long_about = None)]
struct Cli {
    /// Load configuration from a specific file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch the interactive vault shell.
    Shell,
    /// Unlock the vault and print the security report.
    Audit {
        /// Emit the snapshot as JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// Show vault and cloud link status without unlocking.
    Status {
        /// Emit structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match &cli.config {
        Some(path) => onyx_config::load_and_validate_path(path),
        None => onyx_config::load_and_validate(),
    };
    let config = match config {
        Ok(config) => config,
        Err(errors) => {
            onyx_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins; the config's log level is the fallback.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.app.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Commands::Shell) | None => shell::run_shell(config).await,
        Some(Commands::Audit { json }) => audit::run_audit(config, json).await,
        Some(Commands::Status { json }) => status::run_status(config, json).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        super::Cli::command().debug_assert();
    }

    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads with defaults (no config file needed).
        let config = onyx_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.app.name, "onyx");
    }
}
