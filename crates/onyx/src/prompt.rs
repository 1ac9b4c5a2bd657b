// SPDX-FileCopyrightText: 2026 OnyxVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via TTY prompt or ONYX_MASTER_PASSWORD
//! environment variable.

use onyx_core::OnyxError;
use secrecy::SecretString;

/// The environment variable name for providing the master password.
pub const MASTER_PASSWORD_ENV_VAR: &str = "ONYX_MASTER_PASSWORD";

/// Get the master password from the environment or an interactive TTY prompt.
///
/// Priority:
/// 1. `ONYX_MASTER_PASSWORD` environment variable (for headless/scripted use)
/// 2. Interactive TTY prompt via `rpassword`
///
/// Returns an error if neither source is available.
pub fn master_password() -> Result<SecretString, OnyxError> {
    if let Ok(password) = std::env::var(MASTER_PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok(SecretString::from(password));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("Master password: ");
        let password = rpassword::read_password()
            .map_err(|e| OnyxError::Internal(format!("failed to read password: {e}")))?;
        if password.is_empty() {
            return Err(OnyxError::Internal("empty password not allowed".to_string()));
        }
        return Ok(SecretString::from(password));
    }

    Err(OnyxError::Internal(
        "No password provided. Set ONYX_MASTER_PASSWORD or run interactively.".to_string(),
    ))
}

/// Get the master password with a confirmation prompt (for vault creation).
///
/// Prompts twice and verifies the passwords match. Falls back to the env
/// var when stdin is not a terminal.
pub fn master_password_with_confirm() -> Result<SecretString, OnyxError> {
    if let Ok(password) = std::env::var(MASTER_PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok(SecretString::from(password));
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        eprint!("New master password: ");
        let first = rpassword::read_password()
            .map_err(|e| OnyxError::Internal(format!("failed to read password: {e}")))?;
        eprint!("Confirm master password: ");
        let second = rpassword::read_password()
            .map_err(|e| OnyxError::Internal(format!("failed to read password: {e}")))?;

        if first != second {
            return Err(OnyxError::Internal("passwords do not match".to_string()));
        }
        if first.is_empty() {
            return Err(OnyxError::Internal("empty password not allowed".to_string()));
        }
        return Ok(SecretString::from(first));
    }

    Err(OnyxError::Internal(
        "No password provided. Set ONYX_MASTER_PASSWORD or run interactively.".to_string(),
    ))
}
