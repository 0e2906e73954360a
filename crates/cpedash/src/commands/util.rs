//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use cpedash_core::Dashboard;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::CliError;

/// Re-validate the cached session, logging in with the profile's
/// credentials when it is gone.
pub async fn require_session(dashboard: &Dashboard) -> Result<(), CliError> {
    dashboard.ensure_session().await?;
    Ok(())
}

/// Like [`require_session`] but never fails: commands that degrade to
/// public data carry on logged out.
pub async fn try_session(dashboard: &Dashboard) -> bool {
    if dashboard.check_session().await {
        return true;
    }
    if dashboard.config().credentials.is_none() {
        return false;
    }
    match dashboard.ensure_session().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "automatic login failed, continuing without a session");
            false
        }
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').to_owned(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Read and parse a JSON file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn on_off(flag: bool) -> String {
    if flag { "on".into() } else { "off".into() }
}
