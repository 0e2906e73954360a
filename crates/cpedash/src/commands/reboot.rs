//! Reboot handler.

use cpedash_core::Dashboard;

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::util;

pub async fn handle(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    if !util::confirm("Reboot the router?", global.yes)? {
        return Ok(());
    }
    util::require_session(dashboard).await?;
    dashboard.reboot().await?;
    if !global.quiet {
        eprintln!("Reboot initiated");
    }
    Ok(())
}
