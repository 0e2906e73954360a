//! SIM PIN / PUK handlers.

use cpedash_core::{Dashboard, PinStatus, validate};

use crate::cli::{GlobalOpts, SimArgs, SimCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(status: &PinStatus) -> String {
    output::detail_lines(&[
        ("SIM", status.sim_status.clone()),
        ("PIN lock", Some(util::on_off(status.pin_enabled))),
        ("PIN attempts", status.pin_remaining.map(|n| n.to_string())),
        ("PUK attempts", status.puk_remaining.map(|n| n.to_string())),
        (
            "PUK locked",
            Some(if status.puk_locked() { "yes" } else { "no" }.into()),
        ),
    ])
}

pub async fn handle(dashboard: &Dashboard, args: SimArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SimCommand::Status => {
            util::require_session(dashboard).await?;
            let status = dashboard.pin_status().await?;
            let out = output::render_single(&global.output, &status, detail, |s| {
                s.sim_status.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SimCommand::VerifyPin { pin } => {
            // Reject bad input before touching the network.
            validate::pin("pin", &pin)?;
            util::require_session(dashboard).await?;
            dashboard.verify_pin(&pin).await?;
            if !global.quiet {
                eprintln!("SIM unlocked");
            }
            Ok(())
        }

        SimCommand::UnlockPuk { puk, new_pin } => {
            validate::puk("puk", &puk)?;
            validate::pin("new_pin", &new_pin)?;
            util::require_session(dashboard).await?;
            dashboard.unlock_puk(&puk, &new_pin).await?;
            if !global.quiet {
                eprintln!("SIM unlocked, new PIN set");
            }
            Ok(())
        }
    }
}
