//! Command dispatch: bridges CLI args -> Dashboard calls -> output formatting.

pub mod config_cmd;
pub mod plmn;
pub mod reboot;
pub mod session;
pub mod settings;
pub mod sim;
pub mod status;
pub mod topology;
pub mod util;
pub mod watch;
pub mod wifi_qr;

use cpedash_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to its handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => session::login(dashboard, &args, global).await,
        Command::Logout => session::logout(dashboard, global).await,
        Command::Session => session::check(dashboard, global).await,
        Command::Status => status::handle(dashboard, global).await,
        Command::Settings(args) => settings::handle(dashboard, &args, global).await,
        Command::Topology(args) => topology::live(dashboard, &args, global).await,
        Command::WifiQr(args) => wifi_qr::from_device(dashboard, &args, global).await,
        Command::Sim(args) => sim::handle(dashboard, args, global).await,
        Command::PlmnHelp(_) => plmn::live(dashboard, global).await,
        Command::Reboot => reboot::handle(dashboard, global).await,
        Command::Watch(args) => watch::handle(dashboard, &args, global).await,
        // Local commands are handled before a Dashboard exists.
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
