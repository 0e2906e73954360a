//! login / logout / session handlers.

use std::io::BufRead;

use dialoguer::Input;
use secrecy::SecretString;
use serde_json::json;

use cpedash_core::Dashboard;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn login(
    dashboard: &Dashboard,
    args: &LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let configured = dashboard.config().credentials.clone();

    let username = match args
        .username
        .clone()
        .or_else(|| configured.as_ref().map(|c| c.username.clone()))
    {
        Some(username) => username,
        None => Input::new()
            .with_prompt("Username")
            .default("admin".to_owned())
            .interact_text()
            .map_err(util::prompt_err)?,
    };

    let password = if args.password_stdin {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        SecretString::from(line.trim_end_matches(['\r', '\n']).to_owned())
    } else if let Some(creds) = configured.filter(|c| c.username == username) {
        creds.password
    } else {
        SecretString::from(rpassword::prompt_password("Password: ").map_err(util::prompt_err)?)
    };

    dashboard.login(&username, &password).await?;

    if !global.quiet {
        eprintln!("Logged in as {username}");
    }
    Ok(())
}

/// The local token is dropped even when the router call fails; the
/// failure is still reported.
pub async fn logout(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let result = dashboard.logout().await;
    if !global.quiet {
        eprintln!("Session token cleared");
    }
    Ok(result?)
}

pub async fn check(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    dashboard.check_session().await;
    let state = dashboard.session().state();

    let report = json!({
        "url": dashboard.config().url.as_str(),
        "state": state,
    });
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |_| {
            output::detail_lines(&[
                ("Router", Some(dashboard.config().url.to_string())),
                ("Session", Some(output::login_state(state, color))),
            ])
        },
        |_| state.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
