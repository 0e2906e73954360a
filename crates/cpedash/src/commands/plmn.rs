//! Operator help handlers.

use serde_json::json;

use cpedash_core::Dashboard;
use cpedash_core::plmn::{Language, help_content, known_plmns};

use crate::cli::{GlobalOpts, PlmnHelpArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

fn show(plmn: &str, language: Language, global: &GlobalOpts) -> Result<(), CliError> {
    let content = help_content(plmn, language).ok_or_else(|| CliError::NotFound {
        resource: "operator help".into(),
        identifier: plmn.to_owned(),
        hint: "Run: cpedash plmn-help --list".into(),
    })?;

    let report = json!({
        "plmn": plmn,
        "language": language.to_string(),
        "content": content,
    });
    let out = output::render_single(
        &global.output,
        &report,
        |_| content.to_string(),
        |_| content.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

/// `--list`, or help for an explicit PLMN.
pub fn offline(args: &PlmnHelpArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if args.list {
        let plmns: Vec<&str> = known_plmns().collect();
        let out = output::render_single(
            &global.output,
            &plmns,
            |list| list.join("\n"),
            |list| list.join("\n"),
        );
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let plmn = args.plmn.as_deref().unwrap_or_default();
    show(plmn, config::language(global)?, global)
}

/// Help for the operator of the SIM currently in the router.
pub async fn live(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let language = config::language(global)?;
    dashboard.refresh_status().await?;

    let plmn = dashboard
        .data()
        .status_info()
        .and_then(|s| s.plmn.clone())
        .ok_or_else(|| CliError::NotFound {
            resource: "PLMN".into(),
            identifier: "current SIM".into(),
            hint: "Is a SIM inserted and registered? Pass the PLMN explicitly.".into(),
        })?;
    show(&plmn, language, global)
}
