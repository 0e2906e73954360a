//! Watch handler: runs the background tasks and prints store changes.

use std::time::Duration;

use chrono::Local;
use tokio_stream::StreamExt;
use tracing::debug;

use cpedash_core::{Dashboard, StatusInfo};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn parse_duration(raw: Option<&str>) -> Result<Option<Duration>, CliError> {
    raw.map(|d| {
        humantime::parse_duration(d).map_err(|e| CliError::Validation {
            field: "duration".into(),
            reason: e.to_string(),
        })
    })
    .transpose()
}

fn summary(status: &StatusInfo) -> String {
    let now = Local::now().format("%H:%M:%S");
    let dash = || "-".to_owned();
    format!(
        "[{now}] {}  signal {}  PLMN {}  RSRP {}  clients {}",
        status.network_type.clone().unwrap_or_else(dash),
        status.signal_strength.map_or_else(dash, |s| s.to_string()),
        status.plmn.clone().unwrap_or_else(dash),
        status.rsrp.map_or_else(dash, |r| r.to_string()),
        status.connected_clients.map_or_else(dash, |c| c.to_string()),
    )
}

pub async fn handle(
    dashboard: &Dashboard,
    args: &WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let limit = parse_duration(args.duration.as_deref())?;
    util::try_session(dashboard).await;

    let color = output::should_color(&global.color);
    // Table and plain print a status line per poll; the structured
    // formats print the whole store on any change, one document per line.
    let summaries = matches!(global.output, OutputFormat::Table | OutputFormat::Plain);
    let mut status = dashboard.data().subscribe_status_info().into_stream();
    let mut version = dashboard.data().subscribe_version();
    let mut state = dashboard.login_state();
    dashboard.start().await?;

    let deadline = async {
        match limit {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            () = &mut deadline => break,
            next = status.next(), if summaries => match next {
                Some(info) => output::print_output(&summary(&info), global.quiet),
                None => break,
            },
            changed = version.changed(), if !summaries => {
                if changed.is_err() {
                    break;
                }
                let json = output::render_json_compact(&dashboard.data().to_json());
                output::print_output(&json, global.quiet);
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow_and_update();
                if !global.quiet {
                    eprintln!("session: {}", output::login_state(current, color));
                }
            }
        }
    }
    Ok(())
}
