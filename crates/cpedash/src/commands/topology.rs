//! Topology handlers: live from the router or from a saved report.

use std::fs;

use cpedash_core::topology::{create_data, render_tree, wrap_internet};
use cpedash_core::{Dashboard, DhcpLease, MacAddress, TopologyData, validate};

use crate::cli::{GlobalOpts, OutputFormat, TopologyArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn al_mac(args: &TopologyArgs) -> Result<Option<MacAddress>, CliError> {
    Ok(args
        .al_mac
        .as_deref()
        .map(|raw| validate::mac("al_mac", raw))
        .transpose()?)
}

fn print(mut data: TopologyData, args: &TopologyArgs, global: &GlobalOpts) {
    let missing = args
        .al_mac
        .as_ref()
        .and(data.local_host_mac.as_ref())
        .filter(|mac| {
            data.tree_data
                .as_ref()
                .is_some_and(|tree| tree.find(mac).is_none())
        });
    if let Some(mac) = missing.filter(|_| !global.quiet) {
        eprintln!("Warning: AL MAC {mac} is not in the report");
    }

    if !args.no_internet {
        data.tree_data = data.tree_data.map(wrap_internet);
    }

    let out = match (&global.output, &data.tree_data) {
        (OutputFormat::Table, None) | (OutputFormat::Plain, None) => {
            if !global.quiet {
                eprintln!("No topology data");
            }
            return;
        }
        (OutputFormat::Plain, Some(_)) => data
            .mac_list
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        (format, _) => output::render_single(
            format,
            &data,
            |d| {
                d.tree_data
                    .as_ref()
                    .map(|root| render_tree(root).trim_end().to_owned())
                    .unwrap_or_default()
            },
            |_| String::new(),
        ),
    };
    output::print_output(&out, global.quiet);
}

pub fn from_file(args: &TopologyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let Some(ref path) = args.file else {
        return Err(CliError::Validation {
            field: "file".into(),
            reason: "a report file is required".into(),
        });
    };
    let raw = fs::read_to_string(path)?;
    let leases: Vec<DhcpLease> = match args.dhcp_file {
        Some(ref dhcp) => util::read_json_file(dhcp)?,
        None => Vec::new(),
    };

    let data = create_data(&raw, &leases, al_mac(args)?.as_ref());
    print(data, args, global);
    Ok(())
}

pub async fn live(
    dashboard: &Dashboard,
    args: &TopologyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let al_mac = al_mac(args)?;
    util::require_session(dashboard).await?;
    let data = dashboard.topology(al_mac.as_ref()).await?;
    print(data, args, global);
    Ok(())
}
