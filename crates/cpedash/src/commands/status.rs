//! Status handler.

use std::time::Duration;

use bytesize::ByteSize;
use chrono::Local;

use cpedash_core::{Dashboard, GlobalKey, StatusInfo};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub(super) fn detail(status: &StatusInfo, updated: Option<String>) -> String {
    let signal = status.signal_strength.map(|bars| format!("{bars}/5"));
    let radio = match (status.rsrp, status.rsrq, status.sinr) {
        (None, None, None) => None,
        (rsrp, rsrq, sinr) => Some(format!(
            "RSRP {} dBm, RSRQ {} dB, SINR {} dB",
            opt(rsrp),
            opt(rsrq),
            opt(sinr)
        )),
    };
    let traffic = match (status.rx_bytes, status.tx_bytes) {
        (None, None) => None,
        (rx, tx) => Some(format!(
            "rx {} / tx {}",
            rx.map_or_else(|| "-".into(), |b| ByteSize(b).to_string()),
            tx.map_or_else(|| "-".into(), |b| ByteSize(b).to_string()),
        )),
    };

    output::detail_lines(&[
        ("Model", status.model_name.clone()),
        ("Firmware", status.firmware_version.clone()),
        ("IMEI", status.imei.clone()),
        ("SIM", status.sim_status.clone()),
        ("Operator", status.operator_name.clone()),
        ("PLMN", status.plmn.clone()),
        ("Network", status.network_type.clone()),
        ("Signal", signal),
        ("Radio", radio),
        ("WAN IP", status.wan_ip.clone()),
        ("Clients", status.connected_clients.map(|n| n.to_string())),
        ("Traffic", traffic),
        (
            "Uptime",
            status
                .uptime
                .map(|secs| humantime::format_duration(Duration::from_secs(secs)).to_string()),
        ),
        ("Updated", updated),
    ])
}

fn opt(value: Option<i64>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

pub async fn handle(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    dashboard.refresh_status().await?;

    let data = dashboard.data();
    let status = data.status_info().unwrap_or_default();
    let updated = data
        .updated_at(GlobalKey::StatusInfo)
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string());

    let out = output::render_single(
        &global.output,
        status.as_ref(),
        |s| detail(s, updated.clone()),
        |s| s.network_type.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
