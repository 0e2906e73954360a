//! Settings handler: connection, Wi-Fi, account and enumeration tables.

use serde_json::{Map, Value};
use tabled::Tabled;

use cpedash_core::{Dashboard, GlobalData, GlobalKey, WifiNetwork};

use crate::cli::{GlobalOpts, OutputFormat, SettingsArgs, SettingsSection};
use crate::error::CliError;
use crate::output;

use super::util;

const SETTINGS_KEYS: [GlobalKey; 4] = [
    GlobalKey::ConnectionSettings,
    GlobalKey::WifiSettings,
    GlobalKey::AccountLevel,
    GlobalKey::GlobalConfig,
];

fn key_for(section: SettingsSection) -> GlobalKey {
    match section {
        SettingsSection::Connection => GlobalKey::ConnectionSettings,
        SettingsSection::Wifi => GlobalKey::WifiSettings,
        SettingsSection::Account => GlobalKey::AccountLevel,
        SettingsSection::Global => GlobalKey::GlobalConfig,
    }
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "Band")]
    band: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Hidden")]
    hidden: String,
    #[tabled(rename = "Auth")]
    auth: String,
    #[tabled(rename = "Channel")]
    channel: String,
}

impl From<&WifiNetwork> for NetworkRow {
    fn from(n: &WifiNetwork) -> Self {
        Self {
            band: n.band.clone().unwrap_or_default(),
            ssid: n.ssid.clone(),
            state: util::on_off(n.enabled),
            hidden: if n.hidden { "yes".into() } else { String::new() },
            auth: n.auth_type.clone().unwrap_or_default(),
            channel: n.channel.clone().unwrap_or_else(|| "auto".into()),
        }
    }
}

fn section_detail(data: &GlobalData, key: GlobalKey) -> Option<String> {
    match key {
        GlobalKey::ConnectionSettings => data.connection_settings().map(|c| {
            output::detail_lines(&[
                ("Mode", c.connection_mode.clone()),
                ("Network mode", c.network_mode.clone()),
                ("APN", c.apn.clone()),
                ("Roaming", Some(util::on_off(c.data_roaming))),
                ("MTU", c.mtu.map(|m| m.to_string())),
            ])
        }),
        GlobalKey::WifiSettings => data.wifi_settings().map(|w| {
            let rows: Vec<NetworkRow> = w.networks.iter().map(NetworkRow::from).collect();
            format!(
                "Wi-Fi: {}\n{}",
                util::on_off(w.wifi_enabled),
                tabled::Table::new(rows).with(tabled::settings::Style::rounded())
            )
        }),
        GlobalKey::AccountLevel => data.account_level().map(|a| {
            output::detail_lines(&[
                ("User", a.username.clone()),
                ("Level", a.account_level.map(|l| l.to_string())),
                ("Admin", Some(if a.is_admin() { "yes" } else { "no" }.into())),
            ])
        }),
        GlobalKey::GlobalConfig => data.global_config().map(|g| {
            let labels = |list: &[cpedash_core::EnumEntry]| {
                list.iter().map(|e| e.label.as_str()).collect::<Vec<_>>().join(" ")
            };
            output::detail_lines(&[
                ("Countries", Some(g.country_list.len().to_string())),
                ("2.4G channels", Some(labels(&g.channel_list_2g))),
                ("5G channels", Some(labels(&g.channel_list_5g))),
                ("Language", g.default_language.clone()),
            ])
        }),
        GlobalKey::StatusInfo => None,
    }
}

fn render(data: &GlobalData, keys: &[GlobalKey], global: &GlobalOpts) -> String {
    match global.output {
        OutputFormat::Table => keys
            .iter()
            .filter_map(|&key| section_detail(data, key).map(|body| format!("── {key} ──\n{body}")))
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Plain => keys
            .iter()
            .filter(|&&key| data.seq(key) > 0)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => {
            let map: Map<String, Value> = keys
                .iter()
                .filter(|&&key| data.seq(key) > 0)
                .map(|&key| (key.to_string(), data.key_to_json(key)))
                .collect();
            output::render_single(&global.output, &map, |_| String::new(), |_| String::new())
        }
    }
}

pub async fn handle(
    dashboard: &Dashboard,
    args: &SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let keys: Vec<GlobalKey> = match args.section {
        Some(section) => {
            let key = key_for(section);
            if key.requires_login() {
                util::require_session(dashboard).await?;
            }
            dashboard.refresh_key(key).await?;
            vec![key]
        }
        None => {
            if !util::try_session(dashboard).await && !global.quiet {
                eprintln!("Not logged in: showing public settings only");
            }
            let refresh = dashboard.refresh_settings().await;
            for (key, err) in &refresh.failed {
                eprintln!("warning: {key} not refreshed: {err}");
            }
            SETTINGS_KEYS.to_vec()
        }
    };

    let out = render(dashboard.data(), &keys, global);
    output::print_output(&out, global.quiet);
    Ok(())
}
