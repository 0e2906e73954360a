//! Wi-Fi QR payload handlers.

use serde::Serialize;
use tabled::Tabled;

use cpedash_core::wifi_qr::{WifiAuth, network_payload, qr_payload};
use cpedash_core::{Dashboard, GlobalKey, validate};

use crate::cli::{GlobalOpts, QrAuth, WifiQrArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Clone, Serialize, Tabled)]
struct QrEntry {
    #[tabled(rename = "Band")]
    band: String,
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Payload")]
    payload: String,
}

fn auth(arg: QrAuth) -> WifiAuth {
    match arg {
        QrAuth::Open => WifiAuth::Open,
        QrAuth::Wep => WifiAuth::Wep,
        QrAuth::Wpa => WifiAuth::Wpa,
        QrAuth::Sae => WifiAuth::Sae,
    }
}

fn print(entries: &[QrEntry], global: &GlobalOpts) {
    let out = output::render_list(&global.output, entries, QrEntry::clone, |e| e.payload.clone());
    output::print_output(&out, global.quiet);
}

/// Build the payload from command-line values alone.
pub fn offline(args: &WifiQrArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ssid = args.ssid.as_deref().ok_or_else(|| CliError::Validation {
        field: "ssid".into(),
        reason: "an SSID is required unless --from-device is given".into(),
    })?;
    validate::ssid("ssid", ssid)?;

    let auth = auth(args.auth);
    match (auth, args.password.as_deref()) {
        (WifiAuth::Open, _) => {}
        (_, None) => {
            return Err(CliError::Validation {
                field: "password".into(),
                reason: format!("a password is required for {auth} networks"),
            });
        }
        (WifiAuth::Wpa | WifiAuth::Sae, Some(password)) => {
            validate::wpa_passphrase("password", password)?;
        }
        (WifiAuth::Wep, Some(_)) => {}
    }

    let entry = QrEntry {
        band: String::new(),
        ssid: ssid.to_owned(),
        payload: qr_payload(ssid, args.password.as_deref(), auth, args.hidden),
    };
    print(&[entry], global);
    Ok(())
}

/// One payload per network the router reports, optionally filtered by SSID.
pub async fn from_device(
    dashboard: &Dashboard,
    args: &WifiQrArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_session(dashboard).await?;
    dashboard.refresh_key(GlobalKey::WifiSettings).await?;

    let wifi = dashboard.data().wifi_settings().unwrap_or_default();
    let entries: Vec<QrEntry> = wifi
        .networks
        .iter()
        .filter(|n| args.ssid.as_ref().is_none_or(|ssid| &n.ssid == ssid))
        .map(|n| QrEntry {
            band: n.band.clone().unwrap_or_default(),
            ssid: n.ssid.clone(),
            payload: network_payload(n),
        })
        .collect();

    if entries.is_empty() {
        return Err(CliError::NotFound {
            resource: "Wi-Fi network".into(),
            identifier: args.ssid.clone().unwrap_or_else(|| "*".into()),
            hint: "Run: cpedash settings wifi".into(),
        });
    }
    print(&entries, global);
    Ok(())
}
