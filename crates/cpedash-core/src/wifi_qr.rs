// ── Wi-Fi QR payloads ──
//
// Builds the `WIFI:` URI that phone cameras understand, from the SSID,
// key and the router's numeric auth-type code.

use std::fmt::Write as _;

use strum::{Display, EnumString};

use crate::model::WifiNetwork;

/// Security family as it appears in the `T:` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum WifiAuth {
    #[strum(serialize = "nopass")]
    Open,
    #[strum(serialize = "WEP")]
    Wep,
    #[strum(serialize = "WPA")]
    Wpa,
    #[strum(serialize = "SAE")]
    Sae,
}

impl WifiAuth {
    /// Map the router's auth-type code.
    ///
    /// `0` open, `1`..`3` WPA/WPA2 personal, `4` WPA3-SAE, `5` WPA2/WPA3
    /// transition, `6` WEP. Unknown codes are treated as WPA, which every
    /// scanner accepts.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => Self::Open,
            "4" => Self::Sae,
            "6" => Self::Wep,
            _ => Self::Wpa,
        }
    }
}

/// Backslash-escape the characters the URI scheme reserves.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ';' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render the QR payload. The password is left out for open networks.
pub fn qr_payload(ssid: &str, password: Option<&str>, auth: WifiAuth, hidden: bool) -> String {
    let mut uri = format!("WIFI:T:{auth};S:{};", escape(ssid));
    if auth != WifiAuth::Open {
        let _ = write!(uri, "P:{};", escape(password.unwrap_or_default()));
    }
    if hidden {
        uri.push_str("H:true;");
    }
    uri.push(';');
    uri
}

/// Payload for a network as reported in the Wi-Fi settings.
pub fn network_payload(network: &WifiNetwork) -> String {
    let auth = network
        .auth_type
        .as_deref()
        .map_or(WifiAuth::Wpa, WifiAuth::from_code);
    qr_payload(
        &network.ssid,
        network.password.as_deref(),
        auth,
        network.hidden,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn open_network_omits_password_and_escapes_ssid() {
        let uri = qr_payload("A;B", Some("p\\q"), WifiAuth::from_code("0"), false);
        assert_eq!(uri, r"WIFI:T:nopass;S:A\;B;;");
    }

    #[test]
    fn sae_code_maps_to_sae() {
        let uri = qr_payload("home", Some("secret99"), WifiAuth::from_code("4"), false);
        assert_eq!(uri, "WIFI:T:SAE;S:home;P:secret99;;");
    }

    #[test]
    fn password_is_escaped() {
        let uri = qr_payload("lab", Some("a;b\\c"), WifiAuth::Wpa, false);
        assert_eq!(uri, r"WIFI:T:WPA;S:lab;P:a\;b\\c;;");
    }

    #[test]
    fn auth_codes() {
        assert_eq!(WifiAuth::from_code("1"), WifiAuth::Wpa);
        assert_eq!(WifiAuth::from_code("3"), WifiAuth::Wpa);
        assert_eq!(WifiAuth::from_code("5"), WifiAuth::Wpa);
        assert_eq!(WifiAuth::from_code("6"), WifiAuth::Wep);
        assert_eq!(WifiAuth::from_code("99"), WifiAuth::Wpa);
    }

    #[test]
    fn hidden_flag_is_appended() {
        let network = WifiNetwork {
            ssid: "attic".into(),
            auth_type: Some("2".into()),
            password: Some("longpassword".into()),
            hidden: true,
            ..WifiNetwork::default()
        };
        assert_eq!(
            network_payload(&network),
            "WIFI:T:WPA;S:attic;P:longpassword;H:true;;"
        );
    }
}
