// ── Form validation ──
//
// Local checks run before a save or mutation is sent. A failure blocks
// the request entirely and names the offending field.

use crate::error::CoreError;
use crate::model::MacAddress;

type Result<T = ()> = std::result::Result<T, CoreError>;

/// Unicast MAC address in colon, dash or bare-hex form.
pub fn mac(field: &str, value: &str) -> Result<MacAddress> {
    let mac = MacAddress::new(value);
    if !mac.is_well_formed() {
        return Err(CoreError::validation(
            field,
            format!("'{value}' is not a MAC address"),
        ));
    }
    if mac.as_str() == "00:00:00:00:00:00" || mac.as_str() == "FF:FF:FF:FF:FF:FF" {
        return Err(CoreError::validation(field, "reserved MAC address"));
    }
    let multicast = mac
        .as_str()
        .get(..2)
        .and_then(|o| u8::from_str_radix(o, 16).ok())
        .is_some_and(|first| first & 1 == 1);
    if multicast {
        return Err(CoreError::validation(field, "multicast MAC address"));
    }
    Ok(mac)
}

fn digits(field: &str, value: &str, min: usize, max: usize) -> Result {
    let ok = (min..=max).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit());
    if ok {
        return Ok(());
    }
    let message = if min == max {
        format!("must be exactly {min} digits")
    } else {
        format!("must be {min} to {max} digits")
    };
    Err(CoreError::validation(field, message))
}

/// SIM PIN: 4 to 8 digits.
pub fn pin(field: &str, value: &str) -> Result {
    digits(field, value, 4, 8)
}

/// SIM PUK: exactly 8 digits.
pub fn puk(field: &str, value: &str) -> Result {
    digits(field, value, 8, 8)
}

/// SSID: 1 to 32 bytes.
pub fn ssid(field: &str, value: &str) -> Result {
    if value.is_empty() || value.len() > 32 {
        return Err(CoreError::validation(field, "must be 1 to 32 bytes"));
    }
    Ok(())
}

/// WPA pre-shared key: 8 to 63 printable ASCII characters, or a raw
/// 64-digit hex key.
pub fn wpa_passphrase(field: &str, value: &str) -> Result {
    let raw_key = value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit());
    let passphrase = (8..=63).contains(&value.len()) && value.bytes().all(|b| (0x20..=0x7e).contains(&b));
    if raw_key || passphrase {
        return Ok(());
    }
    Err(CoreError::validation(
        field,
        "must be 8 to 63 printable characters or 64 hex digits",
    ))
}
