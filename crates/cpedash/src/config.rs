//! Profile resolution with CLI flag overrides, and the `Dashboard` a
//! device-bound command runs against.

use std::str::FromStr;
use std::sync::Arc;

use cpedash_config::{Config, Profile};
use cpedash_core::plmn::Language;
use cpedash_core::{Dashboard, DeviceConfig, FileTokenStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// The active profile with `--url`, `--insecure` and `--timeout` applied.
///
/// With no config at all the factory defaults apply. Naming a profile
/// that doesn't exist is an error.
pub fn effective_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, cfg);

    let mut profile = match cfg.profiles.get(&name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
                name,
            });
        }
        None => Profile::default(),
    };

    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    Ok((name, profile))
}

pub fn device_config(global: &GlobalOpts) -> Result<(String, DeviceConfig), CliError> {
    let cfg = cpedash_config::load_config_or_default();
    let (name, profile) = effective_profile(global, &cfg)?;
    let device = cpedash_config::profile_to_device_config(&profile, &name, &cfg.defaults)?;
    Ok((name, device))
}

/// Build a `Dashboard` whose session token is cached per profile.
pub fn connect(global: &GlobalOpts) -> Result<Dashboard, CliError> {
    let (name, device) = device_config(global)?;
    let tokens = FileTokenStore::new(cpedash_config::session_token_path(&name));
    tracing::debug!(profile = %name, url = %device.url, "connecting");
    Ok(Dashboard::new(device, Arc::new(tokens))?)
}

/// `--lang`, then the config default, then English.
pub fn language(global: &GlobalOpts) -> Result<Language, CliError> {
    let raw = match global.lang {
        Some(ref lang) => lang.clone(),
        None => cpedash_config::load_config_or_default().defaults.language,
    };
    Language::from_str(&raw).map_err(|_| CliError::Validation {
        field: "lang".into(),
        reason: format!("unsupported language '{raw}' (expected en, zh, de or fr)"),
    })
}
