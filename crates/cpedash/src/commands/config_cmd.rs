//! Config subcommand handlers.

use dialoguer::{Input, Select};
use serde_json::Value;
use tabled::Tabled;

use cpedash_config::{Config, Profile};
use cpedash_core::DEFAULT_DEVICE_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const MASK: &str = "********";

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "User")]
    username: String,
}

/// Config as JSON with plaintext passwords masked.
fn masked(cfg: &Config) -> Result<Value, CliError> {
    let mut value = serde_json::to_value(cfg)?;
    if let Some(profiles) = value.get_mut("profiles").and_then(Value::as_object_mut) {
        for profile in profiles.values_mut() {
            if let Some(pw) = profile.get_mut("password").filter(|pw| !pw.is_null()) {
                *pw = Value::from(MASK);
            }
        }
    }
    Ok(value)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = cpedash_config::load_config_or_default();
            let value = masked(&cfg)?;
            let out = output::render_single(
                &global.output,
                &value,
                |v| serde_yaml::to_string(v).unwrap_or_default(),
                |_| cpedash_config::config_path().display().to_string(),
            );
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = cpedash_config::load_config_or_default();
            let default = cfg.default_profile_name().to_owned();
            let names: Vec<(&String, &Profile)> = cfg.profiles.iter().collect();
            let out = output::render_list(
                &global.output,
                &names,
                |(name, profile)| ProfileRow {
                    marker: if **name == default { "*".into() } else { String::new() },
                    name: (*name).clone(),
                    url: profile.url.clone(),
                    username: profile.username.clone().unwrap_or_default(),
                },
                |(name, _)| (*name).clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = cpedash_config::load_config_or_default();
            let name = config::active_profile_name(global, &cfg);
            let password = rpassword::prompt_password(format!("Password for '{name}': "))
                .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            cpedash_config::store_password(&name, &password)?;
            if !global.quiet {
                eprintln!("✓ Password for '{name}' stored in system keyring");
            }
            Ok(())
        }
    }
}

/// Interactive wizard. Existing profiles are kept.
fn init() -> Result<(), CliError> {
    let config_path = cpedash_config::config_path();
    eprintln!("cpedash configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let url: String = Input::new()
        .with_prompt("Router URL")
        .default(DEFAULT_DEVICE_URL.into())
        .interact_text()
        .map_err(prompt_err)?;

    let username: String = Input::new()
        .with_prompt("Username")
        .default("admin".into())
        .interact_text()
        .map_err(prompt_err)?;

    let password = rpassword::prompt_password("Password (empty to skip): ").map_err(prompt_err)?;

    let password = if password.is_empty() {
        None
    } else {
        let choices = &[
            "Store in system keyring (recommended)",
            "Save to config file (plaintext)",
        ];
        let selection = Select::new()
            .with_prompt("Where to store the password?")
            .items(choices)
            .default(0)
            .interact()
            .map_err(prompt_err)?;
        if selection == 0 {
            cpedash_config::store_password(&name, &password)?;
            eprintln!("   ✓ Password stored in system keyring");
            None
        } else {
            Some(password)
        }
    };

    let profile = Profile {
        url,
        username: Some(username),
        password,
        ..Profile::default()
    };
    // Fail now rather than on the first device command.
    cpedash_config::profile_to_device_config_without_credentials(
        &profile,
        &cpedash_config::Defaults::default(),
    )?;

    let mut cfg = cpedash_config::load_config_or_default();
    cfg.profiles.insert(name.clone(), profile);
    cfg.default_profile = Some(name.clone());
    let path = cpedash_config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Active profile: {name}");
    eprintln!("\n  Test it: cpedash login && cpedash status");
    Ok(())
}
