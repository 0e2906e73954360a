//! Clap derive structures for the `cpedash` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Kept
//! free of workspace imports so `build.rs` can render man pages from it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cpedash -- dashboard for 5G/LTE CPE routers
#[derive(Debug, Parser)]
#[command(
    name = "cpedash",
    version,
    about = "Monitor and manage 5G/LTE CPE routers from the command line",
    long_about = "Talks to the router's CGI command API: session handling, status \
        and settings, mesh topology, SIM PIN/PUK, Wi-Fi QR payloads.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Router profile to use
    #[arg(long, short = 'p', env = "CPEDASH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Router URL (overrides profile)
    #[arg(long, short = 'u', env = "CPEDASH_URL", global = true)]
    pub url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CPEDASH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Language for operator help text (en, zh, de, fr)
    #[arg(long, env = "CPEDASH_LANG", global = true)]
    pub lang: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CPEDASH_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CPEDASH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table or tree (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and cache the session token
    Login(LoginArgs),

    /// End the session and drop the cached token
    Logout,

    /// Re-validate the cached session with the router
    Session,

    /// Show live device status (public, no login needed)
    #[command(alias = "st")]
    Status,

    /// Show connection, Wi-Fi, account and enumeration settings
    Settings(SettingsArgs),

    /// Show the mesh topology tree
    #[command(alias = "topo")]
    Topology(TopologyArgs),

    /// Build a `WIFI:` QR payload
    WifiQr(WifiQrArgs),

    /// SIM PIN / PUK operations
    Sim(SimArgs),

    /// Show operator help for a PLMN
    PlmnHelp(PlmnHelpArgs),

    /// Reboot the router
    Reboot,

    /// Poll the router and print updates until interrupted
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Session ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (defaults to the profile's, then prompts)
    #[arg(long)]
    pub username: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Only fetch one section
    #[arg(value_enum)]
    pub section: Option<SettingsSection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SettingsSection {
    /// WAN connection mode, APN, roaming
    Connection,
    /// Wireless networks
    Wifi,
    /// Account privilege level
    Account,
    /// Country and channel tables
    Global,
}

// ── Topology ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TopologyArgs {
    /// Read a saved topology report instead of querying the router
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// DHCP lease list (JSON array) used with --file
    #[arg(long, requires = "file")]
    pub dhcp_file: Option<PathBuf>,

    /// AL MAC of the device this dashboard runs on
    #[arg(long)]
    pub al_mac: Option<String>,

    /// Do not add the synthetic Internet root
    #[arg(long)]
    pub no_internet: bool,
}

// ── Wi-Fi QR ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WifiQrArgs {
    /// Network name. Without --from-device this builds the payload offline.
    pub ssid: Option<String>,

    /// Network key
    #[arg(long, short = 'P')]
    pub password: Option<String>,

    /// Security type
    #[arg(long, value_enum, default_value = "wpa")]
    pub auth: QrAuth,

    /// Mark the network as hidden
    #[arg(long)]
    pub hidden: bool,

    /// Read networks from the router (SSID filters the list)
    #[arg(long, conflicts_with_all = ["password", "hidden"])]
    pub from_device: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QrAuth {
    /// Open network, no key
    Open,
    Wep,
    /// WPA/WPA2 personal
    Wpa,
    /// WPA3 personal
    Sae,
}

// ── SIM ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SimArgs {
    #[command(subcommand)]
    pub command: SimCommand,
}

#[derive(Debug, Subcommand)]
pub enum SimCommand {
    /// Show lock state and remaining attempts
    Status,

    /// Unlock the SIM with its PIN
    VerifyPin {
        /// 4-8 digit PIN
        pin: String,
    },

    /// Unlock a PUK-blocked SIM and set a new PIN
    UnlockPuk {
        /// 8 digit PUK
        puk: String,
        /// New 4-8 digit PIN
        new_pin: String,
    },
}

// ── PLMN help ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PlmnHelpArgs {
    /// MCC+MNC code (e.g. 46000). Defaults to the SIM's current PLMN.
    pub plmn: Option<String>,

    /// List PLMNs with help content
    #[arg(long, conflicts_with = "plmn")]
    pub list: bool,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this long (e.g. "30s", "5m")
    #[arg(long, value_name = "DURATION")]
    pub duration: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the resolved configuration (passwords masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Store a profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
