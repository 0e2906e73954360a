//! Integration tests for the `cpedash` binary.
//!
//! Argument parsing, offline commands and error exit codes, all without a
//! live router.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `cpedash` binary with env isolation.
///
/// Clears all `CPEDASH_*` env vars and points config and cache
/// directories at a nonexistent path.
fn cpedash() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("cpedash");
    cmd.env("HOME", "/tmp/cpedash-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/cpedash-cli-test-nonexistent")
        .env("XDG_CACHE_HOME", "/tmp/cpedash-cli-test-nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("CPEDASH_PROFILE")
        .env_remove("CPEDASH_URL")
        .env_remove("CPEDASH_OUTPUT")
        .env_remove("CPEDASH_LANG")
        .env_remove("CPEDASH_INSECURE")
        .env_remove("CPEDASH_TIMEOUT")
        .env_remove("CPEDASH_USERNAME")
        .env_remove("CPEDASH_PASSWORD");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn report_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const MESH_REPORT: &str = "{'topology information': [\
    {'AL MAC': 'aa:bb:cc:00:00:01', 'Device role': 0, 'Radio Info': [{'BSSINFO': \
    [{'SSID': 'home', 'connected sta info': [{'STA MAC': '11:22:33:44:55:66', \
    'Medium': '2.4G', 'BH STA': False}]}]}]}, \
    {'AL MAC': 'aa:bb:cc:00:00:02', 'Device role': 1, \
    'Upstream 1905 device': 'aa:bb:cc:00:00:01', 'Distance from controller': 1}]}";

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = cpedash().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    cpedash().arg("--help").assert().success().stdout(
        predicate::str::contains("CPE routers")
            .and(predicate::str::contains("topology"))
            .and(predicate::str::contains("wifi-qr"))
            .and(predicate::str::contains("sim")),
    );
}

#[test]
fn test_version_flag() {
    cpedash()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cpedash"));
}

#[test]
fn test_completions_zsh() {
    cpedash()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_sim_subcommands_exist() {
    cpedash().args(["sim", "--help"]).assert().success().stdout(
        predicate::str::contains("status")
            .and(predicate::str::contains("verify-pin"))
            .and(predicate::str::contains("unlock-puk")),
    );
}

// ── Wi-Fi QR ────────────────────────────────────────────────────────

#[test]
fn test_wifi_qr_open_network_escapes_ssid() {
    cpedash()
        .args(["-o", "plain", "wifi-qr", "A;B", "--auth", "open"])
        .assert()
        .success()
        .stdout(r"WIFI:T:nopass;S:A\;B;;".to_owned() + "\n");
}

#[test]
fn test_wifi_qr_hidden_wpa() {
    cpedash()
        .args([
            "-o",
            "plain",
            "wifi-qr",
            "attic",
            "--password",
            "longpassword",
            "--hidden",
        ])
        .assert()
        .success()
        .stdout("WIFI:T:WPA;S:attic;P:longpassword;H:true;;\n");
}

#[test]
fn test_wifi_qr_short_passphrase_is_rejected() {
    cpedash()
        .args(["wifi-qr", "home", "--password", "short"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("password"));
}

#[test]
fn test_wifi_qr_requires_ssid_offline() {
    cpedash()
        .args(["wifi-qr", "--auth", "open"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ssid"));
}

// ── Topology from file ──────────────────────────────────────────────

#[test]
fn test_topology_file_renders_tree() {
    let report = report_file(MESH_REPORT);
    cpedash()
        .args(["topology", "--file"])
        .arg(report.path())
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("Internet\n")
                .and(predicate::str::contains("Controller AA:BB:CC:00:00:01"))
                .and(predicate::str::contains("Agent AA:BB:CC:00:00:02"))
                .and(predicate::str::contains("STA 11:22:33:44:55:66")),
        );
}

#[test]
fn test_topology_file_plain_lists_mesh_macs() {
    let report = report_file(MESH_REPORT);
    cpedash()
        .args(["-o", "plain", "topology", "--file"])
        .arg(report.path())
        .assert()
        .success()
        .stdout("AA:BB:CC:00:00:01\nAA:BB:CC:00:00:02\n");
}

#[test]
fn test_topology_file_json_applies_dhcp() {
    let report = report_file(MESH_REPORT);
    let dhcp = report_file(
        r#"[{"mac": "11-22-33-44-55-66", "ip": "192.168.0.23", "hostname": "tablet"}]"#,
    );
    cpedash()
        .args(["-o", "json", "--quiet", "topology", "--no-internet", "--file"])
        .arg(report.path())
        .arg("--dhcp-file")
        .arg(dhcp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let output = cpedash()
        .args(["-o", "json", "topology", "--no-internet", "--file"])
        .arg(report.path())
        .arg("--dhcp-file")
        .arg(dhcp.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["treeData"]["devRole"], "Controller");
    assert_eq!(value["localHostMac"], "AA:BB:CC:00:00:01");
    let text = value.to_string();
    assert!(text.contains("tablet"), "hostname missing: {text}");
}

#[test]
fn test_topology_warns_when_al_mac_is_missing() {
    let report = report_file(MESH_REPORT);
    cpedash()
        .args(["-o", "plain", "topology", "--al-mac", "00:11:22:33:44:55", "--file"])
        .arg(report.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("00:11:22:33:44:55 is not in the report"));

    cpedash()
        .args(["-o", "plain", "topology", "--al-mac", "aa:bb:cc:00:00:02", "--file"])
        .arg(report.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("not in the report").not());
}

#[test]
fn test_topology_unparseable_file_is_empty_not_error() {
    let report = report_file("<html>not a report</html>");
    cpedash()
        .args(["topology", "--file"])
        .arg(report.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("No topology data"));
}

// ── PLMN help ───────────────────────────────────────────────────────

#[test]
fn test_plmn_help_localized() {
    cpedash()
        .args(["plmn-help", "46000", "--lang", "zh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10086").and(predicate::str::contains("中国移动")));
}

#[test]
fn test_plmn_help_list() {
    cpedash()
        .args(["-o", "plain", "plmn-help", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("46000").and(predicate::str::contains("310260")));
}

#[test]
fn test_plmn_help_unknown_plmn() {
    cpedash()
        .args(["plmn-help", "99999"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("99999"));
}

#[test]
fn test_plmn_help_bad_language() {
    cpedash()
        .args(["plmn-help", "46000", "--lang", "klingon"])
        .assert()
        .code(2);
}

// ── Device-bound error paths ────────────────────────────────────────

#[test]
fn test_invalid_pin_is_rejected_before_any_request() {
    cpedash()
        .args(["--url", "http://127.0.0.1:1", "sim", "verify-pin", "12"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pin"));
}

#[test]
fn test_status_unreachable_router() {
    cpedash()
        .args(["--url", "http://127.0.0.1:1", "--timeout", "2", "status"])
        .assert()
        .code(7);
}

#[test]
fn test_unknown_profile() {
    cpedash()
        .args(["--profile", "nope", "status"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_reboot_needs_confirmation_when_not_interactive() {
    cpedash()
        .args(["--url", "http://127.0.0.1:1", "reboot"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_invalid_output_format() {
    let output = cpedash()
        .args(["--output", "invalid", "status"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("possible values"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    cpedash().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_subcommands_exist() {
    cpedash().args(["config", "--help"]).assert().success().stdout(
        predicate::str::contains("init")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("profiles"))
            .and(predicate::str::contains("set-password")),
    );
}
