//! Integration tests for the `pifly` CLI binary.
//!
//! Argument parsing, help output, and completions run without a device;
//! status and control commands run against a `wiremock` stand-in.
#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// A `pifly` command isolated from the user's environment and config.
fn pifly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("pifly");
    cmd.env("HOME", "/tmp/pifly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/pifly-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("PIFLY_PROFILE")
        .env_remove("PIFLY_URL")
        .env_remove("PIFLY_OUTPUT")
        .env_remove("PIFLY_TIMEOUT")
        .env_remove("PIFLY_DEFAULT_PROFILE")
        .env_remove("RUST_LOG");
    cmd
}

/// Same, with the config directory rooted at `dir`.
fn pifly_cmd_in(dir: &Path) -> assert_cmd::Command {
    let mut cmd = pifly_cmd();
    cmd.env("HOME", dir).env("XDG_CONFIG_HOME", dir);
    cmd
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: &[&str]) -> Output {
    let args: Vec<String> = args.iter().map(|a| (*a).to_owned()).collect();
    tokio::task::spawn_blocking(move || pifly_cmd().args(&args).output().unwrap())
        .await
        .unwrap()
}

fn hold_payload(setpoint: u32) -> Value {
    json!({
        "status": {"mode": "Hold", "units": "F", "p_mode": 2},
        "current": {"PSP": setpoint, "P": {"Grill": 224}, "F": {"Probe1": 150.5}}
    })
}

async fn device(payload: &Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;
    server
}

async fn accept(server: &MockServer, http_method: &str, endpoint: &str) {
    Mock::given(method(http_method))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "success"})))
        .expect(1)
        .mount(server)
        .await;
}

/// Nothing listens here, so any request fails with a connection error.
const DEAD_URL: &str = "http://127.0.0.1:9";

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = pifly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    pifly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("PiFire")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("hold"))
            .and(predicate::str::contains("smoke-plus")),
    );
}

#[test]
fn test_version_flag() {
    pifly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pifly"));
}

#[test]
fn test_completions_bash() {
    pifly_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pifly"));
}

// ── Argument errors ─────────────────────────────────────────────────

#[test]
fn test_invalid_output_format() {
    let output = pifly_cmd()
        .args(["--output", "csv", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_pmode_out_of_range() {
    let output = pifly_cmd().args(["pmode", "10"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("10"));
}

#[test]
fn test_unknown_mode_rejected() {
    let output = pifly_cmd().args(["mode", "sear"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_prime_zero_rejected_before_connecting() {
    // A connection attempt would exit 7; validation exits 2.
    let output = pifly_cmd()
        .args(["--url", DEAD_URL, "prime", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("grams"));
}

#[test]
fn test_system_requires_confirmation() {
    let output = pifly_cmd()
        .args(["--url", DEAD_URL, "system", "reboot"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[test]
fn test_unreachable_device_exit_code() {
    let output = pifly_cmd()
        .args(["--url", DEAD_URL, "--timeout", "2", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_missing_profile() {
    let output = pifly_cmd()
        .args(["--profile", "cabin", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("cabin"));
}

// ── Against a device ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json() {
    let server = device(&hold_payload(225)).await;
    let output = run(&["--url", &server.uri(), "-o", "json", "status"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["mode"], "hold");
    assert_eq!(report["setpoint"], 225.0);
    assert_eq!(report["grill_temp"], 224.0);
    assert_eq!(report["probe_temps"]["Probe1"], 150.5);
    assert_eq!(report["poll_interval"], "fast");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_plain() {
    let server = device(&hold_payload(225)).await;
    let output = run(&["--url", &server.uri(), "-o", "plain", "status"]).await;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.first(), Some(&"mode=hold"));
    assert!(lines.contains(&"Grill=224"));
    assert!(lines.contains(&"Probe1=150.5"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sensors_list() {
    let server = device(&hold_payload(225)).await;
    let output = run(&["--url", &server.uri(), "-o", "plain", "sensors"]).await;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("recipe"));
    assert!(stdout.contains("runtime"));
    assert!(stdout.contains("probe:Grill"));
    assert!(stdout.contains("probe:Probe1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pmode_sends_command() {
    let server = device(&hold_payload(225)).await;
    accept(&server, "GET", "/api/set/pmode/3").await;

    let output = run(&["--url", &server.uri(), "pmode", "3"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("P-mode set to 3"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_hold_defaults_to_current_setpoint() {
    let server = device(&hold_payload(250)).await;
    accept(&server, "GET", "/api/set/mode/hold/250").await;

    let output = run(&["--url", &server.uri(), "hold"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_hold_outside_unit_range() {
    let server = device(&hold_payload(225)).await;
    Mock::given(any())
        .and(path("/api/set/mode/hold/600"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run(&["--url", &server.uri(), "hold", "600"]).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("temperature"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_system_restart_posts() {
    let server = device(&hold_payload(225)).await;
    accept(&server, "POST", "/api/cmd/restart").await;

    let output = run(&["--url", &server.uri(), "system", "restart", "--yes"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_count() {
    let server = device(&hold_payload(225)).await;
    let output = run(&[
        "--url",
        &server.uri(),
        "-o",
        "json",
        "watch",
        "--count",
        "1",
    ])
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1);
    let update: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(update["mode"], "hold");
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    pifly_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_init_then_use() {
    let dir = tempfile::tempdir().unwrap();

    pifly_cmd_in(dir.path())
        .args(["config", "init", "http://10.0.0.7:8080", "--name", "patio"])
        .assert()
        .success();

    let output = pifly_cmd_in(dir.path())
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["default_profile"], "patio");
    assert_eq!(shown["profiles"]["patio"]["url"], "http://10.0.0.7:8080");

    let output = pifly_cmd_in(dir.path())
        .args(["config", "use", "cabin"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("patio"));
}

#[test]
fn test_config_init_rejects_bad_url() {
    let dir = tempfile::tempdir().unwrap();
    pifly_cmd_in(dir.path())
        .args(["config", "init", "ftp://grill"])
        .assert()
        .failure();
    assert!(!dir.path().join("pifly").join("config.toml").exists());
}
