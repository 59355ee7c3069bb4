//! Integration tests for the `cubesense` binary.
//!
//! Argument parsing, config handling, and end-to-end reads against a
//! mock sensor cloud.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `cubesense` binary with env isolation.
///
/// Clears all `CUBESENSE_*` env vars and points the config file at a
/// nonexistent path so tests never touch the user's real configuration.
fn cubesense_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("cubesense");
    cmd.env("HOME", "/tmp/cubesense-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/cubesense-cli-test-nonexistent")
        .env("CUBESENSE_CONFIG", "/tmp/cubesense-cli-test-nonexistent/config.toml")
        .env_remove("CUBESENSE_TOKEN")
        .env_remove("CUBESENSE_API_URL")
        .env_remove("CUBESENSE_TTL")
        .env_remove("CUBESENSE_TIMEOUT")
        .env_remove("CUBESENSE_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Same as [`cubesense_cmd`] but wired to a mock cloud.
fn against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = cubesense_cmd();
    cmd.args(["--api-url", &format!("{}/v1", server.uri()), "--token", "test-token"]);
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// One cube ("a") with a battery and one non-cube sensor ("b").
async fn mock_fleet() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                { "uid": "a", "name": "Living Room", "type": "cube" },
                { "uid": "b", "name": "Hallway", "type": "sense" }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device": {
                "uid": "a",
                "name": "Living Room",
                "type": "cube",
                "extra": { "last_state": { "battery": 2400 } }
            }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device": { "uid": "b", "name": "Hallway", "type": "sense" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/a/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "field_list": ["time", "temp", "humidity", "voc", "battery"],
            "results": [["2016-01-01T10:00:00Z", 21.5, 40, 1200, 1100]]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/devices/b/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "field_list": ["temp"],
            "results": [[18.0]]
        })))
        .mount(&server)
        .await;

    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = cubesense_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    cubesense_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("devices")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("refresh")),
    );
}

#[test]
fn test_version_flag() {
    cubesense_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cubesense"));
}

#[test]
fn test_completions_bash() {
    cubesense_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_output_format() {
    let output = cubesense_cmd()
        .args(["devices", "-o", "xml"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cubesense.toml");

    cubesense_cmd()
        .env("CUBESENSE_CONFIG", &path)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cubesense.toml"));
}

#[test]
fn test_config_show_redacts_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "token = \"super-secret\"\nttl = 45\n").unwrap();

    cubesense_cmd()
        .env("CUBESENSE_CONFIG", &path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("ttl = 45")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("super-secret").not()),
        );
}

#[test]
fn test_malformed_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "ttl = \"later\"\n").unwrap();

    let output = cubesense_cmd()
        .env("CUBESENSE_CONFIG", &path)
        .args(["--token", "t", "devices"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

// ── Cloud reads ─────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_json_merges_info_and_state() {
    let server = mock_fleet().await;

    let output = against(&server)
        .args(["devices", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let devices: Value = serde_json::from_slice(&output.stdout).unwrap();
    let devices = devices.as_array().unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0]["id"], "a");
    assert_eq!(devices[0]["name"], "Living Room");
    assert_eq!(devices[0]["data"]["temperature"], 21.5);
    assert_eq!(devices[1]["id"], "b");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_table_and_cube_filter() {
    let server = mock_fleet().await;

    against(&server)
        .args(["devices", "--cubes"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Living Room")
                .and(predicate::str::contains("21.5°C"))
                .and(predicate::str::contains("Fair"))
                .and(predicate::str::contains("Hallway").not()),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_device_services() {
    let server = mock_fleet().await;

    against(&server)
        .args(["--color", "never", "show", "a"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Manufacturer:  CubeSensors")
                .and(predicate::str::contains("CO2 detected:  abnormal"))
                .and(predicate::str::contains("Battery state: low"))
                .and(predicate::str::contains("Living Room Air Quality")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_unknown_device() {
    let server = mock_fleet().await;

    let output = against(&server).args(["show", "zzz"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_reports_count() {
    let server = mock_fleet().await;

    against(&server)
        .args(["refresh", "-o", "json-compact"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"devices":2,"ids":["a","b"]}"#));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_count() {
    let server = mock_fleet().await;

    against(&server)
        .args(["watch", "--interval", "0", "--count", "2", "-o", "plain"])
        .assert()
        .success()
        .stdout("a\nb\na\nb\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_token_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "bad token" })))
        .mount(&server)
        .await;

    let output = against(&server).arg("devices").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failing_device_is_left_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [{ "uid": "ok" }, { "uid": "broken" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/devices/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "device": { "uid": "ok" } })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/devices/ok/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "field_list": [], "results": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/devices/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/devices/broken/current"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    against(&server)
        .args(["devices", "-o", "plain"])
        .assert()
        .success()
        .stdout("ok\n");
}
