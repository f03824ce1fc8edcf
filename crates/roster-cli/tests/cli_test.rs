//! CLI integration tests using assert_cmd
//!
//! The fetch tests run the binary against a mock platform.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn roster_cmd(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("roster").expect("Failed to find roster binary");
    cmd.current_dir(workdir).env_remove("RUST_LOG");
    cmd
}

/// Write a config pointing every endpoint at `base`
fn write_config(dir: &Path, base: &str, credentials: &str) -> PathBuf {
    let content = format!(
        r#"
tenant = "acme"
email = "ops@acme.test"
{credentials}

[endpoints]
auth_v1 = "{base}/{{customer}}/api/v1/auth"
auth_v2 = "{base}/{{customer}}/api/v2/auth"
applications = "{base}/{{customer}}/api/applications"
projects = "{base}/{{customer}}/api/projects"
branches = "{base}/{{customer}}/api/branches?page[limit]={{limit}}&page[offset]={{offset}}"
role_assignments = "{base}/{{customer}}/api/roleassignments"
resource_urn = "urn:{{customer}}:project:{{project_id}}"

[fetch]
retry_attempts = 1
timeout_secs = 5

[log]
level = "warn"
"#
    );
    let path = dir.join("roster.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/acme/api/v1/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t0k"})))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_applications(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/acme/api/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{
            "id": "a1",
            "attributes": {"name": "Payments", "description": "card flows"},
            "relationships": {"projects": {"data": [{"id": "P1"}]}}
        }]})))
        .mount(server)
        .await;
}

/// Projects endpoint, expected to be hit `calls` times
async fn mount_projects(server: &MockServer, calls: u64) {
    Mock::given(method("GET"))
        .and(path("/acme/api/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"id": "P1", "attributes": {"name": "web", "type": "sast", "properties": {"team": "core"}}},
            {"id": "P2", "attributes": {"name": "api", "type": "sca", "properties": {}}}
        ]})))
        .expect(calls)
        .mount(server)
        .await;
}

async fn mount_branches(server: &MockServer, data: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/acme/api/branches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

fn default_branches() -> serde_json::Value {
    json!([
        {"attributes": {"name": "main"}, "relationships": {"project": {"data": {"id": "P1"}}}},
        {"attributes": {"name": "dev"}, "relationships": {"project": {"data": {"id": "P1"}}}},
        {"attributes": {"name": "main"}, "relationships": {"project": {"data": {"id": "P2"}}}}
    ])
}

async fn mount_role_assignments(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/acme/api/roleassignments"))
        .and(query_param("filter[resource]", "urn:acme:project:P1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "included": [{"type": "user", "id": "u1", "attributes": {"name": "Alice", "email": "alice@x.com"}}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/acme/api/roleassignments"))
        .and(query_param("filter[resource]", "urn:acme:project:P2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "included": [{"type": "group", "id": "g1", "attributes": {"name": "QA"}}]
        })))
        .mount(server)
        .await;
}

async fn mount_platform(server: &MockServer) {
    mount_auth(server).await;
    mount_applications(server).await;
    mount_projects(server, 1).await;
    mount_branches(server, default_branches()).await;
    mount_role_assignments(server).await;
}

/// A server that fails the test if it receives any request
async fn silent_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    server
}

fn seed(run_dir: &Path, file: &str, content: &serde_json::Value) {
    fs::create_dir_all(run_dir).expect("Failed to create run dir");
    fs::write(run_dir.join(file), content.to_string()).expect("Failed to write snapshot");
}

const EXPECTED_REPORT: [&str; 3] = [
    "Application Name,Project Name,Project ID,Type,Name,Email,Branch Name 1,Branch Name 2,Branch Name 3,Branch Name 4,Branch Name 5",
    "Payments,web,P1,Individual User,Alice,alice@x.com,main,dev,,,",
    "No Application Name,api,P2,Group,QA,,main,,,,",
];

fn read_report(run_dir: &Path) -> String {
    fs::read_to_string(run_dir.join("project_report.csv")).expect("Failed to read report")
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    roster_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    roster_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("roster"));
}

#[test]
fn test_invalid_mode_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    roster_cmd(dir.path())
        .args(["fetch", "--mode", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid snapshot mode"));
}

#[test]
fn test_fetch_without_credentials_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(dir.path(), "http://127.0.0.1:9", "");

    roster_cmd(dir.path())
        .arg("fetch")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "either a password or an access token is required",
        ));
}

#[test]
fn test_report_without_snapshots_fails() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(dir.path(), "http://127.0.0.1:9", "password = \"x\"");

    roster_cmd(dir.path())
        .arg("report")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Snapshot not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_builds_report() {
    let server = MockServer::start().await;
    mount_platform(&server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(dir.path(), &server.uri(), "password = \"hunter2\"");
    let output = dir.path().join("out");

    roster_cmd(dir.path())
        .args(["fetch", "--yes", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 rows)"));

    let run_dir = output.join("acme");
    for file in [
        "applications.json",
        "projects.json",
        "branches.json",
        "role_assignments.json",
        "applications.csv",
        "project_properties.csv",
        "branches.csv",
        "user_group_role_details.csv",
    ] {
        assert!(run_dir.join(file).exists(), "missing {file}");
    }

    let report = read_report(&run_dir);
    assert_eq!(report.lines().collect::<Vec<_>>(), EXPECTED_REPORT);

    // Report subcommand reproduces the same file from the snapshots
    roster_cmd(dir.path())
        .args(["report", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();
    assert_eq!(read_report(&run_dir), report);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_declined_prompt_cancels_without_network() {
    let server = silent_server().await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(dir.path(), &server.uri(), "password = \"hunter2\"");
    let output = dir.path().join("out");
    let run_dir = output.join("acme");
    seed(&run_dir, "applications.json", &json!([]));

    roster_cmd(dir.path())
        .args(["fetch", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[y/N]"))
        .stdout(predicate::str::contains("Cancelled."));

    assert!(run_dir.join("applications.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_confirmed_then_declined_keeps_every_snapshot() {
    let server = silent_server().await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(dir.path(), &server.uri(), "password = \"hunter2\"");
    let output = dir.path().join("out");
    let run_dir = output.join("acme");
    seed(&run_dir, "applications.json", &json!([]));
    seed(&run_dir, "branches.json", &json!([]));

    roster_cmd(dir.path())
        .args(["fetch", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .write_stdin("y\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));

    assert!(run_dir.join("applications.json").exists());
    assert!(run_dir.join("branches.json").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_stage_stops_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/acme/api/v2/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t0k"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(dir.path(), &server.uri(), "access_token = \"pat\"");
    let output = dir.path().join("out");

    roster_cmd(dir.path())
        .args(["fetch", "--mode", "always-fetch", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No applications collected"));

    assert!(!output.join("acme").join("project_report.csv").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_refetch_clears_stale_snapshot() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    mount_applications(&server).await;
    mount_projects(&server, 1).await;
    mount_branches(&server, json!([])).await;
    mount_role_assignments(&server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(dir.path(), &server.uri(), "password = \"hunter2\"");
    let output = dir.path().join("out");
    let run_dir = output.join("acme");
    seed(
        &run_dir,
        "branches.json",
        &json!([{"name": "STALE-from-last-run", "project_id": "P1"}]),
    );
    fs::write(run_dir.join("branches.csv"), "Project ID,Branch Name\n")
        .expect("Failed to write table");

    roster_cmd(dir.path())
        .args(["fetch", "--mode", "always-fetch", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No branches collected"));

    assert!(!run_dir.join("branches.json").exists());
    assert!(!run_dir.join("branches.csv").exists());
    assert!(run_dir.join("applications.json").exists());

    roster_cmd(dir.path())
        .args(["report", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Snapshot not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_existing_projects_snapshot_skips_projects_fetch() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    mount_applications(&server).await;
    mount_projects(&server, 0).await;
    mount_branches(&server, default_branches()).await;
    mount_role_assignments(&server).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(dir.path(), &server.uri(), "password = \"hunter2\"");
    let output = dir.path().join("out");
    let run_dir = output.join("acme");
    seed(
        &run_dir,
        "projects.json",
        &json!([
            {"id": "P1", "name": "web", "type": "sast", "properties": {"team": "core"}},
            {"id": "P2", "name": "api", "type": "sca", "properties": {"none": "none"}}
        ]),
    );

    roster_cmd(dir.path())
        .args(["fetch", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 rows)"));

    assert_eq!(
        read_report(&run_dir).lines().collect::<Vec<_>>(),
        EXPECTED_REPORT
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reusing_every_snapshot_skips_login() {
    let live = MockServer::start().await;
    mount_platform(&live).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let output = dir.path().join("out");
    let run_dir = output.join("acme");
    let config = write_config(dir.path(), &live.uri(), "password = \"hunter2\"");
    roster_cmd(dir.path())
        .args(["fetch", "--yes", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();
    fs::remove_file(run_dir.join("project_report.csv")).expect("Failed to remove report");

    // Second run against a server that must see no traffic, not even login
    let offline = silent_server().await;
    let config = write_config(dir.path(), &offline.uri(), "password = \"hunter2\"");
    roster_cmd(dir.path())
        .args(["fetch", "--mode", "reuse", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 rows)"));

    assert_eq!(
        read_report(&run_dir).lines().collect::<Vec<_>>(),
        EXPECTED_REPORT
    );
}
