use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tempfile::{NamedTempFile, TempDir};
use tokio::time::{sleep, timeout};

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config with all paths inside `dir`. The daemon
/// URLs point at closed ports; the clients connect lazily, so startup
/// succeeds without them.
fn minimal_config(port: u16, dir: &Path) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {port}

[database]
path = "{dir}/fablearr.db"

[storage]
download_path = "{dir}/downloads"
library_path = "{dir}/library"

[qbittorrent]
url = "http://127.0.0.1:9"
password = "test-password"

[audiobookshelf]
url = "http://127.0.0.1:9"
api_key = "test-api-key"
"#,
        port = port,
        dir = dir.display(),
    )
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_fablearr"))
        .env("FABLEARR_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Start a server in a temp dir and wait until it answers.
async fn start_test_server() -> (u16, tokio::process::Child, NamedTempFile, TempDir) {
    let port = get_available_port();
    let temp_dir = TempDir::new().unwrap();

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(minimal_config(port, temp_dir.path()).as_bytes())
        .unwrap();
    temp_file.flush().unwrap();

    let server = spawn_server(temp_file.path()).await;
    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    (port, server, temp_file, temp_dir)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (port, mut server, _config, _temp_dir) = start_test_server().await;

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_config_endpoint_returns_sanitized() {
    let (port, mut server, _config, temp_dir) = start_test_server().await;

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["server"]["port"], port);
    assert_eq!(
        json["database"]["path"],
        format!("{}/fablearr.db", temp_dir.path().display())
    );
    assert_eq!(json["qbittorrent"]["password_configured"], true);
    assert!(json["qbittorrent"].get("password").is_none());
    assert_eq!(json["audiobookshelf"]["api_key_configured"], true);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_metrics_endpoint_exposed() {
    let (port, mut server, _config, _temp_dir) = start_test_server().await;

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/metrics", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body = response.text().await.expect("Failed to read body");
    assert!(body.contains("fablearr_jobs_by_status"));

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_fablearr"))
            .env("FABLEARR_CONFIG", "/nonexistent/config.toml")
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_missing_audiobookshelf_section_exits_with_error() {
    let config_without_catalog = r#"
[qbittorrent]
url = "http://127.0.0.1:9"
password = "test-password"
"#;

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(config_without_catalog.as_bytes())
        .unwrap();
    temp_file.flush().unwrap();

    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_fablearr"))
            .env("FABLEARR_CONFIG", temp_file.path())
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_invalid_poll_interval_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = minimal_config(get_available_port(), temp_dir.path());
    config.push_str("\n[downloader]\npoll_interval_ms = 0\n");

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(config.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_fablearr"))
            .env("FABLEARR_CONFIG", temp_file.path())
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}
