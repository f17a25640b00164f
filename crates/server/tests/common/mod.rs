//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that assembles the full router
//! in-process with a scripted torrent daemon and media catalog, enabling
//! endpoint testing without external infrastructure.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use fablearr_core::{
    testing::{MockMediaCatalog, MockTorrentClient},
    AudiobookshelfConfig, Config, DatabaseConfig, DownloadManager, DownloadStore,
    DownloaderConfig, FsOrganizer, LoggingConfig, MediaCatalog, NewSearchResult, Organizer,
    OrganizerConfig, QBittorrentConfig, ServerConfig, SqliteDownloadStore, StorageConfig,
    TorrentClient,
};

/// Re-export fixtures for test convenience
pub use fablearr_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - The torrent daemon (MockTorrentClient)
/// - The media catalog (MockMediaCatalog)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_result_ingestion() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/results", json!({
///         "query": "mistborn",
///         "title": "Mistborn by Brandon Sanderson"
///     })).await;
///
///     assert_eq!(response.status, StatusCode::CREATED);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock torrent daemon - script transfer progress and failures
    pub torrent_client: Arc<MockTorrentClient>,
    /// Mock media catalog - configure libraries and scan behavior
    pub catalog: Arc<MockMediaCatalog>,
    /// The download manager behind the router
    pub manager: Arc<DownloadManager>,
    /// Temporary directory for the test database and storage roots
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let download_path = temp_dir.path().join("downloads");
        let library_path = temp_dir.path().join("library");
        std::fs::create_dir_all(&download_path).expect("Failed to create download dir");
        std::fs::create_dir_all(&library_path).expect("Failed to create library dir");

        // Create mocks
        let torrent_client = Arc::new(MockTorrentClient::new());
        let catalog = Arc::new(MockMediaCatalog::new());

        // Tight polling so lifecycle tests settle quickly
        let downloader = DownloaderConfig {
            poll_interval_ms: 25,
            grace_attempts: 4,
            max_poll_attempts: 400,
            ..Default::default()
        };

        // Create config
        let config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            storage: StorageConfig {
                download_path: download_path.clone(),
                library_path,
            },
            downloader: downloader.clone(),
            qbittorrent: QBittorrentConfig {
                url: "http://127.0.0.1:8080".to_string(),
                username: "admin".to_string(),
                password: "test-password".to_string(),
                timeout_secs: 5,
            },
            audiobookshelf: AudiobookshelfConfig {
                url: "http://127.0.0.1:13378".to_string(),
                api_key: "test-api-key".to_string(),
                timeout_secs: 5,
            },
            logging: LoggingConfig::default(),
        };

        // Create store and organizer
        let store = Arc::new(SqliteDownloadStore::new(&db_path).expect("Failed to create store"));
        let organizer = Arc::new(FsOrganizer::new(OrganizerConfig::from(&config.storage)));

        // Create download manager
        let manager = Arc::new(DownloadManager::new(
            downloader,
            download_path,
            Arc::clone(&store) as Arc<dyn DownloadStore>,
            Arc::clone(&torrent_client) as Arc<dyn TorrentClient>,
            organizer as Arc<dyn Organizer>,
            Arc::clone(&catalog) as Arc<dyn MediaCatalog>,
        ));

        // Create app state with mocks
        let state = Arc::new(fablearr_server::state::AppState::new(
            config,
            Arc::clone(&store) as Arc<dyn DownloadStore>,
            Arc::clone(&torrent_client) as Arc<dyn TorrentClient>,
            Arc::clone(&catalog) as Arc<dyn MediaCatalog>,
            Arc::clone(&manager),
        ));

        // Create router
        let router = fablearr_server::api::create_router(state);

        Self {
            router,
            torrent_client,
            catalog,
            manager,
            temp_dir,
        }
    }

    /// Ingest a search result through the API, returning its id.
    pub async fn seed_result(&self, result: NewSearchResult) -> i64 {
        let body = serde_json::to_value(&result).expect("Failed to serialize result");
        let response = self.post("/api/v1/results", body).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "seeding search result failed: {}",
            response.body
        );
        response.body["id"].as_i64().expect("result id")
    }

    /// Create the on-disk payload the daemon would have downloaded.
    pub fn make_download_payload(&self, name: &str) -> PathBuf {
        let dir = self.temp_dir.path().join("downloads").join(name);
        std::fs::create_dir_all(&dir).expect("Failed to create payload dir");
        std::fs::write(dir.join("01 - Chapter One.mp3"), b"audio-1").unwrap();
        std::fs::write(dir.join("cover.jpg"), b"jpeg").unwrap();
        dir
    }

    /// Poll the job status endpoint until it reports `expected`. Returns
    /// false on timeout, or early when the job settles in a different
    /// terminal status.
    pub async fn wait_for_job_status(
        &self,
        job_id: i64,
        expected: &str,
        timeout: Duration,
    ) -> bool {
        let terminal = ["completed", "completed_with_warning", "failed", "cancelled"];
        let path = format!("/api/v1/downloads/{}", job_id);
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            let response = self.get(&path).await;
            if let Some(status) = response.body["status"].as_str() {
                if status == expected {
                    return true;
                }
                if terminal.contains(&status) {
                    return false;
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        false
    }

    /// Poll the job status endpoint until the daemon transfer is bound.
    pub async fn wait_for_transfer_bound(&self, job_id: i64, timeout: Duration) -> bool {
        let path = format!("/api/v1/downloads/{}", job_id);
        let start = std::time::Instant::now();
        while start.elapsed() < timeout {
            let response = self.get(&path).await;
            if response.body["transfer_id"].is_string() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        false
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a GET request and return the raw body (for non-JSON endpoints).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
