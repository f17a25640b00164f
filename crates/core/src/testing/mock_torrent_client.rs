//! Mock torrent client for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::torrent_client::{
    SubmitRequest, TorrentClient, TorrentClientError, TransferRate, TransferSnapshot,
    TransferSource, TransferState,
};

/// A recorded submit call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSubmit {
    pub request: SubmitRequest,
    pub timestamp: chrono::DateTime<Utc>,
}

/// A recorded delete call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDelete {
    pub id: String,
    pub delete_files: bool,
}

#[derive(Debug, Clone)]
struct MockTransfer {
    snapshot: TransferSnapshot,
    category: Option<String>,
}

/// Mock implementation of the [`TorrentClient`] trait.
///
/// Provides controllable behavior for testing:
/// - Records submit/delete calls for assertions
/// - Scripts transfer progress and state per id
/// - Injects one-shot failures per operation
///
/// # Example
///
/// ```rust,ignore
/// let client = MockTorrentClient::new();
///
/// client.submit(SubmitRequest::magnet("magnet:?xt=urn:btih:abc").with_tag("job-1")).await?;
/// let id = client.submitted()[0]; // via recorded calls
///
/// client.set_progress("abc", 0.5).await;
/// client.set_progress("abc", 1.0).await; // flips state to Seeding
/// ```
#[derive(Debug)]
pub struct MockTorrentClient {
    submitted: Arc<RwLock<Vec<RecordedSubmit>>>,
    deleted: Arc<RwLock<Vec<RecordedDelete>>>,
    /// Categories ensured so far, as (name, save_path).
    categories: Arc<RwLock<Vec<(String, String)>>>,
    transfers: Arc<RwLock<HashMap<String, MockTransfer>>>,
    rate: Arc<RwLock<TransferRate>>,
    /// One-shot error injection, consumed by the next matching call.
    submit_error: Arc<RwLock<Option<TorrentClientError>>>,
    list_error: Arc<RwLock<Option<TorrentClientError>>>,
    delete_error: Arc<RwLock<Option<TorrentClientError>>>,
    category_error: Arc<RwLock<Option<TorrentClientError>>>,
    id_counter: Arc<RwLock<u32>>,
    default_save_path: String,
}

impl Default for MockTorrentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTorrentClient {
    pub fn new() -> Self {
        Self {
            submitted: Arc::new(RwLock::new(Vec::new())),
            deleted: Arc::new(RwLock::new(Vec::new())),
            categories: Arc::new(RwLock::new(Vec::new())),
            transfers: Arc::new(RwLock::new(HashMap::new())),
            rate: Arc::new(RwLock::new(TransferRate {
                download_bps: 0,
                upload_bps: 0,
            })),
            submit_error: Arc::new(RwLock::new(None)),
            list_error: Arc::new(RwLock::new(None)),
            delete_error: Arc::new(RwLock::new(None)),
            category_error: Arc::new(RwLock::new(None)),
            id_counter: Arc::new(RwLock::new(0)),
            default_save_path: "/mock/downloads".to_string(),
        }
    }

    /// All recorded submit calls.
    pub async fn submitted(&self) -> Vec<RecordedSubmit> {
        self.submitted.read().await.clone()
    }

    /// All recorded delete calls.
    pub async fn deleted(&self) -> Vec<RecordedDelete> {
        self.deleted.read().await.clone()
    }

    /// All ensured categories, as (name, save_path).
    pub async fn ensured_categories(&self) -> Vec<(String, String)> {
        self.categories.read().await.clone()
    }

    /// Set the progress fraction (0.0 - 1.0) for a transfer. Reaching 1.0
    /// flips the state to `Seeding`, mirroring what qBittorrent reports for
    /// finished torrents.
    pub async fn set_progress(&self, id: &str, progress: f64) {
        let mut transfers = self.transfers.write().await;
        if let Some(transfer) = transfers.get_mut(id) {
            let progress = progress.clamp(0.0, 1.0);
            transfer.snapshot.progress = progress;
            transfer.snapshot.downloaded_bytes =
                (transfer.snapshot.size_bytes as f64 * progress) as u64;
            if progress >= 1.0 {
                transfer.snapshot.state = TransferState::Seeding;
                transfer.snapshot.eta_secs = None;
            }
        }
    }

    /// Set the daemon-reported state for a transfer directly.
    pub async fn set_state(&self, id: &str, state: TransferState) {
        let mut transfers = self.transfers.write().await;
        if let Some(transfer) = transfers.get_mut(id) {
            transfer.snapshot.state = state;
        }
    }

    /// Set the content path for a transfer (where the payload landed).
    pub async fn set_content_path(&self, id: &str, path: impl Into<String>) {
        let mut transfers = self.transfers.write().await;
        if let Some(transfer) = transfers.get_mut(id) {
            transfer.snapshot.content_path = Some(path.into());
        }
    }

    /// Pre-populate a transfer without going through `submit`.
    pub async fn add_mock_transfer(&self, snapshot: TransferSnapshot, category: Option<&str>) {
        self.transfers.write().await.insert(
            snapshot.id.clone(),
            MockTransfer {
                snapshot,
                category: category.map(str::to_string),
            },
        );
    }

    /// Remove a transfer without recording a delete call. Simulates the
    /// daemon losing a transfer behind the manager's back.
    pub async fn drop_transfer(&self, id: &str) {
        self.transfers.write().await.remove(id);
    }

    pub async fn has_transfer(&self, id: &str) -> bool {
        self.transfers.read().await.contains_key(id)
    }

    pub async fn transfer_count(&self) -> usize {
        self.transfers.read().await.len()
    }

    /// Fail the next `submit` call with the given error.
    pub async fn set_submit_error(&self, error: TorrentClientError) {
        *self.submit_error.write().await = Some(error);
    }

    /// Fail the next `list` call with the given error.
    pub async fn set_list_error(&self, error: TorrentClientError) {
        *self.list_error.write().await = Some(error);
    }

    /// Fail the next `delete` call with the given error.
    pub async fn set_delete_error(&self, error: TorrentClientError) {
        *self.delete_error.write().await = Some(error);
    }

    /// Fail the next `ensure_category` call with the given error.
    pub async fn set_category_error(&self, error: TorrentClientError) {
        *self.category_error.write().await = Some(error);
    }

    pub async fn set_transfer_rate(&self, download_bps: u64, upload_bps: u64) {
        *self.rate.write().await = TransferRate {
            download_bps,
            upload_bps,
        };
    }

    async fn next_id(&self) -> String {
        let mut counter = self.id_counter.write().await;
        *counter += 1;
        format!("mockhash{:08x}", *counter)
    }

    /// Extract the info hash from a magnet URI, if present.
    fn hash_from_magnet(uri: &str) -> Option<String> {
        uri.split('&')
            .find(|part| part.contains("xt=urn:btih:"))
            .and_then(|part| part.split("xt=urn:btih:").nth(1))
            .map(|hash| hash.to_lowercase())
    }

    /// Extract the display name from a magnet URI, if present.
    fn name_from_magnet(uri: &str) -> Option<String> {
        uri.split('&')
            .find(|part| part.starts_with("dn="))
            .map(|part| part.trim_start_matches("dn=").replace('+', " "))
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, request: SubmitRequest) -> Result<(), TorrentClientError> {
        if let Some(err) = self.submit_error.write().await.take() {
            return Err(err);
        }

        self.submitted.write().await.push(RecordedSubmit {
            request: request.clone(),
            timestamp: Utc::now(),
        });

        let (id, name) = match &request.source {
            TransferSource::Magnet { uri } => {
                let id = match Self::hash_from_magnet(uri) {
                    Some(hash) => hash,
                    None => self.next_id().await,
                };
                let name =
                    Self::name_from_magnet(uri).unwrap_or_else(|| format!("Mock Transfer {}", id));
                (id, name)
            }
            TransferSource::TorrentFile { filename, .. } => {
                let id = self.next_id().await;
                let name = filename
                    .clone()
                    .unwrap_or_else(|| format!("Mock Transfer {}", id));
                (id, name)
            }
        };

        let save_path = request
            .save_path
            .clone()
            .unwrap_or_else(|| self.default_save_path.clone());

        let snapshot = TransferSnapshot {
            id: id.clone(),
            name,
            tags: request.tags.clone(),
            progress: 0.0,
            state: TransferState::Downloading,
            size_bytes: 100 * 1024 * 1024,
            downloaded_bytes: 0,
            download_speed: 1024 * 1024,
            upload_speed: 256 * 1024,
            eta_secs: Some(100),
            seeds: 10,
            peers: 5,
            added_at: Some(Utc::now()),
            save_path: Some(save_path),
            content_path: None,
        };

        self.transfers.write().await.insert(
            id,
            MockTransfer {
                snapshot,
                category: request.category.clone(),
            },
        );
        Ok(())
    }

    async fn list(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<TransferSnapshot>, TorrentClientError> {
        if let Some(err) = self.list_error.write().await.take() {
            return Err(err);
        }

        let transfers = self.transfers.read().await;
        let mut result: Vec<TransferSnapshot> = transfers
            .values()
            .filter(|t| match category {
                Some(category) => t.category.as_deref() == Some(category),
                None => true,
            })
            .map(|t| t.snapshot.clone())
            .collect();
        result.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(result)
    }

    async fn get(&self, id: &str) -> Result<Option<TransferSnapshot>, TorrentClientError> {
        Ok(self
            .transfers
            .read()
            .await
            .get(id)
            .map(|t| t.snapshot.clone()))
    }

    async fn delete(&self, id: &str, delete_files: bool) -> Result<(), TorrentClientError> {
        if let Some(err) = self.delete_error.write().await.take() {
            return Err(err);
        }

        self.deleted.write().await.push(RecordedDelete {
            id: id.to_string(),
            delete_files,
        });
        // Like qBittorrent, deleting an unknown hash is not an error.
        self.transfers.write().await.remove(id);
        Ok(())
    }

    async fn ensure_category(
        &self,
        name: &str,
        save_path: &str,
    ) -> Result<(), TorrentClientError> {
        if let Some(err) = self.category_error.write().await.take() {
            return Err(err);
        }

        let mut categories = self.categories.write().await;
        if !categories.iter().any(|(n, _)| n == name) {
            categories.push((name.to_string(), save_path.to_string()));
        }
        Ok(())
    }

    async fn transfer_rate(&self) -> Result<TransferRate, TorrentClientError> {
        Ok(*self.rate.read().await)
    }
}
