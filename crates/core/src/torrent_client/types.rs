//! Types for torrent client operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during torrent client operations.
#[derive(Debug, Error)]
pub enum TorrentClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid transfer resource: {0}")]
    InvalidResource(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

/// State of a transfer, as reported by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    /// Downloading from peers.
    Downloading,
    /// Seeding to peers.
    Seeding,
    /// Paused before the download finished.
    PausedDownload,
    /// Paused after the download finished.
    PausedUpload,
    /// Checking file integrity.
    Checking,
    /// Queued by the daemon.
    Queued,
    /// Stalled (no peers).
    Stalled,
    /// Daemon-side error.
    Error,
    /// Files on disk no longer match the transfer.
    MissingFiles,
    /// Unknown state.
    Unknown,
}

impl TransferState {
    /// Returns the string representation for API responses and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Downloading => "downloading",
            TransferState::Seeding => "seeding",
            TransferState::PausedDownload => "paused_download",
            TransferState::PausedUpload => "paused_upload",
            TransferState::Checking => "checking",
            TransferState::Queued => "queued",
            TransferState::Stalled => "stalled",
            TransferState::Error => "error",
            TransferState::MissingFiles => "missing_files",
            TransferState::Unknown => "unknown",
        }
    }

    /// States from which the transfer will make no further progress, so
    /// continuing to monitor it is pointless.
    pub fn is_terminal_error(&self) -> bool {
        matches!(
            self,
            TransferState::Error
                | TransferState::MissingFiles
                | TransferState::PausedUpload
                | TransferState::Unknown
        )
    }
}

/// Point-in-time view of a transfer tracked by the daemon.
///
/// Fixed shape at the adapter boundary: everything the monitoring loop and
/// status surface need, and nothing daemon-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSnapshot {
    /// Daemon-side identifier (info hash for torrents, lowercase hex).
    pub id: String,
    /// Transfer name.
    pub name: String,
    /// Tags attached at submission time.
    pub tags: Vec<String>,
    /// Download progress (0.0 - 1.0).
    pub progress: f64,
    /// Current state.
    pub state: TransferState,
    /// Total size in bytes.
    pub size_bytes: u64,
    /// Downloaded bytes.
    pub downloaded_bytes: u64,
    /// Current download speed in bytes/second.
    pub download_speed: u64,
    /// Current upload speed in bytes/second.
    pub upload_speed: u64,
    /// ETA in seconds (None if unknown or complete).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_secs: Option<u64>,
    /// Number of connected seeds.
    pub seeds: u32,
    /// Number of connected peers.
    pub peers: u32,
    /// When the transfer was added to the daemon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
    /// Directory the daemon saves into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_path: Option<String>,
    /// Root path of the downloaded content (file or directory).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_path: Option<String>,
}

/// Global daemon throughput.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransferRate {
    /// Aggregate download speed in bytes/second.
    pub download_bps: u64,
    /// Aggregate upload speed in bytes/second.
    pub upload_bps: u64,
}

/// The resource reference handed to the daemon.
#[derive(Debug, Clone)]
pub enum TransferSource {
    /// A magnet URI (direct reference).
    Magnet { uri: String },
    /// Raw .torrent file bytes, fetched from an indirect reference.
    TorrentFile {
        data: Vec<u8>,
        /// Original filename (for logging).
        filename: Option<String>,
    },
}

/// Request to submit a new transfer.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub source: TransferSource,
    /// Daemon-side category to file the transfer under.
    pub category: Option<String>,
    /// Download directory override.
    pub save_path: Option<String>,
    /// Tags to attach (used later for identity matching).
    pub tags: Vec<String>,
}

impl SubmitRequest {
    /// Create a magnet submission with default options.
    pub fn magnet(uri: impl Into<String>) -> Self {
        Self {
            source: TransferSource::Magnet { uri: uri.into() },
            category: None,
            save_path: None,
            tags: Vec::new(),
        }
    }

    /// Create a torrent-file submission with default options.
    pub fn torrent_file(data: Vec<u8>) -> Self {
        Self {
            source: TransferSource::TorrentFile {
                data,
                filename: None,
            },
            category: None,
            save_path: None,
            tags: Vec::new(),
        }
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the download directory.
    pub fn with_save_path(mut self, path: impl Into<String>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    /// Attach a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the original filename for torrent-file submissions.
    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        if let TransferSource::TorrentFile { filename, .. } = &mut self.source {
            *filename = Some(name.into());
        }
        self
    }
}

/// Trait for torrent daemon backends.
///
/// Submission does not return a daemon identifier: clients cannot reliably
/// report one at submit time (magnet metadata may not be resolved yet), so
/// callers identify their transfer afterwards via tags or name matching.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Hand a new transfer to the daemon.
    async fn submit(&self, request: SubmitRequest) -> Result<(), TorrentClientError>;

    /// List transfers, optionally scoped to a category.
    async fn list(&self, category: Option<&str>)
        -> Result<Vec<TransferSnapshot>, TorrentClientError>;

    /// Get a specific transfer by identifier.
    async fn get(&self, id: &str) -> Result<Option<TransferSnapshot>, TorrentClientError>;

    /// Remove a transfer. If `delete_files` is true, also delete its data.
    async fn delete(&self, id: &str, delete_files: bool) -> Result<(), TorrentClientError>;

    /// Create the category if missing. Succeeds when the category already
    /// exists, even with a different save path; that mismatch is logged,
    /// since the daemon cannot safely repath an in-use category.
    async fn ensure_category(&self, name: &str, save_path: &str)
        -> Result<(), TorrentClientError>;

    /// Global daemon throughput.
    async fn transfer_rate(&self) -> Result<TransferRate, TorrentClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_state_as_str() {
        assert_eq!(TransferState::Downloading.as_str(), "downloading");
        assert_eq!(TransferState::Seeding.as_str(), "seeding");
        assert_eq!(TransferState::PausedDownload.as_str(), "paused_download");
        assert_eq!(TransferState::PausedUpload.as_str(), "paused_upload");
        assert_eq!(TransferState::Checking.as_str(), "checking");
        assert_eq!(TransferState::Queued.as_str(), "queued");
        assert_eq!(TransferState::Stalled.as_str(), "stalled");
        assert_eq!(TransferState::Error.as_str(), "error");
        assert_eq!(TransferState::MissingFiles.as_str(), "missing_files");
        assert_eq!(TransferState::Unknown.as_str(), "unknown");
    }

    #[test]
    fn test_terminal_error_states() {
        assert!(TransferState::Error.is_terminal_error());
        assert!(TransferState::MissingFiles.is_terminal_error());
        assert!(TransferState::PausedUpload.is_terminal_error());
        assert!(TransferState::Unknown.is_terminal_error());

        assert!(!TransferState::Downloading.is_terminal_error());
        assert!(!TransferState::Seeding.is_terminal_error());
        assert!(!TransferState::PausedDownload.is_terminal_error());
        assert!(!TransferState::Stalled.is_terminal_error());
        assert!(!TransferState::Queued.is_terminal_error());
        assert!(!TransferState::Checking.is_terminal_error());
    }

    #[test]
    fn test_submit_request_magnet_builder() {
        let req = SubmitRequest::magnet("magnet:?xt=urn:btih:abc123")
            .with_category("audiobooks")
            .with_save_path("/downloads/audiobooks")
            .with_tag("fablearr-job-7");

        match &req.source {
            TransferSource::Magnet { uri } => assert_eq!(uri, "magnet:?xt=urn:btih:abc123"),
            _ => panic!("Expected Magnet source"),
        }
        assert_eq!(req.category.as_deref(), Some("audiobooks"));
        assert_eq!(req.save_path.as_deref(), Some("/downloads/audiobooks"));
        assert_eq!(req.tags, vec!["fablearr-job-7".to_string()]);
    }

    #[test]
    fn test_submit_request_torrent_file_builder() {
        let req = SubmitRequest::torrent_file(vec![0u8; 64]).with_filename("book.torrent");

        match &req.source {
            TransferSource::TorrentFile { data, filename } => {
                assert_eq!(data.len(), 64);
                assert_eq!(filename.as_deref(), Some("book.torrent"));
            }
            _ => panic!("Expected TorrentFile source"),
        }
        assert!(req.tags.is_empty());
    }

    #[test]
    fn test_transfer_snapshot_serialization() {
        let snapshot = TransferSnapshot {
            id: "abc123".to_string(),
            name: "Mistborn by Brandon Sanderson".to_string(),
            tags: vec!["fablearr-job-1".to_string()],
            progress: 0.5,
            state: TransferState::Downloading,
            size_bytes: 1024 * 1024 * 300,
            downloaded_bytes: 1024 * 1024 * 150,
            download_speed: 1024 * 200,
            upload_speed: 1024 * 10,
            eta_secs: Some(750),
            seeds: 8,
            peers: 3,
            added_at: None,
            save_path: Some("/downloads/audiobooks".to_string()),
            content_path: Some("/downloads/audiobooks/Mistborn".to_string()),
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: TransferSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, "abc123");
        assert_eq!(parsed.state, TransferState::Downloading);
        assert_eq!(parsed.tags, vec!["fablearr-job-1".to_string()]);
        assert!((parsed.progress - 0.5).abs() < 0.001);
        assert_eq!(parsed.eta_secs, Some(750));
    }
}
