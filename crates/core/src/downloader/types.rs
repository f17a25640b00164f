//! Types for the download manager.

use serde::Serialize;
use thiserror::Error;

use crate::store::DownloadJob;
use crate::torrent_client::TransferSnapshot;

/// Errors surfaced by the download manager's public operations.
///
/// Transient daemon/catalog failures during monitoring are not here on
/// purpose: those are logged and absorbed by the monitor loop, which
/// encodes failure in job status instead.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Search result not found.
    #[error("search result not found: {0}")]
    SearchResultNotFound(i64),

    /// Download job not found.
    #[error("download job not found: {0}")]
    JobNotFound(i64),

    /// Job store error.
    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),

    /// Torrent client error.
    #[error("torrent client error: {0}")]
    TorrentClient(#[from] crate::torrent_client::TorrentClientError),
}

/// A job enriched with its search result title and, when available, a
/// live snapshot of the underlying transfer.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadStatus {
    #[serde(flatten)]
    pub job: DownloadJob,
    /// Title of the search result this job was created from.
    pub title: String,
    /// Live transfer details, present while the daemon still tracks it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer: Option<TransferSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JobStatus;
    use chrono::Utc;

    #[test]
    fn test_download_status_serialization() {
        let status = DownloadStatus {
            job: DownloadJob {
                id: 3,
                search_result_id: 9,
                transfer_id: Some("abc".to_string()),
                status: JobStatus::Downloading,
                progress: 42.0,
                download_path: None,
                created_at: Utc::now(),
                completed_at: None,
                error_message: None,
            },
            title: "Mistborn".to_string(),
            transfer: None,
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["title"], "Mistborn");
        assert_eq!(json["status"], "downloading");
        assert!(json.get("transfer").is_none());
    }

    #[test]
    fn test_error_display() {
        let err = DownloadError::SearchResultNotFound(12);
        assert_eq!(err.to_string(), "search result not found: 12");

        let err = DownloadError::JobNotFound(5);
        assert_eq!(err.to_string(), "download job not found: 5");
    }
}
