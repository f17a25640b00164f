//! Testing utilities and mock implementations for lifecycle tests.
//!
//! This module provides mock implementations of the external service traits,
//! allowing full download-lifecycle testing without a real daemon or catalog
//! server.
//!
//! # Example
//!
//! ```rust,ignore
//! use fablearr_core::testing::{MockTorrentClient, MockMediaCatalog, fixtures};
//!
//! let torrent_client = MockTorrentClient::new();
//! let catalog = MockMediaCatalog::new();
//!
//! // Script the daemon
//! torrent_client.set_progress("abc123", 0.5).await;
//!
//! // Use with a DownloadManager...
//! ```

mod mock_catalog;
mod mock_torrent_client;

pub use mock_catalog::MockMediaCatalog;
pub use mock_torrent_client::{MockTorrentClient, RecordedDelete, RecordedSubmit};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::store::NewSearchResult;
    use crate::torrent_client::{TransferSnapshot, TransferState};

    /// A search result with a magnet reference and reasonable defaults.
    pub fn search_result(title: &str, info_hash: &str) -> NewSearchResult {
        NewSearchResult {
            query: title.to_lowercase(),
            title: title.to_string(),
            author: Some("Test Author".to_string()),
            narrator: None,
            size_bytes: 300 * 1024 * 1024,
            seeders: 40,
            leechers: 5,
            download_url: None,
            magnet_url: Some(magnet(title, info_hash)),
            source: "mock-indexer".to_string(),
            quality: Some("64 kbps".to_string()),
            format: Some("MP3".to_string()),
            languages: vec!["English".to_string()],
            score: 0.9,
            age_days: Some(12.0),
        }
    }

    /// A search result that only carries an indirect .torrent URL.
    pub fn indirect_search_result(title: &str, url: &str) -> NewSearchResult {
        NewSearchResult {
            magnet_url: None,
            download_url: Some(url.to_string()),
            ..search_result(title, "0000000000000000000000000000000000000000")
        }
    }

    /// A magnet URI with a display name, as indexers produce them.
    pub fn magnet(title: &str, info_hash: &str) -> String {
        format!(
            "magnet:?xt=urn:btih:{}&dn={}",
            info_hash,
            title.replace(' ', "+")
        )
    }

    /// A mid-download transfer snapshot with reasonable defaults.
    pub fn transfer_snapshot(id: &str, name: &str, tags: &[&str]) -> TransferSnapshot {
        TransferSnapshot {
            id: id.to_string(),
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            progress: 0.25,
            state: TransferState::Downloading,
            size_bytes: 300 * 1024 * 1024,
            downloaded_bytes: 75 * 1024 * 1024,
            download_speed: 2 * 1024 * 1024,
            upload_speed: 128 * 1024,
            eta_secs: Some(120),
            seeds: 40,
            peers: 5,
            added_at: Some(Utc::now()),
            save_path: Some("/mock/downloads".to_string()),
            content_path: None,
        }
    }
}
