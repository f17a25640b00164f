//! Download orchestration.
//!
//! Ties the store, the torrent daemon, the organizer and the media catalog
//! together: [`DownloadManager`] accepts search results for download and a
//! per-job monitor task follows each transfer until the job settles.

mod config;
mod manager;
mod matcher;
mod types;

pub use config::DownloaderConfig;
pub use manager::DownloadManager;
pub use matcher::match_transfer;
pub use types::{DownloadError, DownloadStatus};
