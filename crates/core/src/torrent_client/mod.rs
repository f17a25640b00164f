//! Torrent client abstraction.
//!
//! This module provides a `TorrentClient` trait over the download daemon's
//! Web API, plus the qBittorrent implementation used in production.

mod qbittorrent;
mod types;

pub use qbittorrent::QBittorrentClient;
pub use types::*;
