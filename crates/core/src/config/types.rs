use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::downloader::DownloaderConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    pub qbittorrent: QBittorrentConfig,
    pub audiobookshelf: AudiobookshelfConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Attach a permissive CORS layer (for browser-based frontends)
    #[serde(default = "default_cors")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: default_cors(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8484
}

fn default_cors() -> bool {
    true
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("fablearr.db")
}

/// Storage paths: where the torrent daemon writes downloads and where the
/// organized library lives.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_download_path")]
    pub download_path: PathBuf,
    #[serde(default = "default_library_path")]
    pub library_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_path: default_download_path(),
            library_path: default_library_path(),
        }
    }
}

fn default_download_path() -> PathBuf {
    PathBuf::from("/downloads/audiobooks")
}

fn default_library_path() -> PathBuf {
    PathBuf::from("/audiobooks")
}

/// qBittorrent Web API connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QBittorrentConfig {
    /// qBittorrent WebUI URL (e.g., "http://localhost:8080")
    pub url: String,
    #[serde(default = "default_qb_username")]
    pub username: String,
    pub password: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_qb_username() -> String {
    "admin".to_string()
}

/// Audiobookshelf connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudiobookshelfConfig {
    /// Audiobookshelf server URL (e.g., "http://localhost:13378")
    pub url: String,
    /// API token (Bearer auth)
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default tracing filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub downloader: DownloaderConfig,
    pub qbittorrent: SanitizedQBittorrentConfig,
    pub audiobookshelf: SanitizedAudiobookshelfConfig,
    pub logging: LoggingConfig,
}

/// Sanitized qBittorrent config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQBittorrentConfig {
    pub url: String,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

/// Sanitized Audiobookshelf config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAudiobookshelfConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            storage: config.storage.clone(),
            downloader: config.downloader.clone(),
            qbittorrent: SanitizedQBittorrentConfig {
                url: config.qbittorrent.url.clone(),
                username: config.qbittorrent.username.clone(),
                password_configured: !config.qbittorrent.password.is_empty(),
                timeout_secs: config.qbittorrent.timeout_secs,
            },
            audiobookshelf: SanitizedAudiobookshelfConfig {
                url: config.audiobookshelf.url.clone(),
                api_key_configured: !config.audiobookshelf.api_key.is_empty(),
                timeout_secs: config.audiobookshelf.timeout_secs,
            },
            logging: config.logging.clone(),
        }
    }
}
