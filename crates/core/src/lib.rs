pub mod catalog;
pub mod config;
pub mod downloader;
pub mod metrics;
pub mod organizer;
pub mod store;
pub mod testing;
pub mod torrent_client;

pub use catalog::{AudiobookshelfClient, CatalogError, Library, MediaCatalog};
pub use config::{
    load_config, load_config_from_str, validate_config, AudiobookshelfConfig, Config, ConfigError,
    DatabaseConfig, LoggingConfig, QBittorrentConfig, SanitizedConfig, ServerConfig, StorageConfig,
};
pub use downloader::{DownloadError, DownloadManager, DownloadStatus, DownloaderConfig};
pub use organizer::{FsOrganizer, Organizer, OrganizerConfig, OrganizerError};
pub use store::{
    DownloadJob, DownloadStore, JobFilter, JobStatus, JobUpdate, NewSearchResult, SearchResult,
    SqliteDownloadStore, StoreError,
};
pub use torrent_client::{
    QBittorrentClient, TorrentClient, TorrentClientError, TransferRate, TransferSnapshot,
    TransferState,
};
