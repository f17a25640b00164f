use std::sync::Arc;

use fablearr_core::{
    Config, DownloadManager, DownloadStore, MediaCatalog, SanitizedConfig, TorrentClient,
};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn DownloadStore>,
    torrent_client: Arc<dyn TorrentClient>,
    catalog: Arc<dyn MediaCatalog>,
    manager: Arc<DownloadManager>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn DownloadStore>,
        torrent_client: Arc<dyn TorrentClient>,
        catalog: Arc<dyn MediaCatalog>,
        manager: Arc<DownloadManager>,
    ) -> Self {
        Self {
            config,
            store,
            torrent_client,
            catalog,
            manager,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &dyn DownloadStore {
        self.store.as_ref()
    }

    pub fn torrent_client(&self) -> &dyn TorrentClient {
        self.torrent_client.as_ref()
    }

    pub fn catalog(&self) -> &dyn MediaCatalog {
        self.catalog.as_ref()
    }

    pub fn manager(&self) -> &DownloadManager {
        self.manager.as_ref()
    }
}
