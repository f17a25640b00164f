use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fablearr_core::{
    load_config, validate_config, AudiobookshelfClient, DownloadManager, DownloadStore,
    FsOrganizer, LoggingConfig, MediaCatalog, Organizer, OrganizerConfig, QBittorrentClient,
    SqliteDownloadStore, TorrentClient,
};

use fablearr_server::api::create_router;
use fablearr_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Logging is not initialized yet when configuration loading fails.
        eprintln!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Determine config path: --config flag, then FABLEARR_CONFIG, then cwd
    let config_path = resolve_config_path();

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    init_tracing(&config.logging);

    info!("Configuration loaded from {:?}", config_path);
    info!("Database path: {:?}", config.database.path);
    info!("Download path: {:?}", config.storage.download_path);
    info!("Library path: {:?}", config.storage.library_path);

    // Create SQLite store
    let store: Arc<dyn DownloadStore> = Arc::new(
        SqliteDownloadStore::new(&config.database.path)
            .context("Failed to create download store")?,
    );
    info!("Download store initialized");

    // Create qBittorrent client
    info!("Using qBittorrent at {}", config.qbittorrent.url);
    let torrent_client: Arc<dyn TorrentClient> =
        Arc::new(QBittorrentClient::new(config.qbittorrent.clone()));

    // Create Audiobookshelf client
    info!("Using Audiobookshelf at {}", config.audiobookshelf.url);
    let catalog: Arc<dyn MediaCatalog> = Arc::new(
        AudiobookshelfClient::new(config.audiobookshelf.clone())
            .context("Failed to create Audiobookshelf client")?,
    );

    // Create organizer
    let organizer: Arc<dyn Organizer> =
        Arc::new(FsOrganizer::new(OrganizerConfig::from(&config.storage)));

    // Create download manager
    let manager = Arc::new(DownloadManager::new(
        config.downloader.clone(),
        config.storage.download_path.clone(),
        Arc::clone(&store),
        Arc::clone(&torrent_client),
        organizer,
        Arc::clone(&catalog),
    ));

    // Pick monitoring back up for jobs that were active when the process
    // last stopped.
    let resumed = manager
        .resume_active_jobs()
        .await
        .context("Failed to resume active jobs")?;
    if resumed > 0 {
        info!("Resumed monitoring for {} active job(s)", resumed);
    }

    // Create app state and router
    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        torrent_client,
        catalog,
        Arc::clone(&manager),
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop download monitors
    info!("Server shutting down...");
    manager.shutdown().await;
    info!("Download monitors stopped");

    Ok(())
}

/// Resolve the config file path from `--config <path>` (or `--config=<path>`),
/// the `FABLEARR_CONFIG` environment variable, or the default `fablearr.toml`.
fn resolve_config_path() -> PathBuf {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return PathBuf::from(path);
            }
        } else if let Some(path) = arg.strip_prefix("--config=") {
            return PathBuf::from(path);
        }
    }

    std::env::var("FABLEARR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("fablearr.toml"))
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured
/// level when set.
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("{},tower_http=debug", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
