//! Catalog notifier for the downstream media library service.
//!
//! After a download is organized into the library, the catalog service
//! (Audiobookshelf) is asked to rescan its libraries so the new book shows
//! up for playback. Both operations are fire-and-forget from the download
//! manager's perspective.

mod audiobookshelf;
mod types;

pub use audiobookshelf::AudiobookshelfClient;
pub use types::Library;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the media catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error status.
    #[error("Catalog API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Trait for media catalog clients.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Returns the name of this catalog implementation.
    fn name(&self) -> &str;

    /// Lists all libraries registered in the catalog.
    async fn list_libraries(&self) -> Result<Vec<Library>, CatalogError>;

    /// Triggers a rescan of the given library. Does not wait for the scan
    /// to finish.
    async fn scan_library(&self, library_id: &str) -> Result<(), CatalogError>;
}
