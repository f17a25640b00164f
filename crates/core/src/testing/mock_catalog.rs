//! Mock media catalog for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, Library, MediaCatalog};

/// Mock implementation of the [`MediaCatalog`] trait.
///
/// Provides controllable behavior for testing:
/// - Configurable library list
/// - Records scan requests for assertions
/// - One-shot and per-library failure injection
///
/// # Example
///
/// ```rust,ignore
/// let catalog = MockMediaCatalog::new();
/// catalog.add_library("lib-1", "Audiobooks").await;
///
/// // ... run the pipeline ...
///
/// assert_eq!(catalog.scanned_libraries().await, vec!["lib-1".to_string()]);
/// ```
#[derive(Debug)]
pub struct MockMediaCatalog {
    libraries: Arc<RwLock<Vec<Library>>>,
    /// Library ids whose scan requests were accepted, in call order.
    scanned: Arc<RwLock<Vec<String>>>,
    /// Library ids whose scans always fail.
    failing_scans: Arc<RwLock<HashSet<String>>>,
    /// If set, the next list_libraries call fails with this error.
    list_error: Arc<RwLock<Option<CatalogError>>>,
}

impl Default for MockMediaCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaCatalog {
    pub fn new() -> Self {
        Self {
            libraries: Arc::new(RwLock::new(Vec::new())),
            scanned: Arc::new(RwLock::new(Vec::new())),
            failing_scans: Arc::new(RwLock::new(HashSet::new())),
            list_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Add a library with the "book" media type.
    pub async fn add_library(&self, id: &str, name: &str) {
        self.libraries.write().await.push(Library {
            id: id.to_string(),
            name: name.to_string(),
            media_type: "book".to_string(),
        });
    }

    /// Replace the configured library list.
    pub async fn set_libraries(&self, libraries: Vec<Library>) {
        *self.libraries.write().await = libraries;
    }

    /// Library ids that received an accepted scan request, in call order.
    pub async fn scanned_libraries(&self) -> Vec<String> {
        self.scanned.read().await.clone()
    }

    pub async fn clear_scanned(&self) {
        self.scanned.write().await.clear();
    }

    /// Make every scan request for the given library id fail.
    pub async fn fail_scans_for(&self, id: &str) {
        self.failing_scans.write().await.insert(id.to_string());
    }

    /// Fail the next `list_libraries` call with the given error.
    pub async fn set_list_error(&self, error: CatalogError) {
        *self.list_error.write().await = Some(error);
    }
}

#[async_trait]
impl MediaCatalog for MockMediaCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_libraries(&self) -> Result<Vec<Library>, CatalogError> {
        if let Some(err) = self.list_error.write().await.take() {
            return Err(err);
        }
        Ok(self.libraries.read().await.clone())
    }

    async fn scan_library(&self, library_id: &str) -> Result<(), CatalogError> {
        if self.failing_scans.read().await.contains(library_id) {
            return Err(CatalogError::ApiError {
                status: 500,
                message: format!("scan rejected for {}", library_id),
            });
        }
        self.scanned.write().await.push(library_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_scan_requests() {
        let catalog = MockMediaCatalog::new();
        catalog.add_library("lib-1", "Audiobooks").await;
        catalog.add_library("lib-2", "Podcasts").await;

        let libraries = catalog.list_libraries().await.unwrap();
        assert_eq!(libraries.len(), 2);

        catalog.scan_library("lib-1").await.unwrap();
        assert_eq!(catalog.scanned_libraries().await, vec!["lib-1".to_string()]);
    }

    #[tokio::test]
    async fn per_library_scan_failures_persist() {
        let catalog = MockMediaCatalog::new();
        catalog.add_library("lib-1", "Audiobooks").await;
        catalog.fail_scans_for("lib-1").await;

        assert!(catalog.scan_library("lib-1").await.is_err());
        assert!(catalog.scan_library("lib-1").await.is_err());
        assert!(catalog.scanned_libraries().await.is_empty());
    }

    #[tokio::test]
    async fn list_error_is_consumed_once() {
        let catalog = MockMediaCatalog::new();
        catalog
            .set_list_error(CatalogError::ApiError {
                status: 503,
                message: "down".to_string(),
            })
            .await;

        assert!(catalog.list_libraries().await.is_err());
        assert!(catalog.list_libraries().await.is_ok());
    }
}
