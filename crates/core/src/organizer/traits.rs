//! Trait definitions for the organizer module.

use async_trait::async_trait;
use std::path::Path;

use super::error::OrganizerError;
use super::types::OrganizeOutcome;

/// An organizer that moves completed downloads into the library layout.
#[async_trait]
pub trait Organizer: Send + Sync {
    /// Returns the name of this organizer implementation.
    fn name(&self) -> &str;

    /// Organizes the download at `source` into the library.
    ///
    /// `source` may be a single audio file or a directory containing the
    /// download. Re-running on the same source is safe: files already in
    /// the library are left untouched.
    async fn organize(&self, source: &Path) -> Result<OrganizeOutcome, OrganizerError>;

    /// Deletes a download from disk.
    ///
    /// Refuses to touch anything outside the configured download root.
    /// A path that no longer exists is not an error.
    async fn cleanup_download(&self, path: &Path) -> Result<(), OrganizerError>;
}
