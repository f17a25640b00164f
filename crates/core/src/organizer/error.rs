//! Error types for the organizer module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while organizing downloaded files.
#[derive(Debug, Error)]
pub enum OrganizerError {
    /// Source path not found.
    #[error("Source path not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// No audio files found under the source path.
    #[error("No audio files found in {path}")]
    NoAudioFiles { path: PathBuf },

    /// Refused to remove a path outside the configured download root.
    #[error("Path is outside the download root, refusing to delete: {path}")]
    OutsideDownloadRoot { path: PathBuf },

    /// Failed to copy a file into the library.
    #[error("Failed to copy {source} to {destination}")]
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Failed to create a library directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
