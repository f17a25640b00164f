//! Types for the organizer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Author and title inferred from a download's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    pub author: String,
    pub title: String,
}

/// Result of organizing a download into the library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeOutcome {
    /// Inferred author (before sanitization).
    pub author: String,
    /// Inferred title (before sanitization).
    pub title: String,
    /// Final `LibraryRoot/Author/Title` directory.
    pub library_path: PathBuf,
    /// Number of files copied on this run. Zero when everything was
    /// already in place from an earlier run.
    pub files_copied: usize,
}
