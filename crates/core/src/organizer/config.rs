//! Configuration for the organizer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::StorageConfig;

/// Configuration for the file system organizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Root directory where the transfer daemon writes finished downloads.
    pub download_root: PathBuf,

    /// Root of the audiobook library.
    pub library_root: PathBuf,

    /// File extensions treated as audiobook content (lowercase, no dot).
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,
}

fn default_audio_extensions() -> Vec<String> {
    ["mp3", "m4b", "m4a", "flac", "aac", "ogg", "wav"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl OrganizerConfig {
    /// Creates a config rooted at the given download and library paths.
    pub fn new(download_root: impl Into<PathBuf>, library_root: impl Into<PathBuf>) -> Self {
        Self {
            download_root: download_root.into(),
            library_root: library_root.into(),
            audio_extensions: default_audio_extensions(),
        }
    }
}

impl From<&StorageConfig> for OrganizerConfig {
    fn from(storage: &StorageConfig) -> Self {
        Self::new(&storage.download_path, &storage.library_path)
    }
}
