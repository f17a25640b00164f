//! File system organizer implementation.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use super::config::OrganizerConfig;
use super::error::OrganizerError;
use super::metadata::{parse_book_metadata, sanitize_for_filesystem};
use super::traits::Organizer;
use super::types::{BookMetadata, OrganizeOutcome};

/// File system based organizer implementation.
pub struct FsOrganizer {
    config: OrganizerConfig,
}

impl FsOrganizer {
    /// Creates a new file system organizer with the given configuration.
    pub fn new(config: OrganizerConfig) -> Self {
        Self { config }
    }

    fn is_audio_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let ext = e.to_ascii_lowercase();
                self.config.audio_extensions.iter().any(|a| *a == ext)
            })
            .unwrap_or(false)
    }

    /// True when `path` is strictly inside the download root with no
    /// parent-directory escapes.
    fn is_under_download_root(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.config.download_root) else {
            return false;
        };
        !rel.as_os_str().is_empty()
            && !rel.components().any(|c| matches!(c, Component::ParentDir))
    }

    /// Collects every regular file under `root`, depth-first, sorted for
    /// deterministic iteration.
    async fn walk_files(root: &Path) -> Result<Vec<PathBuf>, OrganizerError> {
        let mut files = Vec::new();
        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    stack.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Logs the parent directory contents when a source path is missing,
    /// which usually shows where the daemon actually wrote the download.
    async fn log_parent_listing(source: &Path) {
        let Some(parent) = source.parent() else {
            return;
        };

        match fs::read_dir(parent).await {
            Ok(mut entries) => {
                let mut names = Vec::new();
                while let Ok(Some(entry)) = entries.next_entry().await {
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
                warn!(
                    parent = %parent.display(),
                    entries = ?names,
                    "source path missing, listing parent directory"
                );
            }
            Err(e) => {
                warn!(
                    parent = %parent.display(),
                    error = %e,
                    "source path missing and parent directory unreadable"
                );
            }
        }
    }

    /// Destination directory for a parsed book, creating it if necessary.
    async fn ensure_library_dir(
        &self,
        metadata: &BookMetadata,
    ) -> Result<PathBuf, OrganizerError> {
        let safe_author = sanitize_for_filesystem(&metadata.author);
        let safe_title = sanitize_for_filesystem(&metadata.title);

        let dest_dir = self.config.library_root.join(safe_author).join(safe_title);
        fs::create_dir_all(&dest_dir).await.map_err(|e| {
            OrganizerError::DirectoryCreationFailed {
                path: dest_dir.clone(),
                source: e,
            }
        })?;

        Ok(dest_dir)
    }

    /// Copies `source_file` to `destination` unless it is already there.
    /// Returns true when a copy actually happened.
    async fn copy_if_absent(
        source_file: &Path,
        destination: &Path,
    ) -> Result<bool, OrganizerError> {
        if destination.exists() {
            debug!(destination = %destination.display(), "already in library, skipping");
            return Ok(false);
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                OrganizerError::DirectoryCreationFailed {
                    path: parent.to_path_buf(),
                    source: e,
                }
            })?;
        }

        fs::copy(source_file, destination)
            .await
            .map_err(|e| OrganizerError::CopyFailed {
                source: source_file.to_path_buf(),
                destination: destination.to_path_buf(),
                error: e,
            })?;

        Ok(true)
    }

    /// Organizes a download that is a single audio file.
    async fn organize_file(&self, source: &Path) -> Result<OrganizeOutcome, OrganizerError> {
        if !self.is_audio_file(source) {
            return Err(OrganizerError::NoAudioFiles {
                path: source.to_path_buf(),
            });
        }

        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string_lossy().into_owned());
        let metadata = parse_book_metadata(&name);
        let dest_dir = self.ensure_library_dir(&metadata).await?;

        let destination = dest_dir.join(&name);
        let copied = Self::copy_if_absent(source, &destination).await?;

        Ok(OrganizeOutcome {
            author: metadata.author,
            title: metadata.title,
            library_path: dest_dir,
            files_copied: usize::from(copied),
        })
    }

    /// Organizes a download directory, copying every file inside it and
    /// preserving relative subpaths so covers and metadata sidecars ride
    /// along with the audio.
    async fn organize_directory(
        &self,
        source: &Path,
    ) -> Result<OrganizeOutcome, OrganizerError> {
        let all_files = Self::walk_files(source).await?;

        let audio_count = all_files.iter().filter(|f| self.is_audio_file(f)).count();
        if audio_count == 0 {
            return Err(OrganizerError::NoAudioFiles {
                path: source.to_path_buf(),
            });
        }

        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string_lossy().into_owned());
        let metadata = parse_book_metadata(&name);
        let dest_dir = self.ensure_library_dir(&metadata).await?;

        let mut files_copied = 0usize;
        for file in &all_files {
            let Ok(rel) = file.strip_prefix(source) else {
                continue;
            };
            let destination = dest_dir.join(rel);
            if Self::copy_if_absent(file, &destination).await? {
                files_copied += 1;
            }
        }

        Ok(OrganizeOutcome {
            author: metadata.author,
            title: metadata.title,
            library_path: dest_dir,
            files_copied,
        })
    }
}

#[async_trait]
impl Organizer for FsOrganizer {
    fn name(&self) -> &str {
        "fs"
    }

    async fn organize(&self, source: &Path) -> Result<OrganizeOutcome, OrganizerError> {
        let meta = match fs::metadata(source).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::log_parent_listing(source).await;
                return Err(OrganizerError::SourceNotFound {
                    path: source.to_path_buf(),
                });
            }
            Err(e) => return Err(OrganizerError::Io(e)),
        };

        let outcome = if meta.is_file() {
            self.organize_file(source).await?
        } else {
            self.organize_directory(source).await?
        };

        info!(
            author = %outcome.author,
            title = %outcome.title,
            library_path = %outcome.library_path.display(),
            files_copied = outcome.files_copied,
            "organized audiobook into library"
        );

        Ok(outcome)
    }

    async fn cleanup_download(&self, path: &Path) -> Result<(), OrganizerError> {
        let meta = match fs::metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(OrganizerError::Io(e)),
        };

        if !self.is_under_download_root(path) {
            return Err(OrganizerError::OutsideDownloadRoot {
                path: path.to_path_buf(),
            });
        }

        if meta.is_file() {
            fs::remove_file(path).await?;
        } else {
            fs::remove_dir_all(path).await?;
        }

        info!(path = %path.display(), "cleaned up download");
        Ok(())
    }
}
