//! Organizer module for placing completed downloads into the library.
//!
//! Takes the path a finished transfer landed at, infers author and title
//! from its name, and copies the content into the canonical
//! `LibraryRoot/Author/Title/` layout. Re-running is safe: files already
//! present in the library are never overwritten.

mod config;
mod error;
mod fs_organizer;
mod metadata;
mod traits;
mod types;

pub use config::OrganizerConfig;
pub use error::OrganizerError;
pub use fs_organizer::FsOrganizer;
pub use metadata::{parse_book_metadata, sanitize_for_filesystem, UNKNOWN_AUTHOR};
pub use traits::Organizer;
pub use types::{BookMetadata, OrganizeOutcome};
