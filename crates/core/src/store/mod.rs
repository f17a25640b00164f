//! Persistence for search results and download jobs.

mod sqlite_store;
mod traits;
mod types;

pub use sqlite_store::SqliteDownloadStore;
pub use traits::{DownloadStore, StoreError};
pub use types::{DownloadJob, JobFilter, JobStatus, JobUpdate, NewSearchResult, SearchResult};
