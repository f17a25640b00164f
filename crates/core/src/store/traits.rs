//! Storage trait for search results and download jobs.

use thiserror::Error;

use super::types::{DownloadJob, JobFilter, JobStatus, JobUpdate, NewSearchResult, SearchResult};

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Search result not found: {0}")]
    SearchResultNotFound(i64),

    #[error("Download job not found: {0}")]
    JobNotFound(i64),

    #[error("Cannot move job {job_id} from {from} to {to}")]
    InvalidTransition {
        job_id: i64,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Database error: {0}")]
    Database(String),
}

/// Trait for job/search-result storage backends.
///
/// Implementations are synchronous; every call is an independent short-lived
/// session so no lock is ever held across an await point in the callers.
pub trait DownloadStore: Send + Sync {
    /// Persist a search result handed over by the search subsystem.
    fn insert_search_result(&self, result: NewSearchResult) -> Result<SearchResult, StoreError>;

    /// Get a search result by id.
    fn get_search_result(&self, id: i64) -> Result<Option<SearchResult>, StoreError>;

    /// Create a new job in `pending` for the given search result.
    fn create_job(&self, search_result_id: i64) -> Result<DownloadJob, StoreError>;

    /// Get a job by id.
    fn get_job(&self, id: i64) -> Result<Option<DownloadJob>, StoreError>;

    /// List jobs matching the filter, most recent first.
    fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<DownloadJob>, StoreError>;

    /// Count jobs matching the filter. `limit` and `offset` are ignored.
    fn count_jobs(&self, filter: &JobFilter) -> Result<i64, StoreError>;

    /// Apply a partial update to a job and return the updated row.
    ///
    /// Enforces the lifecycle invariants: a status change must be a legal
    /// transition, the transfer id is write-once (later writes are ignored),
    /// and progress never decreases.
    fn update_job(&self, id: i64, update: JobUpdate) -> Result<DownloadJob, StoreError>;

    /// Permanently delete a job. Returns the deleted row if found.
    fn delete_job(&self, id: i64) -> Result<DownloadJob, StoreError>;
}
