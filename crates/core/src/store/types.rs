//! Data model for search results and download jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A ranked result produced by the search subsystem.
///
/// Immutable once stored: the downloader only ever reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    /// Query string that produced this result.
    pub query: String,
    pub title: String,
    pub author: Option<String>,
    pub narrator: Option<String>,
    pub size_bytes: i64,
    pub seeders: i64,
    pub leechers: i64,
    /// Indirect reference: a .torrent/detail URL that must be fetched first.
    pub download_url: Option<String>,
    /// Direct reference: a magnet URI, preferred over `download_url`.
    pub magnet_url: Option<String>,
    /// Originating indexer/source identifier.
    pub source: String,
    pub quality: Option<String>,
    pub format: Option<String>,
    pub languages: Vec<String>,
    /// Relevance score assigned by the search subsystem.
    pub score: f64,
    pub age_days: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a search result (id and timestamp assigned by the store).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSearchResult {
    pub query: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub narrator: Option<String>,
    #[serde(default)]
    pub size_bytes: i64,
    #[serde(default)]
    pub seeders: i64,
    #[serde(default)]
    pub leechers: i64,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub magnet_url: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub age_days: Option<f64>,
}

/// Lifecycle status of a download job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Starting,
    Downloading,
    Processing,
    Completed,
    CompletedWithWarning,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Starting => "starting",
            JobStatus::Downloading => "downloading",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::CompletedWithWarning => "completed_with_warning",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<JobStatus> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "starting" => Some(JobStatus::Starting),
            "downloading" => Some(JobStatus::Downloading),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "completed_with_warning" => Some(JobStatus::CompletedWithWarning),
            "failed" => Some(JobStatus::Failed),
            "cancelled" => Some(JobStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed
                | JobStatus::CompletedWithWarning
                | JobStatus::Failed
                | JobStatus::Cancelled
        )
    }

    /// States with an in-flight download worth monitoring.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobStatus::Starting | JobStatus::Downloading | JobStatus::Processing
        )
    }

    /// Whether the lifecycle graph permits moving from `self` to `next`.
    ///
    /// Same-state writes are always permitted (field updates without a state
    /// change). Cancellation is permitted from any non-terminal state; failure
    /// from any active state; otherwise only the forward edges of the graph.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match next {
            JobStatus::Cancelled => true,
            JobStatus::Failed => self.is_active(),
            JobStatus::Starting => *self == JobStatus::Pending,
            JobStatus::Downloading => *self == JobStatus::Starting,
            JobStatus::Processing => *self == JobStatus::Downloading,
            JobStatus::Completed | JobStatus::CompletedWithWarning => {
                *self == JobStatus::Processing
            }
            JobStatus::Pending => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked download: one per `start_download` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadJob {
    pub id: i64,
    pub search_result_id: i64,
    /// Daemon-side transfer identifier (torrent hash). Bound once, on the
    /// first successful identity match, and never rewritten.
    pub transfer_id: Option<String>,
    pub status: JobStatus,
    /// Percentage 0.0-100.0; never decreases while downloading.
    pub progress: f64,
    /// Transfer output location on disk, recorded when the download finishes.
    pub download_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

/// Partial update applied to a job; unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub transfer_id: Option<String>,
    pub progress: Option<f64>,
    pub download_path: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl JobUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_transfer_id(mut self, transfer_id: impl Into<String>) -> Self {
        self.transfer_id = Some(transfer_id.into());
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_download_path(mut self, path: impl Into<String>) -> Self {
        self.download_path = Some(path.into());
        self
    }

    pub fn with_completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// Filter for querying download jobs.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Match any of these statuses (empty = all).
    pub statuses: Vec<JobStatus>,
    /// Only jobs created strictly before this instant.
    pub created_before: Option<DateTime<Utc>>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl JobFilter {
    pub fn new() -> Self {
        Self {
            statuses: Vec::new(),
            created_before: None,
            limit: 100,
            offset: 0,
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_created_before(mut self, cutoff: DateTime<Utc>) -> Self {
        self.created_before = Some(cutoff);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str_parse_roundtrip() {
        let all = [
            JobStatus::Pending,
            JobStatus::Starting,
            JobStatus::Downloading,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::CompletedWithWarning,
            JobStatus::Failed,
            JobStatus::Cancelled,
        ];
        for status in all {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("bogus"), None);
    }

    #[test]
    fn test_status_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::CompletedWithWarning.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Downloading.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }

    #[test]
    fn test_forward_edges_allowed() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Starting));
        assert!(JobStatus::Starting.can_transition_to(JobStatus::Downloading));
        assert!(JobStatus::Downloading.can_transition_to(JobStatus::Processing));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::CompletedWithWarning));
    }

    #[test]
    fn test_failure_only_from_active_states() {
        assert!(JobStatus::Starting.can_transition_to(JobStatus::Failed));
        assert!(JobStatus::Downloading.can_transition_to(JobStatus::Failed));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Failed));
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Cancelled));
        assert!(JobStatus::Starting.can_transition_to(JobStatus::Cancelled));
        assert!(JobStatus::Downloading.can_transition_to(JobStatus::Cancelled));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Cancelled.can_transition_to(JobStatus::Failed));
    }

    #[test]
    fn test_no_backward_edges() {
        assert!(!JobStatus::Downloading.can_transition_to(JobStatus::Starting));
        assert!(!JobStatus::Processing.can_transition_to(JobStatus::Downloading));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Processing));
        assert!(!JobStatus::Starting.can_transition_to(JobStatus::Pending));
    }

    #[test]
    fn test_same_state_write_allowed() {
        assert!(JobStatus::Downloading.can_transition_to(JobStatus::Downloading));
        assert!(JobStatus::Processing.can_transition_to(JobStatus::Processing));
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&JobStatus::CompletedWithWarning).unwrap();
        assert_eq!(json, "\"completed_with_warning\"");
        let parsed: JobStatus = serde_json::from_str("\"downloading\"").unwrap();
        assert_eq!(parsed, JobStatus::Downloading);
    }
}
