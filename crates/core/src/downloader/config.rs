//! Download manager configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the download manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Daemon-side category submitted transfers are filed under.
    /// Listing is scoped to this category during monitoring.
    #[serde(default = "default_category")]
    pub category: String,

    /// How often the per-job monitor polls the daemon (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Maximum monitor ticks before a job is abandoned.
    /// 1200 ticks at 5 seconds is roughly 100 minutes.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Ticks to keep waiting for a submitted transfer to show up in the
    /// daemon before declaring it lost. 120 ticks is 10 minutes.
    #[serde(default = "default_grace_attempts")]
    pub grace_attempts: u32,

    /// Window around job creation (seconds) within which a name-based
    /// match is trusted. See the matcher for why this is bounded.
    #[serde(default = "default_match_window")]
    pub match_window_secs: i64,

    /// Prefix for the job-unique tag attached to submitted transfers.
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
}

fn default_category() -> String {
    "audiobooks".to_string()
}

fn default_poll_interval() -> u64 {
    5000 // 5 seconds
}

fn default_max_poll_attempts() -> u32 {
    1200
}

fn default_grace_attempts() -> u32 {
    120
}

fn default_match_window() -> i64 {
    300
}

fn default_tag_prefix() -> String {
    "fablearr-job".to_string()
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            category: default_category(),
            poll_interval_ms: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
            grace_attempts: default_grace_attempts(),
            match_window_secs: default_match_window(),
            tag_prefix: default_tag_prefix(),
        }
    }
}

impl DownloaderConfig {
    /// The job-unique tag attached to a submitted transfer so the monitor
    /// can identify it later.
    pub fn job_tag(&self, job_id: i64) -> String {
        format!("{}-{}", self.tag_prefix, job_id)
    }
}
