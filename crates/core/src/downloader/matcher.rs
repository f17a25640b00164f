//! Transfer identity matching.
//!
//! The daemon returns no usable key at submission time, so the monitor has
//! to find "its" transfer in the category listing afterwards. The
//! job-unique tag is authoritative when the daemon reports tags; a
//! name-plus-time heuristic covers daemons or states where it doesn't.

use chrono::{DateTime, Utc};

use crate::torrent_client::TransferSnapshot;

/// Find the transfer belonging to a job among `candidates`.
///
/// Ordered attempts, first hit wins:
///
/// 1. A candidate whose tag set contains `job_tag`.
/// 2. A candidate whose name contains `expected_title`
///    (case-insensitive) and whose added timestamp is within
///    `window_secs` of `job_created_at`. The time bound keeps a common
///    title from binding to an unrelated transfer added by someone else.
///
/// Known limitation: two identically named transfers added inside the
/// window are indistinguishable to the fallback; the first one listed
/// wins. The tag path is immune to this.
pub fn match_transfer<'a>(
    job_tag: &str,
    expected_title: &str,
    job_created_at: DateTime<Utc>,
    window_secs: i64,
    candidates: &'a [TransferSnapshot],
) -> Option<&'a TransferSnapshot> {
    if let Some(hit) = candidates
        .iter()
        .find(|c| c.tags.iter().any(|t| t == job_tag))
    {
        return Some(hit);
    }

    let title_lower = expected_title.to_lowercase();
    candidates.iter().find(|c| {
        let Some(added_at) = c.added_at else {
            // No timestamp means the window cannot be checked, so a
            // name-only match is not trusted.
            return false;
        };
        c.name.to_lowercase().contains(&title_lower)
            && (added_at - job_created_at).num_seconds().abs() <= window_secs
    })
}
