//! Download manager: owns the job lifecycle from acceptance to completion.
//!
//! `DownloadManager` is the write side of the system. It hands resources to
//! the torrent daemon, spawns one monitor task per job, and drives each job
//! through the status machine persisted in the store. Monitors are
//! cooperative: they re-read the job every tick, so a cancel or delete from
//! the API side is picked up within one poll interval.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::catalog::MediaCatalog;
use crate::metrics;
use crate::organizer::Organizer;
use crate::store::{
    DownloadJob, DownloadStore, JobFilter, JobStatus, JobUpdate, SearchResult,
};
use crate::torrent_client::{SubmitRequest, TorrentClient, TransferSnapshot};

use super::config::DownloaderConfig;
use super::matcher::match_transfer;
use super::types::{DownloadError, DownloadStatus};

/// Progress percentage at which a transfer is considered done. qBittorrent
/// reports values like 0.9999998 for finished torrents, so an exact 100.0
/// comparison would hang jobs forever.
const COMPLETION_THRESHOLD: f64 = 99.9;

/// Jobs fetched per store query when scanning for work to resume.
const RESUME_PAGE_SIZE: i64 = 100;

/// Orchestrates download jobs across the store, the torrent daemon, the
/// organizer and the media catalog.
pub struct DownloadManager {
    config: DownloaderConfig,
    download_root: PathBuf,
    store: Arc<dyn DownloadStore>,
    torrent_client: Arc<dyn TorrentClient>,
    organizer: Arc<dyn Organizer>,
    catalog: Arc<dyn MediaCatalog>,
    /// Client for fetching .torrent descriptors from indirect references.
    http: reqwest::Client,
    monitors: Arc<RwLock<HashMap<i64, JoinHandle<()>>>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl DownloadManager {
    pub fn new(
        config: DownloaderConfig,
        download_root: impl Into<PathBuf>,
        store: Arc<dyn DownloadStore>,
        torrent_client: Arc<dyn TorrentClient>,
        organizer: Arc<dyn Organizer>,
        catalog: Arc<dyn MediaCatalog>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            download_root: download_root.into(),
            store,
            torrent_client,
            organizer,
            catalog,
            http,
            monitors: Arc::new(RwLock::new(HashMap::new())),
            shutdown_tx,
        }
    }

    /// Accepts a stored search result for download.
    ///
    /// Creates the job, submits the resource to the daemon and starts a
    /// monitor task. Submission failures are recorded on the job (terminal
    /// `failed`) rather than returned as errors; only a missing search
    /// result or a store fault is an `Err`.
    pub async fn start_download(&self, search_result_id: i64) -> Result<DownloadJob, DownloadError> {
        let result = self
            .store
            .get_search_result(search_result_id)?
            .ok_or(DownloadError::SearchResultNotFound(search_result_id))?;

        let job = self.store.create_job(result.id)?;
        let job = self
            .store
            .update_job(job.id, JobUpdate::new().with_status(JobStatus::Starting))?;
        info!(job_id = job.id, title = %result.title, "starting download");

        // The daemon accepts unknown categories at submission time, so a
        // category setup failure is not fatal to the job.
        if let Err(e) = self
            .torrent_client
            .ensure_category(&self.config.category, &self.download_root.to_string_lossy())
            .await
        {
            warn!(job_id = job.id, error = %e, "could not ensure daemon category");
        }

        let request = match self.resolve_source(&result).await {
            Ok(request) => request,
            Err(message) => {
                warn!(job_id = job.id, message = %message, "no usable download source");
                return self.fail_job(job.id, &message);
            }
        };

        let request = request
            .with_category(&self.config.category)
            .with_save_path(self.download_root.to_string_lossy())
            .with_tag(self.config.job_tag(job.id));

        if let Err(e) = self.torrent_client.submit(request).await {
            warn!(job_id = job.id, error = %e, "daemon rejected submission");
            return self.fail_job(job.id, &format!("failed to submit transfer: {}", e));
        }

        let job = self
            .store
            .update_job(job.id, JobUpdate::new().with_status(JobStatus::Downloading))?;
        metrics::DOWNLOADS_STARTED.inc();

        self.spawn_monitor(job.id).await;
        Ok(job)
    }

    /// Builds the submission request from a search result, preferring the
    /// direct magnet reference and falling back to fetching the .torrent
    /// descriptor over HTTP.
    async fn resolve_source(&self, result: &SearchResult) -> Result<SubmitRequest, String> {
        if let Some(magnet) = &result.magnet_url {
            return Ok(SubmitRequest::magnet(magnet.as_str()));
        }

        let Some(url) = &result.download_url else {
            return Err("no download URL available".to_string());
        };

        debug!(url = %url, "fetching transfer descriptor");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| format!("failed to fetch transfer descriptor: {}", e))?;
        if !response.status().is_success() {
            return Err(format!(
                "failed to fetch transfer descriptor: HTTP {}",
                response.status()
            ));
        }
        let data = response
            .bytes()
            .await
            .map_err(|e| format!("failed to read transfer descriptor: {}", e))?;

        Ok(SubmitRequest::torrent_file(data.to_vec()))
    }

    /// Records a start-phase failure on the job and returns the failed row.
    fn fail_job(&self, job_id: i64, message: &str) -> Result<DownloadJob, DownloadError> {
        let job = self.store.update_job(
            job_id,
            JobUpdate::new()
                .with_status(JobStatus::Failed)
                .with_error_message(message),
        )?;
        metrics::DOWNLOADS_FAILED.inc();
        Ok(job)
    }

    /// Spawns the monitor task for a job. Idempotent: a live monitor for the
    /// same job is left alone.
    pub async fn spawn_monitor(&self, job_id: i64) {
        let mut monitors = self.monitors.write().await;
        if let Some(handle) = monitors.get(&job_id) {
            if !handle.is_finished() {
                debug!(job_id, "monitor already running");
                return;
            }
        }

        let monitor = JobMonitor {
            job_id,
            config: self.config.clone(),
            download_root: self.download_root.clone(),
            store: Arc::clone(&self.store),
            torrent_client: Arc::clone(&self.torrent_client),
            organizer: Arc::clone(&self.organizer),
            catalog: Arc::clone(&self.catalog),
            monitors: Arc::clone(&self.monitors),
            shutdown_rx: self.shutdown_tx.subscribe(),
        };

        metrics::ACTIVE_MONITORS.inc();
        monitors.insert(job_id, tokio::spawn(monitor.run()));
    }

    /// Current state of one job, enriched with a live daemon snapshot when
    /// the job is still active and bound to a transfer.
    pub async fn get_status(&self, job_id: i64) -> Result<Option<DownloadStatus>, DownloadError> {
        let Some(job) = self.store.get_job(job_id)? else {
            return Ok(None);
        };

        let title = self.title_for(&job)?;

        let transfer = match &job.transfer_id {
            Some(transfer_id) if !job.status.is_terminal() => {
                match self.torrent_client.get(transfer_id).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        debug!(job_id, error = %e, "live transfer lookup failed");
                        None
                    }
                }
            }
            _ => None,
        };

        Ok(Some(DownloadStatus { job, title, transfer }))
    }

    /// Lists jobs matching the filter, without live daemon enrichment.
    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<DownloadStatus>, DownloadError> {
        let jobs = self.store.list_jobs(filter)?;
        let mut statuses = Vec::with_capacity(jobs.len());
        for job in jobs {
            let title = self.title_for(&job)?;
            statuses.push(DownloadStatus {
                job,
                title,
                transfer: None,
            });
        }
        Ok(statuses)
    }

    fn title_for(&self, job: &DownloadJob) -> Result<String, DownloadError> {
        Ok(self
            .store
            .get_search_result(job.search_result_id)?
            .map(|result| result.title)
            .unwrap_or_else(|| "Unknown".to_string()))
    }

    /// Cancels a job. Terminal jobs are left untouched (idempotent). If the
    /// daemon refuses to delete a bound transfer the error is returned and
    /// the job keeps its current status, so the caller can retry.
    pub async fn cancel(&self, job_id: i64, delete_files: bool) -> Result<(), DownloadError> {
        let job = self
            .store
            .get_job(job_id)?
            .ok_or(DownloadError::JobNotFound(job_id))?;

        if job.status.is_terminal() {
            debug!(job_id, status = %job.status, "cancel on terminal job is a no-op");
            return Ok(());
        }

        if let Some(transfer_id) = &job.transfer_id {
            self.torrent_client.delete(transfer_id, delete_files).await?;
        }

        self.store.update_job(
            job_id,
            JobUpdate::new()
                .with_status(JobStatus::Cancelled)
                .with_error_message("cancelled by operator"),
        )?;
        metrics::DOWNLOADS_CANCELLED.inc();
        info!(job_id, delete_files, "download cancelled");
        Ok(())
    }

    /// Deletes a job record along with, best-effort, its daemon transfer and
    /// (when `delete_files` is set) its on-disk output. Artifact failures are
    /// logged and do not block the record removal.
    pub async fn delete_job(&self, job_id: i64, delete_files: bool) -> Result<(), DownloadError> {
        let job = self
            .store
            .get_job(job_id)?
            .ok_or(DownloadError::JobNotFound(job_id))?;

        self.remove_artifacts(&job, delete_files).await;
        self.store.delete_job(job_id)?;
        info!(job_id, delete_files, "download job deleted");
        Ok(())
    }

    async fn remove_artifacts(&self, job: &DownloadJob, delete_files: bool) {
        if delete_files {
            if let Some(path) = &job.download_path {
                if let Err(e) = self.organizer.cleanup_download(Path::new(path)).await {
                    warn!(job_id = job.id, error = %e, "could not remove downloaded files");
                }
            }
        }

        if let Some(transfer_id) = &job.transfer_id {
            if let Err(e) = self.torrent_client.delete(transfer_id, delete_files).await {
                warn!(job_id = job.id, error = %e, "could not remove transfer from daemon");
            }
        }
    }

    /// Removes terminal jobs older than the cutoff, including their daemon
    /// transfers and on-disk leftovers. Returns the number of jobs removed.
    pub async fn cleanup(&self, older_than_days: i64) -> Result<usize, DownloadError> {
        let cutoff = Utc::now() - ChronoDuration::days(older_than_days);
        let filter = JobFilter::new()
            .with_status(JobStatus::Completed)
            .with_status(JobStatus::CompletedWithWarning)
            .with_status(JobStatus::Failed)
            .with_status(JobStatus::Cancelled)
            .with_created_before(cutoff);

        let mut removed = 0usize;
        loop {
            let batch = self.store.list_jobs(&filter)?;
            if batch.is_empty() {
                break;
            }

            let mut progressed = false;
            for job in batch {
                self.remove_artifacts(&job, true).await;
                match self.store.delete_job(job.id) {
                    Ok(_) => {
                        debug!(job_id = job.id, status = %job.status, "cleaned up old job");
                        removed += 1;
                        progressed = true;
                    }
                    Err(e) => {
                        warn!(job_id = job.id, error = %e, "could not remove job during cleanup")
                    }
                }
            }
            // A batch where every delete failed would otherwise loop forever.
            if !progressed {
                break;
            }
        }

        if removed > 0 {
            metrics::JOBS_CLEANED.inc_by(removed as u64);
        }
        info!(removed, older_than_days, "download cleanup finished");
        Ok(removed)
    }

    /// Restarts monitor tasks for every job that was mid-flight when the
    /// process last stopped. Returns how many were resumed.
    pub async fn resume_active_jobs(&self) -> Result<usize, DownloadError> {
        let filter = JobFilter::new()
            .with_status(JobStatus::Starting)
            .with_status(JobStatus::Downloading)
            .with_status(JobStatus::Processing)
            .with_limit(RESUME_PAGE_SIZE);

        // Page through the full active set before spawning anything. Unlike
        // cleanup, resuming does not shrink the filtered set, and a monitor
        // spawned mid-scan can move its job out of an active status and shift
        // the jobs behind it into an already-read page.
        let mut jobs = Vec::new();
        let mut offset = 0;
        loop {
            let batch = self.store.list_jobs(&filter.clone().with_offset(offset))?;
            let exhausted = (batch.len() as i64) < RESUME_PAGE_SIZE;
            jobs.extend(batch);
            if exhausted {
                break;
            }
            offset += RESUME_PAGE_SIZE;
        }

        let count = jobs.len();
        for job in &jobs {
            info!(job_id = job.id, status = %job.status, "resuming download monitor");
            self.spawn_monitor(job.id).await;
        }
        if count > 0 {
            info!(count, "resumed active download jobs");
        }
        Ok(count)
    }

    /// Signals every monitor task to stop and gives them a moment to wind
    /// down. Jobs stay in their current status and are picked up again by
    /// `resume_active_jobs` on the next start.
    pub async fn shutdown(&self) {
        info!("stopping download manager");
        let _ = self.shutdown_tx.send(());
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    pub async fn active_monitor_count(&self) -> usize {
        self.monitors.read().await.len()
    }

    pub async fn is_monitoring(&self, job_id: i64) -> bool {
        self.monitors.read().await.contains_key(&job_id)
    }
}

/// Per-job polling task. One instance per active job; exits when the job
/// reaches a terminal status, disappears, or the manager shuts down.
struct JobMonitor {
    job_id: i64,
    config: DownloaderConfig,
    download_root: PathBuf,
    store: Arc<dyn DownloadStore>,
    torrent_client: Arc<dyn TorrentClient>,
    organizer: Arc<dyn Organizer>,
    catalog: Arc<dyn MediaCatalog>,
    monitors: Arc<RwLock<HashMap<i64, JoinHandle<()>>>>,
    shutdown_rx: broadcast::Receiver<()>,
}

enum TickOutcome {
    Continue,
    Stop,
}

impl JobMonitor {
    async fn run(mut self) {
        debug!(job_id = self.job_id, "download monitor started");
        let reason = self.monitor_loop().await;

        let mut monitors = self.monitors.write().await;
        monitors.remove(&self.job_id);
        metrics::ACTIVE_MONITORS.dec();
        info!(job_id = self.job_id, reason, "download monitor stopped");
    }

    async fn monitor_loop(&mut self) -> &'static str {
        let job = match self.store.get_job(self.job_id) {
            Ok(Some(job)) => job,
            Ok(None) => return "job missing",
            Err(e) => {
                error!(job_id = self.job_id, error = %e, "cannot load job");
                return "store unavailable";
            }
        };

        let expected_title = match self.store.get_search_result(job.search_result_id) {
            Ok(Some(result)) => result.title,
            Ok(None) => {
                // Without the search result there is nothing to match the
                // daemon's transfer list against.
                self.mark_failed("search result record is missing").await;
                return "search result missing";
            }
            Err(e) => {
                error!(job_id = self.job_id, error = %e, "cannot load search result");
                self.mark_failed("search result record is missing").await;
                return "search result missing";
            }
        };

        let job_tag = self.config.job_tag(self.job_id);
        let job_created_at = job.created_at;
        let mut attempts: u32 = 0;

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => return "shutdown",
                _ = tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)) => {}
            }

            attempts += 1;
            if attempts > self.config.max_poll_attempts {
                self.mark_failed("monitoring attempts exhausted before the download finished")
                    .await;
                return "attempts exhausted";
            }

            match self
                .tick(&job_tag, &expected_title, job_created_at, attempts)
                .await
            {
                Ok(TickOutcome::Continue) => {}
                Ok(TickOutcome::Stop) => return "job settled",
                Err(e) => {
                    // Transient daemon or store trouble; the next tick retries.
                    warn!(job_id = self.job_id, error = %e, "monitor tick failed");
                }
            }
        }
    }

    async fn tick(
        &self,
        job_tag: &str,
        expected_title: &str,
        job_created_at: DateTime<Utc>,
        attempts: u32,
    ) -> Result<TickOutcome, DownloadError> {
        let Some(job) = self.store.get_job(self.job_id)? else {
            debug!(job_id = self.job_id, "job deleted, stopping monitor");
            return Ok(TickOutcome::Stop);
        };
        if job.status.is_terminal() {
            debug!(job_id = self.job_id, status = %job.status, "job settled elsewhere");
            return Ok(TickOutcome::Stop);
        }

        let transfers = self.torrent_client.list(Some(&self.config.category)).await?;
        let snapshot = match_transfer(
            job_tag,
            expected_title,
            job_created_at,
            self.config.match_window_secs,
            &transfers,
        );

        let Some(snapshot) = snapshot else {
            // Grace period applies only while no transfer was ever bound; a
            // bound transfer that vanished may be mid-move in the daemon.
            if job.transfer_id.is_none() && attempts > self.config.grace_attempts {
                warn!(
                    job_id = self.job_id,
                    attempts, "transfer never appeared in the daemon"
                );
                self.mark_failed("resource not found after timeout").await;
                return Ok(TickOutcome::Stop);
            }
            debug!(job_id = self.job_id, attempts, "transfer not visible yet");
            return Ok(TickOutcome::Continue);
        };

        if job.transfer_id.is_none() {
            self.store.update_job(
                self.job_id,
                JobUpdate::new().with_transfer_id(snapshot.id.as_str()),
            )?;
            info!(job_id = self.job_id, transfer_id = %snapshot.id, "bound transfer to job");
        }

        let progress = (snapshot.progress * 100.0).clamp(0.0, 100.0);

        if progress >= COMPLETION_THRESHOLD {
            // A job resumed in `starting` may see a finished transfer on its
            // first tick; it still walks through `downloading` first.
            if job.status == JobStatus::Starting {
                self.store.update_job(
                    self.job_id,
                    JobUpdate::new().with_status(JobStatus::Downloading),
                )?;
            }
            let output_path = resolve_output_path(&self.download_root, snapshot);
            let job = self.store.update_job(
                self.job_id,
                JobUpdate::new()
                    .with_status(JobStatus::Processing)
                    .with_progress(progress)
                    .with_download_path(output_path.to_string_lossy()),
            )?;
            info!(
                job_id = self.job_id,
                path = %output_path.display(),
                "download finished, organizing files"
            );
            self.complete(&job, &output_path).await;
            return Ok(TickOutcome::Stop);
        }

        if snapshot.state.is_terminal_error() {
            warn!(
                job_id = self.job_id,
                state = snapshot.state.as_str(),
                "daemon reports unrecoverable transfer state"
            );
            self.mark_failed(&format!("transfer state: {}", snapshot.state.as_str()))
                .await;
            return Ok(TickOutcome::Stop);
        }

        let mut update = JobUpdate::new().with_progress(progress);
        // Never move a job backwards: a resumed `processing` job only gets
        // progress refreshes until the completion branch fires again.
        if matches!(job.status, JobStatus::Starting | JobStatus::Downloading) {
            update = update.with_status(JobStatus::Downloading);
        }
        self.store.update_job(self.job_id, update)?;

        Ok(TickOutcome::Continue)
    }

    /// Post-download pipeline: organize into the library, notify the
    /// catalog, settle the job. Runs once; a failure before the final status
    /// write leaves the job `failed`, never stuck in `processing`.
    async fn complete(&self, job: &DownloadJob, output_path: &Path) {
        let outcome = match self.organizer.organize(output_path).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(job_id = self.job_id, error = %e, "organizer failed");
                self.mark_failed("failed to organize downloaded files").await;
                return;
            }
        };

        metrics::FILES_ORGANIZED.inc_by(outcome.files_copied as u64);
        info!(
            job_id = self.job_id,
            author = %outcome.author,
            title = %outcome.title,
            files_copied = outcome.files_copied,
            "organized download into library"
        );

        match self.notify_catalog().await {
            Ok(()) => {
                let completed_at = Utc::now();
                let update = JobUpdate::new()
                    .with_status(JobStatus::Completed)
                    .with_completed_at(completed_at);
                if let Err(e) = self.store.update_job(self.job_id, update) {
                    error!(job_id = self.job_id, error = %e, "could not record completion");
                    return;
                }
                metrics::DOWNLOADS_COMPLETED.inc();
                observe_duration("completed", job.created_at, completed_at);
                info!(job_id = self.job_id, "download completed");

                // The library copy is authoritative now.
                if let Err(e) = self.organizer.cleanup_download(output_path).await {
                    warn!(job_id = self.job_id, error = %e, "could not remove download directory");
                }
            }
            Err(message) => {
                let update = JobUpdate::new()
                    .with_status(JobStatus::CompletedWithWarning)
                    .with_error_message(message.as_str());
                if let Err(e) = self.store.update_job(self.job_id, update) {
                    error!(job_id = self.job_id, error = %e, "could not record completion warning");
                    return;
                }
                metrics::DOWNLOADS_COMPLETED_WITH_WARNING.inc();
                observe_duration("completed_with_warning", job.created_at, Utc::now());
                warn!(job_id = self.job_id, message = %message, "download completed with warning");
            }
        }
    }

    /// Asks the catalog to rescan its libraries. Ok when at least one scan
    /// request was accepted; the Err string becomes the job's warning.
    async fn notify_catalog(&self) -> Result<(), String> {
        let libraries = match self.catalog.list_libraries().await {
            Ok(libraries) => libraries,
            Err(e) => {
                return Err(format!("files organized but catalog was unreachable: {}", e));
            }
        };

        if libraries.is_empty() {
            return Err("files organized but catalog reported no libraries".to_string());
        }

        let mut scanned = 0usize;
        for library in &libraries {
            match self.catalog.scan_library(&library.id).await {
                Ok(()) => {
                    debug!(library_id = %library.id, library = %library.name, "catalog scan requested");
                    scanned += 1;
                }
                Err(e) => {
                    warn!(library_id = %library.id, error = %e, "catalog scan request failed");
                }
            }
        }

        if scanned == 0 {
            return Err("files organized but no catalog library scan succeeded".to_string());
        }
        Ok(())
    }

    /// Marks the job failed unless it already settled. Missing jobs and
    /// terminal statuses are left alone so a concurrent cancel wins.
    async fn mark_failed(&self, message: &str) {
        match self.store.get_job(self.job_id) {
            Ok(Some(job)) if !job.status.is_terminal() => {
                let update = JobUpdate::new()
                    .with_status(JobStatus::Failed)
                    .with_error_message(message);
                match self.store.update_job(self.job_id, update) {
                    Ok(job) => {
                        metrics::DOWNLOADS_FAILED.inc();
                        observe_duration("failed", job.created_at, Utc::now());
                        error!(job_id = self.job_id, message, "download failed");
                    }
                    Err(e) => {
                        error!(job_id = self.job_id, error = %e, "could not record failure")
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                error!(job_id = self.job_id, error = %e, "could not load job to record failure")
            }
        }
    }
}

/// Where the finished payload lives on disk. The daemon's content path is
/// authoritative when present; otherwise fall back to the conventional
/// `<download root>/<transfer name>` location.
fn resolve_output_path(download_root: &Path, snapshot: &TransferSnapshot) -> PathBuf {
    match &snapshot.content_path {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => download_root.join(&snapshot.name),
    }
}

fn observe_duration(result: &str, started: DateTime<Utc>, ended: DateTime<Utc>) {
    let secs = (ended - started).num_milliseconds() as f64 / 1000.0;
    if secs >= 0.0 {
        metrics::DOWNLOAD_DURATION
            .with_label_values(&[result])
            .observe(secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::torrent_client::TransferState;

    fn snapshot(name: &str, content_path: Option<&str>) -> TransferSnapshot {
        TransferSnapshot {
            id: "abc123".to_string(),
            name: name.to_string(),
            tags: vec![],
            progress: 1.0,
            state: TransferState::Seeding,
            size_bytes: 0,
            downloaded_bytes: 0,
            download_speed: 0,
            upload_speed: 0,
            eta_secs: None,
            seeds: 0,
            peers: 0,
            added_at: None,
            save_path: None,
            content_path: content_path.map(str::to_string),
        }
    }

    #[test]
    fn output_path_prefers_daemon_content_path() {
        let path = resolve_output_path(
            Path::new("/downloads"),
            &snapshot("Some Book", Some("/downloads/Some Book [unabridged]")),
        );
        assert_eq!(path, PathBuf::from("/downloads/Some Book [unabridged]"));
    }

    #[test]
    fn output_path_falls_back_to_transfer_name() {
        let path = resolve_output_path(Path::new("/downloads"), &snapshot("Some Book", None));
        assert_eq!(path, PathBuf::from("/downloads/Some Book"));

        let path = resolve_output_path(Path::new("/downloads"), &snapshot("Some Book", Some("")));
        assert_eq!(path, PathBuf::from("/downloads/Some Book"));
    }
}
