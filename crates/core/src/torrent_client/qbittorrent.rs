//! qBittorrent torrent client implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{multipart, Client};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::QBittorrentConfig;

use super::{
    SubmitRequest, TorrentClient, TorrentClientError, TransferRate, TransferSnapshot,
    TransferSource, TransferState,
};

/// qBittorrent Web API v2 client.
pub struct QBittorrentClient {
    client: Client,
    config: QBittorrentConfig,
    /// Session marker (cleared on auth failure to force a re-login).
    session: Arc<RwLock<Option<String>>>,
}

impl QBittorrentClient {
    /// Create a new qBittorrent client.
    pub fn new(config: QBittorrentConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Login and store session cookie.
    async fn login(&self) -> Result<(), TorrentClientError> {
        let url = format!("{}/api/v2/auth/login", self.base_url());

        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TorrentClientError::Timeout
                } else if e.is_connect() {
                    TorrentClientError::ConnectionFailed(e.to_string())
                } else {
                    TorrentClientError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if body.contains("Ok.") {
            debug!("qBittorrent login successful");
            // Session cookie is stored by the cookie jar
            let mut session = self.session.write().await;
            *session = Some("authenticated".to_string());
            Ok(())
        } else if body.contains("Fails.") || status.as_u16() == 403 {
            Err(TorrentClientError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ))
        } else {
            Err(TorrentClientError::AuthenticationFailed(format!(
                "Unexpected response: {}",
                body.chars().take(100).collect::<String>()
            )))
        }
    }

    /// Ensure we have a valid session, logging in if needed.
    async fn ensure_authenticated(&self) -> Result<(), TorrentClientError> {
        let session = self.session.read().await;
        if session.is_some() {
            return Ok(());
        }
        drop(session);
        self.login().await
    }

    /// Drop the session marker and log back in. Used after a 403.
    async fn relogin(&self) -> Result<(), TorrentClientError> {
        warn!("qBittorrent session expired, re-authenticating");
        {
            let mut session = self.session.write().await;
            *session = None;
        }
        self.login().await
    }

    /// Make an authenticated GET request, re-authenticating once on a 403.
    async fn get_text(&self, endpoint: &str) -> Result<String, TorrentClientError> {
        self.ensure_authenticated().await?;

        let url = format!("{}{}", self.base_url(), endpoint);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                TorrentClientError::Timeout
            } else {
                TorrentClientError::ApiError(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() == 403 {
            self.relogin().await?;

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| TorrentClientError::ApiError(e.to_string()))?;

            if !response.status().is_success() {
                return Err(TorrentClientError::ApiError(format!(
                    "HTTP {}",
                    response.status()
                )));
            }

            return response
                .text()
                .await
                .map_err(|e| TorrentClientError::ApiError(e.to_string()));
        }

        if !status.is_success() {
            return Err(TorrentClientError::ApiError(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| TorrentClientError::ApiError(e.to_string()))
    }

    /// Make an authenticated POST request with form data, re-authenticating
    /// once on a 403.
    async fn post_form(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<String, TorrentClientError> {
        self.ensure_authenticated().await?;

        let url = format!("{}{}", self.base_url(), endpoint);
        let response = self
            .client
            .post(&url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TorrentClientError::Timeout
                } else {
                    TorrentClientError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 403 {
            self.relogin().await?;

            let response = self
                .client
                .post(&url)
                .form(params)
                .send()
                .await
                .map_err(|e| TorrentClientError::ApiError(e.to_string()))?;

            if !response.status().is_success() {
                return Err(TorrentClientError::ApiError(format!(
                    "HTTP {}",
                    response.status()
                )));
            }

            return response
                .text()
                .await
                .map_err(|e| TorrentClientError::ApiError(e.to_string()));
        }

        if !status.is_success() {
            return Err(TorrentClientError::ApiError(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| TorrentClientError::ApiError(e.to_string()))
    }

    /// Make an authenticated POST with multipart data, re-authenticating once
    /// on a 403. The form is rebuilt through the closure because multipart
    /// bodies cannot be cloned for a retry.
    async fn post_multipart<F>(
        &self,
        endpoint: &str,
        make_form: F,
    ) -> Result<String, TorrentClientError>
    where
        F: Fn() -> Result<multipart::Form, TorrentClientError> + Send + Sync,
    {
        self.ensure_authenticated().await?;

        let url = format!("{}{}", self.base_url(), endpoint);
        let response = self
            .client
            .post(&url)
            .multipart(make_form()?)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TorrentClientError::Timeout
                } else {
                    TorrentClientError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 403 {
            self.relogin().await?;

            let response = self
                .client
                .post(&url)
                .multipart(make_form()?)
                .send()
                .await
                .map_err(|e| TorrentClientError::ApiError(e.to_string()))?;

            if !response.status().is_success() {
                return Err(TorrentClientError::ApiError(format!(
                    "HTTP {}",
                    response.status()
                )));
            }

            return response
                .text()
                .await
                .map_err(|e| TorrentClientError::ApiError(e.to_string()));
        }

        if !status.is_success() {
            return Err(TorrentClientError::ApiError(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| TorrentClientError::ApiError(e.to_string()))
    }

    async fn fetch_categories(
        &self,
    ) -> Result<HashMap<String, QbCategory>, TorrentClientError> {
        let response = self.get_text("/api/v2/torrents/categories").await?;
        parse_categories_response(&response)
    }
}

/// qBittorrent torrent info response.
#[derive(Debug, Deserialize)]
struct QbTorrentInfo {
    hash: String,
    name: String,
    state: String,
    progress: f64,
    size: i64,
    downloaded: i64,
    dlspeed: i64,
    upspeed: i64,
    num_seeds: i64,
    num_leechs: i64,
    eta: i64,
    added_on: i64,
    save_path: String,
    #[serde(default)]
    content_path: String,
    #[serde(default)]
    tags: String,
}

impl QbTorrentInfo {
    fn into_snapshot(self) -> TransferSnapshot {
        TransferSnapshot {
            id: self.hash.to_lowercase(),
            name: self.name,
            tags: split_tags(&self.tags),
            progress: self.progress,
            state: parse_qb_state(&self.state),
            size_bytes: self.size.max(0) as u64,
            downloaded_bytes: self.downloaded.max(0) as u64,
            download_speed: self.dlspeed.max(0) as u64,
            upload_speed: self.upspeed.max(0) as u64,
            eta_secs: if self.eta > 0 && self.eta < 8640000 {
                Some(self.eta as u64)
            } else {
                None
            },
            seeds: self.num_seeds.max(0) as u32,
            peers: self.num_leechs.max(0) as u32,
            added_at: timestamp_to_datetime(self.added_on),
            save_path: if self.save_path.is_empty() {
                None
            } else {
                Some(self.save_path)
            },
            content_path: if self.content_path.is_empty() {
                None
            } else {
                Some(self.content_path)
            },
        }
    }
}

/// qBittorrent category entry.
#[derive(Debug, Deserialize)]
struct QbCategory {
    #[allow(dead_code)]
    name: String,
    #[serde(rename = "savePath", default)]
    save_path: String,
}

/// qBittorrent global transfer info response.
#[derive(Debug, Deserialize)]
struct QbGlobalTransferInfo {
    dl_info_speed: i64,
    up_info_speed: i64,
}

/// Parse qBittorrent state string to TransferState.
fn parse_qb_state(state: &str) -> TransferState {
    match state {
        "downloading" | "forcedDL" | "metaDL" | "allocating" => TransferState::Downloading,
        "uploading" | "forcedUP" => TransferState::Seeding,
        "pausedDL" | "stoppedDL" => TransferState::PausedDownload,
        "pausedUP" | "stoppedUP" => TransferState::PausedUpload,
        "checkingDL" | "checkingUP" | "checkingResumeData" | "moving" => TransferState::Checking,
        "queuedDL" | "queuedUP" => TransferState::Queued,
        "stalledDL" | "stalledUP" => TransferState::Stalled,
        "error" => TransferState::Error,
        "missingFiles" => TransferState::MissingFiles,
        _ => TransferState::Unknown,
    }
}

/// Split qBittorrent's comma-separated tag string into a tag set.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Convert Unix timestamp to DateTime<Utc>.
fn timestamp_to_datetime(ts: i64) -> Option<DateTime<Utc>> {
    if ts > 0 {
        Utc.timestamp_opt(ts, 0).single()
    } else {
        None
    }
}

fn parse_categories_response(
    body: &str,
) -> Result<HashMap<String, QbCategory>, TorrentClientError> {
    serde_json::from_str(body)
        .map_err(|e| TorrentClientError::ApiError(format!("Failed to parse categories: {}", e)))
}

fn build_add_form(request: &SubmitRequest) -> Result<multipart::Form, TorrentClientError> {
    let mut form = match &request.source {
        TransferSource::Magnet { uri } => multipart::Form::new().text("urls", uri.clone()),
        TransferSource::TorrentFile { data, filename } => {
            let file_part = multipart::Part::bytes(data.clone())
                .file_name(
                    filename
                        .clone()
                        .unwrap_or_else(|| "transfer.torrent".to_string()),
                )
                .mime_str("application/x-bittorrent")
                .map_err(|e| TorrentClientError::InvalidResource(e.to_string()))?;
            multipart::Form::new().part("torrents", file_part)
        }
    };

    if let Some(path) = &request.save_path {
        form = form.text("savepath", path.clone());
    }
    if let Some(category) = &request.category {
        form = form.text("category", category.clone());
    }
    if !request.tags.is_empty() {
        form = form.text("tags", request.tags.join(","));
    }

    Ok(form)
}

#[async_trait]
impl TorrentClient for QBittorrentClient {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn submit(&self, request: SubmitRequest) -> Result<(), TorrentClientError> {
        let body = self
            .post_multipart("/api/v2/torrents/add", || build_add_form(&request))
            .await?;

        // The add endpoint reports rejection in the body with a 200 status.
        if body.trim() == "Fails." {
            return Err(TorrentClientError::InvalidResource(
                "daemon rejected the transfer".to_string(),
            ));
        }

        Ok(())
    }

    async fn list(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<TransferSnapshot>, TorrentClientError> {
        let mut endpoint = "/api/v2/torrents/info".to_string();
        if let Some(category) = category {
            endpoint.push_str(&format!("?category={}", urlencoding::encode(category)));
        }

        let response = self.get_text(&endpoint).await?;
        let torrents: Vec<QbTorrentInfo> = serde_json::from_str(&response).map_err(|e| {
            TorrentClientError::ApiError(format!("Failed to parse response: {}", e))
        })?;

        Ok(torrents.into_iter().map(|t| t.into_snapshot()).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<TransferSnapshot>, TorrentClientError> {
        let id_lower = id.to_lowercase();
        let endpoint = format!("/api/v2/torrents/info?hashes={}", id_lower);
        let response = self.get_text(&endpoint).await?;

        let torrents: Vec<QbTorrentInfo> = serde_json::from_str(&response).map_err(|e| {
            TorrentClientError::ApiError(format!("Failed to parse response: {}", e))
        })?;

        Ok(torrents.into_iter().next().map(|t| t.into_snapshot()))
    }

    async fn delete(&self, id: &str, delete_files: bool) -> Result<(), TorrentClientError> {
        let id_lower = id.to_lowercase();
        let delete_str = if delete_files { "true" } else { "false" };

        self.post_form(
            "/api/v2/torrents/delete",
            &[("hashes", &id_lower), ("deleteFiles", delete_str)],
        )
        .await?;

        Ok(())
    }

    async fn ensure_category(
        &self,
        name: &str,
        save_path: &str,
    ) -> Result<(), TorrentClientError> {
        let categories = self.fetch_categories().await?;

        if let Some(existing) = categories.get(name) {
            if existing.save_path != save_path {
                warn!(
                    category = name,
                    existing_path = %existing.save_path,
                    requested_path = save_path,
                    "category exists with a different save path, leaving it untouched"
                );
            }
            return Ok(());
        }

        match self
            .post_form(
                "/api/v2/torrents/createCategory",
                &[("category", name), ("savePath", save_path)],
            )
            .await
        {
            Ok(_) => {
                debug!(category = name, "created daemon category");
                Ok(())
            }
            Err(e) => {
                // Lost a creation race with another writer: re-check.
                let categories = self.fetch_categories().await?;
                if categories.contains_key(name) {
                    Ok(())
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn transfer_rate(&self) -> Result<TransferRate, TorrentClientError> {
        let response = self.get_text("/api/v2/transfer/info").await?;
        let info: QbGlobalTransferInfo = serde_json::from_str(&response).map_err(|e| {
            TorrentClientError::ApiError(format!("Failed to parse response: {}", e))
        })?;

        Ok(TransferRate {
            download_bps: info.dl_info_speed.max(0) as u64,
            upload_bps: info.up_info_speed.max(0) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_qb_state_downloading() {
        assert_eq!(parse_qb_state("downloading"), TransferState::Downloading);
        assert_eq!(parse_qb_state("forcedDL"), TransferState::Downloading);
        assert_eq!(parse_qb_state("metaDL"), TransferState::Downloading);
    }

    #[test]
    fn test_parse_qb_state_seeding() {
        assert_eq!(parse_qb_state("uploading"), TransferState::Seeding);
        assert_eq!(parse_qb_state("forcedUP"), TransferState::Seeding);
    }

    #[test]
    fn test_parse_qb_state_paused() {
        assert_eq!(parse_qb_state("pausedDL"), TransferState::PausedDownload);
        assert_eq!(parse_qb_state("stoppedDL"), TransferState::PausedDownload);
        assert_eq!(parse_qb_state("pausedUP"), TransferState::PausedUpload);
        assert_eq!(parse_qb_state("stoppedUP"), TransferState::PausedUpload);
    }

    #[test]
    fn test_parse_qb_state_checking_and_queued() {
        assert_eq!(parse_qb_state("checkingDL"), TransferState::Checking);
        assert_eq!(parse_qb_state("checkingResumeData"), TransferState::Checking);
        assert_eq!(parse_qb_state("moving"), TransferState::Checking);
        assert_eq!(parse_qb_state("queuedDL"), TransferState::Queued);
        assert_eq!(parse_qb_state("queuedUP"), TransferState::Queued);
    }

    #[test]
    fn test_parse_qb_state_stalled() {
        assert_eq!(parse_qb_state("stalledDL"), TransferState::Stalled);
        assert_eq!(parse_qb_state("stalledUP"), TransferState::Stalled);
    }

    #[test]
    fn test_parse_qb_state_errors() {
        assert_eq!(parse_qb_state("error"), TransferState::Error);
        assert_eq!(parse_qb_state("missingFiles"), TransferState::MissingFiles);
        assert_eq!(parse_qb_state("something_else"), TransferState::Unknown);
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(
            split_tags("fablearr-job-1, audiobooks"),
            vec!["fablearr-job-1".to_string(), "audiobooks".to_string()]
        );
        assert_eq!(split_tags("solo"), vec!["solo".to_string()]);
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ").is_empty());
    }

    #[test]
    fn test_timestamp_to_datetime() {
        let dt = timestamp_to_datetime(1700000000).unwrap();
        assert_eq!(dt.year(), 2023);
        assert!(timestamp_to_datetime(0).is_none());
        assert!(timestamp_to_datetime(-1).is_none());
    }

    #[test]
    fn test_qb_torrent_info_into_snapshot() {
        let json = r#"{
            "hash": "ABC123DEF",
            "name": "Mistborn by Brandon Sanderson",
            "state": "downloading",
            "progress": 0.42,
            "size": 300000000,
            "downloaded": 126000000,
            "dlspeed": 250000,
            "upspeed": 1000,
            "num_seeds": 5,
            "num_leechs": 2,
            "eta": 600,
            "added_on": 1700000000,
            "save_path": "/downloads/audiobooks",
            "content_path": "/downloads/audiobooks/Mistborn",
            "tags": "fablearr-job-9, audiobooks"
        }"#;

        let info: QbTorrentInfo = serde_json::from_str(json).unwrap();
        let snapshot = info.into_snapshot();

        assert_eq!(snapshot.id, "abc123def");
        assert_eq!(snapshot.state, TransferState::Downloading);
        assert!((snapshot.progress - 0.42).abs() < 0.001);
        assert_eq!(snapshot.size_bytes, 300000000);
        assert_eq!(snapshot.eta_secs, Some(600));
        assert_eq!(snapshot.seeds, 5);
        assert_eq!(snapshot.peers, 2);
        assert_eq!(
            snapshot.tags,
            vec!["fablearr-job-9".to_string(), "audiobooks".to_string()]
        );
        assert_eq!(
            snapshot.content_path.as_deref(),
            Some("/downloads/audiobooks/Mistborn")
        );
        assert!(snapshot.added_at.is_some());
    }

    #[test]
    fn test_qb_torrent_info_missing_optional_fields() {
        // Older daemons omit content_path and tags entirely.
        let json = r#"{
            "hash": "abc",
            "name": "Book",
            "state": "stalledDL",
            "progress": 1.0,
            "size": 10,
            "downloaded": 10,
            "dlspeed": 0,
            "upspeed": 0,
            "num_seeds": 0,
            "num_leechs": 0,
            "eta": 8640000,
            "added_on": 0,
            "save_path": ""
        }"#;

        let info: QbTorrentInfo = serde_json::from_str(json).unwrap();
        let snapshot = info.into_snapshot();

        assert!(snapshot.tags.is_empty());
        assert!(snapshot.content_path.is_none());
        assert!(snapshot.save_path.is_none());
        assert!(snapshot.eta_secs.is_none());
        assert!(snapshot.added_at.is_none());
    }

    #[test]
    fn test_parse_categories_response() {
        let json = r#"{
            "audiobooks": {"name": "audiobooks", "savePath": "/downloads/audiobooks"},
            "movies": {"name": "movies", "savePath": "/downloads/movies"}
        }"#;

        let categories = parse_categories_response(json).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(
            categories.get("audiobooks").unwrap().save_path,
            "/downloads/audiobooks"
        );
    }

    #[test]
    fn test_build_add_form_magnet() {
        let request = SubmitRequest::magnet("magnet:?xt=urn:btih:abc")
            .with_category("audiobooks")
            .with_save_path("/downloads/audiobooks")
            .with_tag("fablearr-job-3");
        assert!(build_add_form(&request).is_ok());
    }

    #[test]
    fn test_build_add_form_torrent_file() {
        let request = SubmitRequest::torrent_file(vec![1, 2, 3]).with_filename("b.torrent");
        assert!(build_add_form(&request).is_ok());
    }
}
