//! Audiobookshelf API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::AudiobookshelfConfig;

use super::types::Library;
use super::{CatalogError, MediaCatalog};

/// Audiobookshelf media catalog client.
pub struct AudiobookshelfClient {
    client: Client,
    config: AudiobookshelfConfig,
}

impl AudiobookshelfClient {
    /// Create a new Audiobookshelf client.
    pub fn new(config: AudiobookshelfConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.config.api_key)
    }
}

/// Audiobookshelf libraries list response.
#[derive(Debug, Deserialize)]
struct AbsLibrariesResponse {
    #[serde(default)]
    libraries: Vec<AbsLibrary>,
}

/// Audiobookshelf library entry.
#[derive(Debug, Deserialize)]
struct AbsLibrary {
    id: String,
    name: String,
    #[serde(rename = "mediaType", default)]
    media_type: String,
}

impl From<AbsLibrary> for Library {
    fn from(lib: AbsLibrary) -> Self {
        Library {
            id: lib.id,
            name: lib.name,
            media_type: lib.media_type,
        }
    }
}

fn parse_libraries_response(body: &str) -> Result<Vec<Library>, CatalogError> {
    let response: AbsLibrariesResponse = serde_json::from_str(body)
        .map_err(|e| CatalogError::ParseError(format!("Failed to parse libraries: {}", e)))?;
    Ok(response.libraries.into_iter().map(Library::from).collect())
}

#[async_trait]
impl MediaCatalog for AudiobookshelfClient {
    fn name(&self) -> &str {
        "audiobookshelf"
    }

    async fn list_libraries(&self) -> Result<Vec<Library>, CatalogError> {
        let url = format!("{}/api/libraries", self.base_url());
        debug!(url = %url, "listing catalog libraries");

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_libraries_response(&body)
    }

    async fn scan_library(&self, library_id: &str) -> Result<(), CatalogError> {
        let url = format!("{}/api/libraries/{}/scan", self.base_url(), library_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        info!(library_id = library_id, "triggered catalog library scan");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_libraries_response() {
        let json = r#"{
            "libraries": [
                {"id": "lib-1", "name": "Audiobooks", "mediaType": "book", "folders": []},
                {"id": "lib-2", "name": "Podcasts", "mediaType": "podcast"}
            ]
        }"#;

        let libraries = parse_libraries_response(json).unwrap();
        assert_eq!(libraries.len(), 2);
        assert_eq!(libraries[0].id, "lib-1");
        assert_eq!(libraries[0].name, "Audiobooks");
        assert_eq!(libraries[0].media_type, "book");
        assert_eq!(libraries[1].media_type, "podcast");
    }

    #[test]
    fn test_parse_libraries_tolerates_missing_media_type() {
        let json = r#"{"libraries": [{"id": "lib-1", "name": "Books"}]}"#;
        let libraries = parse_libraries_response(json).unwrap();
        assert_eq!(libraries[0].media_type, "");
    }

    #[test]
    fn test_parse_libraries_empty_response() {
        let libraries = parse_libraries_response("{}").unwrap();
        assert!(libraries.is_empty());
    }

    #[test]
    fn test_parse_libraries_rejects_malformed_json() {
        assert!(matches!(
            parse_libraries_response("not json"),
            Err(CatalogError::ParseError(_))
        ));
    }
}
