use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Storage paths are non-empty
/// - Integration URLs are non-empty
/// - Downloader polling knobs are coherent
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Storage validation
    if config.storage.download_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.download_path cannot be empty".to_string(),
        ));
    }
    if config.storage.library_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.library_path cannot be empty".to_string(),
        ));
    }

    // Integration validation
    if config.qbittorrent.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "qbittorrent.url cannot be empty".to_string(),
        ));
    }
    if config.audiobookshelf.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "audiobookshelf.url cannot be empty".to_string(),
        ));
    }

    // Downloader validation
    if config.downloader.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "downloader.poll_interval_ms cannot be 0".to_string(),
        ));
    }
    if config.downloader.max_poll_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "downloader.max_poll_attempts cannot be 0".to_string(),
        ));
    }
    if config.downloader.grace_attempts > config.downloader.max_poll_attempts {
        return Err(ConfigError::ValidationError(
            "downloader.grace_attempts cannot exceed downloader.max_poll_attempts".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid_toml() -> &'static str {
        r#"
[qbittorrent]
url = "http://localhost:8080"
password = "adminadmin"

[audiobookshelf]
url = "http://localhost:13378"
api_key = "token"
"#
    }

    #[test]
    fn test_validate_valid_config() {
        let config = load_config_from_str(valid_toml()).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_validate_empty_qbittorrent_url_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.qbittorrent.url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_poll_interval_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.downloader.poll_interval_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_grace_above_max_attempts_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.downloader.grace_attempts = config.downloader.max_poll_attempts + 1;
        assert!(validate_config(&config).is_err());
    }
}
