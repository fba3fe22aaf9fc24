use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::shared::errors::ConfigError;
use crate::shared::types::AppConfig;

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "Config.toml";

/// Upper bound for the alert cooldown, one year
pub const MAX_ALERT_COOLDOWN_SECS: i64 = 365 * 24 * 3600;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration. An explicit path must exist; without one, `Config.toml`
    /// is used when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    warn!("⚠️ {} not found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    AppConfig::default()
                }
            }
        };

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("📄 Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<AppConfig, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
        if config.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".to_string()));
        }
        if config.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be at least 1".to_string()));
        }
        if config.api.max_retries == 0 {
            return Err(ConfigError::Invalid("api.max_retries must be at least 1".to_string()));
        }
        if !config.arbitrage.min_diff_percentage.is_finite() || config.arbitrage.min_diff_percentage < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "arbitrage.min_diff_percentage must be a non-negative number, got {}",
                config.arbitrage.min_diff_percentage
            )));
        }
        if config.arbitrage.max_tickers_per_coin < 2 {
            return Err(ConfigError::Invalid(
                "arbitrage.max_tickers_per_coin must be at least 2".to_string(),
            ));
        }
        if !(0..=MAX_ALERT_COOLDOWN_SECS).contains(&config.alerts.cooldown_secs) {
            return Err(ConfigError::Invalid(format!(
                "alerts.cooldown_secs must be between 0 and {}, got {}",
                MAX_ALERT_COOLDOWN_SECS, config.alerts.cooldown_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = ConfigLoader::parse(
            r#"
            [api]
            api_key = "secret"

            [arbitrage]
            coin_ids = ["bitcoin"]
            "#,
        )
        .unwrap();

        assert_eq!(config.api.api_key.as_deref(), Some("secret"));
        assert_eq!(config.api.max_retries, 3);
        assert_eq!(config.arbitrage.coin_ids, vec!["bitcoin".to_string()]);
        assert_eq!(config.arbitrage.min_diff_percentage, 0.1);
        assert_eq!(config.arbitrage.top_n, 10);
        assert_eq!(config.arbitrage.display_top_n, 3);
        assert_eq!(config.snapshot.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_news_and_labels_tables() {
        let config = ConfigLoader::parse(
            r#"
            [labels.coins]
            bitcoin = "BTC 比特币"

            [[news]]
            id = "n1"
            title = "ETF inflows"
            summary = "Record week"
            source = "Desk"
            url = "news/n1.html"
            date = "2024-05-01"

            [[announcements]]
            id = "a1"
            title = "Maintenance"
            content = "Snapshots pause for an hour"
            date = "2024-05-02"
            tags = ["site"]
            "#,
        )
        .unwrap();

        assert_eq!(config.labels.coins.get("bitcoin").map(String::as_str), Some("BTC 比特币"));
        assert_eq!(config.news.len(), 1);
        assert_eq!(config.news[0].image, None);
        assert_eq!(config.announcements[0].tags, vec!["site".to_string()]);
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let mut config = AppConfig::default();
        config.api.max_retries = 0;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = AppConfig::default();
        config.api.timeout_secs = 0;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_bounds_alert_cooldown() {
        let mut config = AppConfig::default();
        config.alerts.cooldown_secs = i64::MAX - 1;
        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::Invalid(_))));

        config.alerts.cooldown_secs = -1;
        assert!(ConfigLoader::validate(&config).is_err());

        config.alerts.cooldown_secs = MAX_ALERT_COOLDOWN_SECS;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = ConfigLoader::load(Some(Path::new("/nonexistent/coinpulse.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let config = ConfigLoader::parse(include_str!("../../Config.toml")).unwrap();
        ConfigLoader::validate(&config).unwrap();
        assert_eq!(config.arbitrage.display_top_n, 3);
        assert_eq!(config.news.len(), 2);
        assert_eq!(config.announcements.len(), 1);
    }
}
