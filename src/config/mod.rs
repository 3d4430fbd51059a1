use anyhow::Result;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub youtube: YouTubeConfig,
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// API key; overridable via the TAGWATCH_API_KEY environment variable.
    pub api_key: String,
    pub base_url: String,
    /// Search pagination cap: max_pages x page_size is the per-tag result
    /// ceiling for a single run.
    pub max_pages: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Hashtags matched literally against title/description by the
    /// provider's search.
    pub hashtags: Vec<String>,
    /// Named timezone used for all day-boundary computations.
    pub timezone: String,
    /// Lookback window for the full sync, in days.
    pub lookback_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://./tagwatch.db".to_string(),
                max_connections: Some(5),
            },
            youtube: YouTubeConfig {
                api_key: String::new(),
                base_url: "https://www.googleapis.com/youtube/v3".to_string(),
                max_pages: 10,
                page_size: 50,
            },
            tracking: TrackingConfig {
                hashtags: vec!["#shorts".to_string()],
                timezone: "Asia/Seoul".to_string(),
                lookback_days: 365,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        let mut config: Config = if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            toml::from_str(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_file, contents)?;
            default_config
        };

        if let Ok(api_key) = std::env::var("TAGWATCH_API_KEY") {
            config.youtube.api_key = api_key;
        }

        Ok(config)
    }

    /// Validate the parts every workflow depends on. Called once at startup;
    /// a bad timezone or an empty hashtag list is fatal, not degradable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.tracking.hashtags.is_empty() {
            return Err(AppError::configuration("tracking.hashtags must not be empty"));
        }
        if self.tracking.hashtags.iter().any(|h| h.trim().is_empty()) {
            return Err(AppError::configuration(
                "tracking.hashtags must not contain blank entries",
            ));
        }
        self.timezone()?;
        if self.tracking.lookback_days <= 0 {
            return Err(AppError::configuration(
                "tracking.lookback_days must be positive",
            ));
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz, AppError> {
        self.tracking.timezone.parse::<Tz>().map_err(|_| {
            AppError::configuration(format!(
                "unknown timezone: '{}'",
                self.tracking.timezone
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Seoul);
    }

    #[test]
    fn empty_hashtags_rejected() {
        let mut config = Config::default();
        config.tracking.hashtags.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_timezone_rejected() {
        let mut config = Config::default();
        config.tracking.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().is_err());
    }
}
