//! Config - Client Configuration

use crate::constants::{
    ANOMALY_DETECT_DELAY_MS, ANOMALY_PROCESSING_DELAY_MS, DEFAULT_BASE_URL, FORECAST_REFRESH_SECS,
    REQUEST_TIMEOUT_SECS, RETRY_INITIAL_DELAY_MS, RETRY_JITTER, RETRY_MAX_ATTEMPTS,
    RETRY_MAX_DELAY_MS, RETRY_MULTIPLIER,
};
use crate::error::Result;
use crate::helpers::get_or_create_config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variables that override the file, in precedence order
const BASE_URL_VARS: &[&str] = &["GREENFORCE_BASE_URL", "NEXT_PUBLIC_BASE_URL"];
const AGENT_ID_VARS: &[&str] = &["GREENFORCE_AGENT_ID", "NEXT_PUBLIC_AGENT_ID"];

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Backend API configuration
    pub api: ApiConfig,
    /// Live feed configuration
    pub feed: FeedConfig,
    /// Anomaly notifier configuration
    pub anomaly: AnomalyConfig,
    /// Forecast panel refresh period in seconds (0 disables polling)
    pub forecast_refresh_secs: u64,
    /// Directory for rolling log files (console only when unset)
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            feed: FeedConfig::default(),
            anomaly: AnomalyConfig::default(),
            forecast_refresh_secs: FORECAST_REFRESH_SECS,
            log_dir: None,
        }
    }
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:8000`
    pub base_url: String,
    /// Chat agent identifier forwarded to `/chat`
    pub agent_id: Option<String>,
    /// Timeout applied to each request
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            agent_id: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Join an endpoint path onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Live feed configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Reconnect after a channel error (off: the feed stays offline)
    pub reconnect: bool,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub jitter: f64,
    /// Maximum reconnect attempts (0 = unlimited)
    pub max_attempts: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            reconnect: false,
            initial_delay_ms: RETRY_INITIAL_DELAY_MS,
            max_delay_ms: RETRY_MAX_DELAY_MS,
            multiplier: RETRY_MULTIPLIER,
            jitter: RETRY_JITTER,
            max_attempts: RETRY_MAX_ATTEMPTS,
        }
    }
}

/// Which anomaly detector to run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    /// Flags every idle snapshot
    #[default]
    Placeholder,
    /// Flags snapshots with a metric at its high threshold
    Threshold,
}

/// Anomaly notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnomalyConfig {
    pub detector: DetectorKind,
    pub detect_delay_ms: u64,
    pub processing_delay_ms: u64,
    /// Clear the banner once processing completes
    pub auto_dismiss: bool,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            detector: DetectorKind::default(),
            detect_delay_ms: ANOMALY_DETECT_DELAY_MS,
            processing_delay_ms: ANOMALY_PROCESSING_DELAY_MS,
            auto_dismiss: false,
        }
    }
}

impl AppConfig {
    /// Load from the platform config directory and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = get_or_create_config_dir()?.join(CONFIG_FILE_NAME);
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a TOML file; a missing or empty file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        info!("Loaded config from {}", path.display());
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides through the given lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| lookup(key).filter(|value| !value.trim().is_empty()))
        };

        if let Some(base_url) = first(BASE_URL_VARS) {
            self.api.base_url = base_url;
        }
        if let Some(agent_id) = first(AGENT_ID_VARS) {
            self.api.agent_id = Some(agent_id);
        }
    }

    pub fn forecast_refresh(&self) -> Option<Duration> {
        (self.forecast_refresh_secs > 0).then(|| Duration::from_secs(self.forecast_refresh_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::parse(
            r#"
            forecast_refresh_secs = 5

            [api]
            base_url = "http://backend:9000/"

            [anomaly]
            detector = "threshold"
            "#,
        )
        .expect("parse");

        assert_eq!(config.forecast_refresh_secs, 5);
        assert_eq!(config.api.endpoint("/stream"), "http://backend:9000/stream");
        assert_eq!(config.api.request_timeout_secs, REQUEST_TIMEOUT_SECS);
        assert_eq!(config.anomaly.detector, DetectorKind::Threshold);
        assert_eq!(config.anomaly.detect_delay_ms, ANOMALY_DETECT_DELAY_MS);
        assert!(!config.feed.reconnect);
    }

    #[test]
    fn test_env_overrides_in_precedence_order() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("NEXT_PUBLIC_BASE_URL", "http://legacy:8000"),
            ("GREENFORCE_BASE_URL", "http://primary:8000"),
            ("NEXT_PUBLIC_AGENT_ID", "agent-42"),
            ("GREENFORCE_AGENT_ID", "  "),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://primary:8000");
        assert_eq!(config.api.agent_id.as_deref(), Some("agent-42"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join(format!("greenforce-{}.toml", uuid::Uuid::new_v4()));
        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_forecast_refresh_can_be_disabled() {
        let config = AppConfig {
            forecast_refresh_secs: 0,
            ..Default::default()
        };
        assert!(config.forecast_refresh().is_none());
    }
}
