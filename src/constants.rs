//! Client Constants
//!
//! Centralized defaults shared by the service and state layers.

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Rolling chart window size
pub const HISTORY_CAPACITY: usize = 10;

/// Anomaly notifier timings
pub const ANOMALY_DETECT_DELAY_MS: u64 = 2000;
pub const ANOMALY_PROCESSING_DELAY_MS: u64 = 2500;

/// Message used by the placeholder detector
pub const PLACEHOLDER_ANOMALY_MESSAGE: &str =
    "Abnormal emission pattern detected. Triggering corrective workflow.";

/// Batch processing thresholds for the dashboard ingest loop
pub const INGEST_BATCH_SIZE: usize = 256;
pub const INGEST_INTERVAL_MS: u64 = 50;

/// Forecast panel refresh period
pub const FORECAST_REFRESH_SECS: u64 = 10;

/// Request timeout applied to every API call
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Retry configuration for the optional feed reconnect policy
pub const RETRY_INITIAL_DELAY_MS: u64 = 1000;
pub const RETRY_MAX_DELAY_MS: u64 = 60000;
pub const RETRY_MULTIPLIER: f64 = 2.0;
pub const RETRY_JITTER: f64 = 0.1;
pub const RETRY_MAX_ATTEMPTS: u32 = 10;

/// Fallback texts shown when the backend cannot be reached
pub const FORECAST_FALLBACK: &str = "Unable to fetch forecast.";
pub const NO_DATA_FALLBACK: &str = "No data available.";
pub const ANALYSIS_PLACEHOLDER: &str = "Awaiting recommendation...";
pub const CHAT_FALLBACK: &str = "⚠️ Sorry, something went wrong.";

/// Feed status indicator labels
pub const LIVE_LABEL: &str = "Live data streaming";
pub const OFFLINE_LABEL: &str = "Offline";
