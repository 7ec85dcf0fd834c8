//! ForecastState - Forecast Panel

use crate::constants::FORECAST_FALLBACK;
use crate::domain::api::{ApiOutcome, ForecastPoint, ForecastReport};

/// Forecast panel contents
#[derive(Debug, Default)]
pub struct ForecastState {
    loading: bool,
    /// Plain-text narrative; `None` until the first response
    text: Option<String>,
    structured: Vec<ForecastPoint>,
}

impl ForecastState {
    pub fn set_loading(&mut self) {
        self.loading = true;
    }

    pub fn apply(&mut self, outcome: ApiOutcome<ForecastReport>) {
        self.loading = false;
        match outcome {
            ApiOutcome::Ready(report) => {
                self.text = Some(report.plain_text());
                self.structured = report.structured;
            }
            ApiOutcome::Failed { reason } => {
                tracing::error!("Forecast fetch error: {}", reason);
                self.text = Some(FORECAST_FALLBACK.to_string());
                self.structured.clear();
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn structured(&self) -> &[ForecastPoint] {
        &self.structured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_fetch_shows_fallback() {
        let mut state = ForecastState::default();
        state.apply(ApiOutcome::Ready(ForecastReport {
            forecast: "<p>Stable</p>".to_string(),
            structured: vec![ForecastPoint {
                metric: "co2_emissions".to_string(),
                latest: 120.0,
                predicted: 125.0,
            }],
        }));
        assert_eq!(state.text(), Some("Stable"));
        assert_eq!(state.structured().len(), 1);

        state.set_loading();
        state.apply(ApiOutcome::Failed {
            reason: "connection refused".into(),
        });
        assert!(!state.is_loading());
        assert_eq!(state.text(), Some(FORECAST_FALLBACK));
        assert!(state.structured().is_empty());
    }
}
