//! AnalysisState - Workflow Recommendations

use crate::constants::ANALYSIS_PLACEHOLDER;
use crate::domain::api::{AnalysisReport, ApiOutcome, Workflow};

/// Analysis panel contents
#[derive(Debug, Default)]
pub struct AnalysisState {
    loading: bool,
    report: Option<AnalysisReport>,
}

impl AnalysisState {
    pub fn set_loading(&mut self) {
        self.loading = true;
    }

    /// Store a new report; a failure keeps the previous one
    pub fn apply(&mut self, outcome: ApiOutcome<AnalysisReport>) {
        self.loading = false;
        match outcome {
            ApiOutcome::Ready(report) => self.report = Some(report),
            ApiOutcome::Failed { reason } => tracing::error!("Analyze error: {}", reason),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    /// Headline text for the recommendation tile
    pub fn summary(&self) -> &str {
        self.report
            .as_ref()
            .and_then(|r| r.recommendation.as_deref().or(r.ai_analysis.as_deref()))
            .unwrap_or(ANALYSIS_PLACEHOLDER)
    }

    pub fn recommended(&self) -> &[Workflow] {
        self.report
            .as_ref()
            .map(|r| r.recommended_workflows.as_slice())
            .unwrap_or_default()
    }

    pub fn triggered(&self) -> Vec<Workflow> {
        self.report
            .as_ref()
            .map(AnalysisReport::triggered_workflows)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_until_report() {
        let mut state = AnalysisState::default();
        assert_eq!(state.summary(), ANALYSIS_PLACEHOLDER);
        assert!(state.recommended().is_empty());

        state.set_loading();
        state.apply(ApiOutcome::Ready(AnalysisReport {
            ai_analysis: Some("Energy usage trending high".to_string()),
            recommended_workflows: vec![Workflow {
                name: "energy_optimization".to_string(),
                reason: "High energy consumption".to_string(),
            }],
            ..Default::default()
        }));
        assert!(!state.is_loading());
        assert_eq!(state.summary(), "Energy usage trending high");
        assert_eq!(state.recommended()[0].title(), "Energy Optimization");
    }

    #[test]
    fn test_failure_keeps_previous_report() {
        let mut state = AnalysisState::default();
        state.apply(ApiOutcome::Ready(AnalysisReport {
            recommendation: Some("Run a carbon audit".to_string()),
            ..Default::default()
        }));
        state.apply(ApiOutcome::Failed { reason: "HTTP 500".into() });
        assert_eq!(state.summary(), "Run a carbon audit");
    }
}
