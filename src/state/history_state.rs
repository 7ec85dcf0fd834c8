//! HistoryState - Historical Samples and Similarity Search

use crate::constants::NO_DATA_FALLBACK;
use crate::domain::api::{ApiOutcome, HistoryReport, SimilarRecord, SimilarReport};
use crate::domain::metrics::MetricsSnapshot;

/// History tab contents
#[derive(Debug, Default)]
pub struct HistoryState {
    loading: bool,
    records: Vec<MetricsSnapshot>,
    similar_loading: bool,
    similar: Vec<SimilarRecord>,
}

impl HistoryState {
    pub fn set_loading(&mut self) {
        self.loading = true;
    }

    pub fn set_similar_loading(&mut self) {
        self.similar_loading = true;
    }

    pub fn apply_history(&mut self, outcome: ApiOutcome<HistoryReport>) {
        self.loading = false;
        self.records = match outcome {
            ApiOutcome::Ready(report) => report.history,
            ApiOutcome::Failed { reason } => {
                tracing::error!("History fetch error: {}", reason);
                Vec::new()
            }
        };
    }

    pub fn apply_similar(&mut self, outcome: ApiOutcome<SimilarReport>) {
        self.similar_loading = false;
        self.similar = match outcome {
            ApiOutcome::Ready(report) => report.similar,
            ApiOutcome::Failed { reason } => {
                tracing::error!("Find similar error: {}", reason);
                Vec::new()
            }
        };
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn records(&self) -> &[MetricsSnapshot] {
        &self.records
    }

    pub fn similar(&self) -> &[SimilarRecord] {
        &self.similar
    }

    /// Placeholder text when there is nothing to list
    pub fn empty_message(&self) -> Option<&'static str> {
        (!self.loading && self.records.is_empty()).then_some(NO_DATA_FALLBACK)
    }
}
