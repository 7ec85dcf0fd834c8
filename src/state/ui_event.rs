//! UI Events
//!
//! Events emitted from the state layer to whatever renders it: banner
//! changes, panel refreshes and error notices.

use crate::services::ConnectionState;
use std::sync::Arc;

/// UI events for user feedback
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    /// Feed status indicator changed
    FeedChanged {
        state: ConnectionState,
        /// Indicator text ("Live data streaming" / "Offline")
        label: &'static str,
        detail: Arc<str>,
    },

    /// Anomaly banner raised
    AnomalyRaised { message: Arc<str> },

    /// Corrective processing finished; banner still shown
    AnomalyProcessed,

    /// Anomaly banner removed
    AnomalyCleared,

    /// Analysis panel has a new report
    AnalysisUpdated,

    /// Forecast panel refreshed
    ForecastUpdated,

    /// History list replaced
    HistoryUpdated { count: usize },

    /// Similarity results replaced
    SimilarUpdated { count: usize },

    /// Chat answer (or fallback) appended
    ChatAnswered { text: Arc<str> },

    /// A remote call failed and its panel fell back
    ErrorOccurred {
        /// Error source/task name
        source: Arc<str>,
        message: Arc<str>,
    },
}
