//! Service Events
//!
//! Events emitted by the service layer to be consumed by the state layer.
//! Each remote call reports back exactly one event carrying its outcome.

use crate::domain::api::{
    AnalysisReport, ApiOutcome, ChatReply, ForecastReport, HistoryReport, SimilarReport,
};
use crate::domain::metrics::MetricsSnapshot;
use std::sync::Arc;

/// Lifecycle of the live push channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not started yet
    Idle,
    /// Handshake in flight
    Connecting,
    /// Channel open and delivering events
    Connected,
    /// Channel closed; terminal unless a reconnect policy is enabled
    Disconnected,
    /// Waiting before the next reconnect attempt
    Backoff,
}

impl ConnectionState {
    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Idle,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Disconnected,
            _ => ConnectionState::Backoff,
        }
    }
}

/// Events emitted by the service layer
#[derive(Clone, Debug)]
pub enum ServiceEvent {
    // ==================== Live Feed ====================
    /// A decoded snapshot arrived on the push channel
    Snapshot(MetricsSnapshot),

    /// Push channel state changed
    FeedState {
        state: ConnectionState,
        /// Additional detail (e.g., "Reconnecting in 8s (attempt 4/10)")
        detail: Arc<str>,
    },

    // ==================== Remote Actions ====================
    Analysis(ApiOutcome<AnalysisReport>),

    Forecast(ApiOutcome<ForecastReport>),

    History(ApiOutcome<HistoryReport>),

    Similar(ApiOutcome<SimilarReport>),

    Chat {
        /// Query the reply answers
        query: Arc<str>,
        outcome: ApiOutcome<ChatReply>,
    },
}
