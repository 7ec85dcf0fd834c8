//! Dashboard State
//!
//! Single source of truth for everything the dashboard shows: the metrics
//! store, the anomaly banner, the feed indicator and every panel. It is the
//! only writer of that state; service results arrive through the hub's event
//! channel and are applied in batches.

use crate::constants::INGEST_BATCH_SIZE;
use crate::domain::api::ApiOutcome;
use crate::domain::config::AnomalyConfig;
use crate::services::{ServiceEvent, ServiceHub};
use crate::state::analysis_state::AnalysisState;
use crate::state::anomaly::{
    AnomalyDetector, AnomalyEvent, AnomalyNotifier, AnomalyState, AnomalyTiming, detector_for,
};
use crate::state::chat_state::ChatState;
use crate::state::connection_state::FeedIndicator;
use crate::state::forecast_state::ForecastState;
use crate::state::history_state::HistoryState;
use crate::state::snapshot_store::{MetricsStore, StoreUpdate};
use crate::state::tabs_state::{DashboardTab, TabsState};
use crate::state::ui_event::UiEvent;
use crossbeam_channel::Receiver;

pub struct DashboardState {
    hub: ServiceHub,
    events: Receiver<ServiceEvent>,
    store: MetricsStore,
    notifier: AnomalyNotifier,
    anomaly_events: Receiver<AnomalyEvent>,
    tabs: TabsState,
    feed: FeedIndicator,
    analysis: AnalysisState,
    forecast: ForecastState,
    history: HistoryState,
    chat: ChatState,
}

impl DashboardState {
    pub fn new(hub: ServiceHub, anomaly: &AnomalyConfig) -> Self {
        Self::with_detector(hub, detector_for(anomaly.detector), AnomalyTiming::from(anomaly))
    }

    /// Build with an explicit detection strategy
    pub fn with_detector(
        hub: ServiceHub,
        detector: Box<dyn AnomalyDetector>,
        timing: AnomalyTiming,
    ) -> Self {
        let (anomaly_tx, anomaly_events) = crossbeam_channel::unbounded();
        Self {
            events: hub.events(),
            hub,
            store: MetricsStore::new(),
            notifier: AnomalyNotifier::new(detector, timing, anomaly_tx),
            anomaly_events,
            tabs: TabsState::default(),
            feed: FeedIndicator::default(),
            analysis: AnalysisState::default(),
            forecast: ForecastState::default(),
            history: HistoryState::default(),
            chat: ChatState::default(),
        }
    }

    /// Start the services behind the dashboard
    pub fn start(&mut self) {
        self.hub.start();
        if self.hub.polls_forecast() {
            self.forecast.set_loading();
        }
        tracing::info!("Dashboard started");
    }

    /// Close the feed and cancel anomaly timers
    pub fn stop(&mut self) {
        self.hub.stop();
        self.notifier.shutdown();
        tracing::info!("Dashboard stopped");
    }

    // ==================== Ingest ====================

    /// Apply pending service and anomaly events
    ///
    /// Returns the UI notifications they produced, in order.
    pub fn drain(&mut self) -> Vec<UiEvent> {
        let mut ui = Vec::new();

        let batch: Vec<ServiceEvent> = self.events.try_iter().take(INGEST_BATCH_SIZE).collect();
        for event in batch {
            ui.extend(self.apply_event(event));
        }

        let anomalies: Vec<AnomalyEvent> = self.anomaly_events.try_iter().collect();
        for event in anomalies {
            ui.push(self.apply_anomaly(event));
        }

        ui
    }

    /// Apply a single service event
    pub fn apply_event(&mut self, event: ServiceEvent) -> Option<UiEvent> {
        match event {
            ServiceEvent::Snapshot(snapshot) => {
                self.store.set_current(snapshot);
                self.notifier.on_snapshot(self.store.current());
                None
            }

            ServiceEvent::FeedState { state, detail } => {
                self.feed.set(state, detail.to_string());
                Some(UiEvent::FeedChanged {
                    state,
                    label: self.feed.label(),
                    detail,
                })
            }

            ServiceEvent::Analysis(outcome) => {
                let failure = failure_event("analyze", &outcome);
                self.analysis.apply(outcome);
                Some(failure.unwrap_or(UiEvent::AnalysisUpdated))
            }

            ServiceEvent::Forecast(outcome) => {
                let failure = failure_event("forecast", &outcome);
                self.forecast.apply(outcome);
                Some(failure.unwrap_or(UiEvent::ForecastUpdated))
            }

            ServiceEvent::History(outcome) => {
                let failure = failure_event("history", &outcome);
                self.history.apply_history(outcome);
                Some(failure.unwrap_or(UiEvent::HistoryUpdated {
                    count: self.history.records().len(),
                }))
            }

            ServiceEvent::Similar(outcome) => {
                let failure = failure_event("similar", &outcome);
                self.history.apply_similar(outcome);
                Some(failure.unwrap_or(UiEvent::SimilarUpdated {
                    count: self.history.similar().len(),
                }))
            }

            ServiceEvent::Chat { query, outcome } => {
                tracing::debug!("Chat reply for {:?}", query);
                let text = self.chat.apply(outcome);
                Some(UiEvent::ChatAnswered { text: text.into() })
            }
        }
    }

    fn apply_anomaly(&mut self, event: AnomalyEvent) -> UiEvent {
        match event {
            AnomalyEvent::Announced { message, .. } => {
                // Corrective processing kicks off a fresh analysis of the live metrics.
                self.analysis.set_loading();
                self.hub.request_analysis(self.store.current().clone());
                UiEvent::AnomalyRaised { message }
            }
            AnomalyEvent::ProcessingComplete => UiEvent::AnomalyProcessed,
            AnomalyEvent::Cleared => UiEvent::AnomalyCleared,
        }
    }

    // ==================== User Actions ====================

    pub fn select_tab(&mut self, tab: DashboardTab) {
        if !self.tabs.select(tab) {
            return;
        }
        tracing::debug!("Switched to {} tab", tab.title());
        self.notifier.on_tab_change(tab);

        if tab == DashboardTab::History {
            self.refresh_history();
        }
    }

    pub fn refresh_history(&mut self) {
        self.history.set_loading();
        self.hub.request_history();
    }

    /// Search history for samples resembling the current snapshot
    pub fn find_similar(&mut self) {
        self.history.set_similar_loading();
        self.hub.request_similar(self.store.current().clone());
    }

    pub fn refresh_forecast(&mut self) {
        self.forecast.set_loading();
        self.hub.request_forecast();
    }

    /// Analyze the current snapshot on demand
    pub fn analyze(&mut self) {
        self.analysis.set_loading();
        self.hub.request_analysis(self.store.current().clone());
    }

    /// Send a chat message; blank input is ignored
    pub fn send_chat(&mut self, input: &str) -> bool {
        let Some(query) = self.chat.begin(input) else {
            return false;
        };
        self.hub
            .request_chat(query, self.chat.thread_id().map(str::to_string));
        true
    }

    // ==================== Getters ====================

    pub fn subscribe_metrics(&mut self) -> Receiver<StoreUpdate> {
        self.store.subscribe()
    }

    pub fn store(&self) -> &MetricsStore {
        &self.store
    }

    pub fn anomaly(&self) -> AnomalyState {
        self.notifier.state()
    }

    pub fn active_tab(&self) -> DashboardTab {
        self.tabs.active()
    }

    pub fn feed(&self) -> &FeedIndicator {
        &self.feed
    }

    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    pub fn forecast(&self) -> &ForecastState {
        &self.forecast
    }

    pub fn history(&self) -> &HistoryState {
        &self.history
    }

    pub fn chat(&self) -> &ChatState {
        &self.chat
    }
}

impl std::fmt::Debug for DashboardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardState")
            .field("tab", &self.tabs.active())
            .field("feed", &self.feed)
            .field("anomaly", &self.notifier.state())
            .finish()
    }
}

fn failure_event<T>(source: &str, outcome: &ApiOutcome<T>) -> Option<UiEvent> {
    match outcome {
        ApiOutcome::Ready(_) => None,
        ApiOutcome::Failed { reason } => Some(UiEvent::ErrorOccurred {
            source: source.into(),
            message: reason.clone(),
        }),
    }
}
