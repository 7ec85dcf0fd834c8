//! Anomaly Notifier
//!
//! Local state machine behind the anomaly banner:
//!
//! ```text
//! idle ──snapshot + Anomalous verdict──▶ pending ──detect_delay──▶ active+processing
//!   ▲                                                                   │
//!   │                                                          processing_delay
//!   │                                                                   ▼
//!   └──────────────── leave dashboard tab ◀──────────────────── active (banner)
//! ```
//!
//! Leaving the dashboard tab clears the banner at any point and cancels
//! pending timers. Timers are tokio tasks; a generation counter guarantees a
//! cancelled timer never mutates state even if it was already firing.

use crate::constants::PLACEHOLDER_ANOMALY_MESSAGE;
use crate::domain::config::{AnomalyConfig, DetectorKind};
use crate::domain::metrics::{Level, MetricKind, MetricsSnapshot};
use crate::state::tabs_state::DashboardTab;
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

/// Result of evaluating one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnomalyVerdict {
    Normal,
    Anomalous { message: String },
}

/// Pluggable detection strategy
pub trait AnomalyDetector: Send + Sync {
    fn evaluate(&self, snapshot: &MetricsSnapshot) -> AnomalyVerdict;
}

/// Flags every snapshot it is asked about.
///
/// Stands in for real detection: the notifier's own guards decide how often
/// it is consulted.
#[derive(Debug, Clone)]
pub struct PlaceholderDetector {
    message: String,
}

impl Default for PlaceholderDetector {
    fn default() -> Self {
        Self {
            message: PLACEHOLDER_ANOMALY_MESSAGE.to_string(),
        }
    }
}

impl AnomalyDetector for PlaceholderDetector {
    fn evaluate(&self, _snapshot: &MetricsSnapshot) -> AnomalyVerdict {
        AnomalyVerdict::Anomalous {
            message: self.message.clone(),
        }
    }
}

/// Flags snapshots where any metric reaches its high threshold
#[derive(Debug, Clone, Default)]
pub struct ThresholdDetector;

impl AnomalyDetector for ThresholdDetector {
    fn evaluate(&self, snapshot: &MetricsSnapshot) -> AnomalyVerdict {
        let offending: Vec<String> = MetricKind::all()
            .iter()
            .filter(|kind| Level::of(**kind, snapshot.value(**kind)) == Level::High)
            .map(|kind| format!("{} at {}", kind.label(), snapshot.value(*kind)))
            .collect();

        if offending.is_empty() {
            AnomalyVerdict::Normal
        } else {
            AnomalyVerdict::Anomalous {
                message: format!("Threshold exceeded: {}", offending.join(", ")),
            }
        }
    }
}

/// Build the detector selected in configuration
pub fn detector_for(kind: DetectorKind) -> Box<dyn AnomalyDetector> {
    match kind {
        DetectorKind::Placeholder => Box::new(PlaceholderDetector::default()),
        DetectorKind::Threshold => Box::new(ThresholdDetector),
    }
}

/// Banner state read by views
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnomalyState {
    pub active: bool,
    pub message: String,
    pub processing: bool,
}

/// Notifications for the state layer
#[derive(Debug, Clone, PartialEq)]
pub enum AnomalyEvent {
    /// Banner raised; corrective processing started
    Announced {
        message: Arc<str>,
        snapshot: MetricsSnapshot,
    },
    /// Simulated processing finished
    ProcessingComplete,
    /// Banner cleared
    Cleared,
}

/// Delays used by the notifier
#[derive(Debug, Clone, Copy)]
pub struct AnomalyTiming {
    pub detect_delay: Duration,
    pub processing_delay: Duration,
    pub auto_dismiss: bool,
}

impl Default for AnomalyTiming {
    fn default() -> Self {
        Self::from(&AnomalyConfig::default())
    }
}

impl From<&AnomalyConfig> for AnomalyTiming {
    fn from(config: &AnomalyConfig) -> Self {
        Self {
            detect_delay: Duration::from_millis(config.detect_delay_ms),
            processing_delay: Duration::from_millis(config.processing_delay_ms),
            auto_dismiss: config.auto_dismiss,
        }
    }
}

struct Inner {
    state: AnomalyState,
    /// Bumped on every cancellation; timers compare before mutating
    generation: u64,
    timer: Option<AbortHandle>,
}

impl Inner {
    fn cancel_timer(&mut self) {
        self.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Anomaly banner state machine
///
/// Must be driven from within a tokio runtime; timers are spawned tasks.
pub struct AnomalyNotifier {
    inner: Arc<Mutex<Inner>>,
    detector: Box<dyn AnomalyDetector>,
    timing: AnomalyTiming,
    tx: Sender<AnomalyEvent>,
}

impl AnomalyNotifier {
    pub fn new(
        detector: Box<dyn AnomalyDetector>,
        timing: AnomalyTiming,
        tx: Sender<AnomalyEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: AnomalyState::default(),
                generation: 0,
                timer: None,
            })),
            detector,
            timing,
            tx,
        }
    }

    pub fn from_config(config: &AnomalyConfig, tx: Sender<AnomalyEvent>) -> Self {
        Self::new(detector_for(config.detector), AnomalyTiming::from(config), tx)
    }

    pub fn state(&self) -> AnomalyState {
        self.inner.lock().state.clone()
    }

    /// React to a freshly stored snapshot
    pub fn on_snapshot(&self, snapshot: &MetricsSnapshot) {
        let mut inner = self.inner.lock();
        if inner.state.active || inner.state.processing || inner.timer.is_some() {
            return;
        }

        let AnomalyVerdict::Anomalous { message } = self.detector.evaluate(snapshot) else {
            return;
        };

        let generation = inner.generation;
        let task = tokio::spawn(run_timers(
            self.inner.clone(),
            generation,
            self.timing,
            message.into(),
            snapshot.clone(),
            self.tx.clone(),
        ));
        inner.timer = Some(task.abort_handle());
        tracing::debug!("Anomaly announcement scheduled in {:?}", self.timing.detect_delay);
    }

    /// React to tab navigation; leaving the dashboard clears the banner
    pub fn on_tab_change(&self, tab: DashboardTab) {
        if tab == DashboardTab::Dashboard {
            return;
        }
        let mut inner = self.inner.lock();

        inner.cancel_timer();
        let was_active = inner.state.active;
        inner.state = AnomalyState::default();
        if was_active {
            tracing::info!("Anomaly banner cleared by navigation");
            let _ = self.tx.send(AnomalyEvent::Cleared);
        }
    }

    /// Cancel pending timers; state is left untouched
    pub fn shutdown(&self) {
        self.inner.lock().cancel_timer();
    }
}

impl Drop for AnomalyNotifier {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for AnomalyNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnomalyNotifier")
            .field("state", &self.state())
            .field("timing", &self.timing)
            .finish()
    }
}

async fn run_timers(
    inner: Arc<Mutex<Inner>>,
    generation: u64,
    timing: AnomalyTiming,
    message: Arc<str>,
    snapshot: MetricsSnapshot,
    tx: Sender<AnomalyEvent>,
) {
    tokio::time::sleep(timing.detect_delay).await;
    {
        let mut guard = inner.lock();
        if guard.generation != generation {
            return;
        }
        guard.state = AnomalyState {
            active: true,
            message: message.to_string(),
            processing: true,
        };
        tracing::warn!("Anomaly detected: {}", message);
        let _ = tx.send(AnomalyEvent::Announced { message, snapshot });
    }

    tokio::time::sleep(timing.processing_delay).await;
    let mut guard = inner.lock();
    if guard.generation != generation {
        return;
    }
    guard.state.processing = false;
    guard.timer = None;
    let _ = tx.send(AnomalyEvent::ProcessingComplete);

    if timing.auto_dismiss {
        guard.state = AnomalyState::default();
        let _ = tx.send(AnomalyEvent::Cleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver, unbounded};

    fn scenario_snapshot() -> MetricsSnapshot {
        MetricsSnapshot::new(105.0, 75.0, 13500.0)
    }

    fn notifier(timing: AnomalyTiming) -> (AnomalyNotifier, Receiver<AnomalyEvent>) {
        let (tx, rx) = unbounded();
        (
            AnomalyNotifier::new(Box::new(PlaceholderDetector::default()), timing, tx),
            rx,
        )
    }

    async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    fn assert_invariant(state: &AnomalyState) {
        assert!(!state.processing || state.active, "processing without active: {state:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_announce_then_finish_processing() {
        let (notifier, rx) = notifier(AnomalyTiming::default());

        notifier.on_snapshot(&scenario_snapshot());
        sleep_ms(1999).await;
        assert!(!notifier.state().active);

        sleep_ms(2).await;
        let state = notifier.state();
        assert!(state.active);
        assert!(state.processing);
        assert!(!state.message.is_empty());
        assert!(matches!(rx.try_recv(), Ok(AnomalyEvent::Announced { .. })));

        sleep_ms(2500).await;
        let state = notifier.state();
        assert!(state.active);
        assert!(!state.processing);
        assert_eq!(rx.try_recv(), Ok(AnomalyEvent::ProcessingComplete));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_reschedule_while_active() {
        let (notifier, rx) = notifier(AnomalyTiming::default());

        notifier.on_snapshot(&scenario_snapshot());
        notifier.on_snapshot(&scenario_snapshot());
        sleep_ms(5000).await;
        notifier.on_snapshot(&scenario_snapshot());
        sleep_ms(5000).await;

        let announcements = rx
            .try_iter()
            .filter(|e| matches!(e, AnomalyEvent::Announced { .. }))
            .count();
        assert_eq!(announcements, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_dashboard_clears_during_processing() {
        let (notifier, rx) = notifier(AnomalyTiming::default());

        notifier.on_snapshot(&scenario_snapshot());
        sleep_ms(2100).await;
        assert!(notifier.state().processing);

        notifier.on_tab_change(DashboardTab::History);
        let state = notifier.state();
        assert!(!state.active);
        assert_invariant(&state);

        // The cancelled processing timer must not fire later.
        sleep_ms(5000).await;
        assert_eq!(notifier.state(), AnomalyState::default());
        let events: Vec<_> = rx.try_iter().collect();
        assert!(matches!(events.last(), Some(AnomalyEvent::Cleared)));
        assert!(!events.contains(&AnomalyEvent::ProcessingComplete));
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_dashboard_cancels_pending_announcement() {
        let (notifier, rx) = notifier(AnomalyTiming::default());

        notifier.on_snapshot(&scenario_snapshot());
        sleep_ms(1000).await;
        notifier.on_tab_change(DashboardTab::Forecast);
        sleep_ms(5000).await;

        assert!(!notifier.state().active);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_on_other_tab_still_announces() {
        let (notifier, rx) = notifier(AnomalyTiming::default());

        notifier.on_tab_change(DashboardTab::History);
        notifier.on_snapshot(&scenario_snapshot());
        sleep_ms(2100).await;

        let state = notifier.state();
        assert!(state.active);
        assert!(state.processing);
        assert!(matches!(rx.try_recv(), Ok(AnomalyEvent::Announced { .. })));

        // Navigating away again clears it.
        notifier.on_tab_change(DashboardTab::Forecast);
        assert_eq!(notifier.state(), AnomalyState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invariant_holds_across_transitions() {
        let (notifier, _rx) = notifier(AnomalyTiming::default());
        let tabs = [
            DashboardTab::Dashboard,
            DashboardTab::History,
            DashboardTab::Dashboard,
            DashboardTab::Forecast,
            DashboardTab::Dashboard,
        ];

        for (step, tab) in tabs.iter().cycle().take(20).enumerate() {
            notifier.on_snapshot(&scenario_snapshot());
            sleep_ms(300 + (step as u64 * 700) % 3000).await;
            assert_invariant(&notifier.state());
            notifier.on_tab_change(*tab);
            assert_invariant(&notifier.state());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_dismiss() {
        let timing = AnomalyTiming {
            auto_dismiss: true,
            ..Default::default()
        };
        let (notifier, rx) = notifier(timing);

        notifier.on_snapshot(&scenario_snapshot());
        sleep_ms(4600).await;
        assert_eq!(notifier.state(), AnomalyState::default());
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], AnomalyEvent::Cleared);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_timers() {
        let (notifier, rx) = notifier(AnomalyTiming::default());
        notifier.on_snapshot(&scenario_snapshot());
        notifier.shutdown();
        sleep_ms(5000).await;
        assert!(!notifier.state().active);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_threshold_detector() {
        let detector = ThresholdDetector;
        assert_eq!(
            detector.evaluate(&MetricsSnapshot::new(100.0, 30.0, 12000.0)),
            AnomalyVerdict::Normal
        );
        match detector.evaluate(&scenario_snapshot()) {
            AnomalyVerdict::Anomalous { message } => {
                assert!(message.contains("Waste Level"));
                assert!(!message.contains("CO₂"));
            }
            AnomalyVerdict::Normal => panic!("waste level 75% should be flagged"),
        }
    }
}
