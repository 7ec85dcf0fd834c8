//! MetricsStore - Latest Snapshot and Rolling Chart Window
//!
//! Single owner of the current metrics. Views observe it through
//! [`MetricsStore::subscribe`] instead of reading shared globals.

use crate::constants::HISTORY_CAPACITY;
use crate::domain::metrics::MetricsSnapshot;
use crate::helpers::RollingWindow;
use crossbeam_channel::{Receiver, Sender};

/// One point of the mini live chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Local wall-clock label (HH:MM:SS)
    pub time: String,
    pub snapshot: MetricsSnapshot,
}

/// Notification delivered to every subscriber on each update
#[derive(Debug, Clone)]
pub struct StoreUpdate {
    pub point: ChartPoint,
    /// Number of points in the window after this update
    pub window_len: usize,
}

/// Owned container for the latest snapshot and recent history
#[derive(Debug)]
pub struct MetricsStore {
    current: MetricsSnapshot,
    history: RollingWindow<ChartPoint>,
    subscribers: Vec<Sender<StoreUpdate>>,
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsStore {
    pub fn new() -> Self {
        Self {
            current: MetricsSnapshot::default(),
            history: RollingWindow::new(HISTORY_CAPACITY),
            subscribers: Vec::new(),
        }
    }

    /// Replace the current snapshot, stamping it with the local time
    pub fn set_current(&mut self, snapshot: MetricsSnapshot) {
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        self.set_current_at(snapshot, time);
    }

    /// Replace the current snapshot with an explicit time label
    ///
    /// The snapshot is accepted as-is; validation happens when decoding.
    pub fn set_current_at(&mut self, snapshot: MetricsSnapshot, time: impl Into<String>) {
        let point = ChartPoint {
            time: time.into(),
            snapshot: snapshot.clone(),
        };
        self.current = snapshot;
        if let Some(evicted) = self.history.push(point.clone()) {
            tracing::trace!("Evicted chart point {}", evicted.time);
        }

        let update = StoreUpdate {
            point,
            window_len: self.history.len(),
        };
        // Drop observers whose receiver is gone.
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }

    /// Register an observer
    pub fn subscribe(&mut self) -> Receiver<StoreUpdate> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn current(&self) -> &MetricsSnapshot {
        &self.current
    }

    /// Chart window, oldest first
    pub fn history(&self) -> Vec<ChartPoint> {
        self.history.to_vec()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(i: usize) -> MetricsSnapshot {
        MetricsSnapshot::new(i as f64, 50.0, 12000.0)
    }

    #[test]
    fn test_window_keeps_last_ten_in_order() {
        let mut store = MetricsStore::new();
        for i in 1..=11 {
            store.set_current_at(snapshot(i), format!("t{i}"));
        }

        let history = store.history();
        assert_eq!(history.len(), HISTORY_CAPACITY);
        let times: Vec<&str> = history.iter().map(|p| p.time.as_str()).collect();
        let expected: Vec<String> = (2..=11).map(|i| format!("t{i}")).collect();
        assert_eq!(times, expected);
        assert_eq!(store.current().co2_emissions, 11.0);
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let mut store = MetricsStore::new();
        for i in 0..50 {
            store.set_current(snapshot(i));
            assert!(store.history().len() <= HISTORY_CAPACITY);
        }
    }

    #[test]
    fn test_subscribers_receive_updates_and_are_pruned() {
        let mut store = MetricsStore::new();
        let rx = store.subscribe();
        let dropped = store.subscribe();
        drop(dropped);

        store.set_current_at(snapshot(1), "12:00:00");
        let update = rx.try_recv().expect("update");
        assert_eq!(update.point.time, "12:00:00");
        assert_eq!(update.window_len, 1);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn test_accepts_zeroed_snapshot() {
        let mut store = MetricsStore::new();
        store.set_current(MetricsSnapshot::default());
        assert_eq!(store.history().len(), 1);
    }
}
