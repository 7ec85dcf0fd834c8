//! Service Hub
//!
//! Central orchestrator for all services. Handles initialization, lifecycle,
//! and provides a unified API for the state layer. Every request is fired on
//! the tokio runtime and answered through the shared event channel.

use crate::domain::api::ApiOutcome;
use crate::domain::config::AppConfig;
use crate::domain::metrics::MetricsSnapshot;
use crate::error::{Error, Result};
use crate::services::{ApiClient, ConnectionState, LiveFeed, ServiceEvent};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Central hub for all backend services
#[derive(Clone)]
pub struct ServiceHub {
    api: Arc<ApiClient>,
    feed: Arc<LiveFeed>,
    forecast_refresh: Option<Duration>,
    forecast_task: Arc<Mutex<Option<JoinHandle<()>>>>,
    runtime: Handle,
    /// Event sender (for internal use)
    tx: Sender<ServiceEvent>,
    /// Event receiver (for state layer)
    rx: Receiver<ServiceEvent>,
}

impl ServiceHub {
    /// Create a new hub bound to the current tokio runtime
    pub fn new(config: &AppConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| Error::Invalid {
            message: format!("ServiceHub requires a tokio runtime: {e}"),
        })?;
        Self::with_runtime(config, runtime)
    }

    pub fn with_runtime(config: &AppConfig, runtime: Handle) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();

        let api = Arc::new(ApiClient::new(&config.api)?);
        let feed = Arc::new(LiveFeed::new(&config.api, &config.feed, tx.clone())?);

        Ok(Self {
            api,
            feed,
            forecast_refresh: config.forecast_refresh(),
            forecast_task: Arc::new(Mutex::new(None)),
            runtime,
            tx,
            rx,
        })
    }

    /// Get the event receiver for the state layer
    ///
    /// Events from all services are multiplexed into this single channel.
    pub fn events(&self) -> Receiver<ServiceEvent> {
        self.rx.clone()
    }

    /// Open the live feed and start periodic forecast refreshes
    pub fn start(&self) {
        tracing::info!("Starting all services");
        self.feed.start(&self.runtime);

        let Some(period) = self.forecast_refresh else {
            return;
        };
        let mut task = self.forecast_task.lock();
        if task.is_some() {
            return;
        }

        let api = self.api.clone();
        let tx = self.tx.clone();
        *task = Some(self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let outcome = api.forecast().await.into();
                if tx.send(ServiceEvent::Forecast(outcome)).is_err() {
                    break;
                }
            }
        }));
    }

    /// Stop all services
    pub fn stop(&self) {
        tracing::info!("Stopping all services");
        self.feed.stop();
        if let Some(task) = self.forecast_task.lock().take() {
            task.abort();
        }
    }

    // ==================== Remote Actions ====================

    pub fn request_analysis(&self, snapshot: MetricsSnapshot) {
        let api = self.api.clone();
        self.dispatch("analyze", async move {
            ServiceEvent::Analysis(api.analyze(&snapshot).await.into())
        });
    }

    pub fn request_forecast(&self) {
        let api = self.api.clone();
        self.dispatch("forecast", async move {
            ServiceEvent::Forecast(api.forecast().await.into())
        });
    }

    pub fn request_history(&self) {
        let api = self.api.clone();
        self.dispatch("history", async move {
            ServiceEvent::History(api.history().await.into())
        });
    }

    pub fn request_similar(&self, snapshot: MetricsSnapshot) {
        let api = self.api.clone();
        self.dispatch("similar", async move {
            ServiceEvent::Similar(api.similar(&snapshot).await.into())
        });
    }

    pub fn request_chat(&self, query: String, thread_id: Option<String>) {
        let api = self.api.clone();
        self.dispatch("chat", async move {
            let outcome: ApiOutcome<_> = api.chat(&query, thread_id.as_deref()).await.into();
            ServiceEvent::Chat {
                query: query.into(),
                outcome,
            }
        });
    }

    /// Spawn a one-shot call whose result is pushed to the event channel
    fn dispatch<F>(&self, name: &'static str, call: F)
    where
        F: Future<Output = ServiceEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        tracing::debug!("Dispatching {} request", name);
        self.runtime.spawn(async move {
            let event = call.await;
            if tx.send(event).is_err() {
                tracing::debug!("Dropped {} result: state layer gone", name);
            }
        });
    }

    // ==================== Health ====================

    pub fn feed_state(&self) -> ConnectionState {
        self.feed.state()
    }

    /// Whether `start` schedules periodic forecast refreshes
    pub fn polls_forecast(&self) -> bool {
        self.forecast_refresh.is_some()
    }

    pub fn is_feed_running(&self) -> bool {
        self.feed.is_running()
    }

    /// Emit a service event (mainly for testing)
    #[cfg(test)]
    pub fn emit(&self, event: ServiceEvent) {
        let _ = self.tx.send(event);
    }
}

impl std::fmt::Debug for ServiceHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceHub")
            .field("api", &self.api)
            .field("feed", &self.feed)
            .field("forecast_refresh", &self.forecast_refresh)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_requires_runtime() {
        assert!(ServiceHub::new(&AppConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_hub_creation_is_idle() {
        let hub = ServiceHub::new(&AppConfig::default()).expect("hub");
        assert_eq!(hub.feed_state(), ConnectionState::Idle);
        assert!(!hub.is_feed_running());
        hub.emit(ServiceEvent::Snapshot(MetricsSnapshot::new(1.0, 2.0, 3.0)));
        assert!(matches!(hub.events().try_recv(), Ok(ServiceEvent::Snapshot(_))));
    }
}
