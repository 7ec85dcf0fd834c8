//! Live Feed
//!
//! Owns the single push channel to `{base}/stream`. Every SSE `data` payload
//! is decoded into a [`MetricsSnapshot`] and forwarded as
//! [`ServiceEvent::Snapshot`]; malformed payloads are logged and dropped.
//!
//! A channel-level failure closes the channel and reports `Disconnected`
//! once. Unless `feed.reconnect` is enabled the feed then stays offline.

use crate::domain::config::{ApiConfig, FeedConfig};
use crate::domain::metrics::MetricsSnapshot;
use crate::error::{Error, Result};
use crate::services::events::{ConnectionState, ServiceEvent};
use crate::services::sse::SseDecoder;
use crate::services::supervisor::{BackoffPolicy, Supervisor};
use crossbeam_channel::Sender;
use futures::StreamExt;
use parking_lot::Mutex;
use reqwest::header::ACCEPT;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

const STREAM_PATH: &str = "/stream";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Push channel subscriber
pub struct LiveFeed {
    url: String,
    reconnect: bool,
    client: reqwest::Client,
    tx: Sender<ServiceEvent>,
    supervisor: Arc<Supervisor>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl LiveFeed {
    pub fn new(api: &ApiConfig, feed: &FeedConfig, tx: Sender<ServiceEvent>) -> Result<Self> {
        // No overall timeout: the stream is expected to stay open indefinitely.
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Invalid {
                message: format!("failed to build feed client: {e}"),
            })?;

        Ok(Self {
            url: api.endpoint(STREAM_PATH),
            reconnect: feed.reconnect,
            client,
            supervisor: Arc::new(Supervisor::new("feed", BackoffPolicy::from(feed), tx.clone())),
            tx,
            task: Mutex::new(None),
        })
    }

    /// Open the channel on the given runtime
    pub fn start(&self, runtime: &Handle) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            tracing::warn!("Live feed already running");
            return;
        }

        tracing::info!("Starting live feed from {}", self.url);
        *task = Some(runtime.spawn(run_feed(
            self.client.clone(),
            self.url.clone(),
            self.reconnect,
            self.tx.clone(),
            self.supervisor.clone(),
        )));
    }

    /// Close the channel unconditionally
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            tracing::info!("Stopped live feed");
            self.supervisor.on_disconnected("Stopped");
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.supervisor.state()
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl std::fmt::Debug for LiveFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveFeed")
            .field("url", &self.url)
            .field("reconnect", &self.reconnect)
            .field("supervisor", &self.supervisor)
            .finish()
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_feed(
    client: reqwest::Client,
    url: String,
    reconnect: bool,
    tx: Sender<ServiceEvent>,
    supervisor: Arc<Supervisor>,
) {
    loop {
        let session = uuid::Uuid::new_v4();
        tracing::debug!("Feed session {} opening", session);

        let reason = match stream_once(&client, &url, &tx, &supervisor).await {
            Ok(()) => "Server closed the stream".to_string(),
            Err(Error::ChannelSend { .. }) => {
                tracing::debug!("Feed session {}: no consumers left", session);
                supervisor.on_disconnected("Consumer gone");
                return;
            }
            Err(e) => e.to_string(),
        };
        supervisor.on_disconnected(&reason);

        if !reconnect {
            return;
        }
        match supervisor.next_retry_delay() {
            Some(delay) => tokio::time::sleep(delay).await,
            None => {
                supervisor.on_disconnected("Reconnect attempts exhausted");
                return;
            }
        }
    }
}

/// Run one channel instance until it closes or fails
async fn stream_once(
    client: &reqwest::Client,
    url: &str,
    tx: &Sender<ServiceEvent>,
    supervisor: &Supervisor,
) -> Result<()> {
    supervisor.on_connecting();

    let response = client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(|e| Error::Http {
            endpoint: STREAM_PATH.to_string(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            endpoint: STREAM_PATH.to_string(),
            status: status.as_u16(),
        });
    }
    supervisor.on_connected();

    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| Error::Connection {
            message: format!("stream interrupted: {e}"),
        })?;

        for event in decoder.feed(&chunk) {
            match MetricsSnapshot::decode(&event.data) {
                Ok(snapshot) => {
                    supervisor.on_connected();
                    tx.send(ServiceEvent::Snapshot(snapshot))
                        .map_err(|e| Error::ChannelSend {
                            message: e.to_string(),
                        })?;
                }
                Err(e) => tracing::warn!("Dropping feed event: {}", e),
            }
        }
    }

    Ok(())
}
