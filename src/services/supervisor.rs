//! Connection Supervisor
//!
//! Owns the feed's [`ConnectionState`]: every change is published once as a
//! [`ServiceEvent::FeedState`]. When reconnects are enabled it also hands out
//! backoff delays from a [`BackoffPolicy`].

use crate::domain::config::FeedConfig;
use crate::services::events::{ConnectionState, ServiceEvent};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use std::time::Duration;

/// Exponential backoff schedule for reconnect attempts
#[derive(Clone, Debug, PartialEq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub ceiling: Duration,
    pub factor: f64,
    /// Fraction of the delay randomized in either direction, 0.0 to 1.0
    pub jitter: f64,
    /// 0 retries forever
    pub attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&FeedConfig::default())
    }
}

impl From<&FeedConfig> for BackoffPolicy {
    fn from(feed: &FeedConfig) -> Self {
        Self {
            base: Duration::from_millis(feed.initial_delay_ms),
            ceiling: Duration::from_millis(feed.max_delay_ms),
            factor: feed.multiplier.max(1.0),
            jitter: feed.jitter.clamp(0.0, 1.0),
            attempts: feed.max_attempts,
        }
    }
}

impl BackoffPolicy {
    /// Delay before the `attempt`-th retry (1-based), without jitter
    ///
    /// `None` when the attempt is past the budget.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || (self.attempts > 0 && attempt > self.attempts) {
            return None;
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let millis = self.base.as_millis() as f64 * self.factor.powi(exponent);
        Some(Duration::from_millis(
            millis.min(self.ceiling.as_millis() as f64) as u64,
        ))
    }

    /// Spread `delay` by up to `jitter` using `sample` in `[0, 1)`
    pub fn spread(&self, delay: Duration, sample: f64) -> Duration {
        let millis = delay.as_millis() as f64;
        let offset = (sample * 2.0 - 1.0) * millis * self.jitter;
        Duration::from_millis((millis + offset).max(0.0) as u64)
    }

    fn budget_label(&self) -> String {
        match self.attempts {
            0 => "unlimited".to_string(),
            n => n.to_string(),
        }
    }
}

/// Uniform sample in `[0, 1)` taken from a random v4 UUID
fn jitter_sample() -> f64 {
    // The low 62 bits of a v4 UUID are random.
    let bits = uuid::Uuid::new_v4().as_u128() as u64 & ((1u64 << 53) - 1);
    bits as f64 / (1u64 << 53) as f64
}

/// Health tracker for the push channel
pub struct Supervisor {
    name: &'static str,
    policy: BackoffPolicy,
    tx: Sender<ServiceEvent>,
    state: AtomicU8,
    retries: AtomicU32,
}

impl Supervisor {
    pub fn new(name: &'static str, policy: BackoffPolicy, tx: Sender<ServiceEvent>) -> Self {
        Self {
            name,
            policy,
            tx,
            state: AtomicU8::new(ConnectionState::Idle as u8),
            retries: AtomicU32::new(0),
        }
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Publish `next` unless it is already the current state
    fn enter(&self, next: ConnectionState, detail: &str) -> bool {
        if self.state.swap(next as u8, Ordering::SeqCst) == next as u8 {
            return false;
        }
        if self
            .tx
            .send(ServiceEvent::FeedState {
                state: next,
                detail: detail.into(),
            })
            .is_err()
        {
            tracing::debug!("{}: state {:?} not delivered", self.name, next);
        }
        true
    }

    pub fn on_connecting(&self) {
        if self.enter(ConnectionState::Connecting, "Connecting") {
            tracing::info!("{}: connecting", self.name);
        }
    }

    /// Mark the channel healthy and reset the retry budget
    pub fn on_connected(&self) {
        self.retries.store(0, Ordering::SeqCst);
        if self.enter(ConnectionState::Connected, "Connected") {
            tracing::info!("{}: connected", self.name);
        }
    }

    /// Mark the channel closed
    ///
    /// Returns false when it was already disconnected, so one failure is
    /// reported exactly once.
    pub fn on_disconnected(&self, reason: &str) -> bool {
        let changed = self.enter(ConnectionState::Disconnected, reason);
        if changed {
            tracing::warn!("{}: disconnected ({})", self.name, reason);
        }
        changed
    }

    /// Claim the next retry slot and enter `Backoff`
    ///
    /// Returns `None` once the retry budget is spent.
    pub fn next_retry_delay(&self) -> Option<Duration> {
        let attempt = self.retries.fetch_add(1, Ordering::SeqCst) + 1;
        let Some(delay) = self.policy.delay(attempt) else {
            tracing::warn!(
                "{}: giving up after {} reconnect attempts",
                self.name,
                self.policy.attempts
            );
            return None;
        };
        let delay = self.policy.spread(delay, jitter_sample());

        let detail = format!(
            "Retrying in {:.1}s (attempt {} of {})",
            delay.as_secs_f64(),
            attempt,
            self.policy.budget_label()
        );
        self.enter(ConnectionState::Backoff, &detail);
        tracing::info!("{}: {}", self.name, detail);
        Some(delay)
    }

    pub fn retries(&self) -> u32 {
        self.retries.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("retries", &self.retries())
            .finish()
    }
}
