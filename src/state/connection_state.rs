//! ConnectionState - Live Feed Status Indicator

use crate::constants::{LIVE_LABEL, OFFLINE_LABEL};
use crate::services::ConnectionState;

/// Status of the push channel as shown in the header
#[derive(Debug, Clone)]
pub struct FeedIndicator {
    state: ConnectionState,
    detail: Option<String>,
}

impl Default for FeedIndicator {
    fn default() -> Self {
        Self {
            state: ConnectionState::Idle,
            detail: None,
        }
    }
}

impl FeedIndicator {
    pub fn set(&mut self, state: ConnectionState, detail: impl Into<String>) {
        self.state = state;
        self.detail = Some(detail.into());
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn is_live(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn label(&self) -> &'static str {
        if self.is_live() { LIVE_LABEL } else { OFFLINE_LABEL }
    }
}
