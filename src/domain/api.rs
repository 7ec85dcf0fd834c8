//! API - Typed Backend Payloads
//!
//! One explicit result type per endpoint. Every field carries a serde default
//! so a response with an unexpected shape decodes into an empty value rather
//! than an arbitrary JSON tree.

use crate::domain::metrics::MetricsSnapshot;
use crate::helpers::{format_workflow_title, sanitize_html};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A workflow recommended or triggered by the analysis agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workflow {
    pub name: String,
    pub reason: String,
}

impl Workflow {
    pub fn title(&self) -> String {
        format_workflow_title(&self.name)
    }
}

/// A workflow the backend already executed
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TriggeredAction {
    pub workflow: String,
    pub result: serde_json::Value,
}

/// Response of `POST /analyze`
///
/// The backend has shipped several shapes for this endpoint; all of them
/// decode into this struct with the unused parts left empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisReport {
    pub recommended_workflows: Vec<Workflow>,
    pub next_actions: Vec<String>,
    pub ai_analysis: Option<String>,
    pub recommendation: Option<String>,
    #[serde(deserialize_with = "triggered_workflows")]
    pub triggered: Vec<Workflow>,
    pub actions: Vec<TriggeredAction>,
}

impl AnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.recommended_workflows.is_empty()
            && self.next_actions.is_empty()
            && self.ai_analysis.is_none()
            && self.recommendation.is_none()
            && self.triggered.is_empty()
            && self.actions.is_empty()
    }

    /// Workflows the backend reports as triggered, from whichever field carried them
    pub fn triggered_workflows(&self) -> Vec<Workflow> {
        if !self.triggered.is_empty() {
            return self.triggered.clone();
        }
        self.actions
            .iter()
            .map(|action| Workflow {
                name: action.workflow.clone(),
                reason: String::new(),
            })
            .collect()
    }
}

/// `triggered` is either a list of workflows or a plain flag.
fn triggered_workflows<'de, D>(deserializer: D) -> Result<Vec<Workflow>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Triggered {
        List(Vec<Workflow>),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Triggered::deserialize(deserializer)? {
        Triggered::List(list) => list,
        Triggered::Other(_) => Vec::new(),
    })
}

/// One structured forecast row
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForecastPoint {
    pub metric: String,
    pub latest: f64,
    pub predicted: f64,
}

/// Response of `GET /forecast`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForecastReport {
    /// Narrative forecast; may arrive as HTML
    pub forecast: String,
    pub structured: Vec<ForecastPoint>,
}

impl ForecastReport {
    /// Forecast narrative reduced to plain text
    pub fn plain_text(&self) -> String {
        sanitize_html(&self.forecast)
    }
}

/// Response of `GET /history`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryReport {
    pub history: Vec<MetricsSnapshot>,
}

/// A historical sample returned by the similarity search
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimilarRecord {
    #[serde(flatten)]
    pub snapshot: MetricsSnapshot,
    #[serde(default)]
    pub score: f64,
}

/// Response of `POST /similar`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimilarReport {
    pub similar: Vec<SimilarRecord>,
}

/// Response of `GET /chat`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatReply {
    pub response: String,
    pub thread_id: Option<String>,
}

/// Outcome of one remote call as carried through the event channel
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Ready(T),
    Failed { reason: Arc<str> },
}

impl<T> From<crate::error::Result<T>> for ApiOutcome<T> {
    fn from(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(value) => ApiOutcome::Ready(value),
            Err(e) => ApiOutcome::Failed {
                reason: e.to_string().into(),
            },
        }
    }
}
