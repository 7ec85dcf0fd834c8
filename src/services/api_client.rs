//! API Client
//!
//! Stateless request/response wrappers for the backend endpoints. Each call
//! performs exactly one request: no retries, bounded by the configured
//! request timeout.

use crate::domain::api::{AnalysisReport, ChatReply, ForecastReport, HistoryReport, SimilarReport};
use crate::domain::config::ApiConfig;
use crate::domain::metrics::MetricsSnapshot;
use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// HTTP client for the GreenForce backend
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Invalid {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Ask the analysis agent for workflow recommendations
    pub async fn analyze(&self, snapshot: &MetricsSnapshot) -> Result<AnalysisReport> {
        self.post_json("/analyze", snapshot).await
    }

    pub async fn forecast(&self) -> Result<ForecastReport> {
        self.get_json("/forecast", &[]).await
    }

    pub async fn history(&self) -> Result<HistoryReport> {
        self.get_json("/history", &[]).await
    }

    /// Find historical samples resembling `snapshot`
    pub async fn similar(&self, snapshot: &MetricsSnapshot) -> Result<SimilarReport> {
        self.post_json("/similar", snapshot).await
    }

    /// Send one chat turn; `thread_id` continues an existing conversation
    pub async fn chat(&self, query: &str, thread_id: Option<&str>) -> Result<ChatReply> {
        let mut params = vec![("query", query)];
        match self.config.agent_id.as_deref() {
            Some(agent_id) => params.push(("agent_id", agent_id)),
            None => tracing::warn!("No chat agent configured; sending query without agent_id"),
        }
        if let Some(thread_id) = thread_id {
            params.push(("thread_id", thread_id));
        }
        self.get_json("/chat", &params).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = self.config.endpoint(path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;

        decode_response(path, response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.config.endpoint(path);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;

        decode_response(path, response).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

fn transport_error(endpoint: &str, source: reqwest::Error) -> Error {
    if source.is_timeout() {
        Error::Timeout {
            message: format!("{endpoint} did not answer in time"),
        }
    } else {
        Error::Http {
            endpoint: endpoint.to_string(),
            source,
        }
    }
}

async fn decode_response<T: DeserializeOwned>(endpoint: &str, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(endpoint, e))?;

    serde_json::from_slice(&body).map_err(|e| Error::Decode {
        message: format!("{endpoint}: {e}"),
    })
}
