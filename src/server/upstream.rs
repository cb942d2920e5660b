//! Client for the live-search vendor API the gateway fronts.

use crate::api_key::{ApiKeyError, ApiKeySource};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use super::metrics::record_upstream_request;

/// Public endpoint of the hosted search vendor.
pub const DEFAULT_UPSTREAM_URL: &str = "https://data.gopher-ai.com/api/v1/search/live/twitter";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Request(String),
    #[error("No uuid returned")]
    MissingUuid,
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
    #[error("failed to resolve upstream token: {0}")]
    Token(#[from] ApiKeyError),
}

/// HTTP client for the vendor search API.
///
/// Submissions POST to the base URL itself; results are fetched from
/// `{base}/result/{uuid}`. The bearer token is resolved per request so a
/// rotated credential is picked up without a restart.
pub struct UpstreamClient {
    client: Client,
    base_url: String,
    source: String,
    token_source: ApiKeySource,
    search_timeout: Duration,
    result_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(
        base_url: impl Into<String>,
        source: impl Into<String>,
        token_source: ApiKeySource,
        search_timeout: Duration,
        result_timeout: Duration,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            source: source.into(),
            token_source,
            search_timeout,
            result_timeout,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a search and return the job UUID the vendor assigned.
    pub async fn submit_search(&self, query: &str, max_results: u32) -> Result<String, UpstreamError> {
        let payload = json!({
            "type": self.source,
            "arguments": {
                "type": "searchbyquery",
                "query": query,
                "max_results": max_results,
            }
        });
        debug!("Sending search: {}, max_results: {}", query, max_results);

        let start = Instant::now();
        let request = self
            .client
            .post(&self.base_url)
            .timeout(self.search_timeout)
            .json(&payload);
        let result = self.execute(request).await;
        record_upstream_request("search", outcome_label(&result), start.elapsed());

        parse_submit_body(result?)
    }

    /// Fetch the raw result document for a previously submitted job.
    pub async fn fetch_result(&self, job_uuid: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}/result/{}", self.base_url, job_uuid);

        let start = Instant::now();
        let request = self.client.get(url).timeout(self.result_timeout);
        let result = self.execute(request).await;
        record_upstream_request("result", outcome_label(&result), start.elapsed());

        result
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Value, UpstreamError> {
        let request = match self.token_source.get_key().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|err| UpstreamError::Request(err.to_string()))?
            .error_for_status()
            .map_err(|err| UpstreamError::Request(err.to_string()))?;
        response
            .json()
            .await
            .map_err(|err| UpstreamError::InvalidResponse(err.to_string()))
    }
}

fn outcome_label(result: &Result<Value, UpstreamError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(_) => "error",
    }
}

fn parse_submit_body(body: Value) -> Result<String, UpstreamError> {
    match body.get("uuid").and_then(Value::as_str) {
        Some(uuid) if !uuid.is_empty() => Ok(uuid.to_string()),
        _ => Err(UpstreamError::MissingUuid),
    }
}
