//! HTTP client for the search gateway.
//!
//! The gateway carries errors in the response body rather than the status
//! line, so both endpoints parse the body first and look for an `error`
//! field before anything else.

use super::{PollReply, RawPost, SearchError};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Capability trait for the asynchronous search backend.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Dispatch a search, returning the backend's job UUID.
    async fn submit_search(&self, query: &str, max_results: u32) -> Result<String, SearchError>;

    /// Fetch the current result state for a job.
    async fn fetch_results(&self, job_uuid: &str) -> Result<PollReply, SearchError>;
}

/// Client for the gateway's dispatch and result endpoints.
pub struct SearchApiClient {
    client: Client,
    base_url: String,
    source: String,
}

#[derive(Debug, Serialize)]
struct SearchRequestBody<'a> {
    query: &'a str,
    max_results: u32,
}

impl SearchApiClient {
    pub fn new(base_url: &str, source: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(SearchApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            source: source.to_string(),
        })
    }
}

#[async_trait]
impl SearchBackend for SearchApiClient {
    async fn submit_search(&self, query: &str, max_results: u32) -> Result<String, SearchError> {
        let url = format!("{}/api/{}/search", self.base_url, self.source);
        debug!(query = %query, max_results = max_results, "Dispatching search");

        let response = self
            .client
            .post(&url)
            .json(&SearchRequestBody { query, max_results })
            .send()
            .await
            .map_err(|e| SearchError::Connection(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;
        parse_dispatch_body(&body)
    }

    async fn fetch_results(&self, job_uuid: &str) -> Result<PollReply, SearchError> {
        let url = format!("{}/api/{}/result/{}", self.base_url, self.source, job_uuid);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SearchError::Connection(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;
        parse_result_body(body)
    }
}

fn parse_dispatch_body(body: &serde_json::Value) -> Result<String, SearchError> {
    if let Some(error) = body.get("error").and_then(|e| e.as_str()) {
        return Err(SearchError::Api(error.to_string()));
    }
    body.get("jobUUID")
        .and_then(|u| u.as_str())
        .map(|u| u.to_string())
        .ok_or(SearchError::MissingJobId)
}

fn parse_result_body(body: serde_json::Value) -> Result<PollReply, SearchError> {
    if let Some(error) = body.get("error").and_then(|e| e.as_str()) {
        return Err(SearchError::Api(error.to_string()));
    }
    match body {
        serde_json::Value::Array(items) if items.is_empty() => Ok(PollReply::Pending),
        serde_json::Value::Array(items) => {
            let posts = items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<RawPost>, _>>()
                .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;
            Ok(PollReply::Ready(posts))
        }
        // Anything else without an error field counts as not-ready.
        _ => Ok(PollReply::Pending),
    }
}
