//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all gateway endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

/// HTTP test client for the gateway's endpoints
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// POST /api/{source}/search
    pub async fn search(&self, source: &str, body: &Value) -> Response {
        self.client
            .post(format!("{}/api/{}/search", self.base_url, source))
            .json(body)
            .send()
            .await
            .expect("Search request failed")
    }

    /// GET /api/{source}/result/{job_uuid}
    pub async fn result(&self, source: &str, job_uuid: &str) -> Response {
        self.client
            .get(format!(
                "{}/api/{}/result/{}",
                self.base_url, source, job_uuid
            ))
            .send()
            .await
            .expect("Result request failed")
    }

    /// GET /health
    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    /// GET / (server stats)
    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }
}
