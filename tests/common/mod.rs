//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestClient, TestServer, TEST_SOURCE};
//! use reqwest::StatusCode;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_search_dispatch() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.search(TEST_SOURCE, &json!({"query": "flood"})).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
#[allow(unused_imports)]
pub use server::{MockGemini, MockUpstream, ObservedRequest, TestServer};
