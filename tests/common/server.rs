//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers:
//! the gateway under test, a scripted mock of the upstream search API,
//! and a scripted mock of the Gemini generateContent API.
//! Each server binds a random port and shuts down gracefully on drop.

use super::constants::*;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use samudra_monitor::api_key::ApiKeySource;
use samudra_monitor::server::{make_app, RequestsLoggingLevel, ServerConfig, UpstreamClient};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// One request as observed by the mock upstream.
#[derive(Debug, Clone)]
pub struct ObservedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
struct UpstreamScript {
    submit_responses: Arc<Mutex<VecDeque<(u16, Value)>>>,
    result_responses: Arc<Mutex<VecDeque<(u16, Value)>>>,
    observed: Arc<Mutex<Vec<ObservedRequest>>>,
}

/// Scripted stand-in for the upstream search API.
///
/// Responses are served from per-endpoint queues; when a queue is empty
/// the mock answers with a benign default (a fixed job UUID for submits,
/// an empty result array for polls).
pub struct MockUpstream {
    pub base_url: String,
    script: UpstreamScript,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockUpstream {
    pub async fn spawn() -> Self {
        let script = UpstreamScript::default();
        let app = Router::new()
            .route("/", post(upstream_submit))
            .route("/result/{job_uuid}", get(upstream_result))
            .with_state(script.clone());

        let (base_url, shutdown_tx) = serve_on_random_port(app).await;
        Self {
            base_url,
            script,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Queues the response for the next search submission.
    pub fn enqueue_submit(&self, status: u16, body: Value) {
        self.script
            .submit_responses
            .lock()
            .unwrap()
            .push_back((status, body));
    }

    /// Queues the response for the next result poll.
    pub fn enqueue_result(&self, status: u16, body: Value) {
        self.script
            .result_responses
            .lock()
            .unwrap()
            .push_back((status, body));
    }

    /// Every request the mock has received, in order.
    pub fn requests(&self) -> Vec<ObservedRequest> {
        self.script.observed.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn upstream_submit(
    State(script): State<UpstreamScript>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    script.observed.lock().unwrap().push(ObservedRequest {
        path: "/".to_string(),
        authorization: header_value(&headers, "authorization"),
        body,
    });
    let (status, body) = script
        .submit_responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| (200, json!({"uuid": "job-00000000"})));
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

async fn upstream_result(
    State(script): State<UpstreamScript>,
    Path(job_uuid): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    script.observed.lock().unwrap().push(ObservedRequest {
        path: format!("/result/{}", job_uuid),
        authorization: header_value(&headers, "authorization"),
        body: Value::Null,
    });
    let (status, body) = script
        .result_responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| (200, json!([])));
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

#[derive(Clone, Default)]
struct GeminiScript {
    classify_responses: Arc<Mutex<VecDeque<(u16, Value)>>>,
    classify_calls: Arc<Mutex<usize>>,
}

/// Scripted stand-in for the Gemini generateContent API.
///
/// GET on the model path always reports the model as available, so a
/// health check against the mock succeeds. POST (generateContent) pops
/// the scripted queue and defaults to a neutral verdict.
pub struct MockGemini {
    pub base_url: String,
    script: GeminiScript,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockGemini {
    pub async fn spawn() -> Self {
        let script = GeminiScript::default();
        // ":generateContent" is part of the final path segment, so one
        // route covers both the model probe and the generate call.
        let app = Router::new()
            .route(
                "/v1beta/models/{model}",
                get(gemini_model).post(gemini_generate),
            )
            .with_state(script.clone());

        let (base_url, shutdown_tx) = serve_on_random_port(app).await;
        Self {
            base_url,
            script,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Queues the response for the next classification call.
    pub fn enqueue_classify(&self, status: u16, body: Value) {
        self.script
            .classify_responses
            .lock()
            .unwrap()
            .push_back((status, body));
    }

    /// Number of generateContent calls received so far.
    pub fn classify_calls(&self) -> usize {
        *self.script.classify_calls.lock().unwrap()
    }

    /// A well-formed generateContent response carrying the given verdict.
    pub fn verdict_response(verdict: Value) -> Value {
        json!({
            "candidates": [{
                "content": {"parts": [{"text": verdict.to_string()}]}
            }]
        })
    }
}

impl Drop for MockGemini {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn gemini_model() -> Json<Value> {
    Json(json!({"name": format!("models/{}", TEST_GEMINI_MODEL)}))
}

async fn gemini_generate(State(script): State<GeminiScript>) -> (StatusCode, Json<Value>) {
    *script.classify_calls.lock().unwrap() += 1;
    let (status, body) = script
        .classify_responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| {
            (
                200,
                MockGemini::verdict_response(json!({
                    "category": "Observation/Neutral Report",
                    "location": "",
                    "hashtags": [],
                    "misinfo_flag": false,
                    "misinfo_reason": ""
                })),
            )
        });
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

/// Gateway instance under test, with its scripted upstream.
///
/// When dropped, both servers gracefully shut down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the gateway is listening on
    pub port: u16,

    /// The scripted upstream behind the gateway
    pub upstream: MockUpstream,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a gateway on a random port with a bearer token configured.
    pub async fn spawn() -> Self {
        Self::spawn_with_token(Some(TEST_UPSTREAM_TOKEN)).await
    }

    /// Spawns a gateway with the given upstream token. `None` means no
    /// Authorization header is sent upstream.
    ///
    /// # Panics
    ///
    /// Panics if port binding fails or the gateway doesn't become ready
    /// within the timeout.
    pub async fn spawn_with_token(token: Option<&str>) -> Self {
        let upstream = MockUpstream::spawn().await;

        let token_source = match token {
            Some(token) => ApiKeySource::Static(token.to_string()),
            None => ApiKeySource::None,
        };
        let client = UpstreamClient::new(
            upstream.base_url.clone(),
            TEST_SOURCE,
            token_source,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        );

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            frontend_dir_path: None,
        };
        let app = make_app(config, Arc::new(client));

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            upstream,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the gateway to answer its health endpoint.
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_on_random_port(app: Router) -> (String, tokio::sync::oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();
    let base_url = format!("http://127.0.0.1:{}", port);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
    });

    (base_url, shutdown_tx)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
