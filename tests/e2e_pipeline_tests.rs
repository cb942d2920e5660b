//! End-to-end tests for the monitoring pipeline
//!
//! Drives a real Monitor against a real gateway backed by the scripted
//! upstream, exercising dispatch, polling, classification and reveal
//! together. Delays are shrunk to keep the tests fast; the schedules
//! themselves are covered by the unit tests.

mod common;

use common::{MockGemini, TestServer, TEST_GEMINI_KEY, TEST_GEMINI_MODEL, TEST_SOURCE};
use samudra_monitor::api_key::ApiKeySource;
use samudra_monitor::classify::{Category, Classifier, GeminiClassifier, HeuristicClassifier};
use samudra_monitor::feed::ConsoleFeed;
use samudra_monitor::ingest::{PollPolicy, SearchApiClient};
use samudra_monitor::pipeline::{BatchPolicy, Monitor, SearchOutcome};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn fast_poll_policy() -> PollPolicy {
    PollPolicy {
        initial_delay: Duration::from_millis(5),
        backoff_step: Duration::from_millis(5),
        transient_retry_delay: Duration::from_millis(5),
        max_attempts: 5,
    }
}

fn fast_batch_policy() -> BatchPolicy {
    BatchPolicy {
        batch_size: 3,
        reveal_delay: Duration::from_millis(5),
    }
}

fn monitor_against(server: &TestServer, classifier: Arc<dyn Classifier>, online: bool) -> Monitor {
    let backend = SearchApiClient::new(&server.base_url, TEST_SOURCE, Duration::from_secs(10))
        .expect("Failed to build search client");
    Monitor::new(
        Arc::new(backend),
        classifier,
        online,
        Arc::new(ConsoleFeed::new()),
        fast_poll_policy(),
        fast_batch_policy(),
        20,
    )
}

// =============================================================================
// Offline Pipeline Tests
// =============================================================================

#[tokio::test]
async fn test_search_to_feed_with_keyword_classifier() {
    let server = TestServer::spawn().await;
    // First poll comes back empty, second delivers the posts.
    server.upstream.enqueue_result(200, json!([]));
    server.upstream.enqueue_result(
        200,
        json!([
            {
                "content": "Heavy flooding in Chennai, please help #ChennaiFloods",
                "source": "twitter",
                "metadata": {"username": "coastwatcher"}
            },
            {"content": "Waves at the beach", "source": "twitter"}
        ]),
    );
    let monitor = monitor_against(&server, Arc::new(HeuristicClassifier::new()), false);

    let outcome = monitor.run("flood Chennai").await;

    assert_eq!(outcome, SearchOutcome::Completed { appended: 2 });
    let posts = monitor.snapshot();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].category, Category::EmergencyAlert);
    assert_eq!(posts[0].category_score, 0.5);
    assert_eq!(posts[0].location.region, "CHENNAI");
    assert_eq!(posts[0].hashtags, vec!["#ChennaiFloods"]);
    assert_eq!(posts[1].category, Category::ObservationNeutralReport);
    assert_eq!(posts[1].location.region, "Unknown");

    // One submit and two polls reached the upstream.
    assert_eq!(server.upstream.requests().len(), 3);

    let history = monitor.volume_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].count, 2);
}

#[tokio::test]
async fn test_poll_budget_exhausted_times_out() {
    let server = TestServer::spawn().await;
    // The default scripted result is an empty array, so the job never
    // completes.
    let monitor = monitor_against(&server, Arc::new(HeuristicClassifier::new()), false);

    let outcome = monitor.run("quiet query").await;

    assert_eq!(outcome, SearchOutcome::TimedOut { attempts: 5 });
    assert!(monitor.snapshot().is_empty());
    // One submit plus one poll per attempt.
    assert_eq!(server.upstream.requests().len(), 6);
}

// =============================================================================
// Remote Classifier Tests
// =============================================================================

#[tokio::test]
async fn test_remote_classifier_in_the_loop() {
    let server = TestServer::spawn().await;
    let gemini = MockGemini::spawn().await;
    server.upstream.enqueue_result(
        200,
        json!([{"content": "Flooding near the harbour, stay safe", "source": "twitter"}]),
    );
    gemini.enqueue_classify(
        200,
        MockGemini::verdict_response(json!({
            "category": "Emergency/Alert",
            "location": "Kochi",
            "hashtags": ["#KeralaFloods"],
            "misinfo_flag": false,
            "misinfo_reason": ""
        })),
    );

    let classifier = GeminiClassifier::new(
        gemini.base_url.clone(),
        TEST_GEMINI_MODEL,
        ApiKeySource::Static(TEST_GEMINI_KEY.to_string()),
    )
    .with_retry(2, Duration::from_millis(5));
    assert!(classifier.health_check().await.is_ok());

    let monitor = monitor_against(&server, Arc::new(classifier), true);
    let outcome = monitor.run("Kerala coast").await;

    assert_eq!(outcome, SearchOutcome::Completed { appended: 1 });
    let posts = monitor.snapshot();
    assert_eq!(posts[0].category, Category::EmergencyAlert);
    assert_eq!(posts[0].category_score, 1.0);
    assert_eq!(posts[0].location.region, "KOCHI");
    assert_eq!(posts[0].location.coordinates, [9.9312, 76.2673]);
    assert_eq!(posts[0].hashtags, vec!["#KeralaFloods"]);
    assert_eq!(gemini.classify_calls(), 1);
}

#[tokio::test]
async fn test_remote_failure_falls_back_to_keywords_per_post() {
    let server = TestServer::spawn().await;
    let gemini = MockGemini::spawn().await;
    server.upstream.enqueue_result(
        200,
        json!([{"content": "Please evacuate the coast now", "source": "twitter"}]),
    );
    // Both attempts fail, so the post degrades to the keyword verdict.
    gemini.enqueue_classify(500, json!({"error": "internal"}));
    gemini.enqueue_classify(500, json!({"error": "internal"}));

    let classifier = GeminiClassifier::new(
        gemini.base_url.clone(),
        TEST_GEMINI_MODEL,
        ApiKeySource::Static(TEST_GEMINI_KEY.to_string()),
    )
    .with_retry(2, Duration::from_millis(5));

    let monitor = monitor_against(&server, Arc::new(classifier), true);
    let outcome = monitor.run("Kerala coast").await;

    assert_eq!(outcome, SearchOutcome::Completed { appended: 1 });
    let posts = monitor.snapshot();
    assert_eq!(posts[0].category, Category::EmergencyAlert);
    // Remote mode was selected at startup, so the score stays remote.
    assert_eq!(posts[0].category_score, 1.0);
    assert_eq!(gemini.classify_calls(), 2);
}

// =============================================================================
// Failure Propagation Tests
// =============================================================================

#[tokio::test]
async fn test_missing_uuid_fails_the_session() {
    let server = TestServer::spawn().await;
    server.upstream.enqueue_submit(200, json!({"status": "accepted"}));
    let monitor = monitor_against(&server, Arc::new(HeuristicClassifier::new()), false);

    let outcome = monitor.run("flood").await;

    assert_eq!(
        outcome,
        SearchOutcome::Failed {
            message: "Error: No uuid returned".to_string()
        }
    );
}

#[tokio::test]
async fn test_upstream_error_fails_the_session() {
    let server = TestServer::spawn().await;
    server.upstream.enqueue_submit(200, json!({"uuid": "job-9"}));
    server.upstream.enqueue_result(500, json!({"detail": "boom"}));
    let monitor = monitor_against(&server, Arc::new(HeuristicClassifier::new()), false);

    let outcome = monitor.run("flood").await;

    match outcome {
        SearchOutcome::Failed { message } => {
            assert!(message.starts_with("Error: "), "got: {}", message);
            assert!(message.contains("500"), "got: {}", message);
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(monitor.snapshot().is_empty());
}
