//! Samudra Monitor Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod analytics;
pub mod api_key;
pub mod classify;
pub mod config;
pub mod feed;
pub mod gazetteer;
pub mod ingest;
pub mod pipeline;
pub mod server;

// Re-export commonly used types for convenience
pub use classify::{Classifier, GeminiClassifier, HeuristicClassifier};
pub use feed::{ConsoleFeed, FeedSink};
pub use ingest::{SearchApiClient, SearchBackend};
pub use pipeline::{Monitor, SearchOutcome};
pub use server::{run_server, RequestsLoggingLevel};
