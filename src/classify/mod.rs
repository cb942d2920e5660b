//! Post classification.
//!
//! A capability trait with two implementations: a remote Gemini-style
//! client and a local keyword heuristic. The active one is picked once per
//! run by a connectivity check, so the batch pipeline never knows which it
//! is talking to.

mod gemini;
mod hazard;
mod heuristic;
mod types;

pub use gemini::{GeminiClassifier, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use hazard::{detect_hazard, determine_urgency, HazardKind, Urgency};
pub use heuristic::HeuristicClassifier;
pub use types::{Category, Verdict};

use crate::ingest::RawPost;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from classification backends.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifyError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid API key or quota exceeded")]
    InvalidCredentials,
    #[error("model {0} not found (check model name or API version)")]
    UnknownModel(String),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Capability trait for post classification.
///
/// Implementations return a raw [`Verdict`]; hazard detection, urgency and
/// location resolution are applied downstream regardless of backend.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, post: &RawPost) -> Result<Verdict, ClassifyError>;

    /// Cheap connectivity probe used to select the active classifier.
    async fn health_check(&self) -> Result<(), ClassifyError>;
}
