//! Search job and raw post models.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A post as returned by the search backend. The upstream feed is lenient
/// about what it carries, so everything defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub metadata: PostMetadata,
}

impl RawPost {
    /// Post with just content, for tests and fixtures.
    pub fn with_content(content: impl Into<String>) -> RawPost {
        RawPost {
            id: None,
            content: content.into(),
            source: None,
            metadata: PostMetadata::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PostMetadata {
    #[serde(default)]
    pub username: Option<String>,
    /// ISO-8601 timestamp as received; parsed on demand.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Free-text user location.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub geo: Option<GeoTag>,
    #[serde(default)]
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoTag {
    /// [latitude, longitude] when well-formed; anything else is ignored.
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// Engagement counters from the upstream feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub like_count: u64,
}

/// Lifecycle of a dispatched search job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PollState {
    Dispatched,
    Polling,
    Completed,
    TimedOut,
    Failed,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Completed | PollState::TimedOut | PollState::Failed
        )
    }
}

/// A dispatched search with its poll state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchJob {
    pub job_uuid: String,
    pub query: String,
    pub max_results: u32,
    pub state: PollState,
}

impl SearchJob {
    pub fn new(job_uuid: impl Into<String>, query: impl Into<String>, max_results: u32) -> Self {
        SearchJob {
            job_uuid: job_uuid.into(),
            query: query.into(),
            max_results,
            state: PollState::Dispatched,
        }
    }
}

/// One poll observation from the result endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum PollReply {
    /// One or more posts arrived; the job is done.
    Ready(Vec<RawPost>),
    /// Empty array; results are not in yet.
    Pending,
}

/// Errors from the search backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Error payload from the backend, surfaced verbatim.
    #[error("{0}")]
    Api(String),
    #[error("No job UUID")]
    MissingJobId,
    #[error("connection error: {0}")]
    Connection(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl SearchError {
    /// Terminal errors abort the job; everything else the poller retries.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchError::Api(_) | SearchError::MissingJobId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_post_parses_upstream_shape() {
        let json = r#"{
            "id": "17283",
            "content": "Heavy flooding in Chennai #ChennaiFloods",
            "source": "twitter",
            "metadata": {
                "username": "coastwatcher",
                "created_at": "2025-08-01T10:00:00Z",
                "location": "Chennai",
                "geo": {"coordinates": [13.08, 80.27]},
                "public_metrics": {"retweet_count": 4, "reply_count": 1, "like_count": 9}
            }
        }"#;
        let post: RawPost = serde_json::from_str(json).unwrap();
        assert_eq!(post.content, "Heavy flooding in Chennai #ChennaiFloods");
        assert_eq!(post.metadata.username.as_deref(), Some("coastwatcher"));
        let metrics = post.metadata.public_metrics.unwrap();
        assert_eq!(metrics.retweet_count, 4);
        assert_eq!(metrics.like_count, 9);
    }

    #[test]
    fn test_raw_post_defaults_missing_fields() {
        let post: RawPost = serde_json::from_str("{}").unwrap();
        assert!(post.id.is_none());
        assert!(post.content.is_empty());
        assert!(post.metadata.geo.is_none());
    }

    #[test]
    fn test_poll_state_serialization() {
        assert_eq!(
            serde_json::to_string(&PollState::TimedOut).unwrap(),
            "\"TIMED_OUT\""
        );
        assert_eq!(
            serde_json::to_string(&PollState::Dispatched).unwrap(),
            "\"DISPATCHED\""
        );
    }

    #[test]
    fn test_poll_state_terminality() {
        assert!(!PollState::Dispatched.is_terminal());
        assert!(!PollState::Polling.is_terminal());
        assert!(PollState::Completed.is_terminal());
        assert!(PollState::TimedOut.is_terminal());
        assert!(PollState::Failed.is_terminal());
    }

    #[test]
    fn test_search_job_starts_dispatched() {
        let job = SearchJob::new("job-1", "flood Chennai", 20);
        assert_eq!(job.state, PollState::Dispatched);
    }

    #[test]
    fn test_search_error_terminality() {
        assert!(SearchError::Api("quota exceeded".to_string()).is_terminal());
        assert!(SearchError::MissingJobId.is_terminal());
        assert!(!SearchError::Connection("refused".to_string()).is_terminal());
        assert!(!SearchError::InvalidResponse("bad json".to_string()).is_terminal());
    }

    #[test]
    fn test_search_error_messages_are_verbatim() {
        let err = SearchError::Api("quota exceeded".to_string());
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(SearchError::MissingJobId.to_string(), "No job UUID");
    }
}
