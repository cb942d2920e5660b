//! Scripted doubles shared by the pipeline tests.

use crate::classify::{Classifier, ClassifyError, Verdict};
use crate::feed::{ClassifiedPost, FeedSink};
use crate::ingest::{PollReply, RawPost, SearchBackend, SearchError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Everything a sink can be told, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Started(String),
    FallbackNotice,
    Revealed(String),
    MoreComing,
    MoreComingCleared,
    Failed(String),
    Completed(usize),
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl FeedSink for RecordingSink {
    async fn session_started(&self, query: &str) {
        self.push(Event::Started(query.to_string()));
    }

    async fn fallback_notice(&self) {
        self.push(Event::FallbackNotice);
    }

    async fn post_revealed(&self, post: &ClassifiedPost) {
        self.push(Event::Revealed(post.raw.content.clone()));
    }

    async fn more_coming(&self) {
        self.push(Event::MoreComing);
    }

    async fn more_coming_cleared(&self) {
        self.push(Event::MoreComingCleared);
    }

    async fn session_failed(&self, message: &str) {
        self.push(Event::Failed(message.to_string()));
    }

    async fn session_completed(&self, total: usize) {
        self.push(Event::Completed(total));
    }
}

/// Classifier answering every call with the same scripted outcome.
pub struct ScriptedClassifier {
    outcome: Result<Verdict, ClassifyError>,
    calls: Mutex<u32>,
}

impl ScriptedClassifier {
    pub fn always(verdict: Verdict) -> Arc<ScriptedClassifier> {
        Arc::new(ScriptedClassifier {
            outcome: Ok(verdict),
            calls: Mutex::new(0),
        })
    }

    pub fn failing(error: ClassifyError) -> Arc<ScriptedClassifier> {
        Arc::new(ScriptedClassifier {
            outcome: Err(error),
            calls: Mutex::new(0),
        })
    }

    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn classify(&self, _post: &RawPost) -> Result<Verdict, ClassifyError> {
        *self.calls.lock().unwrap() += 1;
        self.outcome.clone()
    }

    async fn health_check(&self) -> Result<(), ClassifyError> {
        Ok(())
    }
}

/// Search backend with scripted submit and fetch replies. An exhausted
/// fetch script keeps answering `Pending`.
#[derive(Default)]
pub struct ScriptedBackend {
    submits: Mutex<VecDeque<Result<String, SearchError>>>,
    replies: Mutex<VecDeque<Result<PollReply, SearchError>>>,
    queries: Mutex<Vec<String>>,
    fetch_calls: Mutex<u32>,
}

impl ScriptedBackend {
    pub fn new(
        submits: Vec<Result<String, SearchError>>,
        replies: Vec<Result<PollReply, SearchError>>,
    ) -> Arc<ScriptedBackend> {
        Arc::new(ScriptedBackend {
            submits: Mutex::new(submits.into()),
            replies: Mutex::new(replies.into()),
            queries: Mutex::new(vec![]),
            fetch_calls: Mutex::new(0),
        })
    }

    pub fn submitted_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn fetch_call_count(&self) -> u32 {
        *self.fetch_calls.lock().unwrap()
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn submit_search(&self, query: &str, _max_results: u32) -> Result<String, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok("scripted-job".to_string()))
    }

    async fn fetch_results(&self, _job_uuid: &str) -> Result<PollReply, SearchError> {
        *self.fetch_calls.lock().unwrap() += 1;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(PollReply::Pending))
    }
}

pub fn neutral_verdict() -> Verdict {
    Verdict {
        category: crate::classify::Category::ObservationNeutralReport,
        location: None,
        hashtags: vec![],
        misinfo_flag: false,
        misinfo_reason: String::new(),
    }
}
