//! Search pipeline orchestration.
//!
//! [`Monitor`] drives one search session end to end: dispatch, poll,
//! batch classification and incremental reveal. Starting a new session
//! cancels the previous one and invalidates its working-set token.

mod batch;
#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchPolicy, BatchProcessor, Superseded};

use crate::analytics::{VolumeSample, VolumeSeries};
use crate::classify::Classifier;
use crate::feed::{ClassifiedPost, FeedController, FeedSink};
use crate::ingest::{
    PollError, PollPolicy, Poller, SearchBackend, SearchJob, DEFAULT_QUERY,
};
use chrono::Local;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// How a search session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Every batch was classified and revealed.
    Completed { appended: usize },
    /// Terminal failure; `message` is what the user was shown.
    Failed { message: String },
    /// Poll budget exhausted with no results.
    TimedOut { attempts: u32 },
    /// A newer search replaced this one mid-flight.
    Superseded,
}

/// Owns the working set and runs search sessions against it.
pub struct Monitor {
    backend: Arc<dyn SearchBackend>,
    poller: Poller,
    batch: BatchProcessor,
    feed: Arc<FeedController>,
    sink: Arc<dyn FeedSink>,
    max_results: u32,
    volume: Mutex<VolumeSeries>,
    current_cancel: Mutex<CancellationToken>,
}

impl Monitor {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        classifier: Arc<dyn Classifier>,
        online: bool,
        sink: Arc<dyn FeedSink>,
        poll_policy: PollPolicy,
        batch_policy: BatchPolicy,
        max_results: u32,
    ) -> Monitor {
        let feed = Arc::new(FeedController::new());
        let poller = Poller::new(backend.clone(), poll_policy);
        let batch = BatchProcessor::new(
            classifier,
            online,
            batch_policy,
            feed.clone(),
            sink.clone(),
        );
        Monitor {
            backend,
            poller,
            batch,
            feed,
            sink,
            max_results,
            volume: Mutex::new(VolumeSeries::default()),
            current_cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Runs one search session to a terminal outcome. A blank query falls
    /// back to the default multilingual hazard query.
    pub async fn run(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        let query = if query.is_empty() { DEFAULT_QUERY } else { query };

        let cancel = self.rotate_cancel_token();
        let token = self.feed.begin_session();
        info!(session_id = %token.session_id(), query, "Starting search session");
        self.sink.session_started(query).await;

        let job_uuid = match self.backend.submit_search(query, self.max_results).await {
            Ok(job_uuid) => job_uuid,
            Err(err) => {
                error!(error = %err, "Search dispatch failed");
                let message = format!("Error: {err}");
                self.sink.session_failed(&message).await;
                return SearchOutcome::Failed { message };
            }
        };
        let mut job = SearchJob::new(job_uuid, query, self.max_results);
        info!(job_uuid = %job.job_uuid, "Search dispatched");

        let posts = match self.poller.poll(&mut job, &cancel).await {
            Ok(posts) => posts,
            Err(PollError::Cancelled) => return SearchOutcome::Superseded,
            Err(PollError::TimedOut(attempts)) => {
                let message = PollError::TimedOut(attempts).to_string();
                error!(attempts, "Polling gave up");
                self.sink.session_failed(&message).await;
                return SearchOutcome::TimedOut { attempts };
            }
            Err(err) => {
                error!(error = %err, "Polling failed");
                let message = format!("Error: {err}");
                self.sink.session_failed(&message).await;
                return SearchOutcome::Failed { message };
            }
        };
        info!(count = posts.len(), "Results received");

        let appended = match self.batch.process(&token, posts, &cancel).await {
            Ok(appended) => appended,
            Err(Superseded) => return SearchOutcome::Superseded,
        };

        self.record_volume_sample();
        self.sink.session_completed(appended).await;
        SearchOutcome::Completed { appended }
    }

    /// Current working set, in reveal order.
    pub fn snapshot(&self) -> Vec<ClassifiedPost> {
        self.feed.snapshot()
    }

    /// Rolling post-volume history, one sample per completed session.
    pub fn volume_history(&self) -> Vec<VolumeSample> {
        self.volume.lock().unwrap().samples().to_vec()
    }

    fn rotate_cancel_token(&self) -> CancellationToken {
        let fresh = CancellationToken::new();
        let previous =
            std::mem::replace(&mut *self.current_cancel.lock().unwrap(), fresh.clone());
        previous.cancel();
        fresh
    }

    fn record_volume_sample(&self) {
        let time = Local::now().format("%H:%M").to_string();
        self.volume.lock().unwrap().record(time, self.feed.len());
    }
}
