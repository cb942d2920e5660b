//! Batch classification and incremental reveal.

use crate::classify::{Classifier, HeuristicClassifier};
use crate::feed::{ClassifiedPost, FeedController, FeedSink, SessionToken};
use crate::ingest::RawPost;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Batch sizing and reveal pacing.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPolicy {
    pub batch_size: usize,
    /// Pause before each reveal and around the between-batches notice.
    pub reveal_delay: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        BatchPolicy {
            batch_size: 3,
            reveal_delay: Duration::from_millis(1000),
        }
    }
}

/// The session was replaced by a newer search while work was in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("search superseded")]
pub struct Superseded;

/// Classifies raw posts batch by batch and reveals them one at a time.
///
/// Batches run strictly in sequence; within a batch the classification
/// calls run concurrently and the batch completes when all of them have.
/// A post whose classification fails gets the keyword fallback verdict,
/// so no batch ever drops a post.
pub struct BatchProcessor {
    classifier: Arc<dyn Classifier>,
    fallback: HeuristicClassifier,
    /// Whether the remote classifier was selected at startup. Scores and
    /// the offline notice key off this, not off per-post outcomes.
    online: bool,
    policy: BatchPolicy,
    feed: Arc<FeedController>,
    sink: Arc<dyn FeedSink>,
}

impl BatchProcessor {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        online: bool,
        policy: BatchPolicy,
        feed: Arc<FeedController>,
        sink: Arc<dyn FeedSink>,
    ) -> BatchProcessor {
        BatchProcessor {
            classifier,
            fallback: HeuristicClassifier::default(),
            online,
            policy,
            feed,
            sink,
        }
    }

    /// Runs every post through classification and the reveal cadence.
    /// Returns the number of posts appended to the working set.
    pub async fn process(
        &self,
        token: &SessionToken,
        posts: Vec<RawPost>,
        cancel: &CancellationToken,
    ) -> Result<usize, Superseded> {
        if !self.online {
            warn!("No connectivity, classifying with keyword fallback");
            self.sink.fallback_notice().await;
        }

        let mut revealed = 0;
        let mut queue = posts;
        while !queue.is_empty() {
            let tail = queue.split_off(queue.len().min(self.policy.batch_size));
            let batch = std::mem::replace(&mut queue, tail);
            debug!(batch_size = batch.len(), remaining = queue.len(), "Classifying batch");

            let classified: Vec<ClassifiedPost> =
                join_all(batch.into_iter().map(|post| self.classify_one(post))).await;

            if !self.feed.append(token, classified.clone()) {
                debug!("Working set moved on, dropping batch");
                return Err(Superseded);
            }

            for post in classified {
                self.pause(cancel).await?;
                if !self.feed.is_current(token) {
                    return Err(Superseded);
                }
                self.sink.post_revealed(&post).await;
                revealed += 1;
            }

            if !queue.is_empty() {
                self.sink.more_coming().await;
                self.pause(cancel).await?;
                self.sink.more_coming_cleared().await;
            }
        }

        debug!(revealed, online = self.online, "Batch processing finished");
        Ok(revealed)
    }

    async fn classify_one(&self, post: RawPost) -> ClassifiedPost {
        let verdict = match self.classifier.classify(&post).await {
            Ok(verdict) => verdict,
            Err(err) => {
                warn!(
                    error = %err,
                    content = %preview(&post.content),
                    "Classification failed, using keyword fallback"
                );
                self.fallback.verdict_for(&post)
            }
        };
        ClassifiedPost::from_parts(post, verdict, self.online)
    }

    async fn pause(&self, cancel: &CancellationToken) -> Result<(), Superseded> {
        tokio::select! {
            _ = sleep(self.policy.reveal_delay) => Ok(()),
            _ = cancel.cancelled() => Err(Superseded),
        }
    }
}

fn preview(content: &str) -> String {
    content.chars().take(50).collect()
}
