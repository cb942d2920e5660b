//! Poll loop for dispatched search jobs.
//!
//! A single-timer state machine: one outstanding result request at a time,
//! with a fixed initial delay, linear backoff on empty results and a fixed
//! retry delay on transient errors. Every transition lands in the job's
//! state field, and all waits race against the session's cancellation
//! token so a superseded search stops polling.

use super::{PollReply, PollState, RawPost, SearchBackend, SearchJob};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Timing and bounds for the poll loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay before the first poll.
    pub initial_delay: Duration,
    /// Attempt n waits `backoff_step * n` after an empty result.
    pub backoff_step: Duration,
    /// Fixed delay after a transient fetch error.
    pub transient_retry_delay: Duration,
    /// Maximum number of polls before timing out.
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn delay_after_empty(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            initial_delay: Duration::from_millis(2000),
            backoff_step: Duration::from_millis(2000),
            transient_retry_delay: Duration::from_millis(2000),
            max_attempts: 10,
        }
    }
}

/// Terminal poll outcomes other than results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PollError {
    /// Error payload from the backend, surfaced verbatim.
    #[error("{0}")]
    Api(String),
    #[error("Timeout: No results after {0} attempts")]
    TimedOut(u32),
    /// Transport failure on the final allowed attempt.
    #[error("{0}")]
    Transport(String),
    #[error("search superseded")]
    Cancelled,
}

/// Drives a job from `Dispatched` to a terminal state.
pub struct Poller {
    backend: Arc<dyn SearchBackend>,
    policy: PollPolicy,
}

impl Poller {
    pub fn new(backend: Arc<dyn SearchBackend>, policy: PollPolicy) -> Poller {
        Poller { backend, policy }
    }

    /// Poll until the job completes, fails, times out or is cancelled.
    pub async fn poll(
        &self,
        job: &mut SearchJob,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawPost>, PollError> {
        self.wait(self.policy.initial_delay, cancel).await?;
        job.state = PollState::Polling;

        let mut attempts = 0;
        loop {
            if attempts >= self.policy.max_attempts {
                job.state = PollState::TimedOut;
                return Err(PollError::TimedOut(attempts));
            }
            attempts += 1;
            debug!(job_uuid = %job.job_uuid, attempt = attempts, "Polling for results");

            match self.backend.fetch_results(&job.job_uuid).await {
                Ok(PollReply::Ready(posts)) => {
                    debug!(job_uuid = %job.job_uuid, count = posts.len(), "Results ready");
                    job.state = PollState::Completed;
                    return Ok(posts);
                }
                Ok(PollReply::Pending) => {
                    self.wait(self.policy.delay_after_empty(attempts), cancel)
                        .await?;
                }
                Err(err) if err.is_terminal() => {
                    warn!(job_uuid = %job.job_uuid, error = %err, "Backend reported an error");
                    job.state = PollState::Failed;
                    return Err(PollError::Api(err.to_string()));
                }
                Err(err) => {
                    warn!(
                        job_uuid = %job.job_uuid,
                        attempt = attempts,
                        error = %err,
                        "Poll attempt failed"
                    );
                    if attempts >= self.policy.max_attempts {
                        job.state = PollState::Failed;
                        return Err(PollError::Transport(err.to_string()));
                    }
                    self.wait(self.policy.transient_retry_delay, cancel).await?;
                }
            }
        }
    }

    async fn wait(&self, delay: Duration, cancel: &CancellationToken) -> Result<(), PollError> {
        tokio::select! {
            _ = sleep(delay) => Ok(()),
            _ = cancel.cancelled() => Err(PollError::Cancelled),
        }
    }
}
