//! Sink for incremental feed output.

use super::ClassifiedPost;
use async_trait::async_trait;

/// Receives feed events as the pipeline produces them. The console
/// renderer implements this for interactive use; tests script it.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait FeedSink: Send + Sync {
    /// A new search started; any previous feed output is obsolete.
    async fn session_started(&self, query: &str);

    /// Classification is running without the remote model.
    async fn fallback_notice(&self);

    /// One post became visible.
    async fn post_revealed(&self, post: &ClassifiedPost);

    /// More batches are still being classified.
    async fn more_coming(&self);

    /// The pending-batches notice is over.
    async fn more_coming_cleared(&self);

    /// The search ended with an error; `message` is user-facing.
    async fn session_failed(&self, message: &str);

    /// The search ran to completion with `total` posts revealed.
    async fn session_completed(&self, total: usize);
}
