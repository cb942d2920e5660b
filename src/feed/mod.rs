//! Classified post feed: working set, sinks and console rendering.

mod console;
mod models;
mod sink;
mod working_set;

pub use console::{render_post, render_summary, ConsoleFeed};
pub use models::ClassifiedPost;
pub use sink::FeedSink;
pub use working_set::{FeedController, SessionToken};

#[cfg(feature = "mock")]
pub use sink::MockFeedSink;
