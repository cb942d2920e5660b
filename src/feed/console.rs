//! Console renderer for the incremental feed.

use super::{ClassifiedPost, FeedSink};
use crate::analytics::Summary;
use async_trait::async_trait;
use chrono::DateTime;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Renders posts to stdout as they are revealed, with a spinner while the
/// pipeline is still working.
#[derive(Default)]
pub struct ConsoleFeed {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleFeed {
    pub fn new() -> ConsoleFeed {
        ConsoleFeed::default()
    }

    fn println(&self, line: String) {
        match self.spinner.lock().unwrap().as_ref() {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }

    fn set_message(&self, message: &str) {
        if let Some(bar) = self.spinner.lock().unwrap().as_ref() {
            bar.set_message(message.to_string());
        }
    }

    fn finish(&self, message: Option<String>) {
        if let Some(bar) = self.spinner.lock().unwrap().take() {
            match message {
                Some(message) => bar.abandon_with_message(message),
                None => bar.finish_and_clear(),
            }
        }
    }
}

#[async_trait]
impl FeedSink for ConsoleFeed {
    async fn session_started(&self, query: &str) {
        debug!(query, "Feed session started");
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(SPINNER_TICK);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Loading posts...");
        *self.spinner.lock().unwrap() = Some(bar);
    }

    async fn fallback_notice(&self) {
        self.println("Offline mode: Using basic keyword analysis (no Gemini).".to_string());
    }

    async fn post_revealed(&self, post: &ClassifiedPost) {
        self.println(format!("{}\n", render_post(post)));
    }

    async fn more_coming(&self) {
        self.set_message("More posts coming...");
    }

    async fn more_coming_cleared(&self) {
        self.set_message("Loading posts...");
    }

    async fn session_failed(&self, message: &str) {
        self.finish(Some(message.to_string()));
    }

    async fn session_completed(&self, total: usize) {
        self.finish(None);
        self.println(format!("Displayed {total} posts."));
    }
}

/// Plain-text card for one post.
pub fn render_post(post: &ClassifiedPost) -> String {
    let username = post
        .raw
        .metadata
        .username
        .as_deref()
        .unwrap_or("Unknown User");
    let content = if post.raw.content.is_empty() {
        "No content"
    } else {
        post.raw.content.as_str()
    };
    let metrics = post
        .raw
        .metadata
        .public_metrics
        .clone()
        .unwrap_or_default();

    let mut lines = vec![
        format!(
            "{username} • {} • {}",
            format_timestamp(post.raw.metadata.created_at.as_deref()),
            post.location.region
        ),
        content.to_string(),
        format!(
            "replies {} • reposts {} • likes {}",
            metrics.reply_count, metrics.retweet_count, metrics.like_count
        ),
        format!(
            "Category: {} ({:.1}%) | Hazard: {} | Urgency: {}",
            post.category,
            post.category_score * 100.0,
            post.hazard,
            post.urgency
        ),
    ];
    if post.misinfo_flag {
        lines.push(format!("⚠ Suspect: {}", post.misinfo_reason));
    }
    if !post.hashtags.is_empty() {
        let shown = post
            .hashtags
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let ellipsis = if post.hashtags.len() > 3 { "..." } else { "" };
        lines.push(format!("Hashtags: {shown}{ellipsis}"));
    }
    for url in post.media_urls() {
        lines.push(format!("Media: {url}"));
    }
    lines.join("\n")
}

fn format_timestamp(raw: Option<&str>) -> String {
    match raw {
        None => "Unknown Date".to_string(),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|parsed| parsed.format("%a %d %b %Y, %H:%M").to_string())
            .unwrap_or_else(|_| raw.to_string()),
    }
}

/// End-of-session digest printed under the feed. Zero-count entries are
/// skipped.
pub fn render_summary(summary: &Summary) -> String {
    let mut lines = vec![format!(
        "Summary: {} posts, {} flagged suspect",
        summary.total, summary.misinfo_count
    )];

    let categories = summary
        .category_counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| format!("{category} {count}"))
        .collect::<Vec<_>>();
    if !categories.is_empty() {
        lines.push(format!("Categories: {}", categories.join(" | ")));
    }

    let hazards = summary
        .hazard_counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(hazard, count)| format!("{hazard} {count}"))
        .collect::<Vec<_>>();
    if !hazards.is_empty() {
        lines.push(format!("Hazards: {}", hazards.join(" | ")));
    }

    if !summary.top_hashtags.is_empty() {
        let tags = summary
            .top_hashtags
            .iter()
            .map(|entry| format!("{} ({})", entry.tag, entry.count))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Top hashtags: {tags}"));
    }

    lines.join("\n")
}
