//! Keyword-based offline classification.
//!
//! No network, never fails. Selected when the remote classifier is
//! unavailable, and used as the per-post fallback when a remote call errors
//! out.

use super::{Category, Classifier, ClassifyError, Verdict};
use crate::ingest::RawPost;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HASHTAG_RE: Regex = Regex::new(r"#\w+").expect("Failed to compile hashtag regex");
    static ref BIG_NUMBER_RE: Regex =
        Regex::new(r"\d{4,}").expect("Failed to compile numeric claim regex");
}

const EMERGENCY_KEYWORDS: &[&str] = &["help", "evacuate", "danger", "emergency"];
const PANIC_KEYWORDS: &[&str] = &["fear", "scared", "panic", "!!!"];
const AWARENESS_KEYWORDS: &[&str] = &["alert", "warning", "official", "incois"];

const MISINFO_REASON: &str = "High numerical claims or extreme language detected";

/// Categorize content by keyword buckets, checked in priority order.
pub fn detect_category(content: &str) -> Category {
    let lowered = content.to_lowercase();
    if EMERGENCY_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return Category::EmergencyAlert;
    }
    if PANIC_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return Category::PanicFear;
    }
    if AWARENESS_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return Category::AwarenessOfficialInfo;
    }
    Category::ObservationNeutralReport
}

/// Flag probable misinformation: death claims with 4+ digit numbers, or
/// absolute language.
pub fn detect_misinfo(content: &str) -> bool {
    let lowered = content.to_lowercase();
    (lowered.contains("dead") && BIG_NUMBER_RE.is_match(content))
        || lowered.contains("everyone")
        || lowered.contains("all gone")
}

/// All `#word` tokens in the content, in order of appearance.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Offline keyword classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> HeuristicClassifier {
        HeuristicClassifier
    }

    /// Synchronous verdict, used directly as the per-post fallback path.
    pub fn verdict_for(&self, post: &RawPost) -> Verdict {
        let content = &post.content;
        let misinfo_flag = detect_misinfo(content);
        Verdict {
            category: detect_category(content),
            location: None,
            hashtags: extract_hashtags(content),
            misinfo_flag,
            misinfo_reason: if misinfo_flag {
                MISINFO_REASON.to_string()
            } else {
                String::new()
            },
        }
    }
}

#[async_trait]
impl Classifier for HeuristicClassifier {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn classify(&self, post: &RawPost) -> Result<Verdict, ClassifyError> {
        Ok(self.verdict_for(post))
    }

    async fn health_check(&self) -> Result<(), ClassifyError> {
        Ok(())
    }
}
