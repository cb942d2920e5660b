//! Filtered views and aggregates over the working set.
//!
//! Everything here is a pure derivation: callers pass the current posts
//! and get fresh output, nothing is cached between calls.

use crate::classify::{Category, HazardKind, Urgency};
use crate::feed::ClassifiedPost;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Number of volume samples kept for the trend chart.
pub const VOLUME_HISTORY_LIMIT: usize = 10;

/// Recency window measured against the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecencyWindow {
    #[default]
    All,
    Last24h,
    Last7d,
    Last30d,
}

impl RecencyWindow {
    fn hours(&self) -> Option<i64> {
        match self {
            RecencyWindow::All => None,
            RecencyWindow::Last24h => Some(24),
            RecencyWindow::Last7d => Some(168),
            RecencyWindow::Last30d => Some(720),
        }
    }
}

/// State of the filter controls. `None` means no restriction.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub hazard: Option<HazardKind>,
    pub category: Option<Category>,
    pub region: Option<String>,
    pub urgency: Option<Urgency>,
    pub source: Option<String>,
    pub recency: RecencyWindow,
}

impl FilterSelection {
    pub fn matches(&self, post: &ClassifiedPost, now: DateTime<Utc>) -> bool {
        if let Some(hazard) = self.hazard {
            if post.hazard != hazard {
                return false;
            }
        }
        if let Some(category) = self.category {
            if post.category != category {
                return false;
            }
        }
        if let Some(region) = &self.region {
            if !post.location.region.eq_ignore_ascii_case(region) {
                return false;
            }
        }
        if let Some(urgency) = self.urgency {
            if post.urgency != urgency {
                return false;
            }
        }
        if let Some(source) = &self.source {
            if post.raw.source.as_deref() != Some(source.as_str()) {
                return false;
            }
        }
        if let Some(hours) = self.recency.hours() {
            // Posts without a parseable timestamp stay visible.
            let created = post
                .raw
                .metadata
                .created_at
                .as_deref()
                .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok());
            if let Some(created) = created {
                if now.signed_duration_since(created) > Duration::hours(hours) {
                    return false;
                }
            }
        }
        true
    }
}

/// Applies the selection against the current time.
pub fn filter<'a>(
    posts: &'a [ClassifiedPost],
    selection: &FilterSelection,
) -> Vec<&'a ClassifiedPost> {
    let now = Utc::now();
    posts
        .iter()
        .filter(|post| selection.matches(post, now))
        .collect()
}

/// One map marker per post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub coordinates: [f64; 2],
    pub region: String,
    pub hazard: HazardKind,
    pub urgency: Urgency,
    pub misinfo_flag: bool,
    pub username: Option<String>,
}

/// Markers for the given posts, usually the filtered subset. Every post
/// carries resolved coordinates, so every post gets a marker.
pub fn markers<'a>(posts: impl IntoIterator<Item = &'a ClassifiedPost>) -> Vec<MapMarker> {
    posts
        .into_iter()
        .map(|post| MapMarker {
            coordinates: post.location.coordinates,
            region: post.location.region.clone(),
            hazard: post.hazard,
            urgency: post.urgency,
            misinfo_flag: post.misinfo_flag,
            username: post.raw.metadata.username.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashtagCount {
    pub tag: String,
    pub count: usize,
}

/// Aggregate counts over the whole working set, independent of any
/// filter selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// Per-category counts in the fixed category order.
    pub category_counts: Vec<(Category, usize)>,
    /// Per-hazard counts in the fixed hazard order.
    pub hazard_counts: Vec<(HazardKind, usize)>,
    /// Top five hashtags, case-folded, most frequent first with
    /// alphabetical tie-break.
    pub top_hashtags: Vec<HashtagCount>,
    pub misinfo_count: usize,
}

impl Summary {
    pub fn from_posts(posts: &[ClassifiedPost]) -> Summary {
        let mut category_counts: Vec<(Category, usize)> =
            Category::ALL.iter().map(|category| (*category, 0)).collect();
        let mut hazard_counts: Vec<(HazardKind, usize)> =
            HazardKind::ALL.iter().map(|hazard| (*hazard, 0)).collect();
        let mut hashtag_counts: HashMap<String, usize> = HashMap::new();
        let mut misinfo_count = 0;

        for post in posts {
            if let Some(entry) = category_counts
                .iter_mut()
                .find(|(category, _)| *category == post.category)
            {
                entry.1 += 1;
            }
            if let Some(entry) = hazard_counts
                .iter_mut()
                .find(|(hazard, _)| *hazard == post.hazard)
            {
                entry.1 += 1;
            }
            for tag in &post.hashtags {
                *hashtag_counts.entry(tag.to_lowercase()).or_insert(0) += 1;
            }
            if post.misinfo_flag {
                misinfo_count += 1;
            }
        }

        let mut top_hashtags: Vec<HashtagCount> = hashtag_counts
            .into_iter()
            .map(|(tag, count)| HashtagCount { tag, count })
            .collect();
        top_hashtags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        top_hashtags.truncate(5);

        Summary {
            total: posts.len(),
            category_counts,
            hazard_counts,
            top_hashtags,
            misinfo_count,
        }
    }
}

/// One point on the post-volume trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeSample {
    /// Wall-clock label, `HH:MM`.
    pub time: String,
    pub count: usize,
}

/// Rolling post-volume history, oldest sample dropped past the limit.
#[derive(Debug, Default)]
pub struct VolumeSeries {
    samples: Vec<VolumeSample>,
}

impl VolumeSeries {
    pub fn record(&mut self, time: String, count: usize) {
        self.samples.push(VolumeSample { time, count });
        if self.samples.len() > VOLUME_HISTORY_LIMIT {
            self.samples.remove(0);
        }
    }

    pub fn samples(&self) -> &[VolumeSample] {
        &self.samples
    }
}
