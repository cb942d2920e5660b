//! Posts enriched with classification output.

use crate::classify::{detect_hazard, determine_urgency, Category, HazardKind, Urgency, Verdict};
use crate::gazetteer::{self, ResolvedLocation};
use crate::ingest::RawPost;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref MEDIA_URL_RE: Regex = Regex::new(
        r"https://pbs\.twimg\.com/media/[^ \n]+|https://pbs\.gstatic\.com/media/[^ \n]+"
    )
    .expect("media url regex");
}

/// A raw post together with everything the classification stage derived
/// from it. Serializes with the raw post fields inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedPost {
    #[serde(flatten)]
    pub raw: RawPost,
    pub category: Category,
    /// 1.0 for remote verdicts, 0.5 for keyword fallback.
    pub category_score: f64,
    pub hazard: HazardKind,
    pub urgency: Urgency,
    pub location: ResolvedLocation,
    pub hashtags: Vec<String>,
    pub misinfo_flag: bool,
    pub misinfo_reason: String,
}

impl ClassifiedPost {
    /// Combines a raw post with its verdict. Hazard, urgency and location
    /// are derived here so remote and fallback verdicts go through the
    /// same enrichment.
    pub fn from_parts(raw: RawPost, verdict: Verdict, online: bool) -> ClassifiedPost {
        let hazard = detect_hazard(&raw.content);
        let urgency = determine_urgency(verdict.category, hazard);
        let location = gazetteer::resolve(
            &raw.content,
            verdict.location.as_deref(),
            raw.metadata.location.as_deref(),
            raw.metadata.geo.as_ref().map(|g| g.coordinates.as_slice()),
        );
        ClassifiedPost {
            category: verdict.category,
            category_score: if online { 1.0 } else { 0.5 },
            hazard,
            urgency,
            location,
            hashtags: verdict.hashtags,
            misinfo_flag: verdict.misinfo_flag,
            misinfo_reason: verdict.misinfo_reason,
            raw,
        }
    }

    /// Image URLs embedded in the content, at most four, upgraded to the
    /// large variant.
    pub fn media_urls(&self) -> Vec<String> {
        MEDIA_URL_RE
            .find_iter(&self.raw.content)
            .take(4)
            .map(|m| m.as_str().replacen("name=small", "name=large", 1))
            .collect()
    }
}
