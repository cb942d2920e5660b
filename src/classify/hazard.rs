//! Local hazard detection and urgency scoring.
//!
//! Both functions are pure. Hazard detection is keyword containment on the
//! lowercased content, with multilingual keywords (Hindi, Tamil, Telugu,
//! Malayalam) mapping to the same hazards as their English equivalents.

use super::Category;
use serde::{Deserialize, Serialize};

/// Coastal hazard kind detected in a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Flood,
    Tsunami,
    Waves,
    Erosion,
    Storm,
    Other,
}

impl HazardKind {
    pub const ALL: [HazardKind; 6] = [
        HazardKind::Flood,
        HazardKind::Tsunami,
        HazardKind::Waves,
        HazardKind::Erosion,
        HazardKind::Storm,
        HazardKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardKind::Flood => "flood",
            HazardKind::Tsunami => "tsunami",
            HazardKind::Waves => "waves",
            HazardKind::Erosion => "erosion",
            HazardKind::Storm => "storm",
            HazardKind::Other => "other",
        }
    }
}

impl std::fmt::Display for HazardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency level derived from category and hazard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Checked in declaration order, first match wins.
const HAZARD_KEYWORDS: &[(HazardKind, &[&str])] = &[
    (
        HazardKind::Flood,
        &[
            "flood",
            "flooding",
            "inundation",
            "बाढ़",
            "வெள்ளம்",
            "వరద",
            "വെള്ളപ്പൊക്കം",
            "വെള്ളം",
        ],
    ),
    (
        HazardKind::Tsunami,
        &["tsunami", "tidal wave", "सुनामी", "சுனாமி", "సునామీ", "സുനാമി"],
    ),
    (
        HazardKind::Waves,
        &["wave", "high wave", "swell", "लहरें", "அலைகள்", "అలలు", "തിരമാലകൾ"],
    ),
    (
        HazardKind::Erosion,
        &["erosion", "coastal erosion", "कटाव", "அரிப்பு", "కోత", "ക്ഷയം"],
    ),
    (
        HazardKind::Storm,
        &["storm", "cyclone", "hurricane", "तूफान", "புயல்", "తుఫాను", "കൊടുങ്കാറ്റ്"],
    ),
];

/// Detect the hazard a post talks about. Returns exactly one of the six
/// kinds; `Other` when no keyword matches.
pub fn detect_hazard(content: &str) -> HazardKind {
    let lowered = content.to_lowercase();
    for (kind, keywords) in HAZARD_KEYWORDS {
        if keywords.iter().any(|keyword| lowered.contains(keyword)) {
            return *kind;
        }
    }
    HazardKind::Other
}

/// Combine category and hazard into an urgency level. Pure and total.
pub fn determine_urgency(category: Category, hazard: HazardKind) -> Urgency {
    if matches!(category, Category::EmergencyAlert | Category::PanicFear)
        || matches!(
            hazard,
            HazardKind::Tsunami | HazardKind::Flood | HazardKind::Storm
        )
    {
        return Urgency::High;
    }
    if matches!(
        category,
        Category::ObservationNeutralReport | Category::AwarenessOfficialInfo
    ) || matches!(hazard, HazardKind::Waves | HazardKind::Erosion)
    {
        return Urgency::Medium;
    }
    Urgency::Low
}
