//! Verdict types shared by the classifier implementations.

use serde::{Deserialize, Serialize};

/// Category a post is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Emergency/Alert")]
    EmergencyAlert,
    #[serde(rename = "Panic/Fear")]
    PanicFear,
    #[serde(rename = "Awareness/Official Info")]
    AwarenessOfficialInfo,
    #[serde(rename = "Observation/Neutral Report")]
    ObservationNeutralReport,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::EmergencyAlert,
        Category::PanicFear,
        Category::AwarenessOfficialInfo,
        Category::ObservationNeutralReport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::EmergencyAlert => "Emergency/Alert",
            Category::PanicFear => "Panic/Fear",
            Category::AwarenessOfficialInfo => "Awareness/Official Info",
            Category::ObservationNeutralReport => "Observation/Neutral Report",
        }
    }

    /// Parse a classifier-produced label. `None` when unrecognized.
    pub fn from_label(label: &str) -> Option<Category> {
        match label.trim() {
            "Emergency/Alert" => Some(Category::EmergencyAlert),
            "Panic/Fear" => Some(Category::PanicFear),
            "Awareness/Official Info" => Some(Category::AwarenessOfficialInfo),
            "Observation/Neutral Report" => Some(Category::ObservationNeutralReport),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw classification verdict, before local enrichment (hazard, urgency,
/// location resolution) turns it into a classified post.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub category: Category,
    /// Extracted location name; `None` when the classifier answered Unknown.
    pub location: Option<String>,
    pub hashtags: Vec<String>,
    pub misinfo_flag: bool,
    /// Empty when not flagged.
    pub misinfo_reason: String,
}

impl Verdict {
    /// Safe default substituted when a classifier response cannot be parsed.
    pub fn fallback_default() -> Verdict {
        Verdict {
            category: Category::ObservationNeutralReport,
            location: None,
            hashtags: Vec::new(),
            misinfo_flag: false,
            misinfo_reason: String::new(),
        }
    }
}
