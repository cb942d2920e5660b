//! Region gazetteer and location resolution.
//!
//! Maps Indian states, coastal cities, known villages and river systems to
//! coordinates. Resolution scans the table in declaration order and takes
//! the first region whose name appears in the post text, so broader names
//! listed earlier (e.g. `TAMIL NADU`) win over the cities inside them. The
//! order is part of the contract, keep new entries at the end of their
//! section.

use serde::{Deserialize, Serialize};

/// Fallback coordinates (geographic center of India).
pub const DEFAULT_COORDINATES: [f64; 2] = [20.5937, 78.9629];

/// Ordered region table: uppercase name, [latitude, longitude].
pub const REGIONS: &[(&str, [f64; 2])] = &[
    // States and union territories
    ("ANDAMAN AND NICOBAR ISLANDS", [11.7401, 92.6586]),
    ("ANDHRA PRADESH", [15.9129, 79.7400]),
    ("ARUNACHAL PRADESH", [28.2180, 94.7278]),
    ("ASSAM", [26.2006, 92.9378]),
    ("BIHAR", [25.0941, 85.3136]),
    ("CHHATTISGARH", [21.2514, 81.6299]),
    ("GOA", [15.2993, 74.1240]),
    ("GUJARAT", [22.2587, 71.1924]),
    ("HARYANA", [29.0588, 77.1984]),
    ("HIMACHAL PRADESH", [31.1048, 77.1734]),
    ("JAMMU AND KASHMIR", [33.7782, 76.5762]),
    ("JHARKHAND", [23.3441, 85.3096]),
    ("KARNATAKA", [15.3173, 75.7139]),
    ("KERALA", [10.8505, 76.2711]),
    ("MADHYA PRADESH", [22.9734, 78.6569]),
    ("MAHARASHTRA", [19.7515, 75.7139]),
    ("MANIPUR", [24.6638, 93.9063]),
    ("MEGHALAYA", [25.4670, 91.3662]),
    ("MIZORAM", [23.1645, 92.9378]),
    ("NAGALAND", [25.4670, 94.1230]),
    ("ODISHA", [20.9517, 85.0985]),
    ("PUNJAB", [30.7333, 76.7794]),
    ("RAJASTHAN", [27.0238, 74.2179]),
    ("SIKKIM", [27.5330, 88.5122]),
    ("TAMIL NADU", [11.1271, 78.6569]),
    ("TELANGANA", [17.3850, 78.4867]),
    ("TRIPURA", [23.9408, 91.9882]),
    ("UTTAR PRADESH", [26.8467, 80.9462]),
    ("UTTARAKHAND", [30.3165, 78.0322]),
    ("WEST BENGAL", [22.9868, 87.8550]),
    ("CHANDIGARH", [30.7333, 76.7794]),
    ("DADRA AND NAGAR HAVELI AND DAMAN AND DIU", [20.4283, 72.8397]),
    ("DELHI", [28.7041, 77.1025]),
    ("LADAKH", [34.1526, 77.5770]),
    ("LAKSHADWEEP", [10.5667, 72.6417]),
    ("PUDUCHERRY", [11.9416, 79.8083]),
    // Coastal cities and sites
    ("MUMBAI", [19.0760, 72.8777]),
    ("CHENNAI", [13.0827, 80.2707]),
    ("KOLKATA", [22.5726, 88.3639]),
    ("SURAT", [21.1702, 72.8311]),
    ("VISAKHAPATNAM", [17.6868, 83.2185]),
    ("KOCHI", [9.9312, 76.2673]),
    ("PONDICHERRY", [11.9416, 79.8083]),
    ("MANGALORE", [12.9141, 74.8560]),
    ("VARKALA", [8.7333, 76.7167]),
    ("MARARI BEACH", [9.4833, 76.3167]),
    ("MUNNAR", [10.0892, 77.0596]),
    ("ALAPPUZHA", [9.4981, 76.3388]),
    ("KOLLAM", [8.8934, 76.6102]),
    ("THRISSUR", [10.5276, 76.2144]),
    ("KANNUR", [11.8743, 75.3707]),
    ("KASARGOD", [12.4981, 75.0102]),
    ("BHOPAL", [23.2599, 77.4126]),
    ("HYDERABAD", [17.3850, 78.4867]),
    ("AHMEDABAD", [23.0225, 72.5714]),
    ("PATNA", [25.5941, 85.1376]),
    ("LUCKNOW", [26.8467, 80.9462]),
    // Flood-prone villages, deltas and rivers
    ("SUNDARBANS", [22.0000, 88.8000]),
    ("PARADI PADA VILLAGE", [21.1702, 72.8311]),
    ("DHARALI VILLAGE", [30.7333, 78.4667]),
    ("KHEER GANGA", [31.0000, 79.0000]),
    ("GODAVARI DELTA", [16.7667, 81.8000]),
    ("MAHANADI DELTA", [20.4667, 86.6667]),
    ("KRISHNA DELTA", [16.0000, 81.0000]),
    ("KOSHI RIVER", [26.0000, 86.0000]),
    ("TEESTA RIVER", [27.0000, 88.5000]),
    ("DAMODAR RIVER", [23.5000, 87.5000]),
    ("SABARMATI RIVER", [23.0000, 72.5000]),
    ("PENNAR RIVER", [14.0000, 79.0000]),
    ("VAIGAI RIVER", [10.0000, 78.0000]),
    ("KAVERI DELTA", [11.0000, 79.0000]),
    ("COLERON LAKE", [16.7167, 81.2167]),
    ("GOMTI RIVER", [26.8467, 80.9462]),
    ("YAMUNA RIVER", [28.7041, 77.1025]),
    ("GOMTI FLOOD PLAIN", [26.8467, 80.9462]),
];

/// Location a post resolved to. Every classified post carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// [latitude, longitude]
    pub coordinates: [f64; 2],
    pub region: String,
}

/// Exact-name lookup into the region table.
pub fn coordinates_for(region: &str) -> Option<[f64; 2]> {
    REGIONS
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, coordinates)| *coordinates)
}

/// Resolve a post to coordinates and a region name.
///
/// The classifier-extracted location (when not `Unknown`) and the free-text
/// metadata location are appended to the content before the scan. A known
/// region name beats a geo tag; a 2-element geo tag beats the national
/// default.
pub fn resolve(
    content: &str,
    extracted: Option<&str>,
    meta_location: Option<&str>,
    geo: Option<&[f64]>,
) -> ResolvedLocation {
    let mut haystack = content.to_uppercase();
    if let Some(extracted) = extracted {
        if extracted != "Unknown" {
            haystack.push(' ');
            haystack.push_str(&extracted.to_uppercase());
        }
    }
    if let Some(meta_location) = meta_location {
        haystack.push(' ');
        haystack.push_str(&meta_location.to_uppercase());
    }

    for (region, coordinates) in REGIONS {
        if haystack.contains(region) {
            return ResolvedLocation {
                coordinates: *coordinates,
                region: (*region).to_string(),
            };
        }
    }

    if let Some(geo) = geo {
        if geo.len() == 2 {
            let region = meta_location
                .filter(|l| !l.is_empty())
                .unwrap_or("Unknown")
                .to_string();
            return ResolvedLocation {
                coordinates: [geo[0], geo[1]],
                region,
            };
        }
    }

    ResolvedLocation {
        coordinates: DEFAULT_COORDINATES,
        region: "Unknown".to_string(),
    }
}
