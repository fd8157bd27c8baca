// src/item.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{HazardCategory, Urgency};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemLocation {
    pub lat: f64,
    pub lng: f64,
    pub region: String,
}

/// One entry of the hazard feed. Produced wholesale on each refresh and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: HazardCategory,
    pub urgency: Urgency,
    pub source: String,
    pub published_at: DateTime<Utc>, // RFC 3339 on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ItemLocation>,
    pub relevance_score: f64, // 0.0..=1.0
    pub is_breaking: bool,    // only ever set on urgent items
}

/// Short stable identifier: first 6 bytes of SHA-256 over the parts, hex encoded.
pub(crate) fn item_id(parts: &[&str]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    for p in parts {
        hasher.update(p.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
