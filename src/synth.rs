//! # Item Synthesizer
//! Expands catalog templates into concrete feed items for a location:
//! region names interpolated, coordinates jittered around the user, and
//! timestamps spread over the recent past.
//!
//! All randomness flows through the caller's `Rng`, so a seeded `StdRng`
//! gives reproducible output.

use chrono::{DateTime, Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::analyze::scoring;
use crate::catalog::{self, HazardCategory, Urgency};
use crate::item::{item_id, FeedItem, ItemLocation};
use crate::location::LocationContext;

pub const DEFAULT_FEED_SIZE: usize = 18;
pub const DEFAULT_MAX_AGE_SECS: i64 = 24 * 3600;
pub const DEFAULT_JITTER_DEG: f64 = 1.0;
pub const DEFAULT_BREAKING_PROBABILITY: f64 = 0.10;
/// Oldest back-dating accepted for synthesized items (one year).
pub const MAX_AGE_SECS_LIMIT: i64 = 365 * 24 * 3600;
pub const MAX_JITTER_DEG: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParams {
    pub count: usize,
    pub max_age_secs: i64,
    pub jitter_deg: f64,
    pub breaking_probability: f64,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_FEED_SIZE,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
            jitter_deg: DEFAULT_JITTER_DEG,
            breaking_probability: DEFAULT_BREAKING_PROBABILITY,
        }
    }
}

/// Synthesize `count` items with the default parameters.
pub fn synthesize<R: Rng + ?Sized>(
    location: Option<&LocationContext>,
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<FeedItem> {
    let params = SynthParams {
        count,
        ..SynthParams::default()
    };
    synthesize_with(location, &params, now, rng)
}

/// Absent location yields an empty feed.
pub fn synthesize_with<R: Rng + ?Sized>(
    location: Option<&LocationContext>,
    params: &SynthParams,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<FeedItem> {
    let Some(loc) = location else {
        return Vec::new();
    };

    let region = loc.region();
    let max_age = params.max_age_secs.clamp(0, MAX_AGE_SECS_LIMIT);
    let jitter = if params.jitter_deg.is_finite() {
        params.jitter_deg.abs().min(MAX_JITTER_DEG)
    } else {
        0.0
    };
    let p_breaking = params.breaking_probability.clamp(0.0, 1.0);

    let mut out = Vec::with_capacity(params.count);
    for idx in 0..params.count {
        let Some(category) = HazardCategory::ALL.choose(rng).copied() else {
            break;
        };
        let Some(template) = catalog::lookup(category).choose(rng) else {
            tracing::warn!(target: "feed", %category, "no templates for category");
            continue;
        };

        let published_at = now - Duration::seconds(rng.random_range(0..=max_age));
        let lat = loc.lat + rng.random_range(-jitter..=jitter);
        let lng = loc.lng + rng.random_range(-jitter..=jitter);

        let is_breaking = template.urgency == Urgency::Urgent && rng.random_bool(p_breaking);

        let ts = published_at.timestamp_millis().to_string();
        let idx_s = idx.to_string();
        out.push(FeedItem {
            id: item_id(&[region, category.as_str(), &idx_s, &ts]),
            title: catalog::interpolate(template.title_pattern, region),
            description: catalog::interpolate(template.description_pattern, region),
            category,
            urgency: template.urgency,
            source: template.source_name.to_string(),
            published_at,
            location: Some(ItemLocation {
                lat,
                lng,
                region: region.to_string(),
            }),
            relevance_score: scoring::score(category, loc),
            is_breaking,
        });
    }
    out
}
