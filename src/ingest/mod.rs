// src/ingest/mod.rs
//! Upstream hazard sources: fetch, normalize, classify, and convert into feed
//! items. When any source reports events, they replace the synthesized feed.

pub mod providers;
pub mod types;

use chrono::{DateTime, Duration, Utc};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::analyze::scoring;
use crate::catalog::{HazardCategory, Urgency};
use crate::error::FeedError;
use crate::ingest::types::{HazardEvent, HazardSource};
use crate::item::{item_id, FeedItem, ItemLocation};
use crate::location::LocationContext;

/// Events younger than this and marked urgent are flagged as breaking.
pub const BREAKING_WINDOW_SECS: i64 = 3600;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_events_total", "Total events parsed from sources.");
        describe_counter!("ingest_provider_errors_total", "Source fetch/parse errors.");
        describe_histogram!("ingest_parse_ms", "Source parse time in milliseconds.");
    });
}

/// Normalize text: decode entities, strip tags, unify quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize curly quotes and guillemets to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Classify free text into a hazard category. First match wins, most specific first.
pub fn classify_category(text: &str) -> HazardCategory {
    static RULES: OnceCell<Vec<(Regex, HazardCategory)>> = OnceCell::new();
    let rules = RULES.get_or_init(|| {
        [
            (r"(?i)\btsunami", HazardCategory::Tsunami),
            (r"(?i)\bstorm[\s-]?surge", HazardCategory::StormSurge),
            (r"(?i)\b(cyclone|cyclonic|depression|typhoon|hurricane)", HazardCategory::Cyclone),
            (r"(?i)\b(high waves?|swell|rough seas?)", HazardCategory::HighWaves),
            (r"(?i)\berosion", HazardCategory::CoastalErosion),
            (r"(?i)\b(flood|flooding|inundation|tidal)", HazardCategory::MarineFlooding),
            (r"(?i)\b(evacuat|emergency|rescue)", HazardCategory::Emergency),
            (r"(?i)\b(rip current|lifeguard|beach safety|advisory for swimmers)", HazardCategory::Safety),
        ]
        .into_iter()
        .map(|(p, c)| (Regex::new(p).expect("category regex"), c))
        .collect()
    });
    rules
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, c)| *c)
        .unwrap_or(HazardCategory::Weather)
}

/// Classify urgency from alert wording.
pub fn classify_urgency(text: &str) -> Urgency {
    static RE_URGENT: OnceCell<Regex> = OnceCell::new();
    static RE_HIGH: OnceCell<Regex> = OnceCell::new();
    static RE_MEDIUM: OnceCell<Regex> = OnceCell::new();
    let urgent = RE_URGENT.get_or_init(|| {
        Regex::new(r"(?i)\b(warning|evacuat\w*|red alert|immediately)\b").expect("urgent regex")
    });
    let high = RE_HIGH
        .get_or_init(|| Regex::new(r"(?i)\b(alert|orange|severe)\b").expect("high regex"));
    let medium = RE_MEDIUM
        .get_or_init(|| Regex::new(r"(?i)\b(watch|advisory|yellow|forecast)\b").expect("medium regex"));

    if urgent.is_match(text) {
        Urgency::Urgent
    } else if high.is_match(text) {
        Urgency::High
    } else if medium.is_match(text) {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

/// Poll every source once. A failing source is logged and skipped; the call
/// only fails when there were sources and all of them failed.
pub async fn collect_events(sources: &[Box<dyn HazardSource>]) -> Result<Vec<HazardEvent>, FeedError> {
    ensure_metrics_described();

    let mut out = Vec::new();
    let mut errors = Vec::new();
    for s in sources {
        match s.fetch_latest().await {
            Ok(mut v) => out.append(&mut v),
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, provider = s.name(), "provider error");
                counter!("ingest_provider_errors_total").increment(1);
                errors.push(format!("{}: {e:#}", s.name()));
            }
        }
    }

    if !sources.is_empty() && errors.len() == sources.len() {
        return Err(FeedError::Fetch(errors.join("; ")));
    }
    Ok(out)
}

/// Turn upstream events into scored feed items for `location`. Events without
/// coordinates are placed at the user's position.
pub fn events_to_items(
    events: &[HazardEvent],
    location: &LocationContext,
    now: DateTime<Utc>,
) -> Vec<FeedItem> {
    let region = location.region();
    let window = Duration::seconds(BREAKING_WINDOW_SECS);

    events
        .iter()
        .enumerate()
        .map(|(idx, ev)| {
            let ts = ev.published_at.timestamp_millis().to_string();
            let idx_s = idx.to_string();
            FeedItem {
                id: item_id(&[ev.source.as_str(), ev.title.as_str(), &idx_s, &ts]),
                title: ev.title.clone(),
                description: ev.description.clone(),
                category: ev.category,
                urgency: ev.urgency,
                source: ev.source.clone(),
                published_at: ev.published_at,
                location: Some(ItemLocation {
                    lat: ev.lat.unwrap_or(location.lat),
                    lng: ev.lng.unwrap_or(location.lng),
                    region: region.to_string(),
                }),
                relevance_score: scoring::score(ev.category, location),
                is_breaking: ev.urgency == Urgency::Urgent && now - ev.published_at < window,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::NullSource;
    use crate::location::{CoastalZone, RiskLevel};

    #[test]
    fn normalize_text_collapses_ws_and_entities() {
        let s = "  Cyclone&nbsp;&nbsp; <b>Dana</b>\n intensifies ";
        assert_eq!(normalize_text(s), "Cyclone Dana intensifies");
    }

    #[test]
    fn classifies_categories_by_keyword() {
        assert_eq!(classify_category("Tsunami warning for Andaman"), HazardCategory::Tsunami);
        assert_eq!(classify_category("Storm surge of 2 m expected"), HazardCategory::StormSurge);
        assert_eq!(classify_category("Deep depression over Bay of Bengal"), HazardCategory::Cyclone);
        assert_eq!(classify_category("Swell surge alert for Kerala"), HazardCategory::HighWaves);
        assert_eq!(classify_category("Heavy rain likely"), HazardCategory::Weather);
    }

    #[test]
    fn classifies_urgency_by_wording() {
        assert_eq!(classify_urgency("Tsunami WARNING issued"), Urgency::Urgent);
        assert_eq!(classify_urgency("Orange alert for coast"), Urgency::High);
        assert_eq!(classify_urgency("Tsunami watch in effect"), Urgency::Medium);
        assert_eq!(classify_urgency("Erosion reported"), Urgency::Low);
    }

    struct Broken;

    #[async_trait::async_trait]
    impl HazardSource for Broken {
        async fn fetch_latest(&self) -> anyhow::Result<Vec<HazardEvent>> {
            Err(anyhow::anyhow!("upstream down"))
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn all_sources_failing_is_a_fetch_error() {
        let sources: Vec<Box<dyn HazardSource>> = vec![Box::new(Broken)];
        let err = collect_events(&sources).await.unwrap_err();
        assert!(matches!(err, FeedError::Fetch(ref m) if m.contains("upstream down")));
    }

    #[tokio::test]
    async fn one_healthy_source_is_enough() {
        let sources: Vec<Box<dyn HazardSource>> = vec![Box::new(Broken), Box::new(NullSource)];
        assert!(collect_events(&sources).await.unwrap().is_empty());
        assert!(collect_events(&[]).await.unwrap().is_empty());
    }

    #[test]
    fn events_become_scored_items() {
        let now = Utc::now();
        let loc = LocationContext {
            lat: 13.08,
            lng: 80.27,
            city: "Chennai".into(),
            state: "Tamil Nadu".into(),
            risk_level: RiskLevel::Critical,
            coastal_zone: Some(CoastalZone::East),
        };
        let ev = HazardEvent {
            source: "IMD".into(),
            category: HazardCategory::Cyclone,
            urgency: Urgency::Urgent,
            title: "Cyclone warning".into(),
            description: "d".into(),
            published_at: now - Duration::minutes(10),
            lat: None,
            lng: None,
        };
        let mut old = ev.clone();
        old.published_at = now - Duration::hours(3);

        let items = events_to_items(&[ev, old], &loc, now);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].relevance_score, 1.0);
        assert!(items[0].is_breaking);
        assert!(!items[1].is_breaking);
        let l = items[0].location.as_ref().unwrap();
        assert_eq!((l.lat, l.lng, l.region.as_str()), (13.08, 80.27, "Chennai"));
    }
}
