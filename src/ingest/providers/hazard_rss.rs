use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::ingest::types::{HazardEvent, HazardSource};
use crate::ingest::{classify_category, classify_urgency, normalize_text};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "geo:lat")]
    lat: Option<f64>,
    #[serde(rename = "geo:long")]
    lng: Option<f64>,
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    let odt = OffsetDateTime::parse(ts.trim(), &Rfc2822).ok()?;
    Utc.timestamp_opt(odt.unix_timestamp(), odt.nanosecond()).single()
}

/// Hazard bulletins in RSS 2.0 form (tsunami bulletins, ocean state
/// forecasts, cyclone advisories). Items are classified by keyword.
pub struct RssHazardSource {
    name: &'static str,
    xml: String,
}

impl RssHazardSource {
    pub fn from_fixture_str(name: &'static str, xml: &str) -> Self {
        Self {
            name,
            xml: xml.to_string(),
        }
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<HazardEvent>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing hazard rss xml")?;

        let source = rss
            .channel
            .title
            .as_deref()
            .map(normalize_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.name.to_string());

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            let description = normalize_text(it.description.as_deref().unwrap_or_default());
            let text = format!("{title}. {description}");
            // Undated bulletins get the epoch and sort to the bottom.
            let published_at = it
                .pub_date
                .as_deref()
                .and_then(parse_rfc2822)
                .unwrap_or_default();

            out.push(HazardEvent {
                source: source.clone(),
                category: classify_category(&text),
                urgency: classify_urgency(&text),
                title,
                description,
                published_at,
                lat: it.lat,
                lng: it.lng,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_events_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl HazardSource for RssHazardSource {
    async fn fetch_latest(&self) -> Result<Vec<HazardEvent>> {
        self.parse_items_from_str(&self.xml)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc2822_dates_parse() {
        let dt = parse_rfc2822("Sat, 01 Jun 2024 10:30:00 +0530").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-06-01T05:00:00+00:00");
        assert!(parse_rfc2822("yesterday").is_none());
    }

    #[tokio::test]
    async fn malformed_xml_is_an_error() {
        let src = RssHazardSource::from_fixture_str("broken", "<rss><channel>");
        assert!(src.fetch_latest().await.is_err());
    }
}
