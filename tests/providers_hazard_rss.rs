use hazard_news_feed::ingest::providers::hazard_rss::RssHazardSource;
use hazard_news_feed::ingest::types::HazardSource;
use hazard_news_feed::{HazardCategory, Urgency};

const HAZARD_XML: &str = include_str!("fixtures/hazard_rss.xml");

#[tokio::test]
async fn fixture_parses_and_classifies_items() {
    let provider = RssHazardSource::from_fixture_str("incois", HAZARD_XML);

    let items = provider.fetch_latest().await.expect("rss parse ok");
    assert_eq!(items.len(), 3, "every titled item should be kept");
    assert!(
        items.iter().all(|e| e.source == "INCOIS Bulletins"),
        "channel title is the attribution"
    );

    let tsunami = &items[0];
    assert_eq!(tsunami.category, HazardCategory::Tsunami);
    assert_eq!(tsunami.urgency, Urgency::Urgent);
    assert_eq!(tsunami.title, "Tsunami Warning for Andaman & Nicobar Islands");
    assert!(
        !tsunami.description.contains("<p>"),
        "markup must be stripped: {}",
        tsunami.description
    );
    assert_eq!(tsunami.lat, Some(11.62));
    assert_eq!(tsunami.lng, Some(92.72));
    assert_eq!(tsunami.published_at.to_rfc3339(), "2024-06-01T05:00:00+00:00");

    assert_eq!(items[1].category, HazardCategory::HighWaves);
    assert_eq!(items[1].urgency, Urgency::High);
    assert_eq!(items[1].lat, None);

    assert_eq!(items[2].category, HazardCategory::CoastalErosion);
    assert_eq!(items[2].urgency, Urgency::Low);
    assert_eq!(items[2].published_at.timestamp(), 0, "undated item gets the epoch");
}

#[tokio::test]
async fn empty_channel_yields_no_events() {
    let xml = r#"<rss version="2.0"><channel><title>Quiet</title></channel></rss>"#;
    let provider = RssHazardSource::from_fixture_str("quiet", xml);
    assert!(provider.fetch_latest().await.unwrap().is_empty());
    assert_eq!(provider.name(), "quiet");
}
