//! Demo that builds one feed for a location given on the command line and prints it ranked.
//!
//! Usage: feed_demo [CITY] [STATE] [RISK] [ZONE]
//!   e.g. feed_demo Chennai "Tamil Nadu" critical east

use std::sync::Arc;

use hazard_news_feed::cache::{FreshnessCache, MemoryStore};
use hazard_news_feed::clock::SystemClock;
use hazard_news_feed::{
    CoastalZone, FeedConfig, FeedEngine, LocationContext, RefreshOutcome, RiskLevel,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn parse_risk(s: &str) -> RiskLevel {
    match s.to_ascii_lowercase().as_str() {
        "critical" => RiskLevel::Critical,
        "high" => RiskLevel::High,
        "medium" => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

fn parse_zone(s: &str) -> Option<CoastalZone> {
    match s.to_ascii_lowercase().as_str() {
        "north" => Some(CoastalZone::North),
        "south" => Some(CoastalZone::South),
        "east" => Some(CoastalZone::East),
        "west" => Some(CoastalZone::West),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = FeedConfig::load()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg = |i: usize, d: &str| args.get(i).cloned().unwrap_or_else(|| d.to_string());

    let location = LocationContext {
        lat: 13.08,
        lng: 80.27,
        city: arg(0, "Chennai"),
        state: arg(1, "Tamil Nadu"),
        risk_level: parse_risk(&arg(2, "high")),
        coastal_zone: parse_zone(&arg(3, "east")),
    };

    let clock = Arc::new(SystemClock);
    let cache = FreshnessCache::with_default_ttl(Arc::new(MemoryStore::new()), clock.clone());
    let seed = std::env::var("FEED_DEMO_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok());
    let rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    let engine = FeedEngine::new(cache, clock, rng)
        .with_params(cfg.synth_params())
        .with_sources(cfg.build_sources()?);
    engine.set_location(Some(location));

    if let RefreshOutcome::Committed { items } = engine.refresh().await? {
        println!("{items} items");
    }
    for it in engine.news().iter() {
        println!(
            "{} {:<8} {:<16} {:.2}  {}",
            if it.is_breaking { "!" } else { " " },
            format!("{:?}", it.urgency).to_lowercase(),
            it.category,
            it.relevance_score,
            it.title
        );
    }
    Ok(())
}
