// src/lib.rs
// Public library surface for the server binary, demos and integration tests.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod item;
pub mod location;
pub mod metrics;
pub mod query;
pub mod synth;

// Scoring + ranking
pub mod analyze;

// Upstream hazard sources
pub mod ingest;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::catalog::{HazardCategory, Urgency};
pub use crate::config::FeedConfig;
pub use crate::engine::{FeedEngine, FeedSnapshot, RefreshOutcome};
pub use crate::error::FeedError;
pub use crate::item::FeedItem;
pub use crate::location::{CoastalZone, LocationContext, RiskLevel};

use std::sync::Arc;

/// Build the full application router from configuration (engine, cache, metrics).
pub fn app(cfg: &FeedConfig) -> anyhow::Result<axum::Router> {
    let engine =
        FeedEngine::from_config(cfg).map_err(|e| FeedError::Config(format!("{e:#}")))?;
    let engine = Arc::new(engine);
    let metrics = metrics::Metrics::init(cfg.cache_ttl_secs)?;
    tracing::info!(
        feed_size = cfg.feed_size,
        cache_ttl_secs = cfg.cache_ttl_secs,
        persistent_cache = cfg.cache_dir.is_some(),
        sources = cfg.rss_fixtures.len(),
        "feed engine ready"
    );
    Ok(create_router(AppState::new(engine).with_metrics(metrics)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_source_fixture_is_a_config_error() {
        let cfg = FeedConfig {
            rss_fixtures: vec!["/definitely/not/here/incois.xml".into()],
            ..FeedConfig::default()
        };
        let Err(err) = app(&cfg) else {
            panic!("missing fixture must fail startup");
        };
        let feed_err = err.downcast_ref::<FeedError>().expect("typed error");
        assert!(matches!(feed_err, FeedError::Config(m) if m.contains("incois.xml")), "{feed_err}");
    }
}
