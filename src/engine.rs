//! # Feed Engine
//! Owns the live feed for the current location and drives refreshes.
//!
//! Flow for a location update:
//! 1. `set_location` consults the freshness cache and surfaces a valid entry
//!    immediately.
//! 2. `refresh` always follows: fetch step (sources + simulated latency),
//!    then synthesis or event conversion, scoring and ranking.
//! 3. The result is committed to the live feed and the cache only if no newer
//!    refresh or location change started meanwhile (generation check under
//!    the state write lock). Superseded results are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use metrics::{counter, gauge};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analyze;
use crate::cache::{DynStore, FileStore, FreshnessCache, MemoryStore, MAX_TTL_SECS};
use crate::catalog::HazardCategory;
use crate::clock::{DynClock, SystemClock};
use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::ingest::{self, types::HazardSource};
use crate::item::{item_id, FeedItem};
use crate::location::LocationContext;
use crate::query;
use crate::synth::{self, SynthParams};

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub news: Vec<FeedItem>,
    pub loading: bool,
    pub error: Option<String>,
    pub last_fetch: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// No location; nothing to do.
    Idle,
    /// A newer refresh or location change started while this one was in flight.
    Superseded,
    Committed { items: usize },
}

#[derive(Debug, Default)]
struct LiveState {
    location: Option<LocationContext>,
    news: Arc<Vec<FeedItem>>,
    loading: bool,
    error: Option<String>,
    last_fetch: Option<DateTime<Utc>>,
}

pub struct FeedEngine {
    state: RwLock<LiveState>,
    generation: AtomicU64,
    cache: FreshnessCache,
    sources: Vec<Box<dyn HazardSource>>,
    rng: Mutex<StdRng>,
    clock: DynClock,
    params: SynthParams,
    fetch_delay: std::time::Duration,
}

impl FeedEngine {
    pub fn new(cache: FreshnessCache, clock: DynClock, rng: StdRng) -> Self {
        Self {
            state: RwLock::new(LiveState::default()),
            generation: AtomicU64::new(0),
            cache,
            sources: Vec::new(),
            rng: Mutex::new(rng),
            clock,
            params: SynthParams::default(),
            fetch_delay: std::time::Duration::ZERO,
        }
    }

    /// Production wiring: system clock, OS-seeded RNG, file or memory store.
    pub fn from_config(cfg: &FeedConfig) -> anyhow::Result<Self> {
        let clock: DynClock = Arc::new(SystemClock);
        let store: DynStore = match &cfg.cache_dir {
            Some(dir) => Arc::new(FileStore::new(dir)),
            None => Arc::new(MemoryStore::new()),
        };
        let ttl = Duration::seconds(cfg.cache_ttl_secs.clamp(0, MAX_TTL_SECS));
        let cache = FreshnessCache::new(store, clock.clone(), ttl);

        Ok(Self::new(cache, clock, StdRng::from_os_rng())
            .with_params(cfg.synth_params())
            .with_fetch_delay(std::time::Duration::from_millis(cfg.fetch_delay_ms))
            .with_sources(cfg.build_sources()?))
    }

    pub fn with_params(mut self, params: SynthParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_fetch_delay(mut self, delay: std::time::Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn with_sources(mut self, sources: Vec<Box<dyn HazardSource>>) -> Self {
        self.sources = sources;
        self
    }

    fn read_state(&self) -> RwLockReadGuard<'_, LiveState> {
        self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, LiveState> {
        self.state.write().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn location(&self) -> Option<LocationContext> {
        self.read_state().location.clone()
    }

    /// Switch to a new location (or none). Any in-flight refresh becomes stale,
    /// so the loading flag drops until the next `refresh`.
    /// Returns `true` when a cached feed for the location was surfaced.
    pub fn set_location(&self, location: Option<LocationContext>) -> bool {
        let mut st = self.write_state();
        self.generation.fetch_add(1, Ordering::SeqCst);

        let Some(loc) = location else {
            *st = LiveState::default();
            gauge!("feed_items_gauge").set(0.0);
            debug!(target: "feed", "location cleared; feed idle");
            return false;
        };

        let cached = self.cache.read_entry(loc.key());
        let hit = cached.is_some();
        if let Some(entry) = cached {
            gauge!("feed_items_gauge").set(entry.news.len() as f64);
            st.news = Arc::new(entry.news);
            st.last_fetch = Some(entry.timestamp);
        }
        debug!(target: "feed", location = %anon_hash(loc.key()), cache_hit = hit, "location updated");
        st.location = Some(loc);
        st.loading = false;
        st.error = None;
        hit
    }

    /// Rebuild the feed for the current location.
    pub async fn refresh(&self) -> Result<RefreshOutcome, FeedError> {
        let (gen, location) = {
            let mut st = self.write_state();
            let gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            match st.location.clone() {
                None => return Ok(RefreshOutcome::Idle),
                Some(loc) => {
                    st.loading = true;
                    st.error = None;
                    (gen, loc)
                }
            }
        };
        counter!("feed_refresh_total").increment(1);

        let built = self.fetch_and_build(&location).await;

        let mut st = self.write_state();
        if self.generation.load(Ordering::SeqCst) != gen {
            counter!("feed_stale_refresh_discarded_total").increment(1);
            info!(target: "feed", generation = gen, "discarding superseded refresh");
            return Ok(RefreshOutcome::Superseded);
        }

        match built {
            Ok(items) => {
                let n = items.len();
                // Cache is written under the same lock so it never lags behind the live feed.
                self.cache.write(location.key(), &items);
                st.news = Arc::new(items);
                st.loading = false;
                st.error = None;
                st.last_fetch = Some(self.clock.now());
                gauge!("feed_items_gauge").set(n as f64);
                info!(
                    target: "feed",
                    location = %anon_hash(location.key()),
                    generation = gen,
                    items = n,
                    "feed refreshed"
                );
                Ok(RefreshOutcome::Committed { items: n })
            }
            Err(e) => {
                st.loading = false;
                st.error = Some(e.to_string());
                counter!("feed_refresh_errors_total").increment(1);
                warn!(target: "feed", error = %e, "refresh failed; keeping last feed");
                Err(e)
            }
        }
    }

    async fn fetch_and_build(&self, location: &LocationContext) -> Result<Vec<FeedItem>, FeedError> {
        let events = ingest::collect_events(&self.sources).await?;
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        let now = self.clock.now();
        let items = if events.is_empty() {
            let mut rng = self.lock_rng();
            synth::synthesize_with(Some(location), &self.params, now, &mut *rng)
        } else {
            ingest::events_to_items(&events, location, now)
        };
        Ok(analyze::rank(items))
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let st = self.read_state();
        FeedSnapshot {
            news: st.news.as_ref().clone(),
            loading: st.loading,
            error: st.error.clone(),
            last_fetch: st.last_fetch,
        }
    }

    /// The live feed. Cheap: shares the committed vector.
    pub fn news(&self) -> Arc<Vec<FeedItem>> {
        self.read_state().news.clone()
    }

    pub fn by_category(&self, category: Option<HazardCategory>) -> Vec<FeedItem> {
        query::by_category(&self.news(), category)
    }

    pub fn breaking(&self) -> Vec<FeedItem> {
        query::breaking(&self.news())
    }

    pub fn urgent_or_high(&self) -> Vec<FeedItem> {
        query::urgent_or_high(&self.news())
    }
}

/// Location names are never logged raw.
fn anon_hash(text: &str) -> String {
    item_id(&[text])
}
