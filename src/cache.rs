//! Freshness cache: a single slot holding the last ranked feed together with
//! the location it was built for and when.
//!
//! Storage is pluggable (`CacheStore`), so the same cache runs against an
//! in-process map, a directory on disk, or a test double. The entry is
//! serialized as `{"news": [...], "timestamp": "<RFC 3339>", "location": "<key>"}`.
//! Storage failures never escape: they are logged, counted, and read as a miss.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::clock::DynClock;
use crate::error::FeedError;
use crate::item::FeedItem;

/// Storage key of the single slot.
pub const CACHE_SLOT_KEY: &str = "hazard_news_cache";
pub const DEFAULT_TTL_SECS: i64 = 30 * 60;
pub const MAX_TTL_SECS: i64 = 365 * 24 * 3600;

/// Key/value string store (local-storage style).
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub type DynStore = Arc<dyn CacheStore>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub news: Vec<FeedItem>,
    pub timestamp: DateTime<Utc>,
    pub location: String,
}

// ------------------------------------------------------------
// Stores
// ------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let g = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store mutex poisoned"))?;
        Ok(g.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut g = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store mutex poisoned"))?;
        g.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key under `dir`. Writes go through a temp file + rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let _ = fs::create_dir_all(&dir); // best-effort
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let mut f = fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(value.as_bytes())?;
        fs::rename(&tmp, &path).with_context(|| format!("renaming into {}", path.display()))?;
        Ok(())
    }
}

// ------------------------------------------------------------
// Freshness cache
// ------------------------------------------------------------

pub struct FreshnessCache {
    store: DynStore,
    clock: DynClock,
    ttl: Duration,
}

impl FreshnessCache {
    pub fn new(store: DynStore, clock: DynClock, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    pub fn with_default_ttl(store: DynStore, clock: DynClock) -> Self {
        Self::new(store, clock, Duration::seconds(DEFAULT_TTL_SECS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached items for `location_key` if the slot holds that location and is
    /// younger than the TTL. Any storage or decoding failure reads as `None`.
    pub fn read(&self, location_key: &str) -> Option<Vec<FeedItem>> {
        self.read_entry(location_key).map(|e| e.news)
    }

    /// Same as [`read`](Self::read) but keeps the entry's write timestamp.
    pub fn read_entry(&self, location_key: &str) -> Option<CacheEntry> {
        let entry = match self.load() {
            Ok(Some(e)) => e,
            Ok(None) => {
                counter!("feed_cache_misses_total").increment(1);
                return None;
            }
            Err(e) => {
                tracing::warn!(target: "cache", error = %e, "cache read failed; treating as miss");
                counter!("feed_cache_store_errors_total").increment(1);
                counter!("feed_cache_misses_total").increment(1);
                return None;
            }
        };

        let age = self.clock.now() - entry.timestamp;
        if entry.location != location_key || age >= self.ttl {
            tracing::debug!(
                target: "cache",
                age_secs = age.num_seconds(),
                same_location = entry.location == location_key,
                "cache entry not usable"
            );
            counter!("feed_cache_misses_total").increment(1);
            return None;
        }

        counter!("feed_cache_hits_total").increment(1);
        Some(entry)
    }

    /// Replace the slot. Failures are logged and swallowed.
    pub fn write(&self, location_key: &str, items: &[FeedItem]) {
        if let Err(e) = self.store_entry(location_key, items) {
            tracing::warn!(target: "cache", error = %e, "cache write failed");
            counter!("feed_cache_store_errors_total").increment(1);
        }
    }

    fn load(&self) -> Result<Option<CacheEntry>, FeedError> {
        let raw = self
            .store
            .get(CACHE_SLOT_KEY)
            .map_err(|e| FeedError::CacheRead(format!("{e:#}")))?;
        match raw {
            None => Ok(None),
            Some(s) => serde_json::from_str(&s)
                .map(Some)
                .map_err(|e| FeedError::CacheRead(format!("corrupt cache entry: {e}"))),
        }
    }

    fn store_entry(&self, location_key: &str, items: &[FeedItem]) -> Result<(), FeedError> {
        let entry = CacheEntry {
            news: items.to_vec(),
            timestamp: self.clock.now(),
            location: location_key.to_string(),
        };
        let json =
            serde_json::to_string(&entry).map_err(|e| FeedError::CacheWrite(e.to_string()))?;
        self.store
            .set(CACHE_SLOT_KEY, &json)
            .map_err(|e| FeedError::CacheWrite(format!("{e:#}")))
    }
}
