// src/config/feed.rs
//! Feed engine configuration.
//!
//! Layers, later wins:
//! 1. built-in defaults
//! 2. TOML file at `$FEED_CONFIG_PATH` (default `config/feed.toml`; missing file is fine)
//! 3. environment overrides (`FEED_SIZE`, `FEED_CACHE_TTL_SECS`, `FEED_CACHE_DIR`,
//!    `FEED_FETCH_DELAY_MS`, `FEED_BREAKING_PROBABILITY`)
//!
//! ```toml
//! feed_size = 18
//! cache_ttl_secs = 1800
//! cache_dir = "cache/feed"
//! fetch_delay_ms = 1000
//! breaking_probability = 0.1
//! max_age_secs = 86400
//! jitter_deg = 1.0
//! rss_fixtures = ["config/fixtures/incois.xml"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::cache::{DEFAULT_TTL_SECS, MAX_TTL_SECS};
use crate::error::FeedError;
use crate::ingest::providers::hazard_rss::RssHazardSource;
use crate::ingest::types::HazardSource;
use crate::synth::{
    SynthParams, DEFAULT_BREAKING_PROBABILITY, DEFAULT_FEED_SIZE, DEFAULT_JITTER_DEG,
    DEFAULT_MAX_AGE_SECS, MAX_AGE_SECS_LIMIT, MAX_JITTER_DEG,
};

pub const DEFAULT_FEED_CONFIG_PATH: &str = "config/feed.toml";
pub const ENV_FEED_CONFIG_PATH: &str = "FEED_CONFIG_PATH";

pub const ENV_FEED_SIZE: &str = "FEED_SIZE";
pub const ENV_CACHE_TTL_SECS: &str = "FEED_CACHE_TTL_SECS";
pub const ENV_CACHE_DIR: &str = "FEED_CACHE_DIR";
pub const ENV_FETCH_DELAY_MS: &str = "FEED_FETCH_DELAY_MS";
pub const ENV_BREAKING_PROBABILITY: &str = "FEED_BREAKING_PROBABILITY";

fn default_feed_size() -> usize {
    DEFAULT_FEED_SIZE
}
fn default_cache_ttl_secs() -> i64 {
    DEFAULT_TTL_SECS
}
fn default_fetch_delay_ms() -> u64 {
    1000
}
fn default_breaking_probability() -> f64 {
    DEFAULT_BREAKING_PROBABILITY
}
fn default_max_age_secs() -> i64 {
    DEFAULT_MAX_AGE_SECS
}
fn default_jitter_deg() -> f64 {
    DEFAULT_JITTER_DEG
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_size")]
    pub feed_size: usize,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: i64,
    /// Directory for the on-disk cache slot. `None` keeps the cache in memory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Simulated upstream latency awaited by every refresh.
    #[serde(default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,
    #[serde(default = "default_breaking_probability")]
    pub breaking_probability: f64,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: i64,
    #[serde(default = "default_jitter_deg")]
    pub jitter_deg: f64,
    /// RSS bulletin files served as hazard sources.
    #[serde(default)]
    pub rss_fixtures: Vec<PathBuf>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_size: default_feed_size(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_dir: None,
            fetch_delay_ms: default_fetch_delay_ms(),
            breaking_probability: default_breaking_probability(),
            max_age_secs: default_max_age_secs(),
            jitter_deg: default_jitter_deg(),
            rss_fixtures: Vec::new(),
        }
    }
}

impl FeedConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: FeedConfig = toml::from_str(s).context("parsing feed config toml")?;
        Ok(cfg.sanitized())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading feed config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// Defaults, then the TOML file (if present), then env overrides.
    /// Any failure surfaces as [`FeedError::Config`].
    pub fn load() -> std::result::Result<Self, FeedError> {
        Self::load_layers().map_err(|e| FeedError::Config(format!("{e:#}")))
    }

    fn load_layers() -> Result<Self> {
        let path = env::var(ENV_FEED_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_FEED_CONFIG_PATH));

        let base = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            Self::default()
        };
        base.with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(v) = env_parse::<usize>(ENV_FEED_SIZE)? {
            self.feed_size = v;
        }
        if let Some(v) = env_parse::<i64>(ENV_CACHE_TTL_SECS)? {
            self.cache_ttl_secs = v;
        }
        if let Ok(v) = env::var(ENV_CACHE_DIR) {
            let v = v.trim();
            self.cache_dir = (!v.is_empty()).then(|| PathBuf::from(v));
        }
        if let Some(v) = env_parse::<u64>(ENV_FETCH_DELAY_MS)? {
            self.fetch_delay_ms = v;
        }
        if let Some(v) = env_parse::<f64>(ENV_BREAKING_PROBABILITY)? {
            self.breaking_probability = v;
        }
        Ok(self.sanitized())
    }

    fn sanitized(mut self) -> Self {
        self.feed_size = self.feed_size.max(1);
        self.cache_ttl_secs = self.cache_ttl_secs.clamp(0, MAX_TTL_SECS);
        self.max_age_secs = self.max_age_secs.clamp(0, MAX_AGE_SECS_LIMIT);
        if !self.breaking_probability.is_finite() {
            self.breaking_probability = default_breaking_probability();
        }
        self.breaking_probability = self.breaking_probability.clamp(0.0, 1.0);
        if !self.jitter_deg.is_finite() {
            self.jitter_deg = default_jitter_deg();
        }
        self.jitter_deg = self.jitter_deg.abs().min(MAX_JITTER_DEG);
        self
    }

    pub fn synth_params(&self) -> SynthParams {
        SynthParams {
            count: self.feed_size,
            max_age_secs: self.max_age_secs,
            jitter_deg: self.jitter_deg,
            breaking_probability: self.breaking_probability,
        }
    }

    /// Build RSS sources from the configured fixture files.
    pub fn build_sources(&self) -> Result<Vec<Box<dyn HazardSource>>> {
        let mut out: Vec<Box<dyn HazardSource>> = Vec::with_capacity(self.rss_fixtures.len());
        for p in &self.rss_fixtures {
            let xml = fs::read_to_string(p)
                .with_context(|| format!("reading rss fixture {}", p.display()))?;
            out.push(Box::new(RssHazardSource::from_fixture_str("rss", &xml)));
        }
        Ok(out)
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn clear_env() {
        for k in [
            ENV_FEED_CONFIG_PATH,
            ENV_FEED_SIZE,
            ENV_CACHE_TTL_SECS,
            ENV_CACHE_DIR,
            ENV_FETCH_DELAY_MS,
            ENV_BREAKING_PROBABILITY,
        ] {
            env::remove_var(k);
        }
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let cfg = FeedConfig::from_toml_str("feed_size = 5\nfetch_delay_ms = 0").unwrap();
        assert_eq!(cfg.feed_size, 5);
        assert_eq!(cfg.fetch_delay_ms, 0);
        assert_eq!(cfg.cache_ttl_secs, 1800);
        assert_eq!(cfg.breaking_probability, 0.10);
        assert!(cfg.cache_dir.is_none());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg =
            FeedConfig::from_toml_str("feed_size = 0\nbreaking_probability = 3.5\njitter_deg = -2.0")
                .unwrap();
        assert_eq!(cfg.feed_size, 1);
        assert_eq!(cfg.breaking_probability, 1.0);
        assert_eq!(cfg.jitter_deg, 2.0);
    }

    #[test]
    fn oversized_values_are_capped() {
        let cfg = FeedConfig::from_toml_str(
            "cache_ttl_secs = 9223372036854775807\nmax_age_secs = 9223372036854775807\njitter_deg = 1e300",
        )
        .unwrap();
        assert_eq!(cfg.cache_ttl_secs, MAX_TTL_SECS);
        assert_eq!(cfg.max_age_secs, MAX_AGE_SECS_LIMIT);
        assert_eq!(cfg.jitter_deg, MAX_JITTER_DEG);
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_file() {
        clear_env();
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("feed.toml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "feed_size = 10\ncache_ttl_secs = 60").unwrap();

        env::set_var(ENV_FEED_CONFIG_PATH, path.display().to_string());
        env::set_var(ENV_FEED_SIZE, "25");
        env::set_var(ENV_CACHE_DIR, tmp.path().join("c").display().to_string());

        let cfg = FeedConfig::load().unwrap();
        assert_eq!(cfg.feed_size, 25);
        assert_eq!(cfg.cache_ttl_secs, 60);
        assert_eq!(cfg.cache_dir, Some(tmp.path().join("c")));

        clear_env();
    }

    #[serial_test::serial]
    #[test]
    fn missing_file_means_defaults_and_bad_env_is_an_error() {
        clear_env();
        env::set_var(ENV_FEED_CONFIG_PATH, "/definitely/not/here/feed.toml");
        assert_eq!(FeedConfig::load().unwrap(), FeedConfig::default());

        env::set_var(ENV_FETCH_DELAY_MS, "soon");
        let err = FeedConfig::load().unwrap_err();
        assert!(
            matches!(err, FeedError::Config(ref m) if m.contains(ENV_FETCH_DELAY_MS)),
            "{err}"
        );
        clear_env();
    }
}
