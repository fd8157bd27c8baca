// src/error.rs
use thiserror::Error;

/// Failures the feed engine distinguishes. Only `Fetch` ever reaches the
/// presentation layer (as the snapshot's `error` message); cache failures are
/// logged and degrade to a miss.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to fetch hazard news: {0}")]
    Fetch(String),
    #[error("cache read failed: {0}")]
    CacheRead(String),
    #[error("cache write failed: {0}")]
    CacheWrite(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}
