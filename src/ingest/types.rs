// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::catalog::{HazardCategory, Urgency};

/// A raw hazard report as delivered by an upstream source, before scoring.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct HazardEvent {
    pub source: String, // e.g., "INCOIS", "IMD"
    pub category: HazardCategory,
    pub urgency: Urgency,
    pub title: String,       // normalized text
    pub description: String, // normalized text
    pub published_at: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[async_trait::async_trait]
pub trait HazardSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<HazardEvent>>;
    fn name(&self) -> &'static str;
}

/// Source that never reports anything; the engine then falls back to synthesis.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSource;

#[async_trait::async_trait]
impl HazardSource for NullSource {
    async fn fetch_latest(&self) -> Result<Vec<HazardEvent>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
