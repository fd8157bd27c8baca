// src/analyze/mod.rs
//! Analysis pipeline: relevance scoring and ranking of feed items.

pub mod rerank;
pub mod scoring;

pub use crate::analyze::rerank::{adjusted_score, rank, urgency_bonus};
pub use crate::analyze::scoring::score;
