// src/analyze/rerank.rs
//! Ranking of a synthesized feed.
//!
//! Order:
//! 1. breaking items first,
//! 2. then `relevance_score + urgency_bonus` descending,
//! 3. then `published_at` descending (newest first).
//!
//! The sort is stable, so items tied on all three keys keep their input order.

use std::cmp::Ordering;

use crate::catalog::Urgency;
use crate::item::FeedItem;

pub const URGENT_BONUS: f64 = 0.3;
pub const HIGH_BONUS: f64 = 0.2;

pub fn urgency_bonus(urgency: Urgency) -> f64 {
    match urgency {
        Urgency::Urgent => URGENT_BONUS,
        Urgency::High => HIGH_BONUS,
        Urgency::Medium | Urgency::Low => 0.0,
    }
}

pub fn adjusted_score(item: &FeedItem) -> f64 {
    item.relevance_score + urgency_bonus(item.urgency)
}

/// Total order used by [`rank`]. `Less` means `a` is shown before `b`.
pub fn compare(a: &FeedItem, b: &FeedItem) -> Ordering {
    b.is_breaking
        .cmp(&a.is_breaking)
        .then_with(|| adjusted_score(b).total_cmp(&adjusted_score(a)))
        .then_with(|| b.published_at.cmp(&a.published_at))
}

pub fn rank(mut items: Vec<FeedItem>) -> Vec<FeedItem> {
    items.sort_by(compare);
    items
}
