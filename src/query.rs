//! Read-only views over a feed. Nothing here mutates its input, so calling a
//! view twice over the same feed returns the same items.

use crate::catalog::{HazardCategory, Urgency};
use crate::item::FeedItem;

/// All items when `category` is `None`, else only that category.
pub fn by_category(items: &[FeedItem], category: Option<HazardCategory>) -> Vec<FeedItem> {
    match category {
        None => items.to_vec(),
        Some(c) => items.iter().filter(|i| i.category == c).cloned().collect(),
    }
}

pub fn breaking(items: &[FeedItem]) -> Vec<FeedItem> {
    items.iter().filter(|i| i.is_breaking).cloned().collect()
}

/// Items with urgency `urgent` or `high`.
pub fn urgent_or_high(items: &[FeedItem]) -> Vec<FeedItem> {
    items
        .iter()
        .filter(|i| i.urgency >= Urgency::High)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn mk(id: &str, category: HazardCategory, urgency: Urgency, breaking: bool) -> FeedItem {
        FeedItem {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            category,
            urgency,
            source: "test".into(),
            published_at: Utc::now(),
            location: None,
            relevance_score: 0.5,
            is_breaking: breaking,
        }
    }

    fn feed() -> Vec<FeedItem> {
        vec![
            mk("a", HazardCategory::Tsunami, Urgency::Urgent, true),
            mk("b", HazardCategory::Cyclone, Urgency::High, false),
            mk("c", HazardCategory::Tsunami, Urgency::Medium, false),
            mk("d", HazardCategory::Safety, Urgency::Low, false),
        ]
    }

    fn ids(v: &[FeedItem]) -> Vec<&str> {
        v.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn category_filter() {
        let f = feed();
        assert_eq!(ids(&by_category(&f, None)), vec!["a", "b", "c", "d"]);
        assert_eq!(ids(&by_category(&f, Some(HazardCategory::Tsunami))), vec!["a", "c"]);
        assert!(by_category(&f, Some(HazardCategory::Weather)).is_empty());
    }

    #[test]
    fn breaking_and_urgent_views() {
        let f = feed();
        assert_eq!(ids(&breaking(&f)), vec!["a"]);
        assert_eq!(ids(&urgent_or_high(&f)), vec!["a", "b"]);
    }

    #[test]
    fn views_are_idempotent() {
        let f = feed();
        assert_eq!(urgent_or_high(&f), urgent_or_high(&f));
        assert_eq!(breaking(&f), breaking(&f));
        assert_eq!(by_category(&f, Some(HazardCategory::Cyclone)), by_category(&f, Some(HazardCategory::Cyclone)));
        assert_eq!(f, feed());
    }
}
