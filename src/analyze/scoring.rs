//! Relevance scoring: how pertinent a hazard category is to a location.
//!
//! score = 0.5
//!       + risk bonus   (critical 0.3, high 0.2, medium 0.1, low 0)
//!       + 0.2  if cyclone and the coast faces east
//!       + 0.15 if tsunami and the coast faces south or east
//! clamped to at most 1.0. Every term is non-negative, so the floor is 0.5.

use crate::catalog::HazardCategory;
use crate::location::{CoastalZone, LocationContext, RiskLevel};

pub const BASE_SCORE: f64 = 0.5;
pub const EAST_CYCLONE_BONUS: f64 = 0.2;
pub const TSUNAMI_COAST_BONUS: f64 = 0.15;

pub fn risk_bonus(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Critical => 0.3,
        RiskLevel::High => 0.2,
        RiskLevel::Medium => 0.1,
        RiskLevel::Low => 0.0,
    }
}

/// Score `category` for `location`. Result is in [0.5, 1.0].
pub fn score(category: HazardCategory, location: &LocationContext) -> f64 {
    score_parts(category, location.risk_level, location.coastal_zone)
}

pub fn score_parts(
    category: HazardCategory,
    risk: RiskLevel,
    zone: Option<CoastalZone>,
) -> f64 {
    let mut s = BASE_SCORE + risk_bonus(risk);

    match (category, zone) {
        (HazardCategory::Cyclone, Some(CoastalZone::East)) => s += EAST_CYCLONE_BONUS,
        (HazardCategory::Tsunami, Some(CoastalZone::South | CoastalZone::East)) => {
            s += TSUNAMI_COAST_BONUS
        }
        _ => {}
    }

    s.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn east_coast_cyclone_at_critical_risk_clamps_to_one() {
        let s = score_parts(HazardCategory::Cyclone, RiskLevel::Critical, Some(CoastalZone::East));
        assert_eq!(s, 1.0);
    }

    #[test]
    fn south_coast_tsunami_at_low_risk() {
        let s = score_parts(HazardCategory::Tsunami, RiskLevel::Low, Some(CoastalZone::South));
        assert!(approx(s, 0.65), "got {s}");
    }

    #[test]
    fn risk_levels_add_their_bonus() {
        let w = Some(CoastalZone::West);
        assert!(approx(score_parts(HazardCategory::Weather, RiskLevel::Low, w), 0.5));
        assert!(approx(score_parts(HazardCategory::Weather, RiskLevel::Medium, w), 0.6));
        assert!(approx(score_parts(HazardCategory::Weather, RiskLevel::High, w), 0.7));
        assert!(approx(score_parts(HazardCategory::Weather, RiskLevel::Critical, w), 0.8));
    }

    #[test]
    fn zone_bonus_needs_matching_category() {
        // cyclone on the south coast gets nothing extra
        assert!(approx(
            score_parts(HazardCategory::Cyclone, RiskLevel::Medium, Some(CoastalZone::South)),
            0.6
        ));
        // tsunami inland (no zone) gets nothing extra
        assert!(approx(score_parts(HazardCategory::Tsunami, RiskLevel::High, None), 0.7));
        // tsunami on the east coast at high risk: 0.5 + 0.2 + 0.15
        assert!(approx(
            score_parts(HazardCategory::Tsunami, RiskLevel::High, Some(CoastalZone::East)),
            0.85
        ));
    }

    #[test]
    fn always_within_unit_interval() {
        let zones = [
            None,
            Some(CoastalZone::North),
            Some(CoastalZone::South),
            Some(CoastalZone::East),
            Some(CoastalZone::West),
        ];
        let risks = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High, RiskLevel::Critical];
        for c in HazardCategory::ALL {
            for r in risks {
                for z in zones {
                    let s = score_parts(c, r, z);
                    assert!((0.0..=1.0).contains(&s), "{c} {r:?} {z:?} -> {s}");
                }
            }
        }
    }
}
