//! # Location context
//! The user's position and risk profile as handed over by the location
//! collaborator. Immutable once received; the engine only reads it.

use serde::{Deserialize, Serialize};

/// Placeholder city name emitted by reverse geocoding when it cannot resolve a city.
pub const UNKNOWN_CITY: &str = "Unknown City";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoastalZone {
    North,
    South,
    East,
    West,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationContext {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub city: String,
    pub state: String,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub coastal_zone: Option<CoastalZone>,
}

impl LocationContext {
    /// Display region used in item text: the city, unless it is missing or the
    /// geocoder sentinel, in which case the state.
    pub fn region(&self) -> &str {
        let city = self.city.trim();
        if city.is_empty() || city == UNKNOWN_CITY {
            &self.state
        } else {
            &self.city
        }
    }

    /// Location identity used for cache validity.
    pub fn key(&self) -> &str {
        &self.city
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(city: &str, state: &str) -> LocationContext {
        LocationContext {
            lat: 9.93,
            lng: 76.26,
            city: city.to_string(),
            state: state.to_string(),
            risk_level: RiskLevel::High,
            coastal_zone: Some(CoastalZone::South),
        }
    }

    #[test]
    fn region_prefers_city() {
        assert_eq!(loc("Kochi", "Kerala").region(), "Kochi");
    }

    #[test]
    fn region_falls_back_to_state_for_sentinel_or_empty_city() {
        assert_eq!(loc(UNKNOWN_CITY, "Kerala").region(), "Kerala");
        assert_eq!(loc("  ", "Kerala").region(), "Kerala");
    }

    #[test]
    fn deserializes_presentation_payload() {
        let json = r#"{"lat":13.08,"lng":80.27,"city":"Chennai","state":"Tamil Nadu","riskLevel":"critical","coastalZone":"east"}"#;
        let l: LocationContext = serde_json::from_str(json).unwrap();
        assert_eq!(l.risk_level, RiskLevel::Critical);
        assert_eq!(l.coastal_zone, Some(CoastalZone::East));

        let no_zone = r#"{"lat":28.6,"lng":77.2,"city":"Delhi","state":"Delhi","riskLevel":"low"}"#;
        let l: LocationContext = serde_json::from_str(no_zone).unwrap();
        assert_eq!(l.coastal_zone, None);
    }

    #[test]
    fn payload_without_city_resolves_to_state() {
        let json = r#"{"lat":10.0,"lng":76.3,"state":"Kerala","riskLevel":"high"}"#;
        let l: LocationContext = serde_json::from_str(json).unwrap();
        assert_eq!(l.city, "");
        assert_eq!(l.region(), "Kerala");
    }
}
