//! # Template Catalog
//! Static mapping from hazard category to message templates. Each template
//! carries a fixed urgency tier and an attribution source. The only
//! placeholder is `{region}`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const REGION_PLACEHOLDER: &str = "{region}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HazardCategory {
    Tsunami,
    Cyclone,
    StormSurge,
    HighWaves,
    CoastalErosion,
    MarineFlooding,
    Weather,
    Safety,
    Emergency,
}

impl HazardCategory {
    pub const ALL: [HazardCategory; 9] = [
        HazardCategory::Tsunami,
        HazardCategory::Cyclone,
        HazardCategory::StormSurge,
        HazardCategory::HighWaves,
        HazardCategory::CoastalErosion,
        HazardCategory::MarineFlooding,
        HazardCategory::Weather,
        HazardCategory::Safety,
        HazardCategory::Emergency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardCategory::Tsunami => "tsunami",
            HazardCategory::Cyclone => "cyclone",
            HazardCategory::StormSurge => "storm-surge",
            HazardCategory::HighWaves => "high-waves",
            HazardCategory::CoastalErosion => "coastal-erosion",
            HazardCategory::MarineFlooding => "marine-flooding",
            HazardCategory::Weather => "weather",
            HazardCategory::Safety => "safety",
            HazardCategory::Emergency => "emergency",
        }
    }
}

impl fmt::Display for HazardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for HazardCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        HazardCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| anyhow::anyhow!("unknown hazard category '{}'", s))
    }
}

/// Severity tier. Ordered: `Low < Medium < High < Urgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTemplate {
    pub title_pattern: &'static str,
    pub description_pattern: &'static str,
    pub urgency: Urgency,
    pub source_name: &'static str,
}

const fn tpl(
    title_pattern: &'static str,
    description_pattern: &'static str,
    urgency: Urgency,
    source_name: &'static str,
) -> CategoryTemplate {
    CategoryTemplate {
        title_pattern,
        description_pattern,
        urgency,
        source_name,
    }
}

static TSUNAMI: [CategoryTemplate; 2] = [
    tpl(
        "Tsunami Warning Issued for {region} Coast",
        "INCOIS has issued a tsunami warning for coastal areas near {region}. Residents in low-lying zones should move to higher ground immediately.",
        Urgency::Urgent,
        "INCOIS",
    ),
    tpl(
        "Tsunami Advisory: Sea Level Monitoring Near {region}",
        "Tide gauges off {region} are being monitored after an offshore earthquake. No evacuation is required at this time.",
        Urgency::High,
        "INCOIS",
    ),
];

static CYCLONE: [CategoryTemplate; 2] = [
    tpl(
        "Cyclone Alert: Severe Storm Approaching {region}",
        "IMD reports a cyclonic system intensifying in the Bay of Bengal and tracking towards {region}. Fishermen are advised not to venture into the sea.",
        Urgency::Urgent,
        "India Meteorological Department",
    ),
    tpl(
        "Depression Likely to Intensify Near {region}",
        "A low pressure area may develop into a depression over the next 48 hours. Coastal districts around {region} should stay alert.",
        Urgency::High,
        "India Meteorological Department",
    ),
];

static STORM_SURGE: [CategoryTemplate; 1] = [tpl(
    "Storm Surge Expected Along {region} Shoreline",
    "Surge heights of 1 to 2 metres above astronomical tide are expected near {region}. Avoid beaches and harbour areas.",
    Urgency::High,
    "National Disaster Management Authority",
)];

static HIGH_WAVES: [CategoryTemplate; 2] = [
    tpl(
        "High Wave Alert for {region}",
        "Waves of 2.5 to 3.5 metres are forecast off {region}. Small vessels should stay in harbour.",
        Urgency::Medium,
        "INCOIS Ocean State Forecast",
    ),
    tpl(
        "Swell Surge Warning Issued for {region}",
        "Long period swells may cause sea water to enter low-lying coastal stretches of {region}.",
        Urgency::High,
        "INCOIS Ocean State Forecast",
    ),
];

static COASTAL_EROSION: [CategoryTemplate; 1] = [tpl(
    "Coastal Erosion Reported Near {region}",
    "Local authorities report accelerated shoreline erosion around {region}. Structures close to the waterline are being inspected.",
    Urgency::Low,
    "State Coastal Zone Management Authority",
)];

static MARINE_FLOODING: [CategoryTemplate; 1] = [tpl(
    "Marine Flooding Risk in {region} Low-Lying Areas",
    "High tide combined with onshore winds may flood coastal roads in {region}. Plan travel accordingly.",
    Urgency::Medium,
    "State Disaster Management Authority",
)];

static WEATHER: [CategoryTemplate; 2] = [
    tpl(
        "Heavy Rainfall Forecast for {region}",
        "Heavy to very heavy rainfall is likely over {region} during the next 24 hours.",
        Urgency::Medium,
        "India Meteorological Department",
    ),
    tpl(
        "Strong Winds Expected Over {region}",
        "Gusty winds reaching 50 km/h may affect {region} and adjoining sea areas.",
        Urgency::Low,
        "India Meteorological Department",
    ),
];

static SAFETY: [CategoryTemplate; 1] = [tpl(
    "Beach Safety Advisory for {region}",
    "Lifeguards in {region} advise swimmers to stay within flagged zones due to strong rip currents.",
    Urgency::Low,
    "Coastal Police",
)];

static EMERGENCY: [CategoryTemplate; 1] = [tpl(
    "Emergency Evacuation Ordered in {region}",
    "District administration has ordered evacuation of coastal settlements in {region}. Relief camps are open.",
    Urgency::Urgent,
    "District Emergency Operations Centre",
)];

/// Templates for `category`, in catalog order. Never empty.
pub fn lookup(category: HazardCategory) -> &'static [CategoryTemplate] {
    match category {
        HazardCategory::Tsunami => &TSUNAMI,
        HazardCategory::Cyclone => &CYCLONE,
        HazardCategory::StormSurge => &STORM_SURGE,
        HazardCategory::HighWaves => &HIGH_WAVES,
        HazardCategory::CoastalErosion => &COASTAL_EROSION,
        HazardCategory::MarineFlooding => &MARINE_FLOODING,
        HazardCategory::Weather => &WEATHER,
        HazardCategory::Safety => &SAFETY,
        HazardCategory::Emergency => &EMERGENCY,
    }
}

/// Replace every `{region}` placeholder in `pattern`.
pub fn interpolate(pattern: &str, region: &str) -> String {
    pattern.replace(REGION_PLACEHOLDER, region)
}
