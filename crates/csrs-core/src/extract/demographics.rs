use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Gender;

/// Age band of the age × gender cross-tab.
///
/// Inclusive integer boundaries: every age maps to exactly one band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "juvenile")]
    Juvenile,
    #[serde(rename = "17-25")]
    From17To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46+")]
    From46,
    Unknown,
}

impl AgeBand {
    pub const ALL: [AgeBand; 6] = [
        AgeBand::Juvenile,
        AgeBand::From17To25,
        AgeBand::From26To35,
        AgeBand::From36To45,
        AgeBand::From46,
        AgeBand::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeBand::Juvenile => "juvenile",
            AgeBand::From17To25 => "17-25",
            AgeBand::From26To35 => "26-35",
            AgeBand::From36To45 => "36-45",
            AgeBand::From46 => "46+",
            AgeBand::Unknown => "Unknown",
        }
    }

    pub fn is_juvenile(self) -> bool {
        self == AgeBand::Juvenile
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn age_band(age: Option<u32>) -> AgeBand {
    match age {
        None => AgeBand::Unknown,
        Some(0..=16) => AgeBand::Juvenile,
        Some(17..=25) => AgeBand::From17To25,
        Some(26..=35) => AgeBand::From26To35,
        Some(36..=45) => AgeBand::From36To45,
        Some(_) => AgeBand::From46,
    }
}

/// Band of a raw age cell. Anything that is not an age maps to `Unknown`.
pub fn age_band_text(raw: &str) -> AgeBand {
    age_band(parse_age(raw))
}

/// Parse the leading integer of an age cell ("23", "23.0", "23 yrs").
pub fn parse_age(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let rest = &trimmed[digits.len()..];
    // Reject things like "12/03/2025" that start with digits but are not ages.
    if rest.starts_with(['/', '-', ':']) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|age| *age <= 130)
}

/// Gender from free text: "M..." is male, "F..." is female, anything else unknown.
pub fn gender(raw: &str) -> Gender {
    match raw.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('M') => Gender::Male,
        Some('F') => Gender::Female,
        _ => Gender::Unknown,
    }
}
