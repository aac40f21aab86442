use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DashError, Result};

pub const PAYLOAD_SLIDER_MIN: u32 = 0;
pub const PAYLOAD_SLIDER_MAX: u32 = 10_000;
pub const PAYLOAD_SLIDER_STEP: u32 = 1_000;

/// Dropdown value meaning "every site".
pub const ALL_SITES: &str = "ALL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn from_class(class: u8) -> Option<Self> {
        match class {
            1 => Some(Outcome::Success),
            0 => Some(Outcome::Failure),
            _ => None,
        }
    }

    /// The 0/1 indicator stored in the `class` column.
    pub fn class(self) -> u8 {
        match self {
            Outcome::Success => 1,
            Outcome::Failure => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Success => "Success",
            Outcome::Failure => "Failure",
        }
    }
}

/// One row of the launch dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchRecord {
    pub launch_site: String,
    pub payload_mass_kg: f64,
    pub outcome: Outcome,
    pub booster_version_category: String,
}

impl LaunchRecord {
    pub fn new(
        launch_site: impl Into<String>,
        payload_mass_kg: f64,
        outcome: Outcome,
        booster_version_category: impl Into<String>,
    ) -> Self {
        Self {
            launch_site: launch_site.into(),
            payload_mass_kg,
            outcome,
            booster_version_category: booster_version_category.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SiteSelection {
    #[default]
    All,
    Site(String),
}

impl SiteSelection {
    /// Interprets a raw dropdown value; `"ALL"` is the sentinel for every site.
    pub fn parse(value: &str) -> Self {
        if value == ALL_SITES {
            SiteSelection::All
        } else {
            SiteSelection::Site(value.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SiteSelection::All => ALL_SITES,
            SiteSelection::Site(site) => site,
        }
    }

    pub fn matches(&self, launch_site: &str) -> bool {
        match self {
            SiteSelection::All => true,
            SiteSelection::Site(site) => site == launch_site,
        }
    }
}

impl fmt::Display for SiteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for SiteSelection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for SiteSelection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(SiteSelection::parse(&value))
    }
}

/// Inclusive payload window selected on the range slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PayloadRange {
    low: u32,
    high: u32,
}

impl PayloadRange {
    pub fn new(low: u32, high: u32) -> Result<Self> {
        // u32 already enforces the lower slider bound
        if low > high || high > PAYLOAD_SLIDER_MAX {
            return Err(DashError::InvalidRange { low, high });
        }
        Ok(Self { low, high })
    }

    /// The full slider extent.
    pub fn full() -> Self {
        Self {
            low: PAYLOAD_SLIDER_MIN,
            high: PAYLOAD_SLIDER_MAX,
        }
    }

    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    pub fn contains(&self, payload_mass_kg: f64) -> bool {
        f64::from(self.low) <= payload_mass_kg && payload_mass_kg <= f64::from(self.high)
    }
}

impl<'de> Deserialize<'de> for PayloadRange {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let [low, high] = <[u32; 2]>::deserialize(deserializer)?;
        PayloadRange::new(low, high).map_err(serde::de::Error::custom)
    }
}
