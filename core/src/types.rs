//! Shared primitive types used across the entire dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordinal of a portfolio refresh within one session. The first
/// generated portfolio is refresh 0.
pub type RefreshIndex = u64;

/// Monotonic stamp for summary requests. Bumped on every request so
/// late resolutions can be matched against the request they answer.
pub type Generation = u64;

/// A stable, unique identifier for a customer record.
pub type CustomerId = String;

/// The canonical session identifier.
pub type SessionId = String;

/// Customer wealth band. Drives every distribution in the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    MassMarket,
    Affluent,
    HighNetWorth,
}

impl Segment {
    pub const ALL: [Segment; 3] = [Segment::MassMarket, Segment::Affluent, Segment::HighNetWorth];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MassMarket => "Mass Market",
            Self::Affluent => "Affluent",
            Self::HighNetWorth => "High Net Worth",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Segment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mass_market" | "mass-market" | "massmarket" => Ok(Self::MassMarket),
            "affluent" => Ok(Self::Affluent),
            "high_net_worth" | "high-net-worth" | "highnetworth" | "hnw" => Ok(Self::HighNetWorth),
            other => Err(format!("unknown segment '{other}'")),
        }
    }
}

/// Geographic booking region.
///
/// Declaration order is the tie-break for revenue-sorted region tables.
/// NEVER reorder entries; only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    NorthAmerica,
    Emea,
    Apac,
    LatAm,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::NorthAmerica,
        Region::Emea,
        Region::Apac,
        Region::LatAm,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::NorthAmerica => "North America",
            Self::Emea => "EMEA",
            Self::Apac => "APAC",
            Self::LatAm => "LatAm",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "north_america" | "north-america" | "northamerica" | "na" => Ok(Self::NorthAmerica),
            "emea" => Ok(Self::Emea),
            "apac" => Ok(Self::Apac),
            "latam" | "lat_am" | "lat-am" => Ok(Self::LatAm),
            other => Err(format!("unknown region '{other}'")),
        }
    }
}
