use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category attached to an uploaded garment photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GarmentType {
    Top,
    Bottom,
    Dress,
    Jewelry,
    Hat,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown garment type '{0}' (expected one of: top, bottom, dress, jewelry, hat)")]
pub struct UnknownGarmentType(pub String);

impl GarmentType {
    pub const ALL: [GarmentType; 5] = [
        GarmentType::Top,
        GarmentType::Bottom,
        GarmentType::Dress,
        GarmentType::Jewelry,
        GarmentType::Hat,
    ];

    /// Wire name, as sent in the `type` field of `/pushdb`
    pub fn as_str(&self) -> &'static str {
        match self {
            GarmentType::Top => "top",
            GarmentType::Bottom => "bottom",
            GarmentType::Dress => "dress",
            GarmentType::Jewelry => "jewelry",
            GarmentType::Hat => "hat",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GarmentType::Top => "Top",
            GarmentType::Bottom => "Bottom",
            GarmentType::Dress => "Dress",
            GarmentType::Jewelry => "Jewelry",
            GarmentType::Hat => "Hat",
        }
    }
}

impl fmt::Display for GarmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GarmentType {
    type Err = UnknownGarmentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        GarmentType::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| UnknownGarmentType(s.to_string()))
    }
}
