//! Country landscape profiles

use serde::{Deserialize, Serialize};

/// Landscape category of a country
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LandscapeKind {
    LowLying,
    Varied,
    Mountainous,
    Coastal,
    #[serde(other)]
    Unrecognized,
}

/// Density category used for both water bodies and urbanisation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DensityKind {
    Many,
    High,
    Moderate,
    Mixed,
    Few,
    Low,
    #[serde(other)]
    Unrecognized,
}

/// Static landscape profile of a country
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryProfile {
    pub landscape: LandscapeKind,
    pub water_bodies: DensityKind,
    pub urban_density: DensityKind,
    #[serde(default)]
    pub custom_recommendations: Vec<String>,
}
