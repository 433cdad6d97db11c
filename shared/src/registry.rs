//! Region and country reference data
//!
//! The registry is plain data handed to the pipeline. [`Registry::european`]
//! builds the reference tables for European regions; alternative tables can be
//! loaded from JSON with [`Registry::from_json`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::{CountryProfile, DensityKind, LandscapeKind, RegionDefinition, ThresholdPolicy};

/// Serialized form of a [`Registry`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryDocument {
    pub regions: Vec<RegionDefinition>,
    pub default_region: String,
    #[serde(default)]
    pub profiles: BTreeMap<String, CountryProfile>,
}

/// Read-only lookup: country → region → thresholds, country → profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RegistryDocument", into = "RegistryDocument")]
pub struct Registry {
    regions: Vec<RegionDefinition>,
    default_index: usize,
    profiles: BTreeMap<String, CountryProfile>,
}

impl TryFrom<RegistryDocument> for Registry {
    type Error = CoreError;

    fn try_from(doc: RegistryDocument) -> CoreResult<Self> {
        Registry::new(doc.regions, doc.default_region, doc.profiles)
    }
}

impl From<Registry> for RegistryDocument {
    fn from(registry: Registry) -> Self {
        RegistryDocument {
            default_region: registry.regions[registry.default_index].name.clone(),
            regions: registry.regions,
            profiles: registry.profiles,
        }
    }
}

impl Registry {
    /// Build a registry; the default region must be one of `regions`
    pub fn new(
        regions: Vec<RegionDefinition>,
        default_region: impl Into<String>,
        profiles: BTreeMap<String, CountryProfile>,
    ) -> CoreResult<Self> {
        let default_region = default_region.into();
        let default_index = regions
            .iter()
            .position(|r| r.name == default_region)
            .ok_or(CoreError::UnknownDefaultRegion(default_region))?;
        for region in &regions {
            crate::validation::validate_threshold_policy(&region.thresholds)
                .map_err(|msg| CoreError::InvalidRegistry(format!("{}: {}", region.name, msg)))?;
        }
        Ok(Self {
            regions,
            default_index,
            profiles,
        })
    }

    /// Parse and check a registry document
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::InvalidRegistry(e.to_string()))
    }

    /// European regional thresholds and country profiles
    pub fn european() -> Self {
        let region = |name: &str, countries: &[&str], policy: ThresholdPolicy| RegionDefinition {
            name: name.to_string(),
            countries: countries.iter().map(|c| c.to_string()).collect(),
            thresholds: policy,
        };

        let regions = vec![
            region(
                "Northern_Europe",
                &["Norway", "Sweden", "Finland", "Denmark", "Iceland"],
                ThresholdPolicy::new(15.0, 30.0, 45.0).with_climate(10.0, 70.0),
            ),
            region(
                "Western_Europe",
                &["UK", "Ireland", "France", "Belgium", "Netherlands", "Luxembourg", "Germany"],
                ThresholdPolicy::new(20.0, 35.0, 50.0).with_climate(15.0, 75.0),
            ),
            region(
                "Southern_Europe",
                &["Spain", "Portugal", "Italy", "Greece", "Malta", "Cyprus"],
                ThresholdPolicy::new(25.0, 40.0, 55.0).with_climate(20.0, 65.0),
            ),
            region(
                "Eastern_Europe",
                &["Poland", "Czech Republic", "Slovakia", "Hungary", "Romania", "Bulgaria"],
                ThresholdPolicy::new(20.0, 35.0, 50.0).with_climate(15.0, 70.0),
            ),
        ];

        let mut profiles = BTreeMap::new();
        profiles.insert(
            "Netherlands".to_string(),
            CountryProfile {
                landscape: LandscapeKind::LowLying,
                water_bodies: DensityKind::Many,
                urban_density: DensityKind::High,
                custom_recommendations: vec![
                    "Maintain dyke and canal systems".to_string(),
                    "Monitor urban water management systems".to_string(),
                    "Implement rodent control in dense urban areas".to_string(),
                ],
            },
        );
        profiles.insert(
            "Italy".to_string(),
            CountryProfile {
                landscape: LandscapeKind::Varied,
                water_bodies: DensityKind::Moderate,
                urban_density: DensityKind::Mixed,
                custom_recommendations: vec![
                    "Focus on agricultural water management".to_string(),
                    "Monitor coastal areas during tourist season".to_string(),
                    "Implement prevention in rice farming regions".to_string(),
                ],
            },
        );

        Self {
            regions,
            default_index: 1,
            profiles,
        }
    }

    pub fn regions(&self) -> &[RegionDefinition] {
        &self.regions
    }

    /// Region applied to countries not listed anywhere
    pub fn default_region(&self) -> &RegionDefinition {
        &self.regions[self.default_index]
    }

    /// Whether the country is listed in any region
    pub fn is_mapped(&self, country: &str) -> bool {
        self.regions.iter().any(|r| r.contains(country))
    }

    /// Region of a country; unmapped countries fall back to the default region.
    /// A country listed in several regions resolves to the first listing.
    pub fn region_for(&self, country: &str) -> &RegionDefinition {
        self.regions
            .iter()
            .find(|r| r.contains(country))
            .unwrap_or_else(|| self.default_region())
    }

    pub fn policy_for(&self, country: &str) -> &ThresholdPolicy {
        &self.region_for(country).thresholds
    }

    pub fn profile_for(&self, country: &str) -> Option<&CountryProfile> {
        self.profiles.get(country)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::european()
    }
}
