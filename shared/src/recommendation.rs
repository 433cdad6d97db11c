//! Prevention recommendations
//!
//! Output order is fixed: general block, factor block, then the country block
//! (landscape, water bodies, urban density, custom list).

use crate::models::{CountryProfile, DensityKind, FactorKind, LandscapeKind, RiskLevel};
use crate::registry::Registry;

/// Surveillance, education and sanitation advice included in every result
pub const GENERAL_RECOMMENDATIONS: [&str; 3] = [
    "Implement public health surveillance systems",
    "Educate the public about Leptospirosis transmission",
    "Improve sanitation and drainage systems",
];

pub fn factor_recommendations(factor: FactorKind) -> &'static [&'static str] {
    match factor {
        FactorKind::Temperature => &[
            "Monitor water bodies during warm periods",
            "Implement cooling stations in high-risk areas",
            "Issue temperature-related health advisories",
        ],
        FactorKind::RelativeHumidity => &[
            "Improve ventilation in humid areas",
            "Install dehumidification systems in risk-prone buildings",
            "Monitor humidity levels in agricultural settings",
        ],
        FactorKind::DewPoint => &[
            "Monitor condensation in risk-prone areas",
            "Implement moisture control measures",
            "Install proper drainage systems",
        ],
        FactorKind::Precipitation => &[
            "Improve flood control measures",
            "Maintain proper drainage systems",
            "Issue rainfall-related health advisories",
        ],
        FactorKind::Unrecognized => &[],
    }
}

fn landscape_recommendation(landscape: LandscapeKind) -> Option<&'static str> {
    match landscape {
        LandscapeKind::LowLying => Some("Implement enhanced flood control measures"),
        LandscapeKind::Varied => Some("Focus on region-specific prevention strategies"),
        LandscapeKind::Mountainous | LandscapeKind::Coastal | LandscapeKind::Unrecognized => None,
    }
}

fn water_body_recommendation(density: DensityKind) -> Option<&'static str> {
    match density {
        DensityKind::Many => Some("Regular monitoring of water quality in multiple water bodies"),
        _ => None,
    }
}

fn urban_density_recommendation(density: DensityKind) -> Option<&'static str> {
    match density {
        DensityKind::High => Some("Implement urban rodent control programs"),
        _ => None,
    }
}

/// Country block derived from a landscape profile
pub fn profile_recommendations(profile: &CountryProfile) -> Vec<String> {
    let mut recommendations: Vec<String> = [
        landscape_recommendation(profile.landscape),
        water_body_recommendation(profile.water_bodies),
        urban_density_recommendation(profile.urban_density),
    ]
    .into_iter()
    .flatten()
    .map(str::to_string)
    .collect();

    recommendations.extend(profile.custom_recommendations.iter().cloned());
    recommendations
}

/// Country block for a country name; empty when the registry has no profile
pub fn country_recommendations(country: &str, registry: &Registry) -> Vec<String> {
    registry
        .profile_for(country)
        .map(profile_recommendations)
        .unwrap_or_default()
}

/// Full ordered recommendation list.
///
/// The risk level does not change the list; level-specific guidance is
/// reported separately by [`crate::models::advisory`].
pub fn recommend(
    _risk_level: RiskLevel,
    dominant_factor: &str,
    country: Option<&str>,
    registry: &Registry,
) -> Vec<String> {
    let mut recommendations: Vec<String> = GENERAL_RECOMMENDATIONS
        .iter()
        .map(|r| r.to_string())
        .collect();

    recommendations.extend(
        factor_recommendations(FactorKind::from_feature_name(dominant_factor))
            .iter()
            .map(|r| r.to_string()),
    );

    if let Some(country) = country {
        recommendations.extend(country_recommendations(country, registry));
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_LEVELS: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::VeryHigh,
    ];

    #[test]
    fn general_block_comes_first_for_every_level() {
        let registry = Registry::european();
        for level in ALL_LEVELS {
            let recs = recommend(level, "TP", None, &registry);
            assert_eq!(&recs[..3], &GENERAL_RECOMMENDATIONS);
        }
    }

    #[test]
    fn factor_block_follows_general_block() {
        let registry = Registry::european();
        let recs = recommend(RiskLevel::High, "Relative_Humidity", None, &registry);
        assert_eq!(recs.len(), 6);
        assert_eq!(recs[3], "Improve ventilation in humid areas");
        assert_eq!(recs[5], "Monitor humidity levels in agricultural settings");
    }

    #[test]
    fn unknown_factor_adds_nothing() {
        let registry = Registry::european();
        let recs = recommend(RiskLevel::Low, "Wind_Speed", None, &registry);
        assert_eq!(recs, GENERAL_RECOMMENDATIONS.to_vec());
    }

    #[test]
    fn netherlands_country_block() {
        let registry = Registry::european();
        let recs = recommend(
            RiskLevel::VeryHigh,
            "Temperature_Celsius",
            Some("Netherlands"),
            &registry,
        );
        let country_block = &recs[6..];
        assert_eq!(
            country_block,
            &[
                "Implement enhanced flood control measures",
                "Regular monitoring of water quality in multiple water bodies",
                "Implement urban rodent control programs",
                "Maintain dyke and canal systems",
                "Monitor urban water management systems",
                "Implement rodent control in dense urban areas",
            ]
        );
    }

    #[test]
    fn italy_country_block_skips_moderate_and_mixed() {
        let registry = Registry::european();
        let block = country_recommendations("Italy", &registry);
        assert_eq!(block[0], "Focus on region-specific prevention strategies");
        assert_eq!(block.len(), 4);
        assert_eq!(block[1], "Focus on agricultural water management");
    }

    #[test]
    fn unknown_country_has_no_country_block() {
        let registry = Registry::european();
        let with_country = recommend(RiskLevel::High, "TP", Some("Unknown Land"), &registry);
        let without = recommend(RiskLevel::High, "TP", None, &registry);
        assert_eq!(with_country, without);
    }

    #[test]
    fn unrecognized_landscape_contributes_nothing() {
        let profile = CountryProfile {
            landscape: LandscapeKind::Unrecognized,
            water_bodies: DensityKind::Few,
            urban_density: DensityKind::Low,
            custom_recommendations: vec!["Local advice".to_string()],
        };
        assert_eq!(profile_recommendations(&profile), vec!["Local advice".to_string()]);
    }
}
