//! Dominant-factor attribution

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Covariate;

/// Covariate category used to select factor-specific advice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    Temperature,
    DewPoint,
    RelativeHumidity,
    Precipitation,
    Unrecognized,
}

impl FactorKind {
    /// Map a model feature name to its factor kind
    pub fn from_feature_name(name: &str) -> Self {
        match name {
            "Temperature_Celsius" => FactorKind::Temperature,
            "Dew_Point_Celsius" => FactorKind::DewPoint,
            "Relative_Humidity" => FactorKind::RelativeHumidity,
            "TP" => FactorKind::Precipitation,
            _ => FactorKind::Unrecognized,
        }
    }
}

impl From<Covariate> for FactorKind {
    fn from(covariate: Covariate) -> Self {
        match covariate {
            Covariate::Temperature => FactorKind::Temperature,
            Covariate::DewPoint => FactorKind::DewPoint,
            Covariate::RelativeHumidity => FactorKind::RelativeHumidity,
            Covariate::Precipitation => FactorKind::Precipitation,
        }
    }
}

/// Name of the feature with the largest importance; ties go to the lowest index
pub fn dominant_factor<S: AsRef<str>>(importances: &[f64], feature_names: &[S]) -> CoreResult<String> {
    if importances.len() != feature_names.len() {
        return Err(CoreError::FeatureMismatch {
            importances: importances.len(),
            names: feature_names.len(),
        });
    }
    if importances.is_empty() {
        return Err(CoreError::EmptyFeatures);
    }

    let mut best = 0;
    for (i, value) in importances.iter().enumerate().skip(1) {
        if *value > importances[best] {
            best = i;
        }
    }
    Ok(feature_names[best].as_ref().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FEATURE_NAMES;
    use proptest::prelude::*;

    #[test]
    fn picks_largest_importance() {
        let names = ["Temp", "Dew", "Humidity", "Precip"];
        let factor = dominant_factor(&[0.1, 0.6, 0.2, 0.1], &names).unwrap();
        assert_eq!(factor, "Dew");
    }

    #[test]
    fn ties_resolve_to_first_occurrence() {
        let factor = dominant_factor(&[0.3, 0.3, 0.3, 0.1], &FEATURE_NAMES).unwrap();
        assert_eq!(factor, "Temperature_Celsius");
    }

    #[test]
    fn mismatched_lengths_fail() {
        let err = dominant_factor(&[0.5, 0.5], &FEATURE_NAMES).unwrap_err();
        assert_eq!(
            err,
            CoreError::FeatureMismatch {
                importances: 2,
                names: 4
            }
        );
    }

    #[test]
    fn empty_features_fail() {
        let names: [&str; 0] = [];
        assert_eq!(dominant_factor(&[], &names), Err(CoreError::EmptyFeatures));
    }

    #[test]
    fn feature_names_map_to_kinds() {
        assert_eq!(FactorKind::from_feature_name("TP"), FactorKind::Precipitation);
        assert_eq!(
            FactorKind::from_feature_name("Dew_Point_Celsius"),
            FactorKind::DewPoint
        );
        assert_eq!(FactorKind::from_feature_name("Wind"), FactorKind::Unrecognized);
        for covariate in Covariate::ALL {
            assert_eq!(
                FactorKind::from_feature_name(covariate.feature_name()),
                FactorKind::from(covariate)
            );
        }
    }

    proptest! {
        #[test]
        fn prop_dominant_factor_has_max_importance(values in prop::collection::vec(0.0f64..1.0, 4)) {
            let factor = dominant_factor(&values, &FEATURE_NAMES).unwrap();
            let idx = FEATURE_NAMES.iter().position(|n| *n == factor).unwrap();
            prop_assert!(values.iter().all(|v| *v <= values[idx]));
            prop_assert!(values[..idx].iter().all(|v| *v < values[idx]));
        }
    }
}
