//! Historical analysis: seasonal risk profile, covariate correlations,
//! model evaluation and current-conditions assessment

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared::stats::{mean, pearson, std_dev};
use shared::{is_all_countries, Covariate, Observation, RiskAssessment, FEATURE_NAMES};

use crate::error::{AppError, AppResult};
use crate::services::dataset::ObservationTable;
use crate::services::forecast::{ForecastOutcome, RiskForecaster};
use crate::services::model::Regressor;

/// Predicted disease-rate statistics for one calendar month
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeasonalRisk {
    pub mean_risk: f64,
    pub std_risk: f64,
    pub sample_size: usize,
}

/// Pairwise Pearson correlations between the four covariates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrelationMatrix {
    pub features: Vec<String>,
    pub values: [[f64; 4]; 4],
}

impl CorrelationMatrix {
    pub fn get(&self, a: Covariate, b: Covariate) -> f64 {
        self.values[a.index()][b.index()]
    }
}

/// Error metrics of a model against observed disease rates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ModelEvaluation {
    pub mae: f64,
    pub mse: f64,
    pub r2: f64,
    pub sample_size: usize,
}

/// Combined output of the `analyze` command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub seasonal: BTreeMap<u32, SeasonalRisk>,
    pub correlations: CorrelationMatrix,
    pub evaluation: Option<ModelEvaluation>,
}

/// Group model predictions by calendar month; months without rows are absent
pub fn seasonal_risk<'a, I>(observations: I, model: &dyn Regressor) -> AppResult<BTreeMap<u32, SeasonalRisk>>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for observation in observations {
        let Some(month) = observation.month else {
            continue;
        };
        let prediction = model.predict_scalar(&observation.covariates().to_features())?;
        by_month.entry(month).or_default().push(prediction);
    }

    Ok(by_month
        .into_iter()
        .filter_map(|(month, predictions)| {
            Some((
                month,
                SeasonalRisk {
                    mean_risk: mean(&predictions)?,
                    std_risk: std_dev(&predictions)?,
                    sample_size: predictions.len(),
                },
            ))
        })
        .collect())
}

/// Pearson matrix over the covariates; a zero-variance column correlates 0 with the rest
pub fn factor_correlations<'a, I>(observations: I) -> CorrelationMatrix
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut columns: [Vec<f64>; 4] = Default::default();
    for observation in observations {
        let features = observation.covariates().to_features();
        for (column, value) in columns.iter_mut().zip(features) {
            column.push(value);
        }
    }

    let mut values = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            values[i][j] = if i == j {
                1.0
            } else {
                pearson(&columns[i], &columns[j]).unwrap_or(0.0)
            };
        }
    }

    CorrelationMatrix {
        features: FEATURE_NAMES.iter().map(|f| f.to_string()).collect(),
        values,
    }
}

/// MAE, MSE and R² of the model over the observations.
///
/// R² is `0.0` when the observed rates have zero variance.
pub fn evaluate_model<'a, I>(model: &dyn Regressor, observations: I) -> AppResult<Option<ModelEvaluation>>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut actual = Vec::new();
    let mut predicted = Vec::new();
    for observation in observations {
        predicted.push(model.predict_scalar(&observation.covariates().to_features())?);
        actual.push(observation.disease_rate);
    }
    let Some(actual_mean) = mean(&actual) else {
        return Ok(None);
    };

    let n = actual.len() as f64;
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut total_sq = 0.0;
    for (y, y_hat) in actual.iter().zip(&predicted) {
        abs_sum += (y - y_hat).abs();
        sq_sum += (y - y_hat).powi(2);
        total_sq += (y - actual_mean).powi(2);
    }

    let r2 = if total_sq == 0.0 { 0.0 } else { 1.0 - sq_sum / total_sq };
    Ok(Some(ModelEvaluation {
        mae: abs_sum / n,
        mse: sq_sum / n,
        r2,
        sample_size: actual.len(),
    }))
}

/// Run every analysis over the whole table
pub fn analyze(table: &ObservationTable, model: &dyn Regressor) -> AppResult<AnalysisReport> {
    let report = AnalysisReport {
        seasonal: seasonal_risk(table.observations(), model)?,
        correlations: factor_correlations(table.observations()),
        evaluation: evaluate_model(model, table.observations())?,
    };
    tracing::info!(
        "Analyzed {} observations ({} months with data)",
        table.len(),
        report.seasonal.len()
    );
    Ok(report)
}

/// Classify the most recent observation of a country
pub fn assess_current(
    forecaster: &RiskForecaster,
    table: &ObservationTable,
    country: &str,
) -> AppResult<RiskAssessment> {
    let latest = table
        .latest(country)
        .ok_or_else(|| AppError::MissingInput(format!("no observations for {}", country)))?;
    forecaster.evaluate(country, latest.period(), latest.covariates())
}

/// Current assessment for one country or, for `"all"`, every dataset country
pub fn assess(
    forecaster: &RiskForecaster,
    table: &ObservationTable,
    country: &str,
) -> AppResult<ForecastOutcome> {
    let countries = if is_all_countries(country) {
        table.countries()
    } else {
        vec![country.trim().to_string()]
    };

    let mut outcome = ForecastOutcome {
        requested: countries.clone(),
        ..Default::default()
    };
    for country in countries {
        match assess_current(forecaster, table, &country) {
            Ok(assessment) => outcome.assessments.push(assessment),
            Err(e) if e.is_skippable() => {
                tracing::warn!("Skipping {}: {}", country, e);
                outcome.skipped.push(country);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Predicts the temperature column
    struct TemperatureEcho;

    impl Regressor for TemperatureEcho {
        fn predict(&self, features: &[f64]) -> AppResult<Vec<f64>> {
            Ok(vec![features[0]])
        }

        fn feature_importances(&self) -> &[f64] {
            &[1.0, 0.0, 0.0, 0.0]
        }
    }

    fn obs(month: Option<u32>, temperature: f64, humidity: f64, rate: f64) -> Observation {
        Observation {
            country: "Testland".to_string(),
            year: 2020,
            month,
            temperature,
            dew_point: temperature * 2.0,
            relative_humidity: humidity,
            precipitation: 1.0,
            disease_rate: rate,
        }
    }

    #[test]
    fn seasonal_groups_by_month() {
        let rows = vec![
            obs(Some(1), 2.0, 80.0, 1.0),
            obs(Some(1), 4.0, 80.0, 1.0),
            obs(Some(7), 20.0, 60.0, 1.0),
            obs(None, 99.0, 60.0, 1.0),
        ];
        let seasonal = seasonal_risk(&rows, &TemperatureEcho).unwrap();
        assert_eq!(seasonal.len(), 2);
        let january = seasonal[&1];
        assert_eq!(january.mean_risk, 3.0);
        assert_eq!(january.std_risk, 1.0);
        assert_eq!(january.sample_size, 2);
        assert!(!seasonal.contains_key(&3));
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let rows = vec![
            obs(Some(1), 1.0, 90.0, 1.0),
            obs(Some(2), 2.0, 70.0, 1.0),
            obs(Some(3), 3.0, 50.0, 1.0),
        ];
        let m = factor_correlations(&rows);
        for a in Covariate::ALL {
            assert_eq!(m.get(a, a), 1.0);
            for b in Covariate::ALL {
                assert_eq!(m.get(a, b), m.get(b, a));
            }
        }
        assert!((m.get(Covariate::Temperature, Covariate::DewPoint) - 1.0).abs() < 1e-12);
        assert!((m.get(Covariate::Temperature, Covariate::RelativeHumidity) + 1.0).abs() < 1e-12);
        // Constant precipitation column
        assert_eq!(m.get(Covariate::Temperature, Covariate::Precipitation), 0.0);
    }

    #[test]
    fn evaluation_metrics() {
        let rows = vec![obs(Some(1), 1.0, 80.0, 2.0), obs(Some(2), 3.0, 80.0, 3.0)];
        let eval = evaluate_model(&TemperatureEcho, &rows).unwrap().unwrap();
        assert_eq!(eval.sample_size, 2);
        assert_eq!(eval.mae, 0.5);
        assert_eq!(eval.mse, 0.5);
        // total sum of squares 0.5, residual 1.0
        assert_eq!(eval.r2, -1.0);
    }

    #[test]
    fn constant_target_has_zero_r2() {
        let rows = vec![obs(Some(1), 1.0, 80.0, 2.0), obs(Some(2), 2.0, 80.0, 2.0)];
        let eval = evaluate_model(&TemperatureEcho, &rows).unwrap().unwrap();
        assert_eq!(eval.r2, 0.0);
        assert!(evaluate_model(&TemperatureEcho, std::iter::empty()).unwrap().is_none());
    }
}
