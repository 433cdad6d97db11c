//! Risk forecasting: covariates in, classified assessments out
//!
//! Each `(country, period)` evaluation predicts a disease rate, normalizes it
//! against the historical ceiling, classifies it on the selected ladder and
//! attaches the dominant factor, advisory and recommendations.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shared::{
    advisory, classify_regional, classify_universal, dominant_factor, is_all_countries, normalize,
    recommend, substitute_zero_prediction, validate_historical_max, validate_noise_band,
    validate_trend_horizon, validate_year_range, Covariates, Granularity, Period, Registry,
    RiskAssessment, RiskLevel, ThresholdMode, YearRange, FEATURE_NAMES,
};

use crate::error::{AppError, AppResult};
use crate::services::dataset::ObservationTable;
use crate::services::model::Regressor;
use crate::services::weather::{
    country_seed, ForecastMode, ModelWeather, RandomWalk, TrendForecaster, DEFAULT_NOISE_BAND,
};

/// Whether records are normalized against one dataset-wide ceiling or their region's
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CeilingScope {
    #[default]
    Global,
    Regional,
}

/// Normalization ceiling for predicted rates
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalCeiling {
    global: f64,
    regional: BTreeMap<String, f64>,
}

impl HistoricalCeiling {
    /// A configured ceiling; must be strictly positive
    pub fn global(historical_max: f64) -> AppResult<Self> {
        validate_historical_max(historical_max)
            .map_err(|e| AppError::validation("historical_max", e))?;
        Ok(Self::computed(historical_max))
    }

    fn computed(historical_max: f64) -> Self {
        Self {
            global: historical_max,
            regional: BTreeMap::new(),
        }
    }

    /// Ceiling derived from the dataset, or the configured override when given.
    ///
    /// With [`CeilingScope::Regional`] each region uses its own maximum; regions
    /// without positive data fall back to the global value. A dataset whose
    /// rates are all zero yields a zero ceiling, which normalizes every
    /// prediction to 0%.
    pub fn from_table(
        table: &ObservationTable,
        registry: &Registry,
        scope: CeilingScope,
        configured: Option<f64>,
    ) -> AppResult<Self> {
        if let Some(max) = configured {
            return Self::global(max);
        }

        let global = table
            .historical_max()
            .ok_or_else(|| AppError::MissingInput("dataset has no observations".to_string()))?;
        if global <= 0.0 {
            tracing::warn!("All observed disease rates are zero; risk percentages will be 0");
        }
        let mut ceiling = Self::computed(global);

        if scope == CeilingScope::Regional {
            ceiling.regional = table
                .regional_maxima(registry)
                .into_iter()
                .filter(|(_, max)| validate_historical_max(*max).is_ok())
                .collect();
        }
        Ok(ceiling)
    }

    pub fn for_region(&self, region: &str) -> f64 {
        self.regional.get(region).copied().unwrap_or(self.global)
    }

    pub fn global_max(&self) -> f64 {
        self.global
    }
}

/// Parameters of one forecast run
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub years: YearRange,
    pub mode: ForecastMode,
    pub granularity: Granularity,
    pub noise_band: f64,
    pub seed: Option<u64>,
    /// Present year for range validation and trend horizons
    pub reference_year: i32,
}

impl ForecastRequest {
    pub fn new(years: YearRange, reference_year: i32) -> Self {
        Self {
            years,
            mode: ForecastMode::default(),
            granularity: Granularity::default(),
            noise_band: DEFAULT_NOISE_BAND,
            seed: None,
            reference_year,
        }
    }

    /// Reject malformed requests before any computation
    pub fn validate(&self) -> AppResult<()> {
        let invalid = |message: &str| AppError::InvalidYearRange {
            start: self.years.start,
            end: self.years.end,
            message: message.to_string(),
        };
        validate_year_range(&self.years, self.reference_year).map_err(invalid)?;
        if self.mode == ForecastMode::Trend {
            validate_trend_horizon(&self.years, self.reference_year).map_err(invalid)?;
        }
        if self.mode != ForecastMode::Trend && self.granularity == Granularity::Monthly {
            return Err(AppError::validation(
                "granularity",
                "Monthly granularity is only available in trend mode",
            ));
        }
        if self.mode == ForecastMode::RandomWalk {
            validate_noise_band(self.noise_band)
                .map_err(|e| AppError::validation("noise_band", e))?;
        }
        Ok(())
    }
}

/// Assessments of a run plus the countries it could not cover
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastOutcome {
    pub assessments: Vec<RiskAssessment>,
    pub requested: Vec<String>,
    pub skipped: Vec<String>,
}

/// Risk forecaster over a shared fitted model and registry
#[derive(Clone)]
pub struct RiskForecaster {
    model: Arc<dyn Regressor>,
    registry: Arc<Registry>,
    ceiling: HistoricalCeiling,
    thresholds: ThresholdMode,
    weather_model: Option<ModelWeather>,
    stop: Arc<AtomicBool>,
}

impl RiskForecaster {
    pub fn new(model: Arc<dyn Regressor>, registry: Arc<Registry>, ceiling: HistoricalCeiling) -> Self {
        Self {
            model,
            registry,
            ceiling,
            thresholds: ThresholdMode::default(),
            weather_model: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdMode) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_weather_model(mut self, weather_model: ModelWeather) -> Self {
        self.weather_model = Some(weather_model);
        self
    }

    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Setting the flag stops a batch from starting further countries
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn thresholds(&self) -> ThresholdMode {
        self.thresholds
    }

    /// Classify a percentage on the configured ladder, returning the region used
    pub fn classify(&self, country: &str, risk_percentage: f64) -> (RiskLevel, Option<String>) {
        match self.thresholds {
            ThresholdMode::Regional => {
                let region = self.registry.region_for(country);
                (
                    classify_regional(risk_percentage, &region.thresholds),
                    Some(region.name.clone()),
                )
            }
            ThresholdMode::Universal => (classify_universal(risk_percentage), None),
        }
    }

    /// Evaluate one `(country, period)` from its covariates
    pub fn evaluate(
        &self,
        country: &str,
        period: Period,
        covariates: Covariates,
    ) -> AppResult<RiskAssessment> {
        let raw = self.model.predict_scalar(&covariates.to_features())?;
        if !raw.is_finite() {
            return Err(AppError::InvalidModelOutput {
                country: country.to_string(),
                period: period.to_string(),
            });
        }

        let historical_max = self
            .ceiling
            .for_region(&self.registry.region_for(country).name);
        let predicted_rate = substitute_zero_prediction(raw, historical_max);
        let risk_percentage = normalize(predicted_rate, historical_max);
        let (risk_level, region) = self.classify(country, risk_percentage);
        let factor = dominant_factor(self.model.feature_importances(), &FEATURE_NAMES)?;

        let context = match self.thresholds {
            ThresholdMode::Regional => Some(country),
            ThresholdMode::Universal => None,
        };
        let recommendations = recommend(risk_level, &factor, context, &self.registry);

        tracing::debug!(
            "{} {}: rate {:.4}, {:.2}% ({})",
            country,
            period,
            predicted_rate,
            risk_percentage,
            risk_level
        );

        Ok(RiskAssessment {
            country: country.to_string(),
            period,
            region,
            classification: self.thresholds,
            covariates,
            predicted_rate,
            risk_percentage,
            risk_level,
            dominant_factor: factor,
            advisory: advisory(risk_level).to_string(),
            recommendations,
        })
    }

    /// Forecast every period of the request for one country
    pub fn forecast_country(
        &self,
        table: &ObservationTable,
        country: &str,
        request: &ForecastRequest,
    ) -> AppResult<Vec<RiskAssessment>> {
        request.validate()?;
        if !table.contains(country) {
            return Err(AppError::MissingInput(format!("no observations for {}", country)));
        }
        let history = table.history(country);
        let mut assessments = Vec::with_capacity(request.years.len());

        match request.mode {
            ForecastMode::Trend => {
                let trend = TrendForecaster::fit(country, history)?;
                for year in request.years.years() {
                    let years_ahead = (year - request.reference_year) as u32;
                    let projected = trend.project(years_ahead, request.granularity);
                    for (offset, covariates) in projected.into_iter().enumerate() {
                        let period = request.granularity.period(year, offset);
                        assessments.push(self.evaluate(country, period, covariates)?);
                    }
                }
            }
            ForecastMode::RandomWalk => {
                let mut rng = match request.seed {
                    Some(seed) => StdRng::seed_from_u64(country_seed(seed, country)),
                    None => StdRng::from_os_rng(),
                };
                let mut walk = RandomWalk::start(country, history, request.noise_band)?;
                // One step per year since the latest observation, emitted or not
                let last_observed = history.last().map_or(request.years.start - 1, |o| o.year);
                for _ in (last_observed + 1)..request.years.start {
                    walk.step(&mut rng);
                }
                for year in request.years.years() {
                    let covariates = walk.step(&mut rng);
                    assessments.push(self.evaluate(country, Period::year(year), covariates)?);
                }
            }
            ForecastMode::Model => {
                let weather = self.weather_model.as_ref().ok_or_else(|| {
                    AppError::Configuration("model mode requires a weather model".to_string())
                })?;
                for year in request.years.years() {
                    let covariates = weather.covariates(country, year)?;
                    assessments.push(self.evaluate(country, Period::year(year), covariates)?);
                }
            }
        }

        Ok(assessments)
    }

    /// Forecast every dataset country in sorted order.
    ///
    /// Countries run in parallel; the result keeps the sorted order. Skippable
    /// per-country errors are logged and recorded, any other error aborts.
    pub fn forecast_batch(
        &self,
        table: &ObservationTable,
        request: &ForecastRequest,
    ) -> AppResult<ForecastOutcome> {
        request.validate()?;
        let countries = table.countries();
        self.run(table, countries, request)
    }

    /// Forecast one named country or, for `"all"`, the whole dataset
    pub fn forecast(
        &self,
        table: &ObservationTable,
        country: &str,
        request: &ForecastRequest,
    ) -> AppResult<ForecastOutcome> {
        if is_all_countries(country) {
            return self.forecast_batch(table, request);
        }
        request.validate()?;
        self.run(table, vec![country.trim().to_string()], request)
    }

    fn run(
        &self,
        table: &ObservationTable,
        countries: Vec<String>,
        request: &ForecastRequest,
    ) -> AppResult<ForecastOutcome> {
        tracing::info!(
            "Forecasting {} countries for {}..={} ({} mode)",
            countries.len(),
            request.years.start,
            request.years.end,
            request.mode
        );

        let results: Vec<(String, Option<Vec<RiskAssessment>>)> = countries
            .par_iter()
            .map(|country| {
                if self.stop.load(Ordering::Relaxed) {
                    return Ok((country.clone(), None));
                }
                match self.forecast_country(table, country, request) {
                    Ok(assessments) => Ok((country.clone(), Some(assessments))),
                    Err(e) if e.is_skippable() => {
                        tracing::warn!("Skipping {}: {}", country, e);
                        Ok((country.clone(), None))
                    }
                    Err(e) => Err(e),
                }
            })
            .collect::<AppResult<_>>()?;

        let mut outcome = ForecastOutcome {
            requested: countries,
            ..Default::default()
        };
        for (country, assessments) in results {
            match assessments {
                Some(assessments) => outcome.assessments.extend(assessments),
                None => outcome.skipped.push(country),
            }
        }

        tracing::info!(
            "Produced {} assessments, skipped {} countries",
            outcome.assessments.len(),
            outcome.skipped.len()
        );
        Ok(outcome)
    }
}
