//! Covariate forecasting for future periods
//!
//! Three sources are available: a least-squares trend over the history's row
//! index, a multiplicative random walk from the latest observation, and a
//! fitted weather model keyed on `[year, country_code]`.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::stats::{fit_index_trend, LinearTrend};
use shared::{Covariate, Covariates, Granularity, Observation};

use crate::error::{AppError, AppResult};
use crate::services::model::{CountryEncoder, Regressor};

/// Default random-walk noise band (±2% per year)
pub const DEFAULT_NOISE_BAND: f64 = 0.02;

/// Source of future covariate values
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMode {
    Trend,
    #[default]
    RandomWalk,
    Model,
}

impl std::fmt::Display for ForecastMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastMode::Trend => write!(f, "trend"),
            ForecastMode::RandomWalk => write!(f, "random_walk"),
            ForecastMode::Model => write!(f, "model"),
        }
    }
}

// ============================================================================
// Trend projection
// ============================================================================

/// One fitted line per covariate over the row index of a country's history
#[derive(Debug, Clone, PartialEq)]
pub struct TrendForecaster {
    trends: [LinearTrend; 4],
    rows: usize,
}

impl TrendForecaster {
    /// Fit against a chronologically sorted history
    pub fn fit(country: &str, history: &[Observation]) -> AppResult<Self> {
        let insufficient = || AppError::InsufficientHistory {
            country: country.to_string(),
        };
        if history.is_empty() {
            return Err(insufficient());
        }

        let mut trends = [LinearTrend {
            slope: 0.0,
            intercept: 0.0,
        }; 4];
        for covariate in Covariate::ALL {
            let series: Vec<f64> = history.iter().map(|o| o.covariates().get(covariate)).collect();
            trends[covariate.index()] = fit_index_trend(&series).ok_or_else(insufficient)?;
        }

        Ok(Self {
            trends,
            rows: history.len(),
        })
    }

    /// Row index projected for sub-period `offset` of a year `years_ahead` in the future.
    ///
    /// A horizon of zero is treated as one year ahead.
    pub fn future_index(&self, years_ahead: u32, periods_per_year: usize, offset: usize) -> usize {
        self.rows + (years_ahead as usize).saturating_sub(1) * periods_per_year + offset
    }

    /// Covariates for every sub-period of the target year.
    ///
    /// `years_ahead` must be at least one.
    pub fn project(&self, years_ahead: u32, granularity: Granularity) -> Vec<Covariates> {
        let periods = granularity.periods_per_year();
        (0..periods)
            .map(|offset| {
                let x = self.future_index(years_ahead.max(1), periods, offset) as f64;
                let mut covariates = Covariates::default();
                for covariate in Covariate::ALL {
                    covariates.set(covariate, self.trends[covariate.index()].at(x));
                }
                covariates
            })
            .collect()
    }
}

// ============================================================================
// Random walk
// ============================================================================

/// Compounding multiplicative walk starting at the latest observation
#[derive(Debug, Clone, PartialEq)]
pub struct RandomWalk {
    current: Covariates,
    band: f64,
}

impl RandomWalk {
    pub fn start(country: &str, history: &[Observation], band: f64) -> AppResult<Self> {
        let latest = history.last().ok_or_else(|| AppError::InsufficientHistory {
            country: country.to_string(),
        })?;
        Ok(Self {
            current: latest.covariates(),
            band,
        })
    }

    pub fn current(&self) -> Covariates {
        self.current
    }

    /// Advance one year: scale each covariate, in feature order, by `U(1 - band, 1 + band)`
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Covariates {
        for covariate in Covariate::ALL {
            let factor = rng.random_range((1.0 - self.band)..=(1.0 + self.band));
            let value = self.current.get(covariate) * factor;
            self.current.set(covariate, value);
        }
        self.current
    }
}

/// Per-country stream seed derived from the global seed
pub fn country_seed(seed: u64, country: &str) -> u64 {
    seed.wrapping_add(fnv1a(country.as_bytes()))
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

// ============================================================================
// Fitted weather model
// ============================================================================

/// Weather model predicting all four covariates from `[year, country_code]`
#[derive(Clone)]
pub struct ModelWeather {
    model: Arc<dyn Regressor>,
    encoder: CountryEncoder,
}

impl ModelWeather {
    pub fn new(model: Arc<dyn Regressor>, encoder: CountryEncoder) -> Self {
        Self { model, encoder }
    }

    pub fn covariates(&self, country: &str, year: i32) -> AppResult<Covariates> {
        let code = self
            .encoder
            .encode(country)
            .ok_or_else(|| AppError::MissingInput(format!("no country code for {}", country)))?;

        let outputs = self.model.predict(&[f64::from(year), code as f64])?;
        Covariates::from_slice(&outputs).ok_or_else(|| {
            AppError::ModelArtifact(format!(
                "weather model returned {} values, expected 4",
                outputs.len()
            ))
        })
    }
}
