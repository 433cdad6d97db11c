//! Configuration management for the risk forecasting engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with LEPTO__ prefix

use chrono::Datelike;
use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{Granularity, ThresholdMode};
use validator::Validate;

use crate::services::forecast::CeilingScope;
use crate::services::reporting::OutputFormat;
use crate::services::weather::ForecastMode;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Input dataset and reference data
    #[validate]
    pub data: DataConfig,

    /// Fitted model artifacts
    #[validate]
    pub models: ModelConfig,

    /// Covariate forecasting
    #[validate]
    pub forecast: ForecastConfig,

    /// Normalization and classification
    #[validate]
    pub risk: RiskConfig,

    /// Output destination
    #[validate]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct DataConfig {
    /// Cleaned observation table (CSV)
    #[validate(length(min = 1))]
    pub dataset_path: String,

    /// Region/country registry (JSON); the built-in European registry when absent
    pub registry_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ModelConfig {
    /// Disease-rate model artifact
    #[validate(length(min = 1))]
    pub risk_model_path: String,

    /// Weather model artifact, required only for the `model` forecast mode
    pub weather_model_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ForecastConfig {
    /// Covariate source
    pub mode: ForecastMode,

    /// Periods per forecast year for the trend mode
    pub granularity: Granularity,

    /// Random-walk noise band as a fraction (0.02 = ±2%)
    #[validate(range(min = 0.0001, max = 0.5))]
    pub noise_band: f64,

    /// Global random-walk seed; entropy-seeded when absent
    pub seed: Option<u64>,

    /// Present year; the system clock when absent
    pub reference_year: Option<i32>,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct RiskConfig {
    /// Classification ladder
    pub thresholds: ThresholdMode,

    /// Fixed normalization ceiling; computed from the dataset when absent
    #[validate(range(min = 0.000001))]
    pub historical_max: Option<f64>,

    /// Global or per-region ceiling
    pub ceiling: CeilingScope,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct OutputConfig {
    /// Output file for assessment rows
    #[validate(length(min = 1))]
    pub path: String,

    /// Output format; inferred from the path extension when absent
    pub format: Option<OutputFormat>,

    /// Write a JSON run manifest next to the output
    pub manifest: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("LEPTO_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("data.dataset_path", "ml_data.csv")?
            .set_default("models.risk_model_path", "models/risk_model.json")?
            .set_default("forecast.mode", "random_walk")?
            .set_default("forecast.granularity", "yearly")?
            .set_default("forecast.noise_band", 0.02)?
            .set_default("risk.thresholds", "regional")?
            .set_default("risk.ceiling", "global")?
            .set_default("output.path", "leptospirosis_predictions.csv")?
            .set_default("output.manifest", true)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (LEPTO__ prefix)
            .add_source(
                Environment::with_prefix("LEPTO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Present year used for horizon arithmetic and range validation
    pub fn reference_year(&self) -> i32 {
        self.forecast
            .reference_year
            .unwrap_or_else(|| chrono::Utc::now().year())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            data: DataConfig {
                dataset_path: "ml_data.csv".to_string(),
                registry_path: None,
            },
            models: ModelConfig {
                risk_model_path: "models/risk_model.json".to_string(),
                weather_model_path: None,
            },
            forecast: ForecastConfig::default(),
            risk: RiskConfig::default(),
            output: OutputConfig {
                path: "leptospirosis_predictions.csv".to_string(),
                format: None,
                manifest: true,
            },
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            mode: ForecastMode::RandomWalk,
            granularity: Granularity::Yearly,
            noise_band: 0.02,
            seed: None,
            reference_year: None,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdMode::Regional,
            historical_max: None,
            ceiling: CeilingScope::Global,
        }
    }
}
