//! Assembles the read-only inputs of a run: dataset, registry, models

use std::sync::Arc;

use shared::{Registry, YearRange};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::{
    ForecastRequest, HistoricalCeiling, LinearModel, ModelWeather, ObservationTable, Regressor,
    RiskForecaster,
};

/// Everything a command needs, loaded once up front
pub struct Pipeline {
    pub table: ObservationTable,
    pub model: Arc<dyn Regressor>,
    pub forecaster: RiskForecaster,
}

impl Pipeline {
    /// Load inputs named by the configuration.
    ///
    /// A missing or empty dataset is reported as [`AppError::MissingInput`].
    pub fn load(config: &Config) -> AppResult<Self> {
        let table = ObservationTable::load(&config.data.dataset_path)?;
        tracing::info!(
            "Loaded {} observations for {} countries ({} rows dropped)",
            table.len(),
            table.countries().len(),
            table.dropped_rows()
        );

        let registry = match &config.data.registry_path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Configuration(format!("registry {}: {}", path, e))
                })?;
                Registry::from_json(&json)?
            }
            None => Registry::european(),
        };

        let model: Arc<dyn Regressor> = Arc::new(LinearModel::load(&config.models.risk_model_path)?);
        let weather = match &config.models.weather_model_path {
            Some(path) => Some(Arc::new(LinearModel::load(path)?) as Arc<dyn Regressor>),
            None => None,
        };

        Self::from_parts(table, model, registry, config, weather)
    }

    /// Build from already loaded parts
    pub fn from_parts(
        table: ObservationTable,
        model: Arc<dyn Regressor>,
        registry: Registry,
        config: &Config,
        weather: Option<Arc<dyn Regressor>>,
    ) -> AppResult<Self> {
        if table.is_empty() {
            return Err(AppError::MissingInput("dataset has no usable rows".to_string()));
        }

        let ceiling = HistoricalCeiling::from_table(
            &table,
            &registry,
            config.risk.ceiling,
            config.risk.historical_max,
        )?;
        tracing::info!("Historical maximum: {:.4}", ceiling.global_max());

        let mut forecaster = RiskForecaster::new(Arc::clone(&model), Arc::new(registry), ceiling)
            .with_thresholds(config.risk.thresholds);
        if let Some(weather) = weather {
            forecaster = forecaster.with_weather_model(ModelWeather::new(weather, table.encoder()));
        }

        Ok(Self {
            table,
            model,
            forecaster,
        })
    }

    /// Forecast request for a year range under the configured settings
    pub fn request(config: &Config, years: YearRange) -> ForecastRequest {
        ForecastRequest {
            years,
            mode: config.forecast.mode,
            granularity: config.forecast.granularity,
            noise_band: config.forecast.noise_band,
            seed: config.forecast.seed,
            reference_year: config.reference_year(),
        }
    }
}
