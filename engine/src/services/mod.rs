//! Pipeline services for the risk forecasting engine

pub mod analysis;
pub mod dataset;
pub mod forecast;
pub mod model;
pub mod reporting;
pub mod weather;

pub use dataset::ObservationTable;
pub use forecast::{CeilingScope, ForecastOutcome, ForecastRequest, HistoricalCeiling, RiskForecaster};
pub use model::{CountryEncoder, LinearModel, Regressor};
pub use reporting::{OutputFormat, RunManifest};
pub use weather::{ForecastMode, ModelWeather, RandomWalk, TrendForecaster};
