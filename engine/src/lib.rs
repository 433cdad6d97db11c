//! Leptospirosis risk forecasting engine
//!
//! Loads the historical dataset and fitted models, forecasts covariates,
//! classifies predicted risk and exports the resulting assessments.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use pipeline::Pipeline;
