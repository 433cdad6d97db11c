//! Errors raised by the pure domain layer

use thiserror::Error;

/// Violated preconditions of the domain functions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("feature importances ({importances}) and feature names ({names}) differ in length")]
    FeatureMismatch { importances: usize, names: usize },

    #[error("feature list is empty")]
    EmptyFeatures,

    #[error("default region '{0}' is not defined")]
    UnknownDefaultRegion(String),

    #[error("invalid registry: {0}")]
    InvalidRegistry(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
