//! Fitted-model capability and the artifacts that provide it
//!
//! The pipeline only needs two operations from a fitted regressor: predicting
//! one row and reporting feature importances. Training happens elsewhere.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A fitted regression model shared read-only across evaluations
pub trait Regressor: Send + Sync {
    /// Predict all outputs for one feature row
    fn predict(&self, features: &[f64]) -> AppResult<Vec<f64>>;

    /// Importances aligned with the model's input features
    fn feature_importances(&self) -> &[f64];

    /// Predict a model with exactly one output
    fn predict_scalar(&self, features: &[f64]) -> AppResult<f64> {
        let outputs = self.predict(features)?;
        match outputs.as_slice() {
            [value] => Ok(*value),
            _ => Err(AppError::ModelArtifact(format!(
                "expected a single output, got {}",
                outputs.len()
            ))),
        }
    }
}

/// Linear model artifact: one intercept and coefficient row per output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub intercepts: Vec<f64>,
    pub coefficients: Vec<Vec<f64>>,
    pub importances: Vec<f64>,
}

impl LinearModel {
    /// Parse and check an artifact document
    pub fn from_json(json: &str) -> AppResult<Self> {
        let model: LinearModel = serde_json::from_str(json)?;
        model.check()?;
        Ok(model)
    }

    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::ModelArtifact(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    fn check(&self) -> AppResult<()> {
        let inputs = self.feature_names.len();
        if inputs == 0 {
            return Err(AppError::ModelArtifact("no input features".to_string()));
        }
        if self.intercepts.is_empty() || self.intercepts.len() != self.coefficients.len() {
            return Err(AppError::ModelArtifact(format!(
                "{} intercepts for {} coefficient rows",
                self.intercepts.len(),
                self.coefficients.len()
            )));
        }
        if self.coefficients.iter().any(|row| row.len() != inputs) {
            return Err(AppError::ModelArtifact(format!(
                "coefficient rows must have {} entries",
                inputs
            )));
        }
        if self.importances.len() != inputs {
            return Err(AppError::ModelArtifact(format!(
                "{} importances for {} features",
                self.importances.len(),
                inputs
            )));
        }
        Ok(())
    }

    pub fn outputs(&self) -> usize {
        self.intercepts.len()
    }
}

impl Regressor for LinearModel {
    fn predict(&self, features: &[f64]) -> AppResult<Vec<f64>> {
        if features.len() != self.feature_names.len() {
            return Err(AppError::ModelArtifact(format!(
                "expected {} features, got {}",
                self.feature_names.len(),
                features.len()
            )));
        }
        Ok(self
            .intercepts
            .iter()
            .zip(&self.coefficients)
            .map(|(intercept, row)| {
                intercept + row.iter().zip(features).map(|(c, x)| c * x).sum::<f64>()
            })
            .collect())
    }

    fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

/// Dense integer codes for country names, assigned in sorted name order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryEncoder {
    codes: BTreeMap<String, usize>,
}

impl CountryEncoder {
    pub fn fit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sorted: Vec<String> = names.into_iter().map(Into::into).collect();
        sorted.sort();
        sorted.dedup();
        let codes = sorted
            .into_iter()
            .enumerate()
            .map(|(code, name)| (name, code))
            .collect();
        Self { codes }
    }

    pub fn encode(&self, name: &str) -> Option<usize> {
        self.codes.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
