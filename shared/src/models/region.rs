//! Regional threshold policies

use serde::{Deserialize, Serialize};

/// Cut points on the 0-100 risk-percentage scale, plus advisory climate thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ThresholdPolicy {
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
    /// Advisory temperature threshold (°C)
    pub temperature_threshold: f64,
    /// Advisory relative humidity threshold (%)
    pub humidity_threshold: f64,
}

impl ThresholdPolicy {
    pub fn new(low: f64, moderate: f64, high: f64) -> Self {
        Self {
            low,
            moderate,
            high,
            temperature_threshold: 15.0,
            humidity_threshold: 75.0,
        }
    }

    pub fn with_climate(mut self, temperature_threshold: f64, humidity_threshold: f64) -> Self {
        self.temperature_threshold = temperature_threshold;
        self.humidity_threshold = humidity_threshold;
        self
    }
}

/// A named group of countries sharing one threshold policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionDefinition {
    pub name: String,
    pub countries: Vec<String>,
    pub thresholds: ThresholdPolicy,
}

impl RegionDefinition {
    pub fn contains(&self, country: &str) -> bool {
        self.countries.iter().any(|c| c == country)
    }
}
