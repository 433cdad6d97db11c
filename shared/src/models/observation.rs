//! Historical observation records

use serde::{Deserialize, Serialize};

use crate::types::{Covariates, Period};

/// One cleaned historical record for a country
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    #[serde(rename = "Country Name")]
    pub country: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month", default)]
    pub month: Option<u32>,
    #[serde(rename = "Temperature_Celsius")]
    pub temperature: f64,
    #[serde(rename = "Dew_Point_Celsius")]
    pub dew_point: f64,
    #[serde(rename = "Relative_Humidity")]
    pub relative_humidity: f64,
    #[serde(rename = "TP")]
    pub precipitation: f64,
    #[serde(rename = "Leptospirosis_Rate")]
    pub disease_rate: f64,
}

impl Observation {
    pub fn covariates(&self) -> Covariates {
        Covariates::new(
            self.temperature,
            self.dew_point,
            self.relative_humidity,
            self.precipitation,
        )
    }

    pub fn period(&self) -> Period {
        Period {
            year: self.year,
            month: self.month,
        }
    }
}

/// Sort observations chronologically (year, then month; rows without a month first)
pub fn sort_chronologically(observations: &mut [Observation]) {
    observations.sort_by_key(|o| (o.year, o.month));
}

/// Maximum observed disease rate, `None` for an empty slice
pub fn max_disease_rate(observations: &[Observation]) -> Option<f64> {
    observations
        .iter()
        .map(|o| o.disease_rate)
        .filter(|r| r.is_finite())
        .fold(None, |acc, r| match acc {
            Some(m) if m >= r => Some(m),
            _ => Some(r),
        })
}
