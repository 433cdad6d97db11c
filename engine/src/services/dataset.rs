//! Historical observation table
//!
//! Loads the cleaned dataset, drops incomplete rows and groups the remainder
//! by country in chronological order.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use shared::{max_disease_rate, sort_chronologically, validate_observation, Observation, Registry};

use crate::error::{AppError, AppResult};
use crate::services::model::CountryEncoder;

/// Dataset row as it appears on disk; any missing or unparseable value drops the row
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "Country Name", default)]
    country: Option<String>,
    #[serde(rename = "Year", default, deserialize_with = "csv::invalid_option")]
    year: Option<i32>,
    #[serde(rename = "Month", default, deserialize_with = "csv::invalid_option")]
    month: Option<u32>,
    #[serde(rename = "Date", default)]
    date: Option<String>,
    #[serde(
        rename = "Temperature_Celsius",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    temperature: Option<f64>,
    #[serde(
        rename = "Dew_Point_Celsius",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    dew_point: Option<f64>,
    #[serde(
        rename = "Relative_Humidity",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    relative_humidity: Option<f64>,
    #[serde(rename = "TP", default, deserialize_with = "csv::invalid_option")]
    precipitation: Option<f64>,
    #[serde(
        rename = "Leptospirosis_Rate",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    disease_rate: Option<f64>,
}

impl RawRecord {
    fn into_observation(self) -> Option<Observation> {
        let date = self
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

        let country = self.country?.trim().to_string();
        let year = self.year.or_else(|| date.map(|d| d.year()))?;
        let month = self.month.or_else(|| date.map(|d| d.month()));

        Some(Observation {
            country,
            year,
            month,
            temperature: self.temperature?,
            dew_point: self.dew_point?,
            relative_humidity: self.relative_humidity?,
            precipitation: self.precipitation?,
            disease_rate: self.disease_rate?,
        })
    }
}

/// Observations grouped by country, each history sorted by (year, month)
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    by_country: BTreeMap<String, Vec<Observation>>,
    dropped: usize,
}

impl ObservationTable {
    /// Load the dataset file; a missing file is reported as [`AppError::MissingInput`]
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::MissingInput(format!("dataset {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut observations = Vec::new();
        let mut dropped = 0;

        for record in rdr.deserialize::<RawRecord>() {
            let observation = record?
                .into_observation()
                .filter(|o| validate_observation(o).is_ok());
            match observation {
                Some(o) => observations.push(o),
                None => dropped += 1,
            }
        }

        let mut table = Self::from_observations(observations);
        table.dropped = dropped;
        Ok(table)
    }

    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut by_country: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
        for observation in observations {
            by_country
                .entry(observation.country.clone())
                .or_default()
                .push(observation);
        }
        for history in by_country.values_mut() {
            sort_chronologically(history);
        }
        Self {
            by_country,
            dropped: 0,
        }
    }

    /// Country names in sorted order
    pub fn countries(&self) -> Vec<String> {
        self.by_country.keys().cloned().collect()
    }

    pub fn contains(&self, country: &str) -> bool {
        self.by_country.contains_key(country)
    }

    /// Chronological history of one country; empty when the country is absent
    pub fn history(&self, country: &str) -> &[Observation] {
        self.by_country
            .get(country)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Most recent observation of one country
    pub fn latest(&self, country: &str) -> Option<&Observation> {
        self.history(country).last()
    }

    /// All observations, grouped by country
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.by_country.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_country.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_country.is_empty()
    }

    /// Rows rejected while loading
    pub fn dropped_rows(&self) -> usize {
        self.dropped
    }

    /// Largest disease rate across the whole dataset
    pub fn historical_max(&self) -> Option<f64> {
        self.by_country
            .values()
            .filter_map(|history| max_disease_rate(history))
            .reduce(f64::max)
    }

    /// Largest disease rate per region, keyed by region name
    pub fn regional_maxima(&self, registry: &Registry) -> BTreeMap<String, f64> {
        let mut maxima: BTreeMap<String, f64> = BTreeMap::new();
        for (country, history) in &self.by_country {
            let Some(max) = max_disease_rate(history) else {
                continue;
            };
            let region = registry.region_for(country).name.clone();
            maxima
                .entry(region)
                .and_modify(|m| *m = m.max(max))
                .or_insert(max);
        }
        maxima
    }

    /// Country code encoder over the dataset's countries
    pub fn encoder(&self) -> CountryEncoder {
        CountryEncoder::fit(self.by_country.keys().cloned())
    }
}
