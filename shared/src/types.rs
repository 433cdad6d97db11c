//! Common types used across the pipeline

use serde::{Deserialize, Serialize};

/// Ordered covariate column names consumed by the disease-rate model
pub const FEATURE_NAMES: [&str; 4] = [
    "Temperature_Celsius",
    "Dew_Point_Celsius",
    "Relative_Humidity",
    "TP",
];

/// One of the four environmental covariates, in model input order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Covariate {
    Temperature,
    DewPoint,
    RelativeHumidity,
    Precipitation,
}

impl Covariate {
    pub const ALL: [Covariate; 4] = [
        Covariate::Temperature,
        Covariate::DewPoint,
        Covariate::RelativeHumidity,
        Covariate::Precipitation,
    ];

    /// Column name of the covariate in the dataset and model input
    pub fn feature_name(&self) -> &'static str {
        FEATURE_NAMES[self.index()]
    }

    pub fn index(&self) -> usize {
        match self {
            Covariate::Temperature => 0,
            Covariate::DewPoint => 1,
            Covariate::RelativeHumidity => 2,
            Covariate::Precipitation => 3,
        }
    }
}

/// A covariate vector aligned with [`FEATURE_NAMES`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Covariates {
    pub temperature: f64,
    pub dew_point: f64,
    pub relative_humidity: f64,
    pub precipitation: f64,
}

impl Covariates {
    pub fn new(temperature: f64, dew_point: f64, relative_humidity: f64, precipitation: f64) -> Self {
        Self {
            temperature,
            dew_point,
            relative_humidity,
            precipitation,
        }
    }

    /// Feature vector in model input order
    pub fn to_features(&self) -> [f64; 4] {
        [
            self.temperature,
            self.dew_point,
            self.relative_humidity,
            self.precipitation,
        ]
    }

    /// Build from a model output row; `None` unless exactly four values are given
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [t, d, h, p] => Some(Self::new(*t, *d, *h, *p)),
            _ => None,
        }
    }

    pub fn get(&self, covariate: Covariate) -> f64 {
        self.to_features()[covariate.index()]
    }

    pub fn set(&mut self, covariate: Covariate, value: f64) {
        match covariate {
            Covariate::Temperature => self.temperature = value,
            Covariate::DewPoint => self.dew_point = value,
            Covariate::RelativeHumidity => self.relative_humidity = value,
            Covariate::Precipitation => self.precipitation = value,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.to_features().iter().all(|v| v.is_finite())
    }
}

/// Forecast period: a year, optionally narrowed to a calendar month (1-12)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: Option<u32>,
}

impl Period {
    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.month {
            Some(month) => write!(f, "{}-{:02}", self.year, month),
            None => write!(f, "{}", self.year),
        }
    }
}

/// Inclusive range of forecast years
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn single(year: i32) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of sub-periods forecast within each year
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Yearly,
    Monthly,
}

impl Granularity {
    pub fn periods_per_year(&self) -> usize {
        match self {
            Granularity::Yearly => 1,
            Granularity::Monthly => 12,
        }
    }

    /// Period for the zero-based sub-period `offset` of `year`
    pub fn period(&self, year: i32, offset: usize) -> Period {
        match self {
            Granularity::Yearly => Period::year(year),
            Granularity::Monthly => Period::month(year, offset as u32 + 1),
        }
    }
}
