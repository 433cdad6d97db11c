//! Risk normalization, classification and assessment records

use serde::{Deserialize, Serialize};

use crate::models::ThresholdPolicy;
use crate::types::{Covariates, Period};

/// Smallest percentage reported for a positive ceiling
pub const RISK_FLOOR_PERCENT: f64 = 0.1;

/// Upper bound of the risk-percentage scale
pub const RISK_CEILING_PERCENT: f64 = 100.0;

/// Universal cut points used when no country context is available
pub const UNIVERSAL_LOW: f64 = 25.0;
pub const UNIVERSAL_MODERATE: f64 = 50.0;
pub const UNIVERSAL_HIGH: f64 = 75.0;

/// Discrete risk level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Moderate => write!(f, "Moderate"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::VeryHigh => write!(f, "Very High"),
        }
    }
}

/// Which classification ladder produced a risk level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Fixed 25/50/75 cut points, no country context
    Universal,
    /// Cut points of the country's region
    #[default]
    Regional,
}

impl std::fmt::Display for ThresholdMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdMode::Universal => write!(f, "universal"),
            ThresholdMode::Regional => write!(f, "regional"),
        }
    }
}

/// Convert a predicted rate into a percentage of the historical ceiling.
///
/// A non-positive ceiling yields `0.0`. Otherwise the result is clamped to
/// `[RISK_FLOOR_PERCENT, RISK_CEILING_PERCENT]`, so a zero or negative
/// prediction still reports the nominal floor.
pub fn normalize(predicted_rate: f64, historical_max: f64) -> f64 {
    if !(historical_max > 0.0) {
        return 0.0;
    }
    let percentage = (predicted_rate / historical_max) * 100.0;
    percentage.clamp(RISK_FLOOR_PERCENT, RISK_CEILING_PERCENT)
}

/// Replacement for an exactly-zero model output
pub fn zero_prediction_floor(historical_max: f64) -> f64 {
    (historical_max * 0.01).max(0.01)
}

/// Substitute the minimal floor when the model returned exactly zero
pub fn substitute_zero_prediction(predicted_rate: f64, historical_max: f64) -> f64 {
    if predicted_rate == 0.0 {
        zero_prediction_floor(historical_max)
    } else {
        predicted_rate
    }
}

/// Classify against the fixed 25/50/75 ladder
pub fn classify_universal(risk_percentage: f64) -> RiskLevel {
    if risk_percentage >= UNIVERSAL_HIGH {
        RiskLevel::VeryHigh
    } else if risk_percentage >= UNIVERSAL_MODERATE {
        RiskLevel::High
    } else if risk_percentage >= UNIVERSAL_LOW {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Classify against a regional policy.
///
/// Cut points are inclusive lower bounds read from the top down. The tier at or
/// above `policy.moderate` is reported as `High` and the tier at or above
/// `policy.high` as `VeryHigh`; the level names sit one step above the names of
/// the cut points that select them.
pub fn classify_regional(risk_percentage: f64, policy: &ThresholdPolicy) -> RiskLevel {
    if risk_percentage >= policy.high {
        RiskLevel::VeryHigh
    } else if risk_percentage >= policy.moderate {
        RiskLevel::High
    } else if risk_percentage >= policy.low {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// One-line action summary for a risk level
pub fn advisory(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::VeryHigh => {
            "Immediate intervention needed: strengthen hygiene measures, improve drainage, and provide medical aid"
        }
        RiskLevel::High => {
            "Increased alert: promote sanitation, ensure clean water, and conduct awareness programs"
        }
        RiskLevel::Moderate => {
            "Stay cautious: monitor conditions closely, educate communities, and improve waste management"
        }
        RiskLevel::Low => "Low risk: maintain hygiene practices and regular monitoring",
    }
}

/// Immutable result of one (country, period) evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub country: String,
    pub period: Period,
    /// Region whose thresholds classified the record; `None` on the universal ladder
    pub region: Option<String>,
    pub classification: ThresholdMode,
    pub covariates: Covariates,
    pub predicted_rate: f64,
    pub risk_percentage: f64,
    pub risk_level: RiskLevel,
    pub dominant_factor: String,
    pub advisory: String,
    pub recommendations: Vec<String>,
}
