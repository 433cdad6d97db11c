//! Validation utilities for the risk pipeline
//!
//! Request-level checks run before any computation starts.

use crate::models::{Observation, ThresholdPolicy};
use crate::types::YearRange;

// ============================================================================
// Threshold and Ceiling Validations
// ============================================================================

/// Validate that cut points lie on the 0-100 scale in strictly ascending order
pub fn validate_threshold_policy(policy: &ThresholdPolicy) -> Result<(), &'static str> {
    let cuts = [policy.low, policy.moderate, policy.high];
    if cuts.iter().any(|c| !c.is_finite()) {
        return Err("Threshold cut points must be finite");
    }
    if cuts.iter().any(|c| *c < 0.0 || *c > 100.0) {
        return Err("Threshold cut points must be between 0 and 100");
    }
    if !(policy.low < policy.moderate && policy.moderate < policy.high) {
        return Err("Threshold cut points must be strictly ascending");
    }
    if !policy.temperature_threshold.is_finite() || !policy.humidity_threshold.is_finite() {
        return Err("Climate thresholds must be finite");
    }
    Ok(())
}

/// Validate a normalization ceiling
pub fn validate_historical_max(historical_max: f64) -> Result<(), &'static str> {
    if !historical_max.is_finite() || historical_max <= 0.0 {
        return Err("Historical maximum must be a positive number");
    }
    Ok(())
}

// ============================================================================
// Request Validations
// ============================================================================

/// Validate a forecast year range against the present year
pub fn validate_year_range(range: &YearRange, reference_year: i32) -> Result<(), &'static str> {
    if range.end < range.start {
        return Err("End year must not be before start year");
    }
    if range.end < reference_year {
        return Err("End year must not be before the present year");
    }
    Ok(())
}

/// Trend projection needs every target year strictly after the present year
pub fn validate_trend_horizon(range: &YearRange, reference_year: i32) -> Result<(), &'static str> {
    if range.start <= reference_year {
        return Err("Trend forecasts must start after the present year");
    }
    Ok(())
}

/// Validate the random-walk noise band (fraction, e.g. 0.02 for ±2%)
pub fn validate_noise_band(band: f64) -> Result<(), &'static str> {
    if !band.is_finite() || band <= 0.0 || band > 0.5 {
        return Err("Noise band must be greater than 0 and at most 0.5");
    }
    Ok(())
}

/// Validate a requested country name
pub fn validate_country_name(country: &str) -> Result<(), &'static str> {
    if country.trim().is_empty() {
        return Err("Country name must not be empty");
    }
    Ok(())
}

/// Whether the request targets every country in the dataset
pub fn is_all_countries(country: &str) -> bool {
    country.trim().eq_ignore_ascii_case("all")
}

// ============================================================================
// Observation Validations
// ============================================================================

pub fn validate_month(month: u32) -> Result<(), &'static str> {
    if !(1..=12).contains(&month) {
        return Err("Month must be between 1 and 12");
    }
    Ok(())
}

/// Validate a cleaned observation row
pub fn validate_observation(observation: &Observation) -> Result<(), &'static str> {
    validate_country_name(&observation.country)?;
    if let Some(month) = observation.month {
        validate_month(month)?;
    }
    if !observation.covariates().is_finite() || !observation.disease_rate.is_finite() {
        return Err("Observation values must be finite");
    }
    if observation.relative_humidity < 0.0 || observation.relative_humidity > 100.0 {
        return Err("Relative humidity must be between 0 and 100%");
    }
    if observation.precipitation < 0.0 {
        return Err("Precipitation cannot be negative");
    }
    if observation.disease_rate < 0.0 {
        return Err("Disease rate cannot be negative");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation() -> Observation {
        Observation {
            country: "Netherlands".to_string(),
            year: 2020,
            month: Some(6),
            temperature: 18.5,
            dew_point: 12.1,
            relative_humidity: 78.0,
            precipitation: 2.4,
            disease_rate: 0.42,
        }
    }

    // ========================================================================
    // Threshold Validation Tests
    // ========================================================================

    #[test]
    fn test_threshold_policy_valid() {
        assert!(validate_threshold_policy(&ThresholdPolicy::new(20.0, 35.0, 50.0)).is_ok());
        assert!(validate_threshold_policy(&ThresholdPolicy::new(0.0, 50.0, 100.0)).is_ok());
    }

    #[test]
    fn test_threshold_policy_unordered() {
        assert!(validate_threshold_policy(&ThresholdPolicy::new(35.0, 20.0, 50.0)).is_err());
        assert!(validate_threshold_policy(&ThresholdPolicy::new(20.0, 20.0, 50.0)).is_err());
    }

    #[test]
    fn test_threshold_policy_out_of_scale() {
        assert!(validate_threshold_policy(&ThresholdPolicy::new(-1.0, 35.0, 50.0)).is_err());
        assert!(validate_threshold_policy(&ThresholdPolicy::new(20.0, 35.0, 101.0)).is_err());
        assert!(validate_threshold_policy(&ThresholdPolicy::new(20.0, f64::NAN, 50.0)).is_err());
    }

    #[test]
    fn test_historical_max() {
        assert!(validate_historical_max(10.0).is_ok());
        assert!(validate_historical_max(0.0).is_err());
        assert!(validate_historical_max(-2.0).is_err());
        assert!(validate_historical_max(f64::INFINITY).is_err());
    }

    // ========================================================================
    // Request Validation Tests
    // ========================================================================

    #[test]
    fn test_year_range_valid() {
        assert!(validate_year_range(&YearRange::new(2026, 2030), 2026).is_ok());
        assert!(validate_year_range(&YearRange::single(2027), 2026).is_ok());
    }

    #[test]
    fn test_year_range_reversed() {
        assert!(validate_year_range(&YearRange::new(2030, 2026), 2025).is_err());
    }

    #[test]
    fn test_year_range_in_the_past() {
        assert!(validate_year_range(&YearRange::new(2020, 2022), 2026).is_err());
    }

    #[test]
    fn test_trend_horizon() {
        assert!(validate_trend_horizon(&YearRange::new(2027, 2028), 2026).is_ok());
        assert!(validate_trend_horizon(&YearRange::new(2026, 2028), 2026).is_err());
    }

    #[test]
    fn test_noise_band() {
        assert!(validate_noise_band(0.02).is_ok());
        assert!(validate_noise_band(0.5).is_ok());
        assert!(validate_noise_band(0.0).is_err());
        assert!(validate_noise_band(0.6).is_err());
    }

    #[test]
    fn test_all_countries_keyword() {
        assert!(is_all_countries("all"));
        assert!(is_all_countries(" All "));
        assert!(!is_all_countries("Albania"));
    }

    #[test]
    fn test_country_name() {
        assert!(validate_country_name("Italy").is_ok());
        assert!(validate_country_name("   ").is_err());
    }

    // ========================================================================
    // Observation Validation Tests
    // ========================================================================

    #[test]
    fn test_observation_valid() {
        assert!(validate_observation(&observation()).is_ok());
        let mut without_month = observation();
        without_month.month = None;
        assert!(validate_observation(&without_month).is_ok());
    }

    #[test]
    fn test_observation_bad_month() {
        let mut obs = observation();
        obs.month = Some(13);
        assert!(validate_observation(&obs).is_err());
    }

    #[test]
    fn test_observation_bad_values() {
        let mut humid = observation();
        humid.relative_humidity = 120.0;
        assert!(validate_observation(&humid).is_err());

        let mut negative_rate = observation();
        negative_rate.disease_rate = -0.1;
        assert!(validate_observation(&negative_rate).is_err());

        let mut nan = observation();
        nan.temperature = f64::NAN;
        assert!(validate_observation(&nan).is_err());
    }
}
