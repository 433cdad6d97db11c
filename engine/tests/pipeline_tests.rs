//! Tests for pipeline assembly, current assessments, analysis and export

use std::sync::Arc;

use engine::services::analysis::{analyze, assess, assess_current};
use engine::services::reporting::{export_csv, export_json, AssessmentRow};
use engine::services::{CeilingScope, LinearModel, ObservationTable, Regressor};
use engine::{AppError, Config, Pipeline};
use shared::{Period, Registry, RiskLevel, ThresholdMode};

const DATASET: &str = "\
Country Name,Year,Month,Temperature_Celsius,Dew_Point_Celsius,Relative_Humidity,TP,Leptospirosis_Rate
Netherlands,2021,1,3.5,1.0,88.0,0.25,0.4
Netherlands,2021,7,18.0,12.0,78.0,0.30,1.2
Netherlands,2022,7,19.0,13.0,76.0,0.28,1.6
Italy,2021,1,8.0,3.0,75.0,0.20,0.8
Italy,2021,7,26.0,16.0,60.0,0.05,4.0
Italy,2022,7,27.0,17.0,58.0,,3.0
Norway,2022,7,14.0,8.0,80.0,0.35,0.5
";

/// Linear risk model weighting temperature most heavily
const RISK_MODEL: &str = r#"{
    "feature_names": ["Temperature_Celsius", "Dew_Point_Celsius", "Relative_Humidity", "TP"],
    "intercepts": [0.0],
    "coefficients": [[0.1, 0.0, 0.0, 0.0]],
    "importances": [0.55, 0.15, 0.2, 0.1]
}"#;

fn table() -> ObservationTable {
    ObservationTable::from_reader(DATASET.as_bytes()).unwrap()
}

fn model() -> Arc<dyn Regressor> {
    Arc::new(LinearModel::from_json(RISK_MODEL).unwrap())
}

fn pipeline(config: &Config) -> Pipeline {
    Pipeline::from_parts(table(), model(), Registry::european(), config, None).unwrap()
}

// =============================================================================
// Pipeline assembly
// =============================================================================

mod assembly {
    use super::*;

    #[test]
    fn incomplete_rows_are_dropped_on_load() {
        let t = table();
        assert_eq!(t.len(), 6);
        assert_eq!(t.dropped_rows(), 1);
        assert_eq!(t.countries(), vec!["Italy", "Netherlands", "Norway"]);
    }

    #[test]
    fn empty_dataset_is_a_skippable_input() {
        let empty = ObservationTable::from_reader(DATASET.lines().next().unwrap().as_bytes()).unwrap();
        let err = Pipeline::from_parts(empty, model(), Registry::european(), &Config::default(), None)
            .err()
            .unwrap();
        assert!(matches!(err, AppError::MissingInput(_)));
        assert!(err.is_skippable());
    }

    #[test]
    fn all_zero_rates_assemble_with_zero_risk() {
        let zero_rates: String = DATASET
            .lines()
            .map(|line| match line.rsplit_once(',') {
                Some((head, _)) if !line.starts_with("Country") => format!("{},0.0\n", head),
                _ => format!("{}\n", line),
            })
            .collect();
        let t = ObservationTable::from_reader(zero_rates.as_bytes()).unwrap();
        let p = Pipeline::from_parts(t, model(), Registry::european(), &Config::default(), None).unwrap();

        let a = assess_current(&p.forecaster, &p.table, "Italy").unwrap();
        assert_eq!(a.risk_percentage, 0.0);
        assert_eq!(a.risk_level, RiskLevel::Low);
    }

    #[test]
    fn configured_ceiling_overrides_dataset_maximum() {
        let mut config = Config::default();
        config.risk.historical_max = Some(10.0);
        let p = pipeline(&config);
        // Italy 2021-07: 26 * 0.1 = 2.6 of 10
        let a = assess_current(&p.forecaster, &p.table, "Italy").unwrap();
        assert!((a.risk_percentage - 26.0).abs() < 1e-9);
    }

    #[test]
    fn regional_ceilings_use_each_regions_maximum() {
        let mut config = Config::default();
        config.risk.ceiling = CeilingScope::Regional;
        let p = pipeline(&config);

        // Norway is alone in Northern_Europe with a maximum rate of 0.5
        let norway = assess_current(&p.forecaster, &p.table, "Norway").unwrap();
        assert_eq!(norway.risk_percentage, 100.0);
        assert_eq!(norway.region.as_deref(), Some("Northern_Europe"));
        assert_eq!(norway.risk_level, RiskLevel::VeryHigh);
    }

    #[test]
    fn registry_can_be_loaded_from_json() {
        let json = serde_json::to_string(&Registry::european()).unwrap();
        let registry = Registry::from_json(&json).unwrap();
        let p = Pipeline::from_parts(table(), model(), registry, &Config::default(), None).unwrap();
        assert_eq!(p.forecaster.registry().region_for("Italy").name, "Southern_Europe");
    }
}

// =============================================================================
// Current assessment
// =============================================================================

mod current_assessment {
    use super::*;

    #[test]
    fn uses_most_recent_observation() {
        let p = pipeline(&Config::default());
        let a = assess_current(&p.forecaster, &p.table, "Netherlands").unwrap();
        assert_eq!(a.period, Period::month(2022, 7));
        assert_eq!(a.covariates.temperature, 19.0);
        assert_eq!(a.dominant_factor, "Temperature_Celsius");
    }

    #[test]
    fn all_countries_with_unknown_skipped() {
        let p = pipeline(&Config::default());
        let outcome = assess(&p.forecaster, &p.table, "all").unwrap();
        assert_eq!(outcome.assessments.len(), 3);
        assert!(outcome.skipped.is_empty());

        let outcome = assess(&p.forecaster, &p.table, "Atlantis").unwrap();
        assert!(outcome.assessments.is_empty());
        assert_eq!(outcome.skipped, vec!["Atlantis"]);
    }

    #[test]
    fn universal_assessment_has_no_country_block() {
        let mut config = Config::default();
        config.risk.thresholds = ThresholdMode::Universal;
        let p = pipeline(&config);
        let a = assess_current(&p.forecaster, &p.table, "Netherlands").unwrap();
        assert_eq!(a.region, None);
        assert_eq!(a.recommendations.len(), 6);
    }
}

// =============================================================================
// Analysis
// =============================================================================

mod analysis_report {
    use super::*;

    #[test]
    fn report_covers_months_with_data() {
        let p = pipeline(&Config::default());
        let report = analyze(&p.table, p.model.as_ref()).unwrap();

        let months: Vec<u32> = report.seasonal.keys().copied().collect();
        assert_eq!(months, vec![1, 7]);
        assert_eq!(report.seasonal[&7].sample_size, 4);
        assert_eq!(report.correlations.features.len(), 4);

        let evaluation = report.evaluation.unwrap();
        assert_eq!(evaluation.sample_size, 6);
        assert!(evaluation.mae >= 0.0);
        assert!(evaluation.mse >= 0.0);
    }

    #[test]
    fn report_serializes_to_json() {
        let p = pipeline(&Config::default());
        let report = analyze(&p.table, p.model.as_ref()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["seasonal"]["7"]["mean_risk"].is_number());
    }
}

// =============================================================================
// Export
// =============================================================================

mod export {
    use super::*;

    #[test]
    fn csv_rows_parse_back() {
        let p = pipeline(&Config::default());
        let outcome = assess(&p.forecaster, &p.table, "all").unwrap();

        let mut buf = Vec::new();
        assert_eq!(export_csv(&mut buf, &outcome.assessments).unwrap(), 3);

        let mut rdr = csv::Reader::from_reader(buf.as_slice());
        let rows: Vec<AssessmentRow> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].country, "Italy");
        assert!(rows[0].recommendations.starts_with("1. Implement public health surveillance systems | 2. "));
    }

    #[test]
    fn empty_output_is_valid_json() {
        let mut buf = Vec::new();
        assert_eq!(export_json(&mut buf, &[]).unwrap(), 0);
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value, serde_json::json!([]));
    }
}
