//! Export of assessment records and run manifests

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{RiskAssessment, ThresholdMode};
use uuid::Uuid;

use crate::error::AppResult;

/// File format of the assessment output
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    /// Format implied by a file extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    /// Explicit choice first, then the extension, then CSV
    pub fn resolve(explicit: Option<Self>, path: impl AsRef<Path>) -> Self {
        explicit
            .or_else(|| Self::from_path(path))
            .unwrap_or_default()
    }
}

/// Flat row written to CSV output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssessmentRow {
    pub country: String,
    pub year: i32,
    pub month: Option<u32>,
    pub region: Option<String>,
    pub predicted_rate: f64,
    pub risk_percentage: f64,
    pub risk_level: String,
    pub dominant_factor: String,
    pub advisory: String,
    pub recommendations: String,
}

impl From<&RiskAssessment> for AssessmentRow {
    fn from(a: &RiskAssessment) -> Self {
        Self {
            country: a.country.clone(),
            year: a.period.year,
            month: a.period.month,
            region: a.region.clone(),
            predicted_rate: a.predicted_rate,
            risk_percentage: a.risk_percentage,
            risk_level: a.risk_level.to_string(),
            dominant_factor: a.dominant_factor.clone(),
            advisory: a.advisory.clone(),
            recommendations: numbered(&a.recommendations),
        }
    }
}

/// "1. first | 2. second"
fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Write assessments as CSV rows, returning the number of rows written
pub fn export_csv<W: Write>(writer: W, assessments: &[RiskAssessment]) -> AppResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    for assessment in assessments {
        wtr.serialize(AssessmentRow::from(assessment))?;
    }
    wtr.flush()?;
    Ok(assessments.len())
}

/// Write assessments as a pretty-printed JSON array of full records
pub fn export_json<W: Write>(mut writer: W, assessments: &[RiskAssessment]) -> AppResult<usize> {
    serde_json::to_writer_pretty(&mut writer, assessments)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(assessments.len())
}

/// Write assessments to a file in the given format
pub fn write_assessments(
    path: impl AsRef<Path>,
    format: OutputFormat,
    assessments: &[RiskAssessment],
) -> AppResult<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    let written = match format {
        OutputFormat::Csv => export_csv(writer, assessments)?,
        OutputFormat::Json => export_json(writer, assessments)?,
    };
    tracing::info!("Wrote {} records to {}", written, path.display());
    Ok(written)
}

/// Summary of one run, written next to its output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub mode: String,
    pub classification: ThresholdMode,
    pub countries_requested: Vec<String>,
    pub countries_skipped: Vec<String>,
    pub records: usize,
    pub output: String,
}

impl RunManifest {
    pub fn new(mode: impl Into<String>, classification: ThresholdMode, output: impl AsRef<Path>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            mode: mode.into(),
            classification,
            countries_requested: Vec::new(),
            countries_skipped: Vec::new(),
            records: 0,
            output: output.as_ref().display().to_string(),
        }
    }

    /// `predictions.csv` -> `predictions.manifest.json`
    pub fn path_for(output: impl AsRef<Path>) -> PathBuf {
        output.as_ref().with_extension("manifest.json")
    }

    pub fn write(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Covariates, Period, RiskLevel};

    fn assessment(month: Option<u32>) -> RiskAssessment {
        RiskAssessment {
            country: "Netherlands".to_string(),
            period: Period { year: 2030, month },
            region: Some("Western_Europe".to_string()),
            classification: ThresholdMode::Regional,
            covariates: Covariates::new(11.0, 7.0, 82.0, 0.3),
            predicted_rate: 0.8,
            risk_percentage: 40.0,
            risk_level: RiskLevel::High,
            dominant_factor: "TP".to_string(),
            advisory: "Increased alert".to_string(),
            recommendations: vec!["First".to_string(), "Second".to_string()],
        }
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(OutputFormat::from_path("out.JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_path("out.csv"), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::from_path("out"), None);
        assert_eq!(OutputFormat::resolve(None, "out.txt"), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::resolve(Some(OutputFormat::Json), "out.csv"),
            OutputFormat::Json
        );
    }

    #[test]
    fn row_numbers_recommendations() {
        let row = AssessmentRow::from(&assessment(Some(3)));
        assert_eq!(row.recommendations, "1. First | 2. Second");
        assert_eq!(row.risk_level, "High");
        assert_eq!(row.month, Some(3));
    }

    #[test]
    fn csv_has_header_and_one_line_per_record() {
        let mut buf = Vec::new();
        let n = export_csv(&mut buf, &[assessment(None), assessment(Some(1))]).unwrap();
        assert_eq!(n, 2);
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("country,year,month,region,predicted_rate"));
        assert!(lines[1].starts_with("Netherlands,2030,,Western_Europe,0.8,40.0,High,TP"));
    }

    #[test]
    fn json_keeps_full_records() {
        let mut buf = Vec::new();
        export_json(&mut buf, &[assessment(None)]).unwrap();
        let parsed: Vec<RiskAssessment> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, vec![assessment(None)]);
    }

    #[test]
    fn manifest_sits_next_to_output() {
        assert_eq!(
            RunManifest::path_for("out/predictions.csv"),
            PathBuf::from("out/predictions.manifest.json")
        );
        let manifest = RunManifest::new("trend", ThresholdMode::Universal, "out/predictions.csv");
        assert_eq!(manifest.records, 0);
        assert_eq!(manifest.output, "out/predictions.csv");
    }
}
