//! Command-line surface of the `leptorisk` binary

use clap::{Args, Parser, Subcommand, ValueEnum};
use shared::{validate_country_name, Granularity, ThresholdMode, YearRange};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::{ForecastMode, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "leptorisk",
    version,
    about = "Forecast and classify leptospirosis risk from weather covariates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast risk for future years
    Forecast(ForecastArgs),
    /// Classify the most recent observation of each country
    Assess(AssessArgs),
    /// Seasonal profile, covariate correlations and model evaluation
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args)]
pub struct ForecastArgs {
    /// Country name, or "all" for every country in the dataset
    #[arg(long, default_value = "all")]
    pub country: String,

    /// First forecast year (defaults to next year)
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last forecast year (defaults to the start year)
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Forecast a single year
    #[arg(long, conflicts_with_all = ["start_year", "end_year"])]
    pub year: Option<i32>,

    #[arg(long, value_enum)]
    pub mode: Option<ForecastMode>,

    #[arg(long, value_enum)]
    pub granularity: Option<GranularityArg>,

    #[arg(long, value_enum)]
    pub thresholds: Option<ThresholdArg>,

    /// Seed for reproducible random-walk forecasts
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub output: Option<String>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Args)]
pub struct AssessArgs {
    #[arg(long, default_value = "all")]
    pub country: String,

    #[arg(long, value_enum)]
    pub thresholds: Option<ThresholdArg>,

    #[arg(long)]
    pub output: Option<String>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// JSON report destination
    #[arg(long, default_value = "leptospirosis_analysis.json")]
    pub output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GranularityArg {
    Yearly,
    Monthly,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Yearly => Granularity::Yearly,
            GranularityArg::Monthly => Granularity::Monthly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThresholdArg {
    Regional,
    Universal,
}

impl From<ThresholdArg> for ThresholdMode {
    fn from(arg: ThresholdArg) -> Self {
        match arg {
            ThresholdArg::Regional => ThresholdMode::Regional,
            ThresholdArg::Universal => ThresholdMode::Universal,
        }
    }
}

impl ForecastArgs {
    /// Apply flag overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut Config) -> AppResult<()> {
        validate_country_name(&self.country).map_err(|e| AppError::validation("country", e))?;
        if let Some(mode) = self.mode {
            config.forecast.mode = mode;
        }
        if let Some(granularity) = self.granularity {
            config.forecast.granularity = granularity.into();
        }
        if let Some(thresholds) = self.thresholds {
            config.risk.thresholds = thresholds.into();
        }
        if self.seed.is_some() {
            config.forecast.seed = self.seed;
        }
        override_output(config, self.output.as_ref(), self.format);
        Ok(())
    }

    /// Requested year range; next year when nothing is given
    pub fn years(&self, reference_year: i32) -> YearRange {
        if let Some(year) = self.year {
            return YearRange::single(year);
        }
        let start = self.start_year.unwrap_or(reference_year + 1);
        YearRange::new(start, self.end_year.unwrap_or(start))
    }
}

impl AssessArgs {
    pub fn apply(&self, config: &mut Config) -> AppResult<()> {
        validate_country_name(&self.country).map_err(|e| AppError::validation("country", e))?;
        if let Some(thresholds) = self.thresholds {
            config.risk.thresholds = thresholds.into();
        }
        override_output(config, self.output.as_ref(), self.format);
        Ok(())
    }
}

fn override_output(config: &mut Config, output: Option<&String>, format: Option<OutputFormat>) {
    if let Some(path) = output {
        config.output.path = path.clone();
    }
    if format.is_some() {
        config.output.format = format;
    }
}
