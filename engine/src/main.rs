//! Leptospirosis Risk Forecasting - Command Line Entry Point
//!
//! Loads configuration, builds the pipeline and runs one command.

use std::fs::File;
use std::io::{BufWriter, Write};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

use engine::cli::{Cli, Command};
use engine::services::analysis;
use engine::services::reporting::write_assessments;
use engine::services::{ForecastOutcome, OutputFormat, RunManifest};
use engine::{AppResult, Config, Pipeline};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leptorisk=info,engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let mut config = Config::load()?;

    tracing::info!("Environment: {}", config.environment);

    match cli.command {
        Command::Forecast(args) => {
            args.apply(&mut config)?;
            config.validate()?;

            let years = args.years(config.reference_year());
            let request = Pipeline::request(&config, years);
            request.validate()?;

            let outcome = match load_pipeline(&config)? {
                Some(pipeline) => pipeline
                    .forecaster
                    .forecast(&pipeline.table, &args.country, &request)?,
                None => skipped(&args.country),
            };
            finish(&config, &request.mode.to_string(), outcome)?;
        }
        Command::Assess(args) => {
            args.apply(&mut config)?;
            config.validate()?;

            let outcome = match load_pipeline(&config)? {
                Some(pipeline) => analysis::assess(&pipeline.forecaster, &pipeline.table, &args.country)?,
                None => skipped(&args.country),
            };
            finish(&config, "current", outcome)?;
        }
        Command::Analyze(args) => {
            config.validate()?;

            let Some(pipeline) = load_pipeline(&config)? else {
                println!("No data to analyze");
                return Ok(());
            };
            let report = analysis::analyze(&pipeline.table, pipeline.model.as_ref())?;

            let mut writer = BufWriter::new(File::create(&args.output)?);
            serde_json::to_writer_pretty(&mut writer, &report)?;
            writer.flush()?;
            println!("Analysis saved to {}", args.output);
        }
    }

    Ok(())
}

/// Load inputs; a missing or empty dataset is a warning, not a failure
fn load_pipeline(config: &Config) -> AppResult<Option<Pipeline>> {
    match Pipeline::load(config) {
        Ok(pipeline) => Ok(Some(pipeline)),
        Err(e) if e.is_skippable() => {
            tracing::warn!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn skipped(country: &str) -> ForecastOutcome {
    ForecastOutcome {
        requested: vec![country.to_string()],
        skipped: vec![country.to_string()],
        ..Default::default()
    }
}

/// Write the output and manifest, then report
fn finish(config: &Config, mode: &str, outcome: ForecastOutcome) -> AppResult<()> {
    let path = &config.output.path;
    let format = OutputFormat::resolve(config.output.format, path);
    let written = write_assessments(path, format, &outcome.assessments)?;

    if config.output.manifest {
        let manifest = RunManifest {
            countries_requested: outcome.requested,
            countries_skipped: outcome.skipped,
            records: written,
            ..RunManifest::new(mode, config.risk.thresholds, path)
        };
        let manifest_path = RunManifest::path_for(path);
        manifest.write(&manifest_path)?;
        tracing::info!("Run {} manifest: {}", manifest.run_id, manifest_path.display());
    }

    println!("Predictions saved to {} ({} records)", path, written);
    Ok(())
}
