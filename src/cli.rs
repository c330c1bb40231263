//! Command-line interface
//!
//! Subcommands for the pipeline stages: prepare the dataset, train a model,
//! run batch inference, serve a checkpoint, and write an example serving
//! request.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use crate::columns::{column_to_f64, column_to_strings};
use crate::config::{ModelKind, RunConfig};
use crate::dataset::{DatasetProvider, Split};
use crate::error::Result;
use crate::pipeline::{Inferencer, Trainer};
use crate::server::{run_server, PredictRequest, ServerConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}

fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}

fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn step_run(msg: &str) {
    println!("  {} {}...", accent("›"), msg);
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "bikecast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bike-sharing demand training and batch-inference pipeline")]
pub struct Cli {
    /// Optional JSON configuration file; absent fields fall back to defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the dataset, split it and persist both partitions
    PrepareData {
        /// Skip printing split sizes and schema
        #[arg(long)]
        quiet: bool,
    },

    /// Train a model on the train split and write a checkpoint
    Train {
        /// Model kind (rf, gbt)
        #[arg(short, long, default_value = "rf")]
        model: String,

        /// Log params, metrics and importances to the local tracker
        #[arg(long)]
        track: bool,
    },

    /// Score the test split from a checkpoint and persist predictions
    Infer {
        /// Model kind (rf, gbt)
        #[arg(short, long, default_value = "rf")]
        model: String,
    },

    /// Serve single-row predictions from a checkpoint over HTTP
    Serve {
        /// Model kind (rf, gbt)
        #[arg(short, long, default_value = "rf")]
        model: String,

        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Write the first training row as a serving request JSON
    ExampleRequest {
        /// Output file
        #[arg(short, long, default_value = "example_request.json")]
        output: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::load(path),
        None => Ok(RunConfig::default()),
    }
}

pub fn cmd_prepare_data(config: Option<&PathBuf>, print_info: bool) -> Result<()> {
    let config = load_config(config)?;
    step_run("preparing dataset");
    let started = Instant::now();
    DatasetProvider::from_config(&config.data).prepare(print_info)?;
    step_ok(&format!(
        "splits written to {} {}",
        config.data.data_dir.display(),
        dim(&format!("({:.1}s)", started.elapsed().as_secs_f32()))
    ));
    Ok(())
}

pub fn cmd_train(config: Option<&PathBuf>, model: &str, track: bool) -> Result<()> {
    let kind = ModelKind::from_str(model)?;
    let mut config = load_config(config)?.with_kind(kind);
    if track {
        config.tracking.enabled = true;
    }

    step_run(&format!("training {} model", kind));
    let started = Instant::now();
    let path = Trainer::new(config).run()?;
    step_ok(&format!(
        "checkpoint written to {} {}",
        path.display(),
        dim(&format!("({:.1}s)", started.elapsed().as_secs_f32()))
    ));
    Ok(())
}

pub fn cmd_infer(config: Option<&PathBuf>, model: &str) -> Result<()> {
    let kind = ModelKind::from_str(model)?;
    let config = load_config(config)?.with_kind(kind);

    step_run(&format!("running {} inference on the test split", kind));
    let path = Inferencer::new(config).run()?;
    step_ok(&format!("predictions written to {}", path.display()));
    Ok(())
}

pub async fn cmd_serve(
    config: Option<&PathBuf>,
    model: &str,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let kind = ModelKind::from_str(model)?;
    let config = load_config(config)?.with_kind(kind);
    let server = ServerConfig {
        host: host.to_string(),
        port,
    };
    run_server(server, config).await
}

/// Build a serving request from the first row of the train split and write
/// it as JSON
pub fn cmd_example_request(config: Option<&PathBuf>, output: &PathBuf) -> Result<()> {
    let config = load_config(config)?;
    let split = DatasetProvider::from_config(&config.data).load(Split::Train)?;
    let first = split.features.head(Some(1));

    let string_at = |name: &str| -> Result<String> {
        Ok(column_to_strings(&first, name)?[0].clone())
    };
    let f64_at = |name: &str| -> Result<f64> { Ok(column_to_f64(&first, name)?[0]) };
    let bool_at = |name: &str| -> Result<bool> {
        Ok(matches!(
            column_to_strings(&first, name)?[0].to_lowercase().as_str(),
            "true" | "1"
        ))
    };

    let request = PredictRequest {
        season: string_at("season")?,
        month: f64_at("month")? as i64,
        hour: f64_at("hour")? as i64,
        holiday: bool_at("holiday")?,
        weekday: f64_at("weekday")? as i64,
        workingday: bool_at("workingday")?,
        weather: string_at("weather")?,
        temp: f64_at("temp")?,
        feel_temp: f64_at("feel_temp")?,
        humidity: f64_at("humidity")?,
        windspeed: f64_at("windspeed")?,
    };

    std::fs::write(output, serde_json::to_string_pretty(&request)?)?;
    step_ok(&format!("example request written to {}", output.display()));
    Ok(())
}
