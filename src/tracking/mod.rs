//! Local experiment tracking
//!
//! Runs record hyperparameters, a reproducibility tag, step-indexed metric
//! curves and artifact paths; everything persists as JSON under a tracking
//! directory.

mod storage;
mod tracker;

pub use storage::LocalStorage;
pub use tracker::{Experiment, ExperimentTracker, MetricRecord, Run, RunStatus};
