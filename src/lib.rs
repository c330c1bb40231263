//! Bikecast
//!
//! Training and batch-inference pipeline for the OpenML bike-sharing demand
//! dataset: dataset preparation with a temporal split, two tree-ensemble
//! model adapters behind one contract, whole-adapter checkpointing, local
//! experiment tracking, and an HTTP serving adapter.

pub mod cli;
pub mod columns;
pub mod config;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod learners;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod tracking;
pub mod utils;

pub use config::{ModelKind, RunConfig};
pub use dataset::{DatasetProvider, DatasetSplit, Split};
pub use error::{BikecastError, Result};
pub use models::ModelAdapter;
pub use pipeline::{Inferencer, Trainer};
