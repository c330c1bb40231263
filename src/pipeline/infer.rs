//! Batch-inference flow

use crate::config::RunConfig;
use crate::dataset::{DatasetProvider, Split};
use crate::error::Result;
use crate::models::ModelAdapter;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Loads the configured checkpoint, scores the test split and persists the
/// prediction column as CSV
pub struct Inferencer {
    config: RunConfig,
}

impl Inferencer {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Run the flow; returns the predictions path
    pub fn run(&self) -> Result<PathBuf> {
        let provider = DatasetProvider::from_config(&self.config.data);
        let test = provider.load(Split::Test)?;

        let checkpoint_name = self.config.model.checkpoint_name();
        let checkpoint_path = self.config.data.checkpoint_dir.join(&checkpoint_name);
        let adapter = ModelAdapter::load_checkpoint(&checkpoint_path)?;
        info!(
            model = %adapter.kind(),
            checkpoint = %checkpoint_path.display(),
            "loaded checkpoint"
        );

        let predictions = adapter.eval(&test.features, &test.target)?;

        std::fs::create_dir_all(&self.config.data.predictions_dir)?;
        let stem = Path::new(&checkpoint_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(checkpoint_name.as_str());
        let out_path = self
            .config
            .data
            .predictions_dir
            .join(format!("{}_preds.csv", stem));

        let mut df = df!("prediction" => predictions.to_vec())?;
        let mut file = File::create(&out_path)?;
        CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
        info!(path = %out_path.display(), rows = df.height(), "wrote predictions");

        Ok(out_path)
    }
}
