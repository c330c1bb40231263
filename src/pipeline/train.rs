//! Training flow

use crate::config::RunConfig;
use crate::dataset::{DatasetProvider, Split};
use crate::error::Result;
use crate::models::ModelAdapter;
use crate::tracking::ExperimentTracker;
use std::path::PathBuf;
use tracing::info;

/// Trains the configured model on the train split, evaluating against the
/// test split, and writes a checkpoint. The checkpoint write happens after
/// everything else that can fail, so an aborted run leaves no partial
/// checkpoint behind.
pub struct Trainer {
    config: RunConfig,
}

impl Trainer {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Run the flow; returns the checkpoint path
    pub fn run(&self) -> Result<PathBuf> {
        let provider = DatasetProvider::from_config(&self.config.data);
        let train = provider.load(Split::Train)?;
        let test = provider.load(Split::Test)?;

        let mut adapter = ModelAdapter::build(
            &self.config.model,
            &train.numerical_features,
            &train.categorical_features,
        );
        info!(model = %adapter.kind(), "training");
        adapter.train(
            &train.features,
            &train.target,
            Some(&test.features),
            Some(&test.target),
        )?;

        if !self.config.tracking.enabled {
            return adapter.checkpoint(&self.config.data.checkpoint_dir);
        }

        let tracking = &self.config.tracking;
        let mut tracker = ExperimentTracker::open(&tracking.tracking_dir)?;
        let run_name = tracking
            .run_name
            .clone()
            .unwrap_or_else(|| format!("training-{}", adapter.kind()));
        let mut run = tracker.start_run(&tracking.experiment_name, &run_name);

        let result = adapter
            .log_metrics_and_importances(&mut run, &train.features, &train.target)
            .and_then(|_| adapter.checkpoint(&self.config.data.checkpoint_dir));
        match result {
            Ok(path) => {
                run.log_artifact(&path);
                tracker.finish_run(&tracking.experiment_name, run)?;
                Ok(path)
            }
            Err(e) => {
                // Keep whatever was logged before the failure
                tracker.fail_run(&tracking.experiment_name, run)?;
                Err(e)
            }
        }
    }
}
