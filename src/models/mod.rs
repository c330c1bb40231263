//! Model adapters
//!
//! A closed sum type over the two supported model variants. Each variant
//! owns its hyperparameters, its preprocessing state and its learner, and
//! the whole adapter serializes as one unit, so a checkpoint restores to a
//! ready-to-predict model with no recomputation.

pub mod boosted_trees;
pub mod random_forest;

pub use boosted_trees::BoostedTreesAdapter;
pub use random_forest::RandomForestAdapter;

use crate::config::{ModelConfig, ModelKind};
use crate::error::{BikecastError, Result};
use crate::metrics::RegressionMetrics;
use crate::tracking::Run;
use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// A trained or trainable model behind the uniform
/// train/eval/predict/checkpoint contract
#[derive(Debug, Serialize, Deserialize)]
pub enum ModelAdapter {
    RandomForest(RandomForestAdapter),
    BoostedTrees(BoostedTreesAdapter),
}

impl ModelAdapter {
    /// Construct the adapter variant selected by the configuration.
    ///
    /// `ModelKind` is a closed enumeration; unknown kinds are rejected where
    /// strings enter the system (`ModelKind::from_str`), so dispatch here is
    /// exhaustive.
    pub fn build(
        config: &ModelConfig,
        numerical_features: &[String],
        categorical_features: &[String],
    ) -> Self {
        let checkpoint_name = config.checkpoint_name();
        match config.kind {
            ModelKind::RandomForest => ModelAdapter::RandomForest(RandomForestAdapter::new(
                config.random_forest.clone(),
                checkpoint_name,
                numerical_features.to_vec(),
                categorical_features.to_vec(),
            )),
            ModelKind::BoostedTrees => ModelAdapter::BoostedTrees(BoostedTreesAdapter::new(
                config.boosted_trees.clone(),
                checkpoint_name,
                numerical_features.to_vec(),
                categorical_features.to_vec(),
            )),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            ModelAdapter::RandomForest(_) => ModelKind::RandomForest,
            ModelAdapter::BoostedTrees(_) => ModelKind::BoostedTrees,
        }
    }

    /// Fit the internal learner. A held-out pair drives early stopping for
    /// boosted trees; the random forest fits unconditionally and evaluates
    /// the pair immediately after.
    pub fn train(
        &mut self,
        x: &DataFrame,
        y: &Array1<f64>,
        x_eval: Option<&DataFrame>,
        y_eval: Option<&Array1<f64>>,
    ) -> Result<()> {
        if x_eval.is_some() && y_eval.is_none() {
            return Err(BikecastError::InvalidInput(
                "for the evaluation, y_eval must be provided".to_string(),
            ));
        }
        if y_eval.is_some() && x_eval.is_none() {
            return Err(BikecastError::InvalidInput(
                "y_eval was provided without x_eval".to_string(),
            ));
        }
        match self {
            ModelAdapter::RandomForest(adapter) => adapter.train(x, y, x_eval, y_eval),
            ModelAdapter::BoostedTrees(adapter) => adapter.train(x, y, x_eval, y_eval),
        }
    }

    /// Score held-out data, report the R², and return the predictions.
    /// Requires a fitted learner.
    pub fn eval(&self, x: &DataFrame, y: &Array1<f64>) -> Result<Array1<f64>> {
        let predictions = self.predict(x)?;
        if predictions.len() != y.len() {
            return Err(BikecastError::ShapeError {
                expected: format!("{} targets", predictions.len()),
                actual: format!("{} targets", y.len()),
            });
        }
        let metrics = RegressionMetrics::compute(y, &predictions);
        info!(
            model = %self.kind(),
            r2 = format!("{:.2}", metrics.r2),
            rmse = format!("{:.2}", metrics.rmse),
            n_samples = metrics.n_samples,
            "evaluation"
        );
        Ok(predictions)
    }

    /// Predict without any reporting side effect. Requires a fitted learner.
    pub fn predict(&self, x: &DataFrame) -> Result<Array1<f64>> {
        match self {
            ModelAdapter::RandomForest(adapter) => adapter.predict(x),
            ModelAdapter::BoostedTrees(adapter) => adapter.predict(x),
        }
    }

    pub fn is_fitted(&self) -> bool {
        match self {
            ModelAdapter::RandomForest(adapter) => adapter.is_fitted(),
            ModelAdapter::BoostedTrees(adapter) => adapter.is_fitted(),
        }
    }

    /// Checkpoint filename this adapter was configured with
    pub fn checkpoint_name(&self) -> &str {
        match self {
            ModelAdapter::RandomForest(adapter) => adapter.checkpoint_name(),
            ModelAdapter::BoostedTrees(adapter) => adapter.checkpoint_name(),
        }
    }

    /// Serialize the whole adapter (preprocessing + learner + config) to
    /// `dir/<checkpoint-name>`. Only fitted adapters may be checkpointed, so
    /// a loaded checkpoint is always ready to predict.
    pub fn checkpoint(&self, dir: &Path) -> Result<PathBuf> {
        if !self.is_fitted() {
            return Err(BikecastError::NotFitted);
        }
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.checkpoint_name());
        let json = serde_json::to_string(self)?;
        std::fs::write(&path, json)?;
        info!(path = %path.display(), "wrote checkpoint");
        Ok(path)
    }

    /// Restore an adapter from a checkpoint file
    pub fn load_checkpoint(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BikecastError::CheckpointNotFound(
                path.display().to_string(),
            ));
        }
        let json = std::fs::read_to_string(path)?;
        let adapter: Self = serde_json::from_str(&json)?;
        Ok(adapter)
    }

    /// Report hyperparameters, the reproducibility tag, per-feature
    /// importances and the per-step R²/RMSE curve to a tracking run
    pub fn log_metrics_and_importances(
        &self,
        run: &mut Run,
        x_train: &DataFrame,
        y_train: &Array1<f64>,
    ) -> Result<()> {
        match self {
            ModelAdapter::RandomForest(adapter) => {
                adapter.log_metrics_and_importances(run, x_train, y_train)
            }
            ModelAdapter::BoostedTrees(adapter) => adapter.log_metrics_and_importances(run),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RandomForestParams;
    use polars::prelude::*;

    fn model_config(kind: ModelKind) -> ModelConfig {
        ModelConfig {
            kind,
            checkpoint_name: None,
            random_forest: RandomForestParams {
                n_estimators: 5,
                random_state: Some(1),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn features() -> (Vec<String>, Vec<String>) {
        (
            vec!["temp".to_string()],
            vec!["season".to_string()],
        )
    }

    #[test]
    fn test_factory_dispatch() {
        let (numerical, categorical) = features();
        let adapter = ModelAdapter::build(
            &model_config(ModelKind::RandomForest),
            &numerical,
            &categorical,
        );
        assert_eq!(adapter.kind(), ModelKind::RandomForest);
        assert_eq!(adapter.checkpoint_name(), "model_rf.json");

        let adapter = ModelAdapter::build(
            &model_config(ModelKind::BoostedTrees),
            &numerical,
            &categorical,
        );
        assert_eq!(adapter.kind(), ModelKind::BoostedTrees);
        assert_eq!(adapter.checkpoint_name(), "model_gbt.json");
    }

    #[test]
    fn test_eval_pair_validation() {
        let (numerical, categorical) = features();
        let mut adapter = ModelAdapter::build(
            &model_config(ModelKind::RandomForest),
            &numerical,
            &categorical,
        );

        let x = df!(
            "season" => &["spring", "summer", "winter", "spring"],
            "temp" => &[9.8, 21.5, 3.2, 11.0],
        )
        .unwrap();
        let y = ndarray::array![16.0, 40.0, 32.0, 13.0];

        let err = adapter.train(&x, &y, Some(&x), None).unwrap_err();
        assert!(matches!(err, BikecastError::InvalidInput(_)));
    }

    #[test]
    fn test_checkpoint_requires_fitted() {
        let (numerical, categorical) = features();
        let adapter = ModelAdapter::build(
            &model_config(ModelKind::RandomForest),
            &numerical,
            &categorical,
        );

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            adapter.checkpoint(dir.path()),
            Err(BikecastError::NotFitted)
        ));
    }

    #[test]
    fn test_missing_checkpoint() {
        let err = ModelAdapter::load_checkpoint(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, BikecastError::CheckpointNotFound(_)));
    }
}
