//! Run configuration
//!
//! A `RunConfig` is resolved once per invocation (defaults, optionally
//! overridden by a JSON file and CLI flags) and passed down explicitly.
//! Adapters receive only the hyperparameter subset and feature lists they
//! need.

use crate::error::{BikecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Source CSV for the OpenML Bike_Sharing_Demand dataset (version 2).
pub const DEFAULT_SOURCE_URL: &str =
    "https://www.openml.org/data/get_csv/22044756/dataset";

/// The two supported model kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest,
    BoostedTrees,
}

impl ModelKind {
    /// Default checkpoint filename for this kind
    pub fn default_checkpoint_name(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "model_rf.json",
            ModelKind::BoostedTrees => "model_gbt.json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "rf",
            ModelKind::BoostedTrees => "gbt",
        }
    }
}

impl FromStr for ModelKind {
    type Err = BikecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rf" | "random_forest" => Ok(ModelKind::RandomForest),
            "gbt" | "boosted_trees" => Ok(ModelKind::BoostedTrees),
            other => Err(BikecastError::UnknownModelKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hyperparameters for the random-forest variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub random_state: Option<u64>,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            random_state: Some(42),
        }
    }
}

/// Hyperparameters for the gradient-boosted-trees variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostedTreesParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub subsample: f64,
    pub colsample_bytree: f64,
    /// Truncate to the best iteration (by eval RMSE) when an eval set is given
    pub use_best_model: bool,
    pub random_state: Option<u64>,
}

impl Default for BoostedTreesParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 6,
            min_samples_leaf: 1,
            subsample: 0.8,
            colsample_bytree: 0.8,
            use_best_model: true,
            random_state: Some(42),
        }
    }
}

/// Model selection and checkpoint naming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub kind: ModelKind,
    /// Checkpoint filename inside the checkpoint directory. When unset, a
    /// fixed per-kind name is used and overwritten across runs.
    pub checkpoint_name: Option<String>,
    pub random_forest: RandomForestParams,
    pub boosted_trees: BoostedTreesParams,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::RandomForest,
            checkpoint_name: None,
            random_forest: RandomForestParams::default(),
            boosted_trees: BoostedTreesParams::default(),
        }
    }
}

impl ModelConfig {
    pub fn checkpoint_name(&self) -> String {
        self.checkpoint_name
            .clone()
            .unwrap_or_else(|| self.kind.default_checkpoint_name().to_string())
    }
}

/// Dataset and artifact locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub source_url: String,
    pub data_dir: PathBuf,
    pub checkpoint_dir: PathBuf,
    pub predictions_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            data_dir: PathBuf::from("data"),
            checkpoint_dir: PathBuf::from("checkpoints"),
            predictions_dir: PathBuf::from("predictions"),
        }
    }
}

/// Experiment-tracking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub enabled: bool,
    pub tracking_dir: PathBuf,
    pub experiment_name: String,
    /// Run name; defaults to `training-<kind>` when unset
    pub run_name: Option<String>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tracking_dir: PathBuf::from("experiments"),
            experiment_name: "bike-sharing-demand".to_string(),
            run_name: None,
        }
    }
}

/// Fully resolved configuration for one Trainer/Inferencer invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub model: ModelConfig,
    pub data: DataConfig,
    pub tracking: TrackingConfig,
}

impl RunConfig {
    /// Load a configuration file, falling back to defaults for absent fields
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BikecastError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| BikecastError::ConfigError(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Override the model kind (CLI flag wins over the config file)
    pub fn with_kind(mut self, kind: ModelKind) -> Self {
        self.model.kind = kind;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!(ModelKind::from_str("rf").unwrap(), ModelKind::RandomForest);
        assert_eq!(
            ModelKind::from_str("boosted_trees").unwrap(),
            ModelKind::BoostedTrees
        );
        assert!(matches!(
            ModelKind::from_str("unknown"),
            Err(BikecastError::UnknownModelKind(_))
        ));
    }

    #[test]
    fn test_default_checkpoint_names() {
        let config = ModelConfig::default();
        assert_eq!(config.checkpoint_name(), "model_rf.json");

        let config = ModelConfig {
            kind: ModelKind::BoostedTrees,
            checkpoint_name: Some("run_7.json".to_string()),
            ..Default::default()
        };
        assert_eq!(config.checkpoint_name(), "run_7.json");
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"model": {"kind": "boosted_trees", "boosted_trees": {"n_estimators": 25}}}"#,
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.model.kind, ModelKind::BoostedTrees);
        assert_eq!(config.model.boosted_trees.n_estimators, 25);
        // Unspecified sections keep their defaults
        assert_eq!(config.model.boosted_trees.max_depth, 6);
        assert!(!config.tracking.enabled);
    }
}
