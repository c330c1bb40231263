//! Gradient-boosted-trees adapter
//!
//! Unlike the random-forest pipeline there is no encoding pass in front of
//! the learner: the adapter hands categorical columns to the booster
//! natively, as codes from a category table fitted alongside the model. The
//! table serializes with the adapter, and unseen categories at inference
//! map to a sentinel code instead of failing.

use crate::columns::{column_to_f64, column_to_strings, stack_columns};
use crate::config::BoostedTreesParams;
use crate::error::{BikecastError, Result};
use crate::learners::GradientBoosting;
use crate::tracking::Run;
use crate::utils::git_revision_hash;
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Code for a category never seen during training
const UNSEEN_CODE: f64 = -1.0;

/// Category-to-code table for the natively handled categorical columns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CategoryTable {
    categories: BTreeMap<String, Vec<String>>,
}

impl CategoryTable {
    fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<()> {
        self.categories.clear();
        for name in columns {
            let mut levels = column_to_strings(df, name)?;
            levels.sort();
            levels.dedup();
            self.categories.insert(name.clone(), levels);
        }
        Ok(())
    }

    fn encode_column(&self, df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let levels = self
            .categories
            .get(name)
            .ok_or_else(|| BikecastError::FeatureNotFound(name.to_string()))?;
        let codes = column_to_strings(df, name)?
            .into_iter()
            .map(|value| {
                levels
                    .binary_search(&value)
                    .map_or(UNSEEN_CODE, |code| code as f64)
            })
            .collect();
        Ok(codes)
    }

    fn is_fitted(&self) -> bool {
        !self.categories.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BoostedTreesAdapter {
    params: BoostedTreesParams,
    checkpoint_name: String,
    numerical_features: Vec<String>,
    categorical_features: Vec<String>,
    categories: CategoryTable,
    /// Column order of the learner's matrix, captured at train time
    feature_names: Vec<String>,
    booster: GradientBoosting,
}

impl BoostedTreesAdapter {
    pub fn new(
        params: BoostedTreesParams,
        checkpoint_name: String,
        numerical_features: Vec<String>,
        categorical_features: Vec<String>,
    ) -> Self {
        let booster = GradientBoosting::new(params.clone());
        Self {
            params,
            checkpoint_name,
            numerical_features,
            categorical_features,
            categories: CategoryTable::default(),
            feature_names: Vec::new(),
            booster,
        }
    }

    fn to_matrix(&self, x: &DataFrame) -> Result<Array2<f64>> {
        if !self.categories.is_fitted() {
            return Err(BikecastError::NotFitted);
        }
        let columns: Vec<Vec<f64>> = self
            .feature_names
            .iter()
            .map(|name| {
                if self.categorical_features.contains(name) {
                    self.categories.encode_column(x, name)
                } else {
                    column_to_f64(x, name)
                }
            })
            .collect::<Result<_>>()?;
        stack_columns(&columns, x.height())
    }

    pub fn train(
        &mut self,
        x: &DataFrame,
        y: &Array1<f64>,
        x_eval: Option<&DataFrame>,
        y_eval: Option<&Array1<f64>>,
    ) -> Result<()> {
        self.categories.fit(x, &self.categorical_features)?;
        self.feature_names = x
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let matrix = self.to_matrix(x)?;
        let eval_matrix = x_eval.map(|frame| self.to_matrix(frame)).transpose()?;

        info!(
            n_samples = matrix.nrows(),
            n_features = matrix.ncols(),
            n_estimators = self.params.n_estimators,
            early_stopping = eval_matrix.is_some() && self.params.use_best_model,
            "fitting boosted trees"
        );
        self.booster = GradientBoosting::new(self.params.clone());
        match (eval_matrix.as_ref(), y_eval) {
            (Some(x_eval), Some(y_eval)) => {
                self.booster.fit(&matrix, y, Some((x_eval, y_eval)))?;
                if let Some(best) = self.booster.best_iteration() {
                    info!(
                        best_iteration = best,
                        n_trees = self.booster.n_trees(),
                        "kept best model"
                    );
                }
            }
            _ => self.booster.fit(&matrix, y, None)?,
        }
        Ok(())
    }

    pub fn predict(&self, x: &DataFrame) -> Result<Array1<f64>> {
        if !self.is_fitted() {
            return Err(BikecastError::NotFitted);
        }
        self.booster.predict(&self.to_matrix(x)?)
    }

    pub fn is_fitted(&self) -> bool {
        self.categories.is_fitted() && self.booster.n_trees() > 0
    }

    pub fn checkpoint_name(&self) -> &str {
        &self.checkpoint_name
    }

    /// Log hyperparameters, per-feature importances and the per-round
    /// metric curve recorded by the booster during fitting
    pub fn log_metrics_and_importances(&self, run: &mut Run) -> Result<()> {
        if !self.is_fitted() {
            return Err(BikecastError::NotFitted);
        }

        run.log_param("model_kind", "gbt");
        run.log_param("n_estimators", self.params.n_estimators);
        run.log_param("learning_rate", self.params.learning_rate);
        run.log_param("max_depth", self.params.max_depth);
        run.log_param("subsample", self.params.subsample);
        run.log_param("colsample_bytree", self.params.colsample_bytree);
        run.log_param("use_best_model", self.params.use_best_model);
        run.log_param(
            "random_state",
            self.params
                .random_state
                .map_or("none".to_string(), |s| s.to_string()),
        );
        if let Some(commit) = git_revision_hash() {
            run.log_param("git_commit_id", commit);
        }

        let importances = self.booster.feature_importances();
        for (name, &value) in self.feature_names.iter().zip(importances.iter()) {
            run.log_metric(&format!("fi_of_{}", name), value, 0);
        }

        // The booster already recorded the curve round by round
        for (step, record) in self.booster.evals().iter().enumerate() {
            run.log_metric("r2_metric", record.train_r2, step);
            run.log_metric("rmse_metric", record.train_rmse, step);
            if let Some(eval_rmse) = record.eval_rmse {
                run.log_metric("eval_rmse_metric", eval_rmse, step);
            }
        }
        Ok(())
    }
}
