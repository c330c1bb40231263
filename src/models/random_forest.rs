//! Random-forest adapter
//!
//! Wraps the forest learner behind the adapter contract. Categorical columns
//! go through an embedded ordinal encoder fit on the training split only;
//! the encoder serializes with the adapter so inference reuses the exact
//! category-to-code mapping from training.

use crate::columns::{columns_to_array2, stack_columns};
use crate::config::RandomForestParams;
use crate::encoding::OrdinalEncoder;
use crate::error::{BikecastError, Result};
use crate::learners::RandomForest;
use crate::metrics::{r2_score, rmse};
use crate::tracking::Run;
use crate::utils::git_revision_hash;
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForestAdapter {
    params: RandomForestParams,
    checkpoint_name: String,
    numerical_features: Vec<String>,
    categorical_features: Vec<String>,
    encoder: OrdinalEncoder,
    forest: RandomForest,
}

impl RandomForestAdapter {
    pub fn new(
        params: RandomForestParams,
        checkpoint_name: String,
        numerical_features: Vec<String>,
        categorical_features: Vec<String>,
    ) -> Self {
        let forest = RandomForest::from_params(&params);
        Self {
            params,
            checkpoint_name,
            numerical_features,
            categorical_features,
            encoder: OrdinalEncoder::new(),
            forest,
        }
    }

    /// Feature order in the learner's matrix: encoded categoricals first,
    /// then the numerical columns untouched
    pub fn feature_order(&self) -> Vec<String> {
        self.categorical_features
            .iter()
            .chain(self.numerical_features.iter())
            .cloned()
            .collect()
    }

    fn to_matrix(&self, x: &DataFrame) -> Result<Array2<f64>> {
        if !self.encoder.is_fitted() {
            return Err(BikecastError::NotFitted);
        }
        let mut columns: Vec<Vec<f64>> = self
            .categorical_features
            .iter()
            .map(|name| self.encoder.transform_column(x, name))
            .collect::<Result<_>>()?;
        let numerical = columns_to_array2(x, &self.numerical_features)?;
        for col in numerical.columns() {
            columns.push(col.to_vec());
        }
        stack_columns(&columns, x.height())
    }

    pub fn train(
        &mut self,
        x: &DataFrame,
        y: &Array1<f64>,
        x_eval: Option<&DataFrame>,
        y_eval: Option<&Array1<f64>>,
    ) -> Result<()> {
        self.encoder.fit(x, &self.categorical_features)?;
        let matrix = self.to_matrix(x)?;

        info!(
            n_samples = matrix.nrows(),
            n_features = matrix.ncols(),
            n_estimators = self.params.n_estimators,
            "fitting random forest"
        );
        self.forest = RandomForest::from_params(&self.params);
        self.forest.fit(&matrix, y)?;

        // The forest has no early-stopping hook for the pair; score it
        // right away instead.
        if let (Some(x_eval), Some(y_eval)) = (x_eval, y_eval) {
            self.eval(x_eval, y_eval)?;
        }
        Ok(())
    }

    pub fn eval(&self, x: &DataFrame, y: &Array1<f64>) -> Result<Array1<f64>> {
        let predictions = self.predict(x)?;
        info!(
            r2 = format!("{:.2}", r2_score(y, &predictions)),
            "random forest R2 score"
        );
        Ok(predictions)
    }

    pub fn predict(&self, x: &DataFrame) -> Result<Array1<f64>> {
        if !self.is_fitted() {
            return Err(BikecastError::NotFitted);
        }
        self.forest.predict(&self.to_matrix(x)?)
    }

    pub fn is_fitted(&self) -> bool {
        self.encoder.is_fitted() && self.forest.n_trees() > 0
    }

    pub fn checkpoint_name(&self) -> &str {
        &self.checkpoint_name
    }

    /// Log hyperparameters, per-feature importances and the per-size metric
    /// curve.
    ///
    /// The forest cannot be scored at intermediate ensemble sizes after the
    /// fact, so the curve comes from refitting at every size from one tree
    /// up to the configured count and scoring the training data each time.
    /// Deterministic seeding makes the prefix forests agree with the final
    /// one.
    pub fn log_metrics_and_importances(
        &self,
        run: &mut Run,
        x_train: &DataFrame,
        y_train: &Array1<f64>,
    ) -> Result<()> {
        if !self.is_fitted() {
            return Err(BikecastError::NotFitted);
        }

        run.log_param("model_kind", "rf");
        run.log_param("n_estimators", self.params.n_estimators);
        run.log_param(
            "max_depth",
            self.params
                .max_depth
                .map_or("none".to_string(), |d| d.to_string()),
        );
        run.log_param("min_samples_split", self.params.min_samples_split);
        run.log_param("min_samples_leaf", self.params.min_samples_leaf);
        run.log_param(
            "random_state",
            self.params
                .random_state
                .map_or("none".to_string(), |s| s.to_string()),
        );
        if let Some(commit) = git_revision_hash() {
            run.log_param("git_commit_id", commit);
        }

        if let Some(importances) = self.forest.feature_importances() {
            for (name, &value) in self.feature_order().iter().zip(importances.iter()) {
                run.log_metric(&format!("fi_of_{}", name), value, 0);
            }
        }

        let matrix = self.to_matrix(x_train)?;
        for step in 0..self.params.n_estimators {
            let mut partial = RandomForest::from_params(&self.params);
            partial.n_estimators = step + 1;
            partial.fit(&matrix, y_train)?;
            let predictions = partial.predict(&matrix)?;
            run.log_metric("r2_metric", r2_score(y_train, &predictions), step);
            run.log_metric("rmse_metric", rmse(y_train, &predictions), step);
            debug!(step, "scored partial forest");
        }
        Ok(())
    }
}
