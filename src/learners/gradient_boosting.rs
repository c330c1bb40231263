//! Gradient boosted regression trees
//!
//! Tracks a per-iteration evaluation history during fitting (train R² and
//! RMSE, plus eval RMSE when a held-out pair is supplied) and can truncate
//! to the best iteration by eval RMSE, so the adapter on top reads the curve
//! instead of recomputing it.

use super::decision_tree::RegressionTree;
use crate::config::BoostedTreesParams;
use crate::error::{BikecastError, Result};
use crate::metrics::{r2_score, rmse};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// One boosting round's scores
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IterationRecord {
    /// R² on the training data after this round
    pub train_r2: f64,
    /// RMSE on the training data after this round
    pub train_rmse: f64,
    /// RMSE on the eval set after this round, when one was supplied
    pub eval_rmse: Option<f64>,
}

/// Gradient boosting regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    params: BoostedTreesParams,
    trees: Vec<RegressionTree>,
    col_indices_per_tree: Vec<Vec<usize>>,
    initial_prediction: f64,
    feature_importances: Vec<f64>,
    history: Vec<IterationRecord>,
    best_iteration: Option<usize>,
}

impl GradientBoosting {
    pub fn new(params: BoostedTreesParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            col_indices_per_tree: Vec::new(),
            initial_prediction: 0.0,
            feature_importances: Vec::new(),
            history: Vec::new(),
            best_iteration: None,
        }
    }

    /// Fit the booster. With an eval pair, each round scores the held-out
    /// data and, when `use_best_model` is set, the ensemble is truncated to
    /// the round with the lowest eval RMSE.
    pub fn fit(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        eval: Option<(&Array2<f64>, &Array1<f64>)>,
    ) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(BikecastError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if let Some((x_eval, y_eval)) = eval {
            if x_eval.nrows() != y_eval.len() {
                return Err(BikecastError::ShapeError {
                    expected: format!("y_eval length = {}", x_eval.nrows()),
                    actual: format!("y_eval length = {}", y_eval.len()),
                });
            }
        }

        self.trees.clear();
        self.col_indices_per_tree.clear();
        self.history.clear();
        self.best_iteration = None;
        self.initial_prediction = y.mean().unwrap_or(0.0);
        self.feature_importances = vec![0.0; n_features];

        let mut predictions = Array1::from_elem(n_samples, self.initial_prediction);
        let mut eval_predictions =
            eval.map(|(x_eval, _)| Array1::from_elem(x_eval.nrows(), self.initial_prediction));

        let mut rng = match self.params.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        let mut best_eval_rmse = f64::INFINITY;

        for round in 0..self.params.n_estimators {
            let residuals: Array1<f64> = y
                .iter()
                .zip(predictions.iter())
                .map(|(yi, pi)| yi - pi)
                .collect();

            let sample_indices = subsample(n_samples, self.params.subsample, &mut rng);
            let col_indices = subsample(n_features, self.params.colsample_bytree, &mut rng);

            let x_rows = x.select(ndarray::Axis(0), &sample_indices);
            let x_sub = x_rows.select(ndarray::Axis(1), &col_indices);
            let y_sub: Array1<f64> =
                Array1::from_vec(sample_indices.iter().map(|&i| residuals[i]).collect());

            let mut tree = RegressionTree::new()
                .with_max_depth(self.params.max_depth)
                .with_min_samples_leaf(self.params.min_samples_leaf);
            tree.fit(&x_sub, &y_sub)?;

            // Update running predictions on the full training set
            let x_full_sub = x.select(ndarray::Axis(1), &col_indices);
            let tree_pred = tree.predict(&x_full_sub)?;
            for i in 0..n_samples {
                predictions[i] += self.params.learning_rate * tree_pred[i];
            }

            if let Some(tree_importance) = tree.feature_importances() {
                for (j, &col_idx) in col_indices.iter().enumerate() {
                    if j < tree_importance.len() {
                        self.feature_importances[col_idx] += tree_importance[j];
                    }
                }
            }

            let mut record = IterationRecord {
                train_r2: r2_score(y, &predictions),
                train_rmse: rmse(y, &predictions),
                eval_rmse: None,
            };

            if let (Some((x_eval, y_eval)), Some(eval_preds)) = (eval, eval_predictions.as_mut())
            {
                let x_eval_sub = x_eval.select(ndarray::Axis(1), &col_indices);
                let eval_tree_pred = tree.predict(&x_eval_sub)?;
                for i in 0..eval_preds.len() {
                    eval_preds[i] += self.params.learning_rate * eval_tree_pred[i];
                }
                let eval_rmse = rmse(y_eval, eval_preds);
                record.eval_rmse = Some(eval_rmse);
                if eval_rmse < best_eval_rmse {
                    best_eval_rmse = eval_rmse;
                    self.best_iteration = Some(round);
                }
            }

            self.history.push(record);
            self.trees.push(tree);
            self.col_indices_per_tree.push(col_indices);
        }

        if eval.is_some() && self.params.use_best_model {
            if let Some(best) = self.best_iteration {
                self.trees.truncate(best + 1);
                self.col_indices_per_tree.truncate(best + 1);
            }
        }

        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= total;
            }
        }

        Ok(())
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(BikecastError::NotFitted);
        }

        let n = x.nrows();
        let mut predictions = Array1::from_elem(n, self.initial_prediction);

        for (tree, col_indices) in self.trees.iter().zip(self.col_indices_per_tree.iter()) {
            let x_sub = x.select(ndarray::Axis(1), col_indices);
            let tree_pred = tree.predict(&x_sub)?;
            for i in 0..n {
                predictions[i] += self.params.learning_rate * tree_pred[i];
            }
        }

        Ok(predictions)
    }

    /// Per-round evaluation history recorded during `fit`
    pub fn evals(&self) -> &[IterationRecord] {
        &self.history
    }

    /// Round with the lowest eval RMSE, when an eval set was supplied
    pub fn best_iteration(&self) -> Option<usize> {
        self.best_iteration
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn subsample(n: usize, fraction: f64, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
    let sample_size = ((n as f64) * fraction).ceil() as usize;
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices.truncate(sample_size.max(1));
    indices.sort();
    indices
}
