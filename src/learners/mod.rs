//! Tree-ensemble learners
//!
//! The model adapters delegate all actual learning to these regressors.

pub mod decision_tree;
pub mod gradient_boosting;
pub mod random_forest;

pub use decision_tree::{RegressionTree, TreeNode};
pub use gradient_boosting::{GradientBoosting, IterationRecord};
pub use random_forest::RandomForest;
