//! Training and batch-inference orchestration
//!
//! Single-threaded, run-to-completion flows over the dataset provider and
//! the model adapters. Any error aborts the run; parallelism lives inside
//! the learners only.

mod infer;
mod train;

pub use infer::Inferencer;
pub use train::Trainer;
