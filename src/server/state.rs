//! Shared server state

use crate::models::ModelAdapter;

/// Immutable state behind an `Arc`: a fitted, checkpoint-loaded adapter.
/// Prediction takes `&self`, so concurrent requests need no locking.
pub struct AppState {
    pub adapter: ModelAdapter,
}

impl AppState {
    pub fn new(adapter: ModelAdapter) -> Self {
        Self { adapter }
    }
}
