//! File-system persistence for experiments

use crate::error::{BikecastError, Result};
use std::fs;
use std::path::PathBuf;

use super::tracker::Experiment;

/// Local file system storage backend. All experiments live in one JSON file
/// under the base directory; runs are small (params and metric scalars), so
/// a single document is fine.
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn experiments_file(&self) -> PathBuf {
        self.base_dir.join("experiments.json")
    }

    pub fn save_experiments(&self, experiments: &[Experiment]) -> Result<()> {
        fs::create_dir_all(&self.base_dir)?;
        let json = serde_json::to_string_pretty(experiments)?;
        fs::write(self.experiments_file(), json).map_err(|e| {
            BikecastError::TrackingError(format!(
                "failed to write {}: {}",
                self.experiments_file().display(),
                e
            ))
        })
    }

    pub fn load_experiments(&self) -> Result<Vec<Experiment>> {
        let path = self.experiments_file();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&path)?;
        let experiments = serde_json::from_str(&contents).map_err(|e| {
            BikecastError::TrackingError(format!("corrupt {}: {}", path.display(), e))
        })?;
        Ok(experiments)
    }
}
