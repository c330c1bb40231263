//! Experiment and run records

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::storage::LocalStorage;

/// Run lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

/// One named metric value at an integer step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub key: String,
    pub value: f64,
    pub step: usize,
}

/// A single tracked run: params, step-indexed metrics, artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    pub run_name: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub status: RunStatus,
    pub params: BTreeMap<String, String>,
    pub metrics: Vec<MetricRecord>,
    pub artifacts: Vec<String>,
}

impl Run {
    fn new(run_name: String) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
            run_name,
            start_time: chrono::Utc::now().timestamp(),
            end_time: None,
            status: RunStatus::Running,
            params: BTreeMap::new(),
            metrics: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Record a scalar hyperparameter or tag
    pub fn log_param(&mut self, key: &str, value: impl ToString) {
        self.params.insert(key.to_string(), value.to_string());
    }

    /// Record a named metric value at an integer step
    pub fn log_metric(&mut self, key: &str, value: f64, step: usize) {
        self.metrics.push(MetricRecord {
            key: key.to_string(),
            value,
            step,
        });
    }

    /// Record an artifact path (e.g. a checkpoint file)
    pub fn log_artifact(&mut self, path: &Path) {
        self.artifacts.push(path.display().to_string());
    }
}

/// A named experiment grouping runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    pub experiment_id: String,
    pub name: String,
    pub created_at: i64,
    pub runs: Vec<Run>,
}

/// File-backed experiment tracker
pub struct ExperimentTracker {
    storage: LocalStorage,
    experiments: Vec<Experiment>,
}

impl ExperimentTracker {
    /// Open (or create) the tracker under `base_dir`
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let storage = LocalStorage::new(base_dir.as_ref().to_path_buf());
        let experiments = storage.load_experiments()?;
        Ok(Self {
            storage,
            experiments,
        })
    }

    /// Begin a run inside the named experiment, creating it if needed
    pub fn start_run(&mut self, experiment_name: &str, run_name: &str) -> Run {
        if !self.experiments.iter().any(|e| e.name == experiment_name) {
            self.experiments.push(Experiment {
                experiment_id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
                name: experiment_name.to_string(),
                created_at: chrono::Utc::now().timestamp(),
                runs: Vec::new(),
            });
        }
        Run::new(run_name.to_string())
    }

    /// Mark a run finished and persist it under its experiment
    pub fn finish_run(&mut self, experiment_name: &str, mut run: Run) -> Result<()> {
        run.end_time = Some(chrono::Utc::now().timestamp());
        run.status = RunStatus::Finished;
        self.attach_run(experiment_name, run)
    }

    /// Persist a failed run so partial metrics are not lost
    pub fn fail_run(&mut self, experiment_name: &str, mut run: Run) -> Result<()> {
        run.end_time = Some(chrono::Utc::now().timestamp());
        run.status = RunStatus::Failed;
        self.attach_run(experiment_name, run)
    }

    fn attach_run(&mut self, experiment_name: &str, run: Run) -> Result<()> {
        let experiment = self
            .experiments
            .iter_mut()
            .find(|e| e.name == experiment_name)
            .ok_or_else(|| {
                crate::error::BikecastError::TrackingError(format!(
                    "unknown experiment '{}'",
                    experiment_name
                ))
            })?;
        experiment.runs.push(run);
        self.storage.save_experiments(&self.experiments)
    }

    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = ExperimentTracker::open(dir.path()).unwrap();

        let mut run = tracker.start_run("exp", "training-rf");
        run.log_param("n_estimators", 100);
        run.log_metric("r2", 0.82, 0);
        run.log_metric("r2", 0.85, 1);
        run.log_artifact(Path::new("checkpoints/model_rf.json"));
        tracker.finish_run("exp", run).unwrap();

        // Reopen and verify persistence
        let tracker = ExperimentTracker::open(dir.path()).unwrap();
        let exp = &tracker.experiments()[0];
        assert_eq!(exp.name, "exp");
        let run = &exp.runs[0];
        assert_eq!(run.status, RunStatus::Finished);
        assert_eq!(run.params["n_estimators"], "100");
        assert_eq!(run.metrics.len(), 2);
        assert_eq!(run.metrics[1].step, 1);
        assert_eq!(run.artifacts.len(), 1);
    }
}
