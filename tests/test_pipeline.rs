//! Integration tests: end-to-end train → checkpoint → infer flows

use bikecast::config::{ModelKind, RunConfig};
use bikecast::tracking::{ExperimentTracker, RunStatus};
use bikecast::{BikecastError, Inferencer, Trainer};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

fn train_frame() -> DataFrame {
    df!(
        "season" => &["spring", "spring", "summer", "summer", "fall", "fall", "winter", "winter", "spring", "summer", "fall", "winter"],
        "month" => &[1i64, 2, 5, 6, 9, 10, 12, 1, 3, 7, 9, 11],
        "hour" => &[0i64, 8, 12, 17, 9, 18, 7, 22, 14, 10, 16, 6],
        "holiday" => &[false, false, false, true, false, false, false, false, true, false, false, false],
        "weekday" => &[6i64, 1, 2, 3, 4, 5, 0, 6, 2, 3, 1, 4],
        "workingday" => &[false, true, true, true, true, true, false, false, true, true, true, true],
        "weather" => &["clear", "clear", "misty", "rain", "clear", "misty", "clear", "rain", "clear", "clear", "misty", "clear"],
        "temp" => &[9.84, 8.0, 22.0, 25.0, 18.0, 15.0, 3.0, 5.0, 12.0, 28.0, 17.0, 6.0],
        "feel_temp" => &[14.395, 9.0, 24.0, 27.0, 19.0, 16.0, 2.0, 4.0, 13.0, 30.0, 18.0, 5.0],
        "humidity" => &[0.81, 0.75, 0.55, 0.60, 0.65, 0.70, 0.85, 0.80, 0.60, 0.50, 0.68, 0.78],
        "windspeed" => &[0.0, 5.0, 10.0, 8.0, 6.0, 12.0, 4.0, 3.0, 9.0, 7.0, 11.0, 2.0],
        "count" => &[16.0, 120.0, 240.0, 310.0, 180.0, 150.0, 40.0, 25.0, 130.0, 350.0, 170.0, 60.0],
    )
    .unwrap()
}

fn test_frame() -> DataFrame {
    df!(
        "season" => &["spring", "summer", "fall", "winter", "summer", "spring"],
        "month" => &[1i64, 6, 9, 12, 7, 3],
        "hour" => &[8i64, 12, 18, 7, 10, 14],
        "holiday" => &[false, false, false, false, true, false],
        "weekday" => &[1i64, 2, 5, 0, 3, 4],
        "workingday" => &[true, true, true, false, true, true],
        "weather" => &["clear", "misty", "clear", "rain", "clear", "misty"],
        "temp" => &[10.0, 24.0, 16.0, 4.0, 27.0, 13.0],
        "feel_temp" => &[11.0, 26.0, 17.0, 3.0, 29.0, 14.0],
        "humidity" => &[0.74, 0.56, 0.66, 0.82, 0.52, 0.62],
        "windspeed" => &[4.0, 9.0, 11.0, 3.0, 6.0, 8.0],
        "count" => &[110.0, 250.0, 160.0, 30.0, 330.0, 140.0],
    )
    .unwrap()
}

fn write_csv(df: &mut DataFrame, path: &Path) {
    let mut file = File::create(path).unwrap();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .unwrap();
}

fn pipeline_config(root: &Path, kind: ModelKind) -> RunConfig {
    let mut config = RunConfig::default().with_kind(kind);
    config.data.data_dir = root.join("data");
    config.data.checkpoint_dir = root.join("checkpoints");
    config.data.predictions_dir = root.join("predictions");
    config.tracking.tracking_dir = root.join("experiments");
    config.model.random_forest.n_estimators = 5;
    config.model.random_forest.random_state = Some(21);
    config.model.boosted_trees.n_estimators = 10;
    config.model.boosted_trees.max_depth = 3;
    config
}

fn prepare_splits(root: &Path) {
    std::fs::create_dir_all(root.join("data")).unwrap();
    write_csv(&mut train_frame(), &root.join("data").join("train.csv"));
    write_csv(&mut test_frame(), &root.join("data").join("test.csv"));
}

#[test]
fn test_train_then_infer_random_forest() {
    let dir = tempfile::tempdir().unwrap();
    prepare_splits(dir.path());
    let config = pipeline_config(dir.path(), ModelKind::RandomForest);

    let checkpoint = Trainer::new(config.clone()).run().unwrap();
    assert!(checkpoint.ends_with("model_rf.json"));
    assert!(checkpoint.exists());

    let predictions = Inferencer::new(config).run().unwrap();
    assert!(predictions.ends_with("model_rf_preds.csv"));

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(predictions))
        .unwrap()
        .finish()
        .unwrap();
    assert_eq!(df.height(), 6);
    assert!(df.column("prediction").is_ok());
}

#[test]
fn test_train_then_infer_boosted_trees() {
    let dir = tempfile::tempdir().unwrap();
    prepare_splits(dir.path());
    let config = pipeline_config(dir.path(), ModelKind::BoostedTrees);

    let checkpoint = Trainer::new(config.clone()).run().unwrap();
    assert!(checkpoint.ends_with("model_gbt.json"));

    let predictions = Inferencer::new(config).run().unwrap();
    assert!(predictions.ends_with("model_gbt_preds.csv"));
}

#[test]
fn test_tracked_training_persists_a_finished_run() {
    let dir = tempfile::tempdir().unwrap();
    prepare_splits(dir.path());
    let mut config = pipeline_config(dir.path(), ModelKind::RandomForest);
    config.tracking.enabled = true;

    let checkpoint = Trainer::new(config.clone()).run().unwrap();

    let tracker = ExperimentTracker::open(&config.tracking.tracking_dir).unwrap();
    let experiment = &tracker.experiments()[0];
    assert_eq!(experiment.name, "bike-sharing-demand");

    let run = &experiment.runs[0];
    assert_eq!(run.status, RunStatus::Finished);
    assert_eq!(run.run_name, "training-rf");
    assert_eq!(run.params["model_kind"], "rf");
    assert!(run.metrics.iter().any(|m| m.key == "fi_of_temp"));
    assert!(run.metrics.iter().any(|m| m.key == "r2_metric"));
    assert_eq!(run.artifacts, vec![checkpoint.display().to_string()]);
}

#[test]
fn test_failed_checkpoint_still_persists_the_run() {
    let dir = tempfile::tempdir().unwrap();
    prepare_splits(dir.path());
    let mut config = pipeline_config(dir.path(), ModelKind::RandomForest);
    config.tracking.enabled = true;
    // A file where the checkpoint directory should be makes the write fail
    std::fs::write(dir.path().join("checkpoints"), b"").unwrap();

    assert!(Trainer::new(config.clone()).run().is_err());

    let tracker = ExperimentTracker::open(&config.tracking.tracking_dir).unwrap();
    let run = &tracker.experiments()[0].runs[0];
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.metrics.iter().any(|m| m.key == "r2_metric"));
    assert!(run.artifacts.is_empty());
}

#[test]
fn test_infer_without_checkpoint_fails() {
    let dir = tempfile::tempdir().unwrap();
    prepare_splits(dir.path());
    let config = pipeline_config(dir.path(), ModelKind::RandomForest);

    assert!(matches!(
        Inferencer::new(config).run(),
        Err(BikecastError::CheckpointNotFound(_))
    ));
}

#[test]
fn test_custom_checkpoint_name_names_the_predictions() {
    let dir = tempfile::tempdir().unwrap();
    prepare_splits(dir.path());
    let mut config = pipeline_config(dir.path(), ModelKind::RandomForest);
    config.model.checkpoint_name = Some("run_7.json".to_string());

    let checkpoint = Trainer::new(config.clone()).run().unwrap();
    assert!(checkpoint.ends_with("run_7.json"));

    let predictions = Inferencer::new(config).run().unwrap();
    assert!(predictions.ends_with("run_7_preds.csv"));
}
