//! Integration tests: the adapter contract across both model variants

use bikecast::config::{ModelConfig, ModelKind, RandomForestParams};
use bikecast::{BikecastError, ModelAdapter};
use ndarray::Array1;
use polars::prelude::*;
use std::str::FromStr;

fn config(kind: ModelKind) -> ModelConfig {
    let mut config = ModelConfig {
        kind,
        ..Default::default()
    };
    config.random_forest = RandomForestParams {
        n_estimators: 8,
        random_state: Some(11),
        ..Default::default()
    };
    config.boosted_trees.n_estimators = 8;
    config.boosted_trees.max_depth = 3;
    config
}

fn feature_lists() -> (Vec<String>, Vec<String>) {
    (
        vec!["temp".to_string(), "humidity".to_string()],
        vec!["season".to_string(), "weather".to_string()],
    )
}

fn training_data() -> (DataFrame, Array1<f64>) {
    let x = df!(
        "season" => &["spring", "summer", "winter", "spring", "summer", "winter", "spring", "summer"],
        "weather" => &["clear", "clear", "rain", "misty", "clear", "rain", "clear", "misty"],
        "temp" => &[9.8, 24.0, 2.1, 12.5, 21.0, 4.4, 11.0, 26.5],
        "humidity" => &[0.81, 0.55, 0.90, 0.70, 0.60, 0.85, 0.75, 0.50],
    )
    .unwrap();
    let y = ndarray::array![16.0, 85.0, 12.0, 33.0, 64.0, 20.0, 28.0, 90.0];
    (x, y)
}

fn both_kinds() -> [ModelKind; 2] {
    [ModelKind::RandomForest, ModelKind::BoostedTrees]
}

#[test]
fn test_eval_before_train_is_not_fitted() {
    let (numerical, categorical) = feature_lists();
    let (x, y) = training_data();

    for kind in both_kinds() {
        let adapter = ModelAdapter::build(&config(kind), &numerical, &categorical);
        assert!(
            matches!(adapter.eval(&x, &y), Err(BikecastError::NotFitted)),
            "{} should refuse eval before train",
            kind
        );
    }
}

#[test]
fn test_eval_features_without_targets_is_invalid_input() {
    let (numerical, categorical) = feature_lists();
    let (x, y) = training_data();

    for kind in both_kinds() {
        let mut adapter = ModelAdapter::build(&config(kind), &numerical, &categorical);
        assert!(matches!(
            adapter.train(&x, &y, Some(&x), None),
            Err(BikecastError::InvalidInput(_))
        ));
    }
}

#[test]
fn test_checkpoint_roundtrip_preserves_predictions() {
    let (numerical, categorical) = feature_lists();
    let (x, y) = training_data();
    let dir = tempfile::tempdir().unwrap();

    for kind in both_kinds() {
        let mut adapter = ModelAdapter::build(&config(kind), &numerical, &categorical);
        adapter.train(&x, &y, None, None).unwrap();
        let before = adapter.eval(&x, &y).unwrap();

        let path = adapter.checkpoint(dir.path()).unwrap();
        let restored = ModelAdapter::load_checkpoint(&path).unwrap();
        assert!(restored.is_fitted());
        assert_eq!(restored.kind(), kind);

        let after = restored.eval(&x, &y).unwrap();
        assert_eq!(before, after, "{} roundtrip changed predictions", kind);
    }
}

#[test]
fn test_training_with_eval_pair_reports_and_fits() {
    let (numerical, categorical) = feature_lists();
    let (x, y) = training_data();

    for kind in both_kinds() {
        let mut adapter = ModelAdapter::build(&config(kind), &numerical, &categorical);
        adapter.train(&x, &y, Some(&x), Some(&y)).unwrap();
        assert!(adapter.is_fitted());
        assert_eq!(adapter.predict(&x).unwrap().len(), x.height());
    }
}

#[test]
fn test_unknown_kind_never_reaches_the_factory() {
    assert!(matches!(
        ModelKind::from_str("unknown"),
        Err(BikecastError::UnknownModelKind(_))
    ));
    assert!(matches!(
        ModelKind::from_str(""),
        Err(BikecastError::UnknownModelKind(_))
    ));
}

#[test]
fn test_fixed_seed_is_deterministic() {
    let (numerical, categorical) = feature_lists();
    let (x, y) = training_data();

    for kind in both_kinds() {
        let mut a = ModelAdapter::build(&config(kind), &numerical, &categorical);
        let mut b = ModelAdapter::build(&config(kind), &numerical, &categorical);
        a.train(&x, &y, None, None).unwrap();
        b.train(&x, &y, None, None).unwrap();
        assert_eq!(
            a.predict(&x).unwrap(),
            b.predict(&x).unwrap(),
            "{} not deterministic under a fixed seed",
            kind
        );
    }
}
