//! Dataset preparation and split loading
//!
//! Splitting happens once (`prepare`) and is reused by every run: both
//! partitions are derived identically for all experiments and the remote
//! source is fetched a single time.

use crate::columns::column_to_array1;
use crate::config::DataConfig;
use crate::error::{BikecastError, Result};
use ndarray::Array1;
use polars::prelude::*;
use std::fs::File;
use std::path::PathBuf;
use tracing::{debug, info};

use super::fetch;

/// Target column of the bike-sharing table
pub const TARGET_COLUMN: &str = "count";

/// Temporal partition key; dropped from the feature set post-split
pub const YEAR_COLUMN: &str = "year";

/// Column holding the collapsed categorical weather level
pub const WEATHER_COLUMN: &str = "weather";

/// The fixed numerical feature set; every other feature column is categorical
pub const NUMERICAL_FEATURES: [&str; 4] = ["temp", "feel_temp", "humidity", "windspeed"];

/// A dataset partition name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One loaded partition: features, target, and the feature classification
/// used to build model preprocessing
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub features: DataFrame,
    pub target: Array1<f64>,
    pub numerical_features: Vec<String>,
    pub categorical_features: Vec<String>,
}

/// Fetches, splits and persists the dataset; loads persisted partitions
#[derive(Debug, Clone)]
pub struct DatasetProvider {
    source_url: String,
    data_dir: PathBuf,
}

impl DatasetProvider {
    pub fn new(source_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_url: source_url.into(),
            data_dir: data_dir.into(),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(config.source_url.clone(), config.data_dir.clone())
    }

    fn split_path(&self, split: Split) -> PathBuf {
        self.data_dir.join(format!("{}.csv", split))
    }

    /// Fetch the canonical dataset, clean it, split by year and persist both
    /// partitions (features + target) as CSV.
    pub fn prepare(&self, print_info: bool) -> Result<()> {
        let raw = fetch::fetch_csv(&self.source_url)?;
        info!(rows = raw.height(), "fetched source dataset");

        let (mut train, mut test) = clean_and_split(&raw)?;

        if print_info {
            info!(
                train_rows = train.height(),
                test_rows = test.height(),
                columns = train.width(),
                "split prepared"
            );
            for (name, dtype) in train.schema().iter() {
                debug!(column = name.as_str(), dtype = %dtype, "schema");
            }
        }

        std::fs::create_dir_all(&self.data_dir)?;
        for (df, split) in [(&mut train, Split::Train), (&mut test, Split::Test)] {
            let path = self.split_path(split);
            let mut file = File::create(&path)?;
            CsvWriter::new(&mut file).include_header(true).finish(df)?;
            info!(path = %path.display(), rows = df.height(), "wrote partition");
        }

        Ok(())
    }

    /// Load a persisted partition and classify its feature columns
    pub fn load(&self, split: Split) -> Result<DatasetSplit> {
        let path = self.split_path(split);
        if !path.exists() {
            return Err(BikecastError::SplitNotFound(split.as_str().to_string()));
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .try_into_reader_with_file_path(Some(path))
            .map_err(|e| BikecastError::DataError(e.to_string()))?
            .finish()
            .map_err(|e| BikecastError::DataError(e.to_string()))?;

        let target = column_to_array1(&df, TARGET_COLUMN)?;
        let features = df.drop(TARGET_COLUMN)?;
        let (numerical_features, categorical_features) = classify_features(&features)?;

        debug!(
            split = %split,
            rows = features.height(),
            numerical = numerical_features.len(),
            categorical = categorical_features.len(),
            "loaded partition"
        );

        Ok(DatasetSplit {
            features,
            target,
            numerical_features,
            categorical_features,
        })
    }
}

/// Collapse the rare `heavy_rain` weather level into `rain`, then partition
/// by year: year 0 trains, the rest tests. The year key never reaches the
/// feature set.
pub fn clean_and_split(raw: &DataFrame) -> Result<(DataFrame, DataFrame)> {
    let cleaned = raw
        .clone()
        .lazy()
        .with_column(
            when(col(WEATHER_COLUMN).eq(lit("heavy_rain")))
                .then(lit("rain"))
                .otherwise(col(WEATHER_COLUMN))
                .alias(WEATHER_COLUMN),
        )
        .collect()?;

    let train = cleaned
        .clone()
        .lazy()
        .filter(col(YEAR_COLUMN).eq(lit(0)))
        .select([all().exclude([YEAR_COLUMN])])
        .collect()?;
    let test = cleaned
        .lazy()
        .filter(col(YEAR_COLUMN).neq(lit(0)))
        .select([all().exclude([YEAR_COLUMN])])
        .collect()?;

    debug_assert_eq!(train.height() + test.height(), raw.height());

    Ok((train, test))
}

/// The numerical set is fixed by domain knowledge; everything else in the
/// frame is categorical. The two sets are disjoint and exhaustive.
pub fn classify_features(features: &DataFrame) -> Result<(Vec<String>, Vec<String>)> {
    let names: Vec<String> = features
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for required in NUMERICAL_FEATURES {
        if !names.iter().any(|n| n == required) {
            return Err(BikecastError::FeatureNotFound(required.to_string()));
        }
    }

    let numerical: Vec<String> = NUMERICAL_FEATURES.iter().map(|s| s.to_string()).collect();
    let categorical: Vec<String> = names
        .into_iter()
        .filter(|n| !NUMERICAL_FEATURES.contains(&n.as_str()))
        .collect();

    Ok((numerical, categorical))
}
