//! Dataset fetching, splitting and loading

mod fetch;
mod provider;

pub use fetch::fetch_csv;
pub use provider::{
    classify_features, clean_and_split, DatasetProvider, DatasetSplit, Split, NUMERICAL_FEATURES,
    TARGET_COLUMN, WEATHER_COLUMN, YEAR_COLUMN,
};
