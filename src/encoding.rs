//! Ordinal encoding for categorical features
//!
//! The random-forest adapter embeds this encoder in its serialized pipeline,
//! so inference never recomputes the category-to-code mapping. Codes are
//! assigned by lexical order of the categories seen during `fit`; transform
//! rejects unseen categories instead of guessing a code.

use crate::columns::column_to_strings;
use crate::error::{BikecastError, Result};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-column category -> integer-code mapping, fit on training data only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    /// Column name -> lexically sorted category list; code = position
    categories: BTreeMap<String, Vec<String>>,
}

impl OrdinalEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn the category set of each named column
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<()> {
        self.categories.clear();
        for name in columns {
            let mut levels = column_to_strings(df, name)?;
            levels.sort();
            levels.dedup();
            self.categories.insert(name.clone(), levels);
        }
        Ok(())
    }

    /// Encode one column to f64 codes
    pub fn transform_column(&self, df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let levels = self
            .categories
            .get(name)
            .ok_or_else(|| BikecastError::FeatureNotFound(name.to_string()))?;
        column_to_strings(df, name)?
            .into_iter()
            .map(|value| {
                levels
                    .binary_search(&value)
                    .map(|code| code as f64)
                    .map_err(|_| {
                        BikecastError::DataError(format!(
                            "unseen category '{}' in column '{}'",
                            value, name
                        ))
                    })
            })
            .collect()
    }

    pub fn is_fitted(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Columns this encoder was fit on, in code order
    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.categories.keys()
    }
}
