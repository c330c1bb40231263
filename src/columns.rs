//! DataFrame column extraction helpers
//!
//! Polars stores columns; the learners want row-major `ndarray` matrices.
//! Everything funnels through these helpers so numeric casting behaves the
//! same in training, inference and serving.

use crate::error::{BikecastError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Extract one column as f64 values
pub fn column_to_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| BikecastError::FeatureNotFound(name.to_string()))?;
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|e| BikecastError::DataError(e.to_string()))?;
    let values: Vec<f64> = casted
        .f64()
        .map_err(|e| BikecastError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Extract one column as strings. Booleans and integers get their display
/// form, so categorical levels compare the same regardless of source dtype.
pub fn column_to_strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)
        .map_err(|_| BikecastError::FeatureNotFound(name.to_string()))?;
    let casted = column
        .cast(&DataType::String)
        .map_err(|e| BikecastError::DataError(e.to_string()))?;
    let values: Vec<String> = casted
        .str()
        .map_err(|e| BikecastError::DataError(e.to_string()))?
        .into_iter()
        .map(|v| v.unwrap_or("").to_string())
        .collect();
    Ok(values)
}

/// Stack pre-extracted columns into a row-major matrix
pub fn stack_columns(columns: &[Vec<f64>], n_rows: usize) -> Result<Array2<f64>> {
    let n_cols = columns.len();
    for col in columns {
        if col.len() != n_rows {
            return Err(BikecastError::ShapeError {
                expected: format!("{} rows", n_rows),
                actual: format!("{} rows", col.len()),
            });
        }
    }
    let col_refs: Vec<&[f64]> = columns.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

/// Extract named columns into a row-major matrix, casting everything to f64
pub fn columns_to_array2(df: &DataFrame, names: &[String]) -> Result<Array2<f64>> {
    let columns: Vec<Vec<f64>> = names
        .iter()
        .map(|name| column_to_f64(df, name))
        .collect::<Result<_>>()?;
    stack_columns(&columns, df.height())
}

/// Extract a target column as an ndarray vector
pub fn column_to_array1(df: &DataFrame, name: &str) -> Result<Array1<f64>> {
    Ok(Array1::from_vec(column_to_f64(df, name)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_dtypes_to_matrix() {
        let df = df!(
            "a" => &[1i64, 2, 3],
            "b" => &[0.5f64, 1.5, 2.5],
        )
        .unwrap();

        let x = columns_to_array2(&df, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(x.shape(), &[3, 2]);
        assert_eq!(x[[1, 0]], 2.0);
        assert_eq!(x[[2, 1]], 2.5);
    }

    #[test]
    fn test_bool_column_to_strings() {
        let df = df!("flag" => &[true, false, true]).unwrap();
        let values = column_to_strings(&df, "flag").unwrap();
        assert_eq!(values, vec!["true", "false", "true"]);
    }

    #[test]
    fn test_missing_column() {
        let df = df!("a" => &[1i64]).unwrap();
        assert!(matches!(
            column_to_f64(&df, "nope"),
            Err(BikecastError::FeatureNotFound(_))
        ));
    }
}
