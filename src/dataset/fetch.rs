//! Remote dataset fetch

use crate::error::{BikecastError, Result};
use polars::prelude::*;
use std::io::Cursor;

/// Download a CSV from `url` and parse it into a DataFrame.
///
/// Any transport or parse failure surfaces as `DataUnavailable`; the caller
/// reruns `prepare-data` once the source is reachable again.
pub fn fetch_csv(url: &str) -> Result<DataFrame> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| BikecastError::DataUnavailable(format!("{}: {}", url, e)))?;

    let body = response
        .into_string()
        .map_err(|e| BikecastError::DataUnavailable(format!("{}: {}", url, e)))?;

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .into_reader_with_file_handle(Cursor::new(body.into_bytes()))
        .finish()
        .map_err(|e| BikecastError::DataUnavailable(format!("{}: {}", url, e)))
}
