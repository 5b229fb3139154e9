//! Market data sources.
//!
//! Data is loaded and validated into a [`BarSeries`] before a backtest starts.

mod csv_source;

pub use csv_source::{parse_csv, parse_timestamp, CsvDataSource};

use quant_core::error::DataError;
use quant_core::types::BarSeries;
use std::path::Path;

/// Load every bar of a CSV file as `symbol`.
pub async fn load_csv(path: impl AsRef<Path>, symbol: &str) -> Result<BarSeries, DataError> {
    let source = CsvDataSource::new(path)?;
    source.load_all(symbol).await
}
