//! CSV data source.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use quant_core::error::DataError;
use quant_core::traits::MarketDataSource;
use quant_core::types::{Bar, BarSeries};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Accepted header spellings per required column, matched case-insensitively.
const DATE_HEADERS: &[&str] = &["date", "timestamp", "datetime", "time"];
const OPEN_HEADERS: &[&str] = &["open"];
const HIGH_HEADERS: &[&str] = &["high"];
const LOW_HEADERS: &[&str] = &["low"];
const CLOSE_HEADERS: &[&str] = &["close", "adj close", "adj_close"];
const VOLUME_HEADERS: &[&str] = &["volume"];

/// Positions of the required columns in a CSV header row.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnMap {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, DataError> {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_ascii_lowercase()).collect();
        // aliases are listed in preference order, so "close" wins over "adj close"
        let find = |name: &str, aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias))
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            date: find("date", DATE_HEADERS)?,
            open: find("open", OPEN_HEADERS)?,
            high: find("high", HIGH_HEADERS)?,
            low: find("low", LOW_HEADERS)?,
            close: find("close", CLOSE_HEADERS)?,
            volume: find("volume", VOLUME_HEADERS)?,
        })
    }
}

/// CSV data source for historical data.
///
/// Points either at a single file, used for whatever symbol is requested, or
/// at a directory holding one `<SYMBOL>.csv` file per instrument.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
}

impl CsvDataSource {
    /// Create a new CSV data source.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn file_for(&self, symbol: &str) -> Result<PathBuf, DataError> {
        if self.path.is_dir() {
            let file = self.path.join(format!("{symbol}.csv"));
            if !file.is_file() {
                return Err(DataError::SymbolNotFound(symbol.to_string()));
            }
            Ok(file)
        } else {
            Ok(self.path.clone())
        }
    }

    /// Load every bar for `symbol`.
    pub async fn load_all(&self, symbol: &str) -> Result<BarSeries, DataError> {
        let file = self.file_for(symbol)?;
        let contents = tokio::fs::read_to_string(&file)
            .await
            .map_err(|e| DataError::ParseError(format!("{}: {e}", file.display())))?;

        let series = parse_csv(symbol, &contents)?;
        info!(symbol, bars = series.len(), path = %file.display(), "loaded CSV data");
        Ok(series)
    }
}

#[async_trait]
impl MarketDataSource for CsvDataSource {
    async fn get_historical_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BarSeries, DataError> {
        let series = self.load_all(symbol).await?;
        let sliced = series.slice_range(start.timestamp_millis(), end.timestamp_millis())?;
        debug!(symbol, kept = sliced.len(), total = series.len(), "filtered to date range");
        Ok(sliced)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse CSV text into a validated bar series.
///
/// Rows are sorted by timestamp; duplicate timestamps and invalid prices are
/// rejected by [`BarSeries::new`].
pub fn parse_csv(symbol: &str, contents: &str) -> Result<BarSeries, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(e.to_string()))?
        .clone();
    let columns = ColumnMap::from_headers(&headers)?;

    let mut bars = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DataError::ParseError(e.to_string()))?;
        let field = |index: usize, name: &str| -> Result<f64, DataError> {
            let raw = record.get(index).unwrap_or("");
            raw.parse::<f64>().map_err(|_| {
                DataError::ParseError(format!("row {}: invalid {name} value {raw:?}", row + 1))
            })
        };

        let timestamp = parse_timestamp(record.get(columns.date).unwrap_or(""))?;
        bars.push(Bar::new(
            timestamp,
            field(columns.open, "open")?,
            field(columns.high, "high")?,
            field(columns.low, "low")?,
            field(columns.close, "close")?,
            field(columns.volume, "volume")?,
        ));
    }

    bars.sort_by_key(|b| b.timestamp);
    BarSeries::new(symbol, bars)
}

/// Parse various timestamp formats into Unix milliseconds.
pub fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.timestamp_millis());
    }

    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            return Ok(d.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }

    // Unix timestamp, milliseconds if longer than 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        if ts > 10_000_000_000 {
            return Ok(ts);
        }
        return ts.checked_mul(1000).ok_or_else(|| {
            DataError::ParseError(format!("Unix timestamp out of range: {date_str}"))
        });
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {date_str}"
    )))
}
