//! Destinations for finished backtest results.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use quant_core::TradingError;
use tracing::info;

use crate::BacktestResult;

/// Accepts a finished result and assigns it an identity.
pub trait ResultSink {
    /// Store `result`, returning the identity it was stored under.
    fn store(&mut self, result: &BacktestResult) -> Result<String, TradingError>;
}

/// Writes each result as a pretty JSON file in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
    stored: usize,
}

impl JsonFileSink {
    /// Create a sink writing into `dir`, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, TradingError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, stored: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ResultSink for JsonFileSink {
    fn store(&mut self, result: &BacktestResult) -> Result<String, TradingError> {
        self.stored += 1;
        let id = format!(
            "{}_{}_{}_{:03}",
            result.strategy,
            result.symbol,
            Utc::now().format("%Y%m%dT%H%M%S"),
            self.stored
        );
        let path = self.dir.join(format!("{id}.json"));
        fs::write(&path, result.to_json()?)?;

        info!(id = %id, path = %path.display(), "backtest result stored");
        Ok(id)
    }
}

/// Keeps results in memory, keyed by insertion order.
#[derive(Debug, Default)]
pub struct MemorySink {
    results: Vec<(String, BacktestResult)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[(String, BacktestResult)] {
        &self.results
    }
}

impl ResultSink for MemorySink {
    fn store(&mut self, result: &BacktestResult) -> Result<String, TradingError> {
        let id = format!("run-{}", self.results.len() + 1);
        self.results.push((id.clone(), result.clone()));
        Ok(id)
    }
}
