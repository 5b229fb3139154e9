//! Market data source trait definitions.

use crate::error::DataError;
use crate::types::BarSeries;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Trait for historical market data providers.
///
/// Implementations are called before a simulation starts; the engine itself
/// never performs I/O.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch historical bars.
    ///
    /// # Arguments
    /// * `symbol` - The symbol to fetch
    /// * `start` - Start of the date range (inclusive)
    /// * `end` - End of the date range (inclusive)
    ///
    /// # Returns
    /// A validated, time-ordered bar series
    async fn get_historical_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BarSeries, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
