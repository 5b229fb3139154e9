//! Signal generator implementations.
//!
//! This crate provides the built-in rule-based strategies:
//! - Momentum (fast/slow moving average)
//! - Mean Reversion (Bollinger Bands with RSI confirmation)
//! - Breakout (support/resistance channel with volume confirmation)
//!
//! Each one is a stateless transform from a bar series to a signal frame and
//! is built through the [`StrategyRegistry`] from JSON parameters.

mod breakout;
mod mean_reversion;
mod momentum;
mod params;
mod registry;

pub use breakout::{BreakoutConfig, BreakoutStrategy};
pub use mean_reversion::{MeanReversionConfig, MeanReversionStrategy};
pub use momentum::{MomentumConfig, MomentumStrategy};
pub use registry::{StrategyInfo, StrategyKind, StrategyRegistry};
