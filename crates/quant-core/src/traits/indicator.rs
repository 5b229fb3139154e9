//! Indicator trait definitions.

/// Trait for technical indicators.
///
/// Indicators process price data and produce derived values
/// useful for trading decisions.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    ///
    /// The returned vector is compact: its first element corresponds to the
    /// first input index at which the lookback window is filled. Use
    /// [`aligned`] to line it up with the input.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

/// Multi-output indicator (e.g., Bollinger Bands).
///
/// Some indicators produce multiple related values.
pub trait MultiOutputIndicator: Send + Sync {
    /// The output type containing multiple values.
    type Outputs;

    /// Calculate indicator values for the given data.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Outputs>;

    /// Get the minimum data points required.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}

/// Right-align a compact indicator output with an input of length `len`,
/// padding the unfilled warmup prefix with `None`.
pub fn aligned<T: Copy>(values: &[T], len: usize) -> Vec<Option<T>> {
    let pad = len.saturating_sub(values.len());
    let mut out = Vec::with_capacity(len);
    out.resize(pad, None);
    out.extend(values.iter().take(len).copied().map(Some));
    out
}
