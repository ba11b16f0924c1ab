use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::{Indicator, close_prices, ensure_len, ensure_period, required_len};
use crate::model::Candle;

pub const DEFAULT_PERIOD: usize = 14;

/// Wilder-smoothed RSI. Output length is `len(prices) - period`.
pub fn rsi(prices: &[f64], period: usize) -> Result<Vec<f64>, Report<IndicatorError>> {
    ensure_period("rsi", "period", period)?;
    ensure_len("rsi", min_len(period)?, prices.len())?;

    let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let weight = period as f64;

    // Seed using simple average of first `period` gains/losses
    let mut avg_gain = deltas[..period].iter().map(|&d| d.max(0.0)).sum::<f64>() / weight;
    let mut avg_loss = deltas[..period].iter().map(|&d| (-d).max(0.0)).sum::<f64>() / weight;

    let mut results = Vec::with_capacity(deltas.len() - period + 1);
    results.push(rsi_value(avg_gain, avg_loss));

    for &delta in &deltas[period..] {
        avg_gain = (avg_gain * (weight - 1.0) + delta.max(0.0)) / weight;
        avg_loss = (avg_loss * (weight - 1.0) + (-delta).max(0.0)) / weight;
        results.push(rsi_value(avg_gain, avg_loss));
    }

    Ok(results)
}

fn min_len(period: usize) -> Result<usize, Report<IndicatorError>> {
    required_len("rsi", period.checked_add(1))
}

/// Flat input (no gains, no losses) is neutral rather than 0/0.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// RSI (Relative Strength Index) using Wilder's smoothing method.
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        ensure_period("rsi", "period", period)?;
        min_len(period)?;
        Ok(Self { period })
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "rsi"
    }

    fn required_candles(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, candles: &[Candle]) -> Result<Vec<f64>, Report<IndicatorError>> {
        rsi(&close_prices(candles), self.period)
    }
}
