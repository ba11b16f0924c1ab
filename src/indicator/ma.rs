use std::fmt;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;
use crate::indicator::series::{mean, window_sums};
use crate::indicator::{Indicator, close_prices, ensure_len, ensure_period};
use crate::model::Candle;

/// Moving-average flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MaKind {
    #[serde(alias = "SMA")]
    Sma,
    #[serde(alias = "EMA")]
    Ema,
}

impl MaKind {
    /// Upper-case label used in report keys (`SMA20`, `EMA50`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Sma => "SMA",
            Self::Ema => "EMA",
        }
    }

    /// Build the calculator for this flavour.
    pub fn indicator(self, period: usize) -> Result<Box<dyn Indicator>, Report<IndicatorError>> {
        Ok(match self {
            Self::Sma => Box::new(Sma::new(period)?),
            Self::Ema => Box::new(Ema::new(period)?),
        })
    }
}

impl fmt::Display for MaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Simple moving average. Output length is `len(prices) - period + 1`.
pub fn sma(prices: &[f64], period: usize) -> Result<Vec<f64>, Report<IndicatorError>> {
    ensure_period("sma", "period", period)?;
    ensure_len("sma", period, prices.len())?;
    Ok(window_sums(prices, period)
        .into_iter()
        .map(|sum| sum / period as f64)
        .collect())
}

/// Exponential moving average seeded with the SMA of the first `period`
/// prices. Output length is `len(prices) - period + 1`.
pub fn ema(prices: &[f64], period: usize) -> Result<Vec<f64>, Report<IndicatorError>> {
    ensure_period("ema", "period", period)?;
    ensure_len("ema", period, prices.len())?;

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = mean(&prices[..period]).unwrap_or_default();
    let mut results = Vec::with_capacity(prices.len() - period + 1);
    results.push(ema);

    // Strictly left to right: each value folds in every prior input.
    for &price in &prices[period..] {
        ema = price * k + ema * (1.0 - k);
        results.push(ema);
    }

    Ok(results)
}

/// Simple Moving Average.
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        ensure_period("sma", "period", period)?;
        Ok(Self { period })
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        "sma"
    }

    fn required_candles(&self) -> usize {
        self.period
    }

    fn calculate(&self, candles: &[Candle]) -> Result<Vec<f64>, Report<IndicatorError>> {
        sma(&close_prices(candles), self.period)
    }
}

/// Exponential Moving Average.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        ensure_period("ema", "period", period)?;
        Ok(Self { period })
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        "ema"
    }

    fn required_candles(&self) -> usize {
        self.period
    }

    fn calculate(&self, candles: &[Candle]) -> Result<Vec<f64>, Report<IndicatorError>> {
        ema(&close_prices(candles), self.period)
    }
}
