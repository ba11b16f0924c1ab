use error_stack::{Report, bail};
use serde::Serialize;

use crate::error::IndicatorError;
use crate::indicator::ma::ema;
use crate::indicator::{Indicator, close_prices, ensure_len, ensure_period, required_len};
use crate::model::Candle;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// MACD line, signal line and histogram.
///
/// `macd[i]` belongs to input index `i + macd_warmup`; `signal[j]` and
/// `histogram[j]` belong to input index `j + histogram_warmup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// The latest aligned `(macd, signal, histogram)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl MacdSeries {
    pub fn latest(&self) -> Option<MacdPoint> {
        Some(MacdPoint {
            macd: *self.macd.last()?,
            signal: *self.signal.last()?,
            histogram: *self.histogram.last()?,
        })
    }
}

pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    pub fn new(
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<Self, Report<IndicatorError>> {
        ensure_period("macd", "fast_period", fast_period)?;
        ensure_period("macd", "slow_period", slow_period)?;
        ensure_period("macd", "signal_period", signal_period)?;
        if fast_period >= slow_period {
            bail!(IndicatorError::InvalidParameter {
                indicator: "macd",
                reason: format!(
                    "fast_period ({fast_period}) must be < slow_period ({slow_period})"
                ),
            });
        }
        // histogram_warmup() + 1 must fit
        required_len("macd", slow_period.checked_add(signal_period - 1))?;
        Ok(Self {
            fast_period,
            slow_period,
            signal_period,
        })
    }

    /// How many elements the fast EMA leads the slow EMA by.
    pub fn fast_offset(&self) -> usize {
        self.slow_period - self.fast_period
    }

    /// How many elements of the MACD line the signal EMA consumes before
    /// its first value.
    pub fn signal_offset(&self) -> usize {
        self.signal_period - 1
    }

    /// Input index of `macd[0]`.
    pub fn macd_warmup(&self) -> usize {
        self.slow_period - 1
    }

    /// Input index of `signal[0]` and `histogram[0]`.
    pub fn histogram_warmup(&self) -> usize {
        self.macd_warmup() + self.signal_offset()
    }

    /// Calculate all three aligned series from a price slice.
    pub fn calculate_prices(&self, prices: &[f64]) -> Result<MacdSeries, Report<IndicatorError>> {
        ensure_len("macd", self.required_candles(), prices.len())?;

        let fast_ema = ema(prices, self.fast_period)?;
        let slow_ema = ema(prices, self.slow_period)?;

        let fast_offset = self.fast_offset();
        let macd: Vec<f64> = fast_ema[fast_offset..]
            .iter()
            .zip(&slow_ema)
            .map(|(f, s)| f - s)
            .collect();

        let signal = ema(&macd, self.signal_period)?;
        let signal_offset = self.signal_offset();
        let histogram: Vec<f64> = macd[signal_offset..]
            .iter()
            .zip(&signal)
            .map(|(m, s)| m - s)
            .collect();

        Ok(MacdSeries {
            macd,
            signal,
            histogram,
        })
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        "macd"
    }

    fn required_candles(&self) -> usize {
        self.histogram_warmup() + 1
    }

    /// Returns MACD line values only.
    fn calculate(&self, candles: &[Candle]) -> Result<Vec<f64>, Report<IndicatorError>> {
        Ok(self.calculate_prices(&close_prices(candles))?.macd)
    }
}

/// Free-function form of [`Macd::calculate_prices`].
pub fn macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Result<MacdSeries, Report<IndicatorError>> {
    Macd::new(fast_period, slow_period, signal_period)?.calculate_prices(prices)
}
