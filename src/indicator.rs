pub mod bollinger;
pub mod levels;
pub mod ma;
pub mod macd;
pub mod rsi;
pub mod series;

use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::model::Candle;

/// A technical analysis indicator that operates on a slice of candles.
///
/// Candles must be in ascending chronological order (oldest first).
pub trait Indicator: Send + Sync {
    /// Unique name of this indicator (e.g., "rsi", "sma").
    fn name(&self) -> &str;

    /// Minimum number of candles required to produce at least one output value.
    fn required_candles(&self) -> usize;

    /// Calculate the primary output series from candles.
    ///
    /// The number of values is smaller than the number of input candles by
    /// the indicator's warm-up.
    fn calculate(&self, candles: &[Candle]) -> Result<Vec<f64>, Report<IndicatorError>>;
}

/// Extract close prices from a slice of candles.
pub fn close_prices(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Extract high prices from a slice of candles.
pub fn high_prices(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.high).collect()
}

/// Extract low prices from a slice of candles.
pub fn low_prices(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.low).collect()
}

pub(crate) fn ensure_period(
    indicator: &'static str,
    param: &str,
    value: usize,
) -> Result<(), Report<IndicatorError>> {
    if value == 0 {
        bail!(IndicatorError::InvalidParameter {
            indicator,
            reason: format!("{param} must be > 0"),
        });
    }
    Ok(())
}

/// Minimum input length derived from parameters; `None` means the
/// arithmetic overflowed `usize`.
pub(crate) fn required_len(
    indicator: &'static str,
    len: Option<usize>,
) -> Result<usize, Report<IndicatorError>> {
    len.ok_or_else(|| {
        Report::new(IndicatorError::InvalidParameter {
            indicator,
            reason: "parameters exceed the largest representable input length".into(),
        })
    })
}

pub(crate) fn ensure_len(
    indicator: &'static str,
    required: usize,
    available: usize,
) -> Result<(), Report<IndicatorError>> {
    if available < required {
        bail!(IndicatorError::InsufficientData {
            indicator,
            required,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, TimeZone, Utc};

    use crate::model::Candle;

    pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| candle(i, c, c, c))
            .collect()
    }

    pub fn candles_from_high_low(highs: &[f64], lows: &[f64]) -> Vec<Candle> {
        highs
            .iter()
            .zip(lows)
            .enumerate()
            .map(|(i, (&h, &l))| candle(i, h, l, (h + l) / 2.0))
            .collect()
    }

    fn candle(i: usize, high: f64, low: f64, close: f64) -> Candle {
        let open_time = Utc.timestamp_millis_opt(1_704_067_200_000).unwrap()
            + Duration::minutes(i as i64);
        Candle {
            open_time,
            open: close,
            high,
            low,
            close,
            volume: 1.0,
            close_time: open_time + Duration::milliseconds(59_999),
        }
    }

    pub fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }
}
