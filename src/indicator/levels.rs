//! Support/resistance detection from local extrema of lows and highs.
//!
//! Index `i` is a support candidate when no low inside
//! `lows[i - lookback..=i + lookback]` is strictly smaller than `lows[i]`;
//! resistance mirrors this on highs. Ties are not broken: every tied index
//! qualifies, and duplicates only collapse when the candidates are turned
//! into a set of distinct price levels. Cost is `O(n * lookback)`.

use error_stack::{Report, bail};
use serde::Serialize;

use crate::error::IndicatorError;
use crate::indicator::{ensure_len, ensure_period, high_prices, low_prices, required_len};
use crate::model::Candle;

pub const DEFAULT_LOOKBACK: usize = 20;

/// Distinct price levels. Supports are sorted descending, resistances
/// ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelSet {
    pub supports: Vec<f64>,
    pub resistances: Vec<f64>,
}

impl LevelSet {
    /// Highest support strictly below `price`.
    pub fn nearest_support(&self, price: f64) -> Option<f64> {
        self.supports.iter().copied().find(|&s| s < price)
    }

    /// Lowest resistance strictly above `price`.
    pub fn nearest_resistance(&self, price: f64) -> Option<f64> {
        self.resistances.iter().copied().find(|&r| r > price)
    }

    pub fn len(&self) -> usize {
        self.supports.len() + self.resistances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn find_levels(
    highs: &[f64],
    lows: &[f64],
    lookback: usize,
) -> Result<LevelSet, Report<IndicatorError>> {
    ensure_period("support_resistance", "lookback", lookback)?;
    if highs.len() != lows.len() {
        bail!(IndicatorError::LengthMismatch {
            highs: highs.len(),
            lows: lows.len(),
        });
    }
    ensure_len("support_resistance", min_len(lookback)?, lows.len())?;

    let mut supports = Vec::new();
    let mut resistances = Vec::new();

    for i in lookback..lows.len() - lookback {
        let window = i - lookback..=i + lookback;

        let low = lows[i];
        if lows[window.clone()].iter().all(|&l| l >= low) {
            supports.push(low);
        }

        let high = highs[i];
        if highs[window].iter().all(|&h| h <= high) {
            resistances.push(high);
        }
    }

    supports.sort_by(|a, b| b.total_cmp(a));
    supports.dedup();
    resistances.sort_by(|a, b| a.total_cmp(b));
    resistances.dedup();

    Ok(LevelSet {
        supports,
        resistances,
    })
}

/// `2 * lookback + 1`: one full window around the scanned index.
fn min_len(lookback: usize) -> Result<usize, Report<IndicatorError>> {
    required_len(
        "support_resistance",
        lookback.checked_mul(2).and_then(|n| n.checked_add(1)),
    )
}

/// Candle-level wrapper around [`find_levels`].
pub struct SupportResistance {
    lookback: usize,
}

impl SupportResistance {
    pub fn new(lookback: usize) -> Result<Self, Report<IndicatorError>> {
        ensure_period("support_resistance", "lookback", lookback)?;
        min_len(lookback)?;
        Ok(Self { lookback })
    }

    pub fn required_candles(&self) -> usize {
        2 * self.lookback + 1
    }

    pub fn detect(&self, candles: &[Candle]) -> Result<LevelSet, Report<IndicatorError>> {
        find_levels(&high_prices(candles), &low_prices(candles), self.lookback)
    }
}
