use error_stack::{Report, bail};
use serde::Serialize;

use crate::error::IndicatorError;
use crate::indicator::ma::sma;
use crate::indicator::series::population_variance;
use crate::indicator::{Indicator, close_prices, ensure_len, ensure_period};
use crate::model::Candle;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STD_DEV: f64 = 2.0;

/// Upper, middle and lower bands; all three share length and alignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerSeries {
    pub fn latest(&self) -> Option<Bands> {
        Some(Bands {
            upper: *self.upper.last()?,
            middle: *self.middle.last()?,
            lower: *self.lower.last()?,
        })
    }
}

pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Result<Self, Report<IndicatorError>> {
        ensure_period("bollinger", "period", period)?;
        if !std_dev_multiplier.is_finite() || std_dev_multiplier <= 0.0 {
            bail!(IndicatorError::InvalidParameter {
                indicator: "bollinger",
                reason: format!("std_dev_multiplier must be > 0, got {std_dev_multiplier}"),
            });
        }
        Ok(Self {
            period,
            std_dev_multiplier,
        })
    }

    pub fn calculate_prices(
        &self,
        prices: &[f64],
    ) -> Result<BollingerSeries, Report<IndicatorError>> {
        ensure_len("bollinger", self.required_candles(), prices.len())?;

        let middle = sma(prices, self.period)?;
        let mut upper = Vec::with_capacity(middle.len());
        let mut lower = Vec::with_capacity(middle.len());

        for (window, &mean) in prices.windows(self.period).zip(&middle) {
            let std_dev = population_variance(window, mean)
                .unwrap_or_default()
                .sqrt();
            upper.push(mean + self.std_dev_multiplier * std_dev);
            lower.push(mean - self.std_dev_multiplier * std_dev);
        }

        Ok(BollingerSeries {
            upper,
            middle,
            lower,
        })
    }
}

impl Indicator for BollingerBands {
    fn name(&self) -> &str {
        "bollinger"
    }

    fn required_candles(&self) -> usize {
        self.period
    }

    /// Returns middle band (SMA) values only.
    fn calculate(&self, candles: &[Candle]) -> Result<Vec<f64>, Report<IndicatorError>> {
        Ok(self.calculate_prices(&close_prices(candles))?.middle)
    }
}

pub fn bollinger_bands(
    prices: &[f64],
    period: usize,
    std_dev_multiplier: f64,
) -> Result<BollingerSeries, Report<IndicatorError>> {
    BollingerBands::new(period, std_dev_multiplier)?.calculate_prices(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_support::{assert_close, candles_from_closes};

    #[test]
    fn bollinger_period_zero_invalid() {
        assert!(BollingerBands::new(0, 2.0).is_err());
    }

    #[test]
    fn bollinger_non_positive_multiplier_invalid() {
        assert!(BollingerBands::new(20, -1.0).is_err());
        assert!(BollingerBands::new(20, 0.0).is_err());
        assert!(BollingerBands::new(20, f64::NAN).is_err());
    }

    #[test]
    fn bollinger_insufficient_data() {
        let bb = BollingerBands::new(5, 2.0).unwrap();
        assert!(bb.calculate(&candles_from_closes(&[1.0; 4])).is_err());
    }

    #[test]
    fn bollinger_flat_prices_zero_width() {
        let bands = bollinger_bands(&[10.0; 5], 3, 2.0).unwrap();
        assert_eq!(bands.middle.len(), 3);
        for i in 0..bands.middle.len() {
            assert_eq!(bands.upper[i], bands.middle[i]);
            assert_eq!(bands.lower[i], bands.middle[i]);
        }
    }

    #[test]
    fn bollinger_uses_population_std_dev() {
        let bands = bollinger_bands(&[1.0, 2.0, 3.0, 4.0, 5.0], 5, 2.0).unwrap();
        // variance 10/5 = 2, not 10/4
        let latest = bands.latest().unwrap();
        assert_close(latest.middle, 3.0);
        assert_close(latest.upper, 3.0 + 2.0 * 2.0_f64.sqrt());
        assert_close(latest.lower, 3.0 - 2.0 * 2.0_f64.sqrt());
    }

    #[test]
    fn bollinger_bands_symmetry_and_lengths() {
        let bands = bollinger_bands(&[1.0, 4.0, 2.0, 8.0, 5.0, 7.0], 3, 1.5).unwrap();
        assert_eq!(bands.upper.len(), 4);
        assert_eq!(bands.lower.len(), 4);
        for i in 0..bands.middle.len() {
            let m = bands.middle[i];
            assert_close(bands.upper[i] - m, m - bands.lower[i]);
            assert!(bands.upper[i] >= m);
        }
    }

    #[test]
    fn indicator_returns_middle_band() {
        let bb = BollingerBands::new(2, 2.0).unwrap();
        let middle = bb.calculate(&candles_from_closes(&[1.0, 3.0, 5.0])).unwrap();
        assert_eq!(middle, vec![2.0, 4.0]);
    }
}
