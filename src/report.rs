//! Serializable indicator reports: latest value(s), a trailing window of the
//! series, and the interpreted label.

use error_stack::{Report, ResultExt};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::config::OutputConfig;
use crate::error::IndicatorError;
use crate::indicator::bollinger::{Bands, BollingerBands};
use crate::indicator::levels::SupportResistance;
use crate::indicator::ma::MaKind;
use crate::indicator::macd::{Macd, MacdPoint};
use crate::indicator::rsi::Rsi;
use crate::indicator::series::tail;
use crate::indicator::{Indicator, close_prices, ensure_len};
use crate::interpret::{
    self, BandPosition, MaPosition, RSI_OVERBOUGHT, RSI_OVERSOLD, RsiLevel, Signal, Trend,
};
use crate::model::Candle;

#[derive(Debug, Clone, Serialize)]
pub struct RsiReport {
    pub period: usize,
    pub current_value: f64,
    pub signal: Signal,
    pub description: &'static str,
    pub values: Vec<f64>,
    pub overbought_threshold: f64,
    pub oversold_threshold: f64,
    pub current_level: RsiLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct MacdReport {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub current: MacdPoint,
    pub signal: Signal,
    pub description: &'static str,
    pub recent: RecentMacd,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentMacd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BollingerReport {
    pub period: usize,
    pub std_dev: f64,
    pub current_price: f64,
    pub current_bands: Bands,
    pub position: BandPosition,
    pub signal: Signal,
    pub description: &'static str,
    pub analysis: BandAnalysis,
    pub recent: RecentBands,
}

#[derive(Debug, Clone, Serialize)]
pub struct BandAnalysis {
    /// Band width as a percentage of the middle band; absent when the middle
    /// band is zero.
    pub bandwidth: Option<f64>,
    /// 0 at the lower band, 100 at the upper band; absent for zero width.
    pub price_position: Option<f64>,
    /// Percent distance from each band, absent when that band is zero.
    pub distance_to_upper: Option<f64>,
    pub distance_to_lower: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// String-keyed entries that serialize as a JSON object in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedValues<T>(Vec<(String, T)>);

impl<T> Default for KeyedValues<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> KeyedValues<T> {
    /// Replaces the value in place when `key` is already present.
    pub fn insert(&mut self, key: String, value: T) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Serialize> Serialize for KeyedValues<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MovingAverageReport {
    pub kind: MaKind,
    pub current_price: f64,
    /// Keyed `SMA20`, `EMA50`, ... in the order the periods were requested.
    pub averages: KeyedValues<f64>,
    pub positions: KeyedValues<MaPosition>,
    pub overall_trend: Trend,
    pub above_count: usize,
    pub below_count: usize,
    pub trend_strength: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendBias {
    ApproachingResistance,
    NearSupport,
    Unclear,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportResistanceReport {
    pub lookback: usize,
    pub current_price: f64,
    pub nearest_support: Option<f64>,
    pub nearest_resistance: Option<f64>,
    pub support_distance_percent: Option<f64>,
    pub resistance_distance_percent: Option<f64>,
    pub supports: Vec<f64>,
    pub resistances: Vec<f64>,
    pub trend_bias: TrendBias,
    pub strength: usize,
}

fn latest_close(candles: &[Candle], indicator: &'static str) -> Result<f64, Report<IndicatorError>> {
    ensure_len(indicator, 1, candles.len())?;
    Ok(candles[candles.len() - 1].close)
}

/// Percent change from `base` to `value`; `None` when `base` is zero.
fn percent_from(value: f64, base: f64) -> Option<f64> {
    (base != 0.0).then(|| (value - base) / base * 100.0)
}

fn empty_output(indicator: &'static str) -> Report<IndicatorError> {
    Report::new(IndicatorError::InsufficientData {
        indicator,
        required: 1,
        available: 0,
    })
}

pub fn rsi_report(
    candles: &[Candle],
    period: usize,
    output: &OutputConfig,
) -> Result<RsiReport, Report<IndicatorError>> {
    let values = Rsi::new(period)?.calculate(candles)?;
    let current_value = *values.last().ok_or_else(|| empty_output("rsi"))?;
    let signal = interpret::rsi_signal(current_value);
    debug!(period, points = values.len(), current_value, %signal, "rsi computed");

    Ok(RsiReport {
        period,
        current_value,
        signal,
        description: interpret::rsi_description(signal),
        values: tail(&values, output.rsi_recent).to_vec(),
        overbought_threshold: RSI_OVERBOUGHT,
        oversold_threshold: RSI_OVERSOLD,
        current_level: interpret::rsi_level(current_value),
    })
}

pub fn macd_report(
    candles: &[Candle],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
    output: &OutputConfig,
) -> Result<MacdReport, Report<IndicatorError>> {
    let calc = Macd::new(fast_period, slow_period, signal_period)?;
    let series = calc.calculate_prices(&close_prices(candles))?;
    let current = series.latest().ok_or_else(|| empty_output("macd"))?;
    let signal = interpret::macd_signal(current.macd, current.signal, current.histogram);
    debug!(
        fast_period,
        slow_period,
        signal_period,
        macd_points = series.macd.len(),
        histogram_points = series.histogram.len(),
        %signal,
        "macd computed"
    );

    let n = output.series_recent;
    Ok(MacdReport {
        fast_period,
        slow_period,
        signal_period,
        current,
        signal,
        description: interpret::macd_description(signal),
        recent: RecentMacd {
            macd: tail(&series.macd, n).to_vec(),
            signal: tail(&series.signal, n).to_vec(),
            histogram: tail(&series.histogram, n).to_vec(),
        },
    })
}

pub fn bollinger_report(
    candles: &[Candle],
    period: usize,
    std_dev: f64,
    output: &OutputConfig,
) -> Result<BollingerReport, Report<IndicatorError>> {
    let series = BollingerBands::new(period, std_dev)?.calculate_prices(&close_prices(candles))?;
    let bands = series.latest().ok_or_else(|| empty_output("bollinger"))?;
    let price = latest_close(candles, "bollinger")?;
    let (signal, position) =
        interpret::bollinger_signal(price, bands.upper, bands.middle, bands.lower);
    debug!(period, std_dev, points = series.middle.len(), %signal, "bollinger computed");

    let width = bands.upper - bands.lower;
    let analysis = BandAnalysis {
        bandwidth: (bands.middle != 0.0).then(|| width / bands.middle * 100.0),
        price_position: (width > 0.0).then(|| (price - bands.lower) / width * 100.0),
        distance_to_upper: percent_from(price, bands.upper),
        distance_to_lower: percent_from(price, bands.lower),
    };

    let n = output.series_recent;
    Ok(BollingerReport {
        period,
        std_dev,
        current_price: price,
        current_bands: bands,
        position,
        signal,
        description: interpret::bollinger_description(position),
        analysis,
        recent: RecentBands {
            upper: tail(&series.upper, n).to_vec(),
            middle: tail(&series.middle, n).to_vec(),
            lower: tail(&series.lower, n).to_vec(),
        },
    })
}

pub fn moving_average_report(
    candles: &[Candle],
    periods: &[usize],
    kind: MaKind,
) -> Result<MovingAverageReport, Report<IndicatorError>> {
    let price = latest_close(candles, "moving_average")?;

    let mut averages = KeyedValues::default();
    let mut positions = KeyedValues::default();

    for &period in periods {
        let values = kind
            .indicator(period)
            .and_then(|ma| ma.calculate(candles))
            .attach_with(|| format!("moving average period {period}"))?;
        let value = *values.last().ok_or_else(|| empty_output("moving_average"))?;
        let position = interpret::ma_position(price, value);
        let key = format!("{}{}", kind.label(), period);
        averages.insert(key.clone(), value);
        positions.insert(key, position);
    }

    // duplicate periods collapse into one key
    let total = positions.len();
    if total == 0 {
        return Err(Report::new(IndicatorError::InvalidParameter {
            indicator: "moving_average",
            reason: "at least one period is required".into(),
        }));
    }
    let above_count = positions
        .values()
        .filter(|&&p| p == MaPosition::Above)
        .count();
    debug!(%kind, total, above_count, "moving averages computed");

    Ok(MovingAverageReport {
        kind,
        current_price: price,
        averages,
        positions,
        overall_trend: interpret::overall_trend(above_count, total),
        above_count,
        below_count: total - above_count,
        trend_strength: above_count as f64 / total as f64 * 100.0,
    })
}

pub fn support_resistance_report(
    candles: &[Candle],
    lookback: usize,
    output: &OutputConfig,
) -> Result<SupportResistanceReport, Report<IndicatorError>> {
    let levels = SupportResistance::new(lookback)?.detect(candles)?;
    let price = latest_close(candles, "support_resistance")?;

    let nearest_support = levels.nearest_support(price);
    let nearest_resistance = levels.nearest_resistance(price);
    let priced = price != 0.0;
    let support_distance_percent =
        nearest_support.and_then(|s| priced.then(|| (price - s) / price * 100.0));
    let resistance_distance_percent =
        nearest_resistance.and_then(|r| priced.then(|| (r - price) / price * 100.0));

    let trend_bias = match (support_distance_percent, resistance_distance_percent) {
        (Some(s), Some(r)) if r < s => TrendBias::ApproachingResistance,
        (Some(_), Some(_)) => TrendBias::NearSupport,
        _ => TrendBias::Unclear,
    };
    debug!(
        lookback,
        supports = levels.supports.len(),
        resistances = levels.resistances.len(),
        "support/resistance computed"
    );

    Ok(SupportResistanceReport {
        lookback,
        current_price: price,
        nearest_support,
        nearest_resistance,
        support_distance_percent,
        resistance_distance_percent,
        supports: levels.supports.iter().copied().take(output.max_levels).collect(),
        resistances: levels
            .resistances
            .iter()
            .copied()
            .take(output.max_levels)
            .collect(),
        trend_bias,
        strength: levels.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::test_support::{assert_close, candles_from_closes, candles_from_high_low};

    fn output() -> OutputConfig {
        OutputConfig {
            rsi_recent: 3,
            series_recent: 2,
            max_levels: 1,
        }
    }

    #[test]
    fn rsi_report_uses_latest_value_and_tail() {
        let prices: Vec<f64> = (1..=30).map(f64::from).collect();
        let report = rsi_report(&candles_from_closes(&prices), 14, &output()).unwrap();
        assert_eq!(report.current_value, 100.0);
        assert_eq!(report.signal, Signal::Overbought);
        assert_eq!(report.current_level, RsiLevel::Overbought);
        assert_eq!(report.description, interpret::rsi_description(Signal::Overbought));
        assert_eq!(report.values.len(), 3);
        assert_eq!(report.overbought_threshold, 70.0);
    }

    #[test]
    fn rsi_report_flat_is_neutral() {
        let report = rsi_report(&candles_from_closes(&[5.0; 20]), 14, &output()).unwrap();
        assert_eq!(report.current_value, 50.0);
        assert_eq!(report.signal, Signal::Neutral);
        assert_eq!(report.current_level, RsiLevel::Neutral);
        assert_eq!(report.description, "neutral zone");
    }

    #[test]
    fn rsi_report_surfaces_insufficient_data() {
        let err = rsi_report(&candles_from_closes(&[5.0; 10]), 14, &output()).unwrap_err();
        assert!(matches!(
            err.current_context(),
            IndicatorError::InsufficientData { indicator: "rsi", .. }
        ));
    }

    #[test]
    fn macd_report_latest_matches_tails() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0).collect();
        let report = macd_report(&candles_from_closes(&prices), 12, 26, 9, &output()).unwrap();
        assert_eq!(report.recent.macd.len(), 2);
        assert_eq!(report.current.macd, *report.recent.macd.last().unwrap());
        assert_eq!(report.current.signal, *report.recent.signal.last().unwrap());
        assert_eq!(report.current.histogram, *report.recent.histogram.last().unwrap());
        assert_eq!(report.description, interpret::macd_description(report.signal));
    }

    #[test]
    fn macd_report_rejects_inverted_periods() {
        let candles = candles_from_closes(&[1.0; 60]);
        let err = macd_report(&candles, 26, 12, 9, &output()).unwrap_err();
        assert!(matches!(
            err.current_context(),
            IndicatorError::InvalidParameter { indicator: "macd", .. }
        ));
    }

    #[test]
    fn bollinger_report_analysis() {
        // window [1..5]: middle 3, std sqrt(2), price 5
        let report =
            bollinger_report(&candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0]), 5, 1.0, &output())
                .unwrap();
        let sd = 2.0_f64.sqrt();
        assert_close(report.current_bands.middle, 3.0);
        assert_eq!(report.position, BandPosition::Upper);
        assert_eq!(report.signal, Signal::Overbought);
        assert_eq!(report.description, interpret::bollinger_description(BandPosition::Upper));
        assert_close(report.analysis.bandwidth.unwrap(), 2.0 * sd / 3.0 * 100.0);
        assert_close(
            report.analysis.price_position.unwrap(),
            (5.0 - (3.0 - sd)) / (2.0 * sd) * 100.0,
        );
        assert_close(
            report.analysis.distance_to_upper.unwrap(),
            (5.0 - (3.0 + sd)) / (3.0 + sd) * 100.0,
        );
    }

    #[test]
    fn bollinger_report_zero_width_has_no_price_position() {
        let report = bollinger_report(&candles_from_closes(&[4.0; 6]), 3, 2.0, &output()).unwrap();
        assert!(report.analysis.price_position.is_none());
        assert_eq!(report.analysis.bandwidth, Some(0.0));
        assert_eq!(report.analysis.distance_to_lower, Some(0.0));
        assert_eq!(report.recent.middle, vec![4.0, 4.0]);
    }

    #[test]
    fn bollinger_report_all_zero_window_has_no_ratios() {
        let report = bollinger_report(&candles_from_closes(&[0.0; 5]), 3, 2.0, &output()).unwrap();
        assert!(report.analysis.bandwidth.is_none());
        assert!(report.analysis.price_position.is_none());
        assert!(report.analysis.distance_to_upper.is_none());
        assert!(report.analysis.distance_to_lower.is_none());
        let json = serde_json::to_string(&report.analysis).unwrap();
        assert!(!json.contains("NaN") && !json.contains("inf"), "{json}");
    }

    #[test]
    fn moving_average_report_counts_positions() {
        let prices: Vec<f64> = (1..=10).map(f64::from).collect();
        let report =
            moving_average_report(&candles_from_closes(&prices), &[2, 5], MaKind::Sma).unwrap();
        assert_eq!(report.averages.get("SMA2"), Some(&9.5));
        assert_eq!(report.averages.get("SMA5"), Some(&8.0));
        assert_eq!(report.positions.get("SMA2"), Some(&MaPosition::Above));
        assert_eq!(report.above_count, 2);
        assert_eq!(report.below_count, 0);
        assert_eq!(report.overall_trend, Trend::StrongBullish);
        assert_eq!(report.trend_strength, 100.0);
    }

    #[test]
    fn moving_average_report_falling_prices_strong_bearish() {
        let prices: Vec<f64> = (1..=10).rev().map(f64::from).collect();
        let report =
            moving_average_report(&candles_from_closes(&prices), &[2, 3, 5], MaKind::Ema).unwrap();
        assert!(report.averages.get("EMA3").is_some());
        assert_eq!(report.above_count, 0);
        assert_eq!(report.overall_trend, Trend::StrongBearish);
    }

    #[test]
    fn moving_average_report_keeps_requested_period_order() {
        let prices: Vec<f64> = (1..=12).map(f64::from).collect();
        let report =
            moving_average_report(&candles_from_closes(&prices), &[5, 10, 2, 5], MaKind::Sma)
                .unwrap();
        assert_eq!(report.averages.keys().collect::<Vec<_>>(), ["SMA5", "SMA10", "SMA2"]);
        assert_eq!(report.positions.len(), 3);
        assert_eq!(report.above_count + report.below_count, 3);

        let json = serde_json::to_string(&report.averages).unwrap();
        let at = |key: &str| json.find(&format!("\"{key}\"")).unwrap();
        assert!(at("SMA5") < at("SMA10") && at("SMA10") < at("SMA2"), "{json}");
    }

    #[test]
    fn moving_average_report_period_longer_than_window_fails() {
        let candles = candles_from_closes(&[1.0; 10]);
        let err = moving_average_report(&candles, &[5, 50], MaKind::Sma).unwrap_err();
        assert!(matches!(
            err.current_context(),
            IndicatorError::InsufficientData { required: 50, .. }
        ));
    }

    #[test]
    fn moving_average_report_needs_a_period() {
        let candles = candles_from_closes(&[1.0; 10]);
        assert!(moving_average_report(&candles, &[], MaKind::Sma).is_err());
    }

    #[test]
    fn support_resistance_report_nearest_levels() {
        // supports 2.0 (index 1) and 4.0 (index 4, tied), resistance 9.0
        // (index 3); last close 5.0
        let highs = [6.0, 6.0, 7.0, 9.0, 7.0, 6.0];
        let lows = [4.0, 2.0, 4.0, 5.0, 4.0, 4.0];
        let report =
            support_resistance_report(&candles_from_high_low(&highs, &lows), 1, &output()).unwrap();
        assert_eq!(report.current_price, 5.0);
        assert_eq!(report.nearest_support, Some(4.0));
        assert_eq!(report.nearest_resistance, Some(9.0));
        assert_close(report.support_distance_percent.unwrap(), 20.0);
        assert_close(report.resistance_distance_percent.unwrap(), 80.0);
        assert_eq!(report.trend_bias, TrendBias::NearSupport);
        assert_eq!(report.supports, vec![4.0]);
        assert_eq!(report.strength, 3);
    }

    #[test]
    fn support_resistance_report_zero_price_has_no_distances() {
        let candles = candles_from_high_low(&[2.0, 3.0, 1.0], &[0.0, -2.0, -1.0]);
        let report = support_resistance_report(&candles, 1, &output()).unwrap();
        assert_eq!(report.current_price, 0.0);
        assert_eq!(report.nearest_support, Some(-2.0));
        assert_eq!(report.nearest_resistance, Some(3.0));
        assert!(report.support_distance_percent.is_none());
        assert!(report.resistance_distance_percent.is_none());
        assert_eq!(report.trend_bias, TrendBias::Unclear);
    }

    #[test]
    fn support_resistance_report_unclear_without_both_levels() {
        let highs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let lows = [1.0, 2.0, 3.0, 4.0, 5.0];
        let report =
            support_resistance_report(&candles_from_high_low(&highs, &lows), 1, &output()).unwrap();
        assert_eq!(report.trend_bias, TrendBias::Unclear);
        assert_eq!(report.strength, 0);
    }
}
