//! Discrete labels for the latest indicator values.
//!
//! Thresholds are fixed; nothing here is configurable per call.

use std::fmt;

use serde::Serialize;

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Overbought,
    Oversold,
    Neutral,
    Bullish,
    Bearish,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Overbought => "OVERBOUGHT",
            Self::Oversold => "OVERSOLD",
            Self::Neutral => "NEUTRAL",
            Self::Bullish => "BULLISH",
            Self::Bearish => "BEARISH",
        };
        f.write_str(s)
    }
}

/// Where the price sits relative to the Bollinger bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BandPosition {
    Upper,
    Lower,
    UpperHalf,
    LowerHalf,
}

/// Price relative to a single moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaPosition {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
    StrongBearish,
}

/// Lower-case RSI zone reported next to the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiLevel {
    Overbought,
    Oversold,
    Neutral,
}

pub fn rsi_signal(rsi: f64) -> Signal {
    if rsi > RSI_OVERBOUGHT {
        Signal::Overbought
    } else if rsi < RSI_OVERSOLD {
        Signal::Oversold
    } else {
        Signal::Neutral
    }
}

pub fn rsi_level(rsi: f64) -> RsiLevel {
    match rsi_signal(rsi) {
        Signal::Overbought => RsiLevel::Overbought,
        Signal::Oversold => RsiLevel::Oversold,
        _ => RsiLevel::Neutral,
    }
}

pub fn rsi_description(signal: Signal) -> &'static str {
    match signal {
        Signal::Overbought => "overbought zone, pullback pressure likely",
        Signal::Oversold => "oversold zone, rebound possible",
        _ => "neutral zone",
    }
}

pub fn macd_signal(macd: f64, signal: f64, histogram: f64) -> Signal {
    if macd > signal && histogram > 0.0 {
        Signal::Bullish
    } else if macd < signal && histogram < 0.0 {
        Signal::Bearish
    } else {
        Signal::Neutral
    }
}

pub fn macd_description(signal: Signal) -> &'static str {
    match signal {
        Signal::Bullish => "MACD line above signal line, bullish",
        Signal::Bearish => "MACD line below signal line, bearish",
        _ => "no clear crossover, wait",
    }
}

pub fn bollinger_signal(price: f64, upper: f64, middle: f64, lower: f64) -> (Signal, BandPosition) {
    if price >= upper {
        (Signal::Overbought, BandPosition::Upper)
    } else if price <= lower {
        (Signal::Oversold, BandPosition::Lower)
    } else if price > middle {
        (Signal::Bullish, BandPosition::UpperHalf)
    } else {
        (Signal::Bearish, BandPosition::LowerHalf)
    }
}

pub fn bollinger_description(position: BandPosition) -> &'static str {
    match position {
        BandPosition::Upper => "price at or above the upper band, possibly overbought",
        BandPosition::Lower => "price at or below the lower band, possibly oversold",
        BandPosition::UpperHalf => "price above the middle band, leaning bullish",
        BandPosition::LowerHalf => "price below the middle band, leaning bearish",
    }
}

pub fn ma_position(price: f64, average: f64) -> MaPosition {
    if price > average {
        MaPosition::Above
    } else {
        MaPosition::Below
    }
}

/// Overall trend from how many of `total` averages the price is above.
pub fn overall_trend(above: usize, total: usize) -> Trend {
    if total == 0 {
        return Trend::Neutral;
    }
    let ratio = above as f64 / total as f64;
    if above == total {
        Trend::StrongBullish
    } else if above == 0 {
        Trend::StrongBearish
    } else if ratio > 0.7 {
        Trend::Bullish
    } else if ratio < 0.3 {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}
