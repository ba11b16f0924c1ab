use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Candle interval as accepted by the venue kline endpoint.
///
/// String representations match the venue format (e.g. `"1m"`, `"1M"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Min1,
    #[serde(rename = "3m")]
    Min3,
    #[serde(rename = "5m")]
    Min5,
    #[serde(rename = "15m")]
    Min15,
    #[serde(rename = "30m")]
    Min30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "2h")]
    Hour2,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "6h")]
    Hour6,
    #[serde(rename = "8h")]
    Hour8,
    #[serde(rename = "12h")]
    Hour12,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "3d")]
    Day3,
    #[serde(rename = "1w")]
    Week1,
    #[serde(rename = "1M")]
    Month1,
}

impl Interval {
    /// Parse a venue-format string into an `Interval`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(Self::Min1),
            "3m" => Some(Self::Min3),
            "5m" => Some(Self::Min5),
            "15m" => Some(Self::Min15),
            "30m" => Some(Self::Min30),
            "1h" => Some(Self::Hour1),
            "2h" => Some(Self::Hour2),
            "4h" => Some(Self::Hour4),
            "6h" => Some(Self::Hour6),
            "8h" => Some(Self::Hour8),
            "12h" => Some(Self::Hour12),
            "1d" => Some(Self::Day1),
            "3d" => Some(Self::Day3),
            "1w" => Some(Self::Week1),
            "1M" => Some(Self::Month1),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min1 => "1m",
            Self::Min3 => "3m",
            Self::Min5 => "5m",
            Self::Min15 => "15m",
            Self::Min30 => "30m",
            Self::Hour1 => "1h",
            Self::Hour2 => "2h",
            Self::Hour4 => "4h",
            Self::Hour6 => "6h",
            Self::Hour8 => "8h",
            Self::Hour12 => "12h",
            Self::Day1 => "1d",
            Self::Day3 => "3d",
            Self::Week1 => "1w",
            Self::Month1 => "1M",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One OHLCV observation. Timestamps are epoch milliseconds on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub close_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_round_trip() {
        for s in [
            "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d",
            "1w", "1M",
        ] {
            let interval = Interval::from_str(s).expect("known interval");
            assert_eq!(interval.as_str(), s);
            assert_eq!(interval.to_string(), s);
        }
    }

    #[test]
    fn interval_unknown_is_none() {
        assert!(Interval::from_str("2m").is_none());
        assert!(Interval::from_str("1D").is_none());
    }

    #[test]
    fn month_and_minute_are_distinct() {
        assert_eq!(Interval::from_str("1M"), Some(Interval::Month1));
        assert_eq!(Interval::from_str("1m"), Some(Interval::Min1));
    }

    #[test]
    fn interval_serializes_as_venue_string() {
        assert_eq!(serde_json::to_string(&Interval::Hour4).unwrap(), "\"4h\"");
        let parsed: Interval = serde_json::from_str("\"1M\"").unwrap();
        assert_eq!(parsed, Interval::Month1);
    }

    #[test]
    fn candle_deserializes_epoch_millis() {
        let json = r#"{
            "open_time": 1704067200000,
            "open": 42000.0,
            "high": 43000.0,
            "low": 41500.0,
            "close": 42500.0,
            "volume": 100.5,
            "close_time": 1704153599999
        }"#;
        let candle: Candle = serde_json::from_str(json).unwrap();
        assert_eq!(candle.open_time.timestamp_millis(), 1704067200000);
        assert_eq!(candle.close_time.timestamp_millis(), 1704153599999);
        assert_eq!(candle.close, 42500.0);
    }
}
