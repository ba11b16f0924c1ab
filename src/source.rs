//! Loading a candle window from disk.
//!
//! Accepts either an array of candle objects (epoch-millisecond timestamps)
//! or raw venue kline rows as returned by the `/api/v3/klines` endpoint.

use std::path::Path;

use chrono::{DateTime, Utc};
use error_stack::{Report, ResultExt, bail};
use serde::Deserialize;
use tracing::debug;

use crate::error::SourceError;
use crate::model::Candle;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CandleFile {
    Candles(Vec<Candle>),
    Klines(Vec<KlineRow>),
}

/// Venue kline row: 12-element array
/// [open_time, open, high, low, close, volume, close_time, ...]
#[derive(Debug, Deserialize)]
struct KlineRow(
    i64,                        // 0: open_time (ms)
    String,                     // 1: open
    String,                     // 2: high
    String,                     // 3: low
    String,                     // 4: close
    String,                     // 5: volume
    i64,                        // 6: close_time (ms)
    #[allow(dead_code)] String, // 7: quote asset volume
    #[allow(dead_code)] i64,    // 8: number of trades
    #[allow(dead_code)] String, // 9: taker buy base volume
    #[allow(dead_code)] String, // 10: taker buy quote volume
    #[allow(dead_code)] String, // 11: ignore
);

impl KlineRow {
    fn into_candle(self) -> Result<Candle, Report<SourceError>> {
        let parse_f64 = |field: &str, s: &str| -> Result<f64, Report<SourceError>> {
            let value = s
                .parse::<f64>()
                .change_context(SourceError::Parse {
                    reason: format!("kline {field} is not a number"),
                })
                .attach_with(|| format!("value: {s:?}"))?;
            // "NaN" and "inf" parse successfully
            if !value.is_finite() {
                return Err(Report::new(SourceError::Parse {
                    reason: format!("kline {field} is not finite"),
                })
                .attach(format!("value: {s:?}")));
            }
            Ok(value)
        };

        Ok(Candle {
            open_time: timestamp(self.0)?,
            open: parse_f64("open", &self.1)?,
            high: parse_f64("high", &self.2)?,
            low: parse_f64("low", &self.3)?,
            close: parse_f64("close", &self.4)?,
            volume: parse_f64("volume", &self.5)?,
            close_time: timestamp(self.6)?,
        })
    }
}

fn timestamp(millis: i64) -> Result<DateTime<Utc>, Report<SourceError>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        Report::new(SourceError::Parse {
            reason: format!("timestamp {millis} out of range"),
        })
    })
}

/// Read and validate a candle window from a JSON file at `path`.
pub fn load(path: &Path) -> Result<Vec<Candle>, Report<SourceError>> {
    let content = std::fs::read_to_string(path)
        .change_context(SourceError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    parse(&content).attach_with(|| format!("path: {}", path.display()))
}

/// Parse and validate a candle window from JSON text.
pub fn parse(json: &str) -> Result<Vec<Candle>, Report<SourceError>> {
    let file: CandleFile = serde_json::from_str(json).change_context(SourceError::Parse {
        reason: "expected an array of candles or kline rows".into(),
    })?;

    let candles = match file {
        CandleFile::Candles(candles) => candles,
        CandleFile::Klines(rows) => rows
            .into_iter()
            .map(KlineRow::into_candle)
            .collect::<Result<Vec<_>, _>>()?,
    };

    validate(&candles)?;
    debug!(count = candles.len(), "candle window loaded");
    Ok(candles)
}

fn validate(candles: &[Candle]) -> Result<(), Report<SourceError>> {
    if candles.is_empty() {
        bail!(SourceError::Empty);
    }
    if let Some(pos) = candles
        .windows(2)
        .position(|w| w[1].open_time <= w[0].open_time)
    {
        bail!(SourceError::Unordered { index: pos + 1 });
    }
    Ok(())
}
