use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum SourceError {
    #[display("failed to read candle file")]
    ReadFile,
    #[display("failed to parse candles: {reason}")]
    Parse { reason: String },
    #[display("candle window is empty")]
    Empty,
    #[display("candles out of order at index {index}")]
    Unordered { index: usize },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("{indicator}: insufficient data: need {required}, got {available}")]
    InsufficientData {
        indicator: &'static str,
        required: usize,
        available: usize,
    },
    #[display("{indicator}: invalid parameter: {reason}")]
    InvalidParameter {
        indicator: &'static str,
        reason: String,
    },
    #[display("highs and lows differ in length: {highs} vs {lows}")]
    LengthMismatch { highs: usize, lows: usize },
}
