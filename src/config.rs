use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::indicator::ma::MaKind;
use crate::indicator::{bollinger, levels, macd, rsi};

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_rsi_period() -> usize {
    rsi::DEFAULT_PERIOD
}

fn default_macd_fast() -> usize {
    macd::DEFAULT_FAST
}

fn default_macd_slow() -> usize {
    macd::DEFAULT_SLOW
}

fn default_macd_signal() -> usize {
    macd::DEFAULT_SIGNAL
}

fn default_bollinger_period() -> usize {
    bollinger::DEFAULT_PERIOD
}

fn default_bollinger_std_dev() -> f64 {
    bollinger::DEFAULT_STD_DEV
}

fn default_ma_periods() -> Vec<usize> {
    vec![5, 10, 20, 50]
}

fn default_ma_kind() -> MaKind {
    MaKind::Sma
}

fn default_sr_lookback() -> usize {
    levels::DEFAULT_LOOKBACK
}

fn default_rsi_recent() -> usize {
    20
}

fn default_series_recent() -> usize {
    10
}

fn default_max_levels() -> usize {
    5
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub indicators: IndicatorDefaults,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// Parameters used when a call does not supply its own.
#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorDefaults {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,
    #[serde(default = "default_bollinger_std_dev")]
    pub bollinger_std_dev: f64,
    #[serde(default = "default_ma_periods")]
    pub ma_periods: Vec<usize>,
    #[serde(default = "default_ma_kind")]
    pub ma_kind: MaKind,
    #[serde(default = "default_sr_lookback")]
    pub sr_lookback: usize,
}

impl Default for IndicatorDefaults {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            bollinger_period: default_bollinger_period(),
            bollinger_std_dev: default_bollinger_std_dev(),
            ma_periods: default_ma_periods(),
            ma_kind: default_ma_kind(),
            sr_lookback: default_sr_lookback(),
        }
    }
}

/// How much of each series ends up in a report.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_rsi_recent")]
    pub rsi_recent: usize,
    #[serde(default = "default_series_recent")]
    pub series_recent: usize,
    #[serde(default = "default_max_levels")]
    pub max_levels: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            rsi_recent: default_rsi_recent(),
            series_recent: default_series_recent(),
            max_levels: default_max_levels(),
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

const VALID_LOG_FORMATS: &[&str] = &["text", "json"];

pub fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_log_format(config)?;
    validate_periods(&config.indicators)?;
    validate_macd_order(&config.indicators)?;
    validate_std_dev(&config.indicators)?;
    Ok(())
}

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_log_format(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if !VALID_LOG_FORMATS.contains(&config.general.log_format.as_str()) {
        return Err(invalid(format!(
            "general.log_format \"{}\" is not valid",
            config.general.log_format
        )));
    }
    Ok(())
}

fn validate_periods(ind: &IndicatorDefaults) -> Result<(), Report<ConfigError>> {
    let named = [
        ("rsi_period", ind.rsi_period),
        ("macd_fast", ind.macd_fast),
        ("macd_slow", ind.macd_slow),
        ("macd_signal", ind.macd_signal),
        ("bollinger_period", ind.bollinger_period),
        ("sr_lookback", ind.sr_lookback),
    ];
    for (name, value) in named {
        if value == 0 {
            return Err(invalid(format!("indicators.{name} must be > 0")));
        }
    }

    if ind.ma_periods.is_empty() {
        return Err(invalid("indicators.ma_periods must not be empty".into()));
    }
    if let Some(pos) = ind.ma_periods.iter().position(|&p| p == 0) {
        return Err(invalid(format!("indicators.ma_periods[{pos}] must be > 0")));
    }
    Ok(())
}

fn validate_macd_order(ind: &IndicatorDefaults) -> Result<(), Report<ConfigError>> {
    if ind.macd_fast >= ind.macd_slow {
        return Err(invalid(format!(
            "indicators.macd_fast ({}) must be < macd_slow ({})",
            ind.macd_fast, ind.macd_slow
        )));
    }
    Ok(())
}

fn validate_std_dev(ind: &IndicatorDefaults) -> Result<(), Report<ConfigError>> {
    if !ind.bollinger_std_dev.is_finite() || ind.bollinger_std_dev <= 0.0 {
        return Err(invalid(format!(
            "indicators.bollinger_std_dev must be > 0, got {}",
            ind.bollinger_std_dev
        )));
    }
    Ok(())
}
