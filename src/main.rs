use std::path::Path;

use chrono::Utc;
use clap::{Parser, Subcommand};
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use price_indicators::config::{self, AppConfig, IndicatorDefaults, OutputConfig};
use price_indicators::error::IndicatorError;
use price_indicators::indicator::ma::MaKind;
use price_indicators::model::{Candle, Interval};
use price_indicators::report;
use price_indicators::source;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("candle source error")]
    Source,
    #[display("indicator error")]
    Indicator,
    #[display("output error")]
    Output,
}

#[derive(Parser)]
#[command(
    name = "price-indicators",
    about = "Technical indicators over a historical candle window"
)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// JSON file with candles (oldest first)
    #[arg(long)]
    candles: String,

    /// Instrument symbol echoed into the report
    #[arg(long, default_value = "UNKNOWN")]
    symbol: String,

    /// Candle interval echoed into the report
    #[arg(long, default_value = "1d", value_parser = parse_interval)]
    interval: Interval,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Relative Strength Index
    Rsi {
        #[arg(long)]
        period: Option<usize>,
    },
    /// Moving Average Convergence/Divergence
    Macd {
        #[arg(long)]
        fast: Option<usize>,
        #[arg(long)]
        slow: Option<usize>,
        #[arg(long)]
        signal: Option<usize>,
    },
    /// Bollinger Bands
    Bollinger {
        #[arg(long)]
        period: Option<usize>,
        #[arg(long)]
        std_dev: Option<f64>,
    },
    /// Simple or exponential moving averages
    Ma {
        #[arg(long, value_delimiter = ',')]
        periods: Option<Vec<usize>>,
        #[arg(long, value_enum)]
        kind: Option<MaKind>,
    },
    /// Support and resistance levels
    Levels {
        #[arg(long)]
        lookback: Option<usize>,
    },
    /// Every indicator with configured defaults
    All,
}

fn parse_interval(s: &str) -> Result<Interval, String> {
    Interval::from_str(s).ok_or_else(|| format!("unknown interval \"{s}\""))
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    symbol: &'a str,
    interval: Interval,
    indicator: &'static str,
    timestamp: i64,
    #[serde(flatten)]
    report: T,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Body {
    Rsi(report::RsiReport),
    Macd(report::MacdReport),
    Bollinger(report::BollingerReport),
    MovingAverages(report::MovingAverageReport),
    SupportResistance(report::SupportResistanceReport),
    All(Box<AllReports>),
}

#[derive(Serialize)]
struct AllReports {
    rsi: report::RsiReport,
    macd: report::MacdReport,
    bollinger: report::BollingerReport,
    moving_averages: report::MovingAverageReport,
    support_resistance: report::SupportResistanceReport,
}

fn main() {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load(Path::new(path)).change_context(AppError::Config)?,
        None => AppConfig::default(),
    };

    init_tracing(&config);

    let candles = source::load(Path::new(&cli.candles)).change_context(AppError::Source)?;
    info!(
        symbol = %cli.symbol,
        interval = %cli.interval,
        candles = candles.len(),
        "candle window loaded"
    );

    let (indicator, body) = compute(&cli.command, &candles, &config.indicators, &config.output)
        .change_context(AppError::Indicator)
        .attach_with(|| format!("symbol: {}, interval: {}", cli.symbol, cli.interval))?;

    let envelope = Envelope {
        symbol: &cli.symbol,
        interval: cli.interval,
        indicator,
        timestamp: Utc::now().timestamp_millis(),
        report: body,
    };
    let json = serde_json::to_string_pretty(&envelope).change_context(AppError::Output)?;
    println!("{json}");

    info!(indicator, "report written");
    Ok(())
}

fn compute(
    command: &Command,
    candles: &[Candle],
    defaults: &IndicatorDefaults,
    output: &OutputConfig,
) -> Result<(&'static str, Body), Report<IndicatorError>> {
    let out = match command {
        Command::Rsi { period } => {
            let period = period.unwrap_or(defaults.rsi_period);
            ("RSI", Body::Rsi(report::rsi_report(candles, period, output)?))
        }
        Command::Macd { fast, slow, signal } => {
            let r = report::macd_report(
                candles,
                fast.unwrap_or(defaults.macd_fast),
                slow.unwrap_or(defaults.macd_slow),
                signal.unwrap_or(defaults.macd_signal),
                output,
            )?;
            ("MACD", Body::Macd(r))
        }
        Command::Bollinger { period, std_dev } => {
            let r = report::bollinger_report(
                candles,
                period.unwrap_or(defaults.bollinger_period),
                std_dev.unwrap_or(defaults.bollinger_std_dev),
                output,
            )?;
            ("BOLLINGER_BANDS", Body::Bollinger(r))
        }
        Command::Ma { periods, kind } => {
            let periods = periods.as_deref().unwrap_or(&defaults.ma_periods);
            let kind = kind.unwrap_or(defaults.ma_kind);
            let r = report::moving_average_report(candles, periods, kind)?;
            let name = match kind {
                MaKind::Sma => "MOVING_AVERAGES_SMA",
                MaKind::Ema => "MOVING_AVERAGES_EMA",
            };
            (name, Body::MovingAverages(r))
        }
        Command::Levels { lookback } => {
            let lookback = lookback.unwrap_or(defaults.sr_lookback);
            let r = report::support_resistance_report(candles, lookback, output)?;
            ("SUPPORT_RESISTANCE", Body::SupportResistance(r))
        }
        Command::All => {
            let all = AllReports {
                rsi: report::rsi_report(candles, defaults.rsi_period, output)?,
                macd: report::macd_report(
                    candles,
                    defaults.macd_fast,
                    defaults.macd_slow,
                    defaults.macd_signal,
                    output,
                )?,
                bollinger: report::bollinger_report(
                    candles,
                    defaults.bollinger_period,
                    defaults.bollinger_std_dev,
                    output,
                )?,
                moving_averages: report::moving_average_report(
                    candles,
                    &defaults.ma_periods,
                    defaults.ma_kind,
                )?,
                support_resistance: report::support_resistance_report(
                    candles,
                    defaults.sr_lookback,
                    output,
                )?,
            };
            ("ALL", Body::All(Box::new(all)))
        }
    };
    Ok(out)
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
