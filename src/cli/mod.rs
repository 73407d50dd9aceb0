//! CLI definitions.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use signal_core::Timeframe;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signal-desk")]
#[command(author, version, about = "Crypto market signal desk: indicators, scanning and alerts")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute indicators and signals for symbols
    Analyze(AnalyzeArgs),
    /// Rank strong buys across the market
    Scan(ScanArgs),
    /// Find trading symbols by name, with their 24h prices
    Search(SearchArgs),
    /// Live watch-list dashboard
    Watch(WatchArgs),
    /// Poll the market and send alerts
    Alerts(AlertsArgs),
    /// Plan compounding trades
    Compound(CompoundArgs),
    /// Validate configuration
    ValidateConfig,
    /// Print the effective configuration
    PrintConfig,
}

#[derive(clap::Args)]
pub struct AnalyzeArgs {
    /// Symbols to analyze, e.g. BTCUSDT ETHUSDT
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Candle interval (defaults to market.interval)
    #[arg(short, long)]
    pub interval: Option<Timeframe>,

    /// Directory of {SYMBOL}.csv files to read instead of the exchange
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct ScanArgs {
    /// Quote asset (defaults to market.quote_asset)
    #[arg(short, long)]
    pub quote: Option<String>,

    /// Minimum strength (defaults to scanner.min_strength)
    #[arg(long)]
    pub min_strength: Option<f64>,

    /// Number of results (defaults to scanner.top_n)
    #[arg(long)]
    pub top: Option<usize>,

    /// Candle interval (defaults to market.interval)
    #[arg(short, long)]
    pub interval: Option<Timeframe>,

    /// Directory of {SYMBOL}.csv files to read instead of the exchange
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Rescan every scanner.poll_interval_secs until interrupted
    #[arg(long)]
    pub follow: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct SearchArgs {
    /// Text to match against the symbol or base asset, e.g. "doge"
    pub query: String,

    /// Quote asset (defaults to market.quote_asset)
    #[arg(short, long)]
    pub quote: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct WatchArgs {
    /// Symbols to watch
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Candle interval (defaults to market.interval)
    #[arg(short, long)]
    pub interval: Option<Timeframe>,

    /// Screen refresh period in milliseconds
    #[arg(long, default_value = "500")]
    pub refresh_ms: u64,
}

#[derive(clap::Args)]
pub struct AlertsArgs {
    /// Run a single scan and exit
    #[arg(long)]
    pub once: bool,

    /// Check the bot token and chat id, then exit
    #[arg(long)]
    pub check: bool,

    /// Quote asset (defaults to market.quote_asset)
    #[arg(short, long)]
    pub quote: Option<String>,
}

#[derive(clap::Args)]
pub struct CompoundArgs {
    /// Starting capital (defaults to calculator.investment)
    #[arg(long)]
    pub investment: Option<Decimal>,

    /// Profit per trade in percent (defaults to calculator.margin_pct)
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// Number of trades (defaults to calculator.trades)
    #[arg(long)]
    pub trades: Option<u32>,

    /// Trade numbers to mark completed (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub complete: Vec<u32>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}
