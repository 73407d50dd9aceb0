//! Configuration structures.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use signal_core::{SignalError, Timeframe};
use signal_data::BinanceConfig;
use signal_engine::{AlertPolicy, EngineConfig, PlanInput};
use signal_feed::{FeedConfig, ReconnectPolicy};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub market: MarketSettings,
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub scanner: ScannerSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub calculator: CalculatorSettings,
}

impl AppConfig {
    /// Check values the loaders cannot reject on type alone.
    pub fn validate(&self) -> Result<(), SignalError> {
        let engine = EngineConfig::default();
        if (self.market.kline_limit as usize) < engine.min_candles {
            return Err(SignalError::Config(format!(
                "market.kline_limit must be at least {} to fill the indicator lookback",
                engine.min_candles
            )));
        }
        if self.market.kline_limit > 1000 {
            return Err(SignalError::Config(
                "market.kline_limit cannot exceed 1000".into(),
            ));
        }
        if self.market.requests_per_minute == 0 {
            return Err(SignalError::Config(
                "market.requests_per_minute must be greater than 0".into(),
            ));
        }
        if self.market.timeout_secs == 0 {
            return Err(SignalError::Config(
                "market.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.market.batch_size == 0 {
            return Err(SignalError::Config(
                "market.batch_size must be greater than 0".into(),
            ));
        }
        if self.feed.retry_interval_ms == 0 || self.feed.fallback_interval_ms == 0 {
            return Err(SignalError::Config(
                "feed intervals must be greater than 0".into(),
            ));
        }
        if self.scanner.poll_interval_secs == 0 || self.scanner.watch_interval_secs == 0 {
            return Err(SignalError::Config(
                "scanner intervals must be greater than 0".into(),
            ));
        }
        if self.scanner.concurrency == 0 || self.scanner.top_n == 0 {
            return Err(SignalError::Config(
                "scanner.concurrency and scanner.top_n must be greater than 0".into(),
            ));
        }
        for (name, value) in [
            ("scanner.min_strength", self.scanner.min_strength),
            (
                "notifications.minimum_strength",
                self.notifications.minimum_strength,
            ),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(SignalError::Config(format!(
                    "{name} must be between 0 and 100, got {value}"
                )));
            }
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(SignalError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        self.calculator
            .plan_input()
            .validate()
            .map_err(|e| SignalError::Config(format!("calculator: {e}")))?;
        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "signal-desk".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Exchange REST settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub rest_base_url: String,
    pub timeout_secs: u64,
    pub interval: Timeframe,
    pub kline_limit: u32,
    pub quote_asset: String,
    pub requests_per_minute: u32,
    pub cache_ttl_ms: u64,
    pub batch_size: usize,
    pub batch_pause_ms: u64,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            rest_base_url: "https://api.binance.com/api/v3".to_string(),
            timeout_secs: 5,
            interval: Timeframe::Minute15,
            kline_limit: 500,
            quote_asset: "USDT".to_string(),
            requests_per_minute: 1200,
            cache_ttl_ms: 1000,
            batch_size: 20,
            batch_pause_ms: 100,
        }
    }
}

impl MarketSettings {
    pub fn client_config(&self) -> BinanceConfig {
        BinanceConfig {
            base_url: self.rest_base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            kline_limit: self.kline_limit,
            requests_per_minute: self.requests_per_minute,
            cache_ttl: Duration::from_millis(self.cache_ttl_ms),
            batch_size: self.batch_size,
            batch_pause: Duration::from_millis(self.batch_pause_ms),
        }
    }
}

/// Live price feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub ws_base_url: String,
    pub max_retries: u32,
    pub retry_interval_ms: u64,
    pub fallback_interval_ms: u64,
    pub channel_capacity: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            ws_base_url: "wss://stream.binance.com:9443/ws".to_string(),
            max_retries: 5,
            retry_interval_ms: 2000,
            fallback_interval_ms: 5000,
            channel_capacity: 64,
        }
    }
}

impl FeedSettings {
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            ws_base_url: self.ws_base_url.clone(),
            policy: ReconnectPolicy {
                max_retries: self.max_retries,
                retry_interval: Duration::from_millis(self.retry_interval_ms),
                fallback_interval: Duration::from_millis(self.fallback_interval_ms),
            },
            channel_capacity: self.channel_capacity,
        }
    }
}

/// Market scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Full-market scan period
    pub poll_interval_secs: u64,
    /// Watch-list refresh period
    pub watch_interval_secs: u64,
    pub concurrency: usize,
    /// Strength a strong buy needs to be ranked
    pub min_strength: f64,
    pub top_n: usize,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            watch_interval_secs: 15,
            concurrency: 8,
            min_strength: 70.0,
            top_n: 25,
        }
    }
}

/// Alert channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub telegram_api_url: String,
    /// Environment variable holding the bot token
    pub bot_token_env: String,
    pub chat_id: Option<String>,
    pub notify_strong_buy: bool,
    pub notify_strong_sell: bool,
    pub minimum_strength: f64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            telegram_api_url: "https://api.telegram.org".to_string(),
            bot_token_env: "TELEGRAM_BOT_TOKEN".to_string(),
            chat_id: None,
            notify_strong_buy: true,
            notify_strong_sell: false,
            minimum_strength: 80.0,
        }
    }
}

impl NotificationSettings {
    pub fn policy(&self) -> AlertPolicy {
        AlertPolicy {
            notify_strong_buy: self.notify_strong_buy,
            notify_strong_sell: self.notify_strong_sell,
            minimum_strength: self.minimum_strength,
        }
    }
}

/// Compounding calculator defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    pub investment: Decimal,
    pub margin_pct: Decimal,
    pub trades: u32,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            investment: dec!(1000),
            margin_pct: dec!(2.5),
            trades: 10,
        }
    }
}

impl CalculatorSettings {
    pub fn plan_input(&self) -> PlanInput {
        PlanInput {
            investment: self.investment,
            margin_pct: self.margin_pct,
            trades: self.trades,
        }
    }
}
