//! CLI command implementations.

pub mod alerts;
pub mod analyze;
pub mod compound;
pub mod print_config;
pub mod scan;
pub mod search;
pub mod validate;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use signal_config::{load_config, AppConfig};
use signal_core::traits::MarketDataSource;
use signal_core::Timeframe;
use signal_data::{BinanceClient, CsvDataSource};
use signal_engine::{EngineConfig, IndicatorEngine, SignalScanner};

/// Load and validate the configuration file.
pub(crate) fn load(config_path: &Path) -> Result<AppConfig> {
    let config = load_config(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// CSV files when `data` is given, the exchange otherwise.
pub(crate) fn market_source(
    config: &AppConfig,
    data: Option<&Path>,
) -> Result<Arc<dyn MarketDataSource>> {
    match data {
        Some(dir) => {
            let source = CsvDataSource::new(dir)
                .with_context(|| format!("Failed to open data directory {}", dir.display()))?;
            Ok(Arc::new(source))
        }
        None => {
            let client = BinanceClient::new(config.market.client_config())
                .context("Failed to create exchange client")?;
            Ok(Arc::new(client))
        }
    }
}

pub(crate) fn scanner(
    config: &AppConfig,
    source: Arc<dyn MarketDataSource>,
    interval: Option<Timeframe>,
) -> Result<SignalScanner> {
    let engine = IndicatorEngine::new(EngineConfig::default())
        .context("Failed to create indicator engine")?;
    Ok(SignalScanner::new(source, Arc::new(engine))
        .with_timeframe(interval.unwrap_or(config.market.interval))
        .with_concurrency(config.scanner.concurrency))
}
