//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, CalculatorSettings, FeedSettings, LoggingConfig, MarketSettings,
    NotificationSettings, ScannerSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Environment variable prefix; `SIGNAL__MARKET__INTERVAL=1h` overrides `market.interval`.
pub const ENV_PREFIX: &str = "SIGNAL";

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}
