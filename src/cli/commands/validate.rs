//! Validate configuration command.

use anyhow::Result;
use signal_config::load_config;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Exchange: {}", config.market.rest_base_url);
    println!("Interval: {}", config.market.interval);
    println!("Quote asset: {}", config.market.quote_asset);
    println!("Scan period: {}s", config.scanner.poll_interval_secs);
    println!(
        "Alerts: strong buy {}, strong sell {}, minimum strength {}",
        config.notifications.notify_strong_buy,
        config.notifications.notify_strong_sell,
        config.notifications.minimum_strength
    );
    println!(
        "Chat id: {}",
        config.notifications.chat_id.as_deref().unwrap_or("(not set)")
    );

    Ok(())
}
