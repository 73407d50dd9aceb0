//! Market scan command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::{load, market_source, scanner};
use crate::cli::{output, OutputFormat, ScanArgs};
use signal_engine::{top_strong_buys, SignalScanner};

pub async fn run(args: ScanArgs, config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let source = market_source(&config, args.data.as_deref())?;
    let scanner = scanner(&config, source, args.interval)?;

    let quote = args
        .quote
        .unwrap_or_else(|| config.market.quote_asset.clone())
        .to_uppercase();
    let min_strength = args.min_strength.unwrap_or(config.scanner.min_strength);
    let top = args.top.unwrap_or(config.scanner.top_n);

    if !args.follow {
        return scan_once(&scanner, &quote, min_strength, top, args.output).await;
    }

    let period = Duration::from_secs(config.scanner.poll_interval_secs);
    info!(quote = %quote, period_secs = period.as_secs(), "Following market scan");
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = scan_once(&scanner, &quote, min_strength, top, args.output).await {
                    warn!(error = %e, "Scan failed, retrying next period");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping scan");
                break;
            }
        }
    }

    Ok(())
}

async fn scan_once(
    scanner: &SignalScanner,
    quote: &str,
    min_strength: f64,
    top: usize,
    format: OutputFormat,
) -> Result<()> {
    let signals = scanner
        .scan_market(quote)
        .await
        .with_context(|| format!("Failed to scan {quote} market"))?;
    let ranked = top_strong_buys(&signals, min_strength, top);

    info!(
        scanned = signals.len(),
        matched = ranked.len(),
        "Scan complete"
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ranked)?),
        OutputFormat::Text => {
            let title = format!(
                "TOP STRONG BUYS {quote} {} (strength >= {min_strength}) {}",
                scanner.timeframe(),
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            );
            print!("{}", output::signal_table(&title, &ranked));
        }
    }

    Ok(())
}
