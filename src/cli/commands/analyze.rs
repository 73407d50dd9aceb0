//! Analyze command implementation.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use super::{load, market_source, scanner};
use crate::cli::{output, AnalyzeArgs, OutputFormat};

pub async fn run(args: AnalyzeArgs, config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let source = market_source(&config, args.data.as_deref())?;
    let scanner = scanner(&config, source, args.interval)?;

    let symbols: Vec<String> = args.symbols.iter().map(|s| s.to_uppercase()).collect();
    info!(
        symbols = ?symbols,
        interval = %scanner.timeframe(),
        "Analyzing symbols"
    );

    let signals = scanner.scan(&symbols).await;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&signals)?),
        OutputFormat::Text => {
            let title = format!("SIGNALS ({})", scanner.timeframe());
            print!("{}", output::signal_table(&title, &signals));
        }
    }

    Ok(())
}
