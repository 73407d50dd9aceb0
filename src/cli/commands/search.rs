//! Symbol search command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use signal_core::types::{PriceTick, SymbolInfo};
use std::path::Path;
use tracing::info;

use super::load;
use crate::cli::{output, OutputFormat, SearchArgs};
use signal_data::BinanceClient;

#[derive(Serialize)]
struct Match<'a> {
    #[serde(flatten)]
    info: &'a SymbolInfo,
    price: Option<&'a PriceTick>,
}

pub async fn run(args: SearchArgs, config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let client = BinanceClient::new(config.market.client_config())
        .context("Failed to create exchange client")?;

    let quote = args
        .quote
        .unwrap_or_else(|| config.market.quote_asset.clone())
        .to_uppercase();
    let found = client
        .search_symbols(&args.query, &quote)
        .await
        .with_context(|| format!("Failed to search {quote} symbols"))?;

    let symbols: Vec<String> = found.iter().map(|s| s.symbol.clone()).collect();
    let prices = client.ticker_batch(&symbols).await;
    info!(query = %args.query, matched = found.len(), priced = prices.len(), "Search complete");

    match args.output {
        OutputFormat::Json => {
            let matches: Vec<Match> = found
                .iter()
                .map(|info| Match {
                    info,
                    price: prices.iter().find(|p| p.symbol == info.symbol),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        OutputFormat::Text => {
            let title = format!("SYMBOLS MATCHING {:?} ({quote})", args.query);
            print!("{}", output::search_table(&title, &found, &prices));
        }
    }

    Ok(())
}
