//! Live watch-list command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{load, scanner};
use crate::cli::WatchArgs;
use signal_core::types::PriceTick;
use signal_data::BinanceClient;
use signal_engine::SignalScanner;
use signal_feed::{PriceEvent, PricePool};
use signal_monitor::{Dashboard, DashboardState, WatchRow};

const MAX_MESSAGES: usize = 5;

pub async fn run(args: WatchArgs, config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let client = Arc::new(
        BinanceClient::new(config.market.client_config())
            .context("Failed to create exchange client")?,
    );
    let scanner = Arc::new(scanner(&config, client.clone(), args.interval)?);
    let pool = PricePool::new(config.feed.feed_config(), client.clone());

    let symbols: Vec<String> = args.symbols.iter().map(|s| s.to_uppercase()).collect();
    let mut rows: Vec<WatchRow> = symbols.iter().map(WatchRow::new).collect();
    seed_prices(&mut rows, &client.ticker_batch(&symbols).await);
    let state = Arc::new(RwLock::new(DashboardState {
        interval: scanner.timeframe().to_string(),
        rows,
        ..Default::default()
    }));

    info!(symbols = ?symbols, "Starting watch list");

    let mut tasks: Vec<JoinHandle<()>> = symbols
        .iter()
        .map(|symbol| spawn_price_task(&pool, symbol, state.clone()))
        .collect();
    tasks.push(spawn_refresh_task(
        scanner,
        symbols,
        Duration::from_secs(config.scanner.watch_interval_secs),
        state.clone(),
    ));

    let view = state.clone();
    let refresh_ms = args.refresh_ms;
    let result = tokio::task::spawn_blocking(move || {
        Dashboard::new(refresh_ms).run(|| view.read().clone())
    })
    .await;

    for task in &tasks {
        task.abort();
    }
    pool.close_all();

    result
        .context("Dashboard thread panicked")?
        .context("Dashboard terminal error")?;
    Ok(())
}

fn spawn_price_task(
    pool: &PricePool,
    symbol: &str,
    state: Arc<RwLock<DashboardState>>,
) -> JoinHandle<()> {
    let mut subscription = pool.subscribe(symbol);
    let pool = pool.clone();

    tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            let symbol = subscription.symbol();
            let live = pool.state(symbol).is_some_and(|s| s.is_live());
            let mut state = state.write();

            match event {
                PriceEvent::Price(tick) => {
                    if let Some(row) = state.rows.iter_mut().find(|r| r.symbol == tick.symbol) {
                        row.price = Some(tick.price);
                        row.change_pct = Some(tick.change_pct);
                        row.live = live;
                    }
                }
                PriceEvent::State { symbol, state: feed } => {
                    debug!(symbol = %symbol, state = %feed, "Feed state changed");
                    if let Some(row) = state.rows.iter_mut().find(|r| r.symbol == symbol) {
                        row.live = feed.is_live();
                    }
                }
                PriceEvent::Error { symbol, message } => {
                    push_message(&mut state, format!("{symbol}: {message}"));
                }
            }
        }
    })
}

fn spawn_refresh_task(
    scanner: Arc<SignalScanner>,
    symbols: Vec<String>,
    period: Duration,
    state: Arc<RwLock<DashboardState>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let signals = scanner.scan(&symbols).await;

            let mut state = state.write();
            for signal in signals {
                if let Some(row) = state.rows.iter_mut().find(|r| r.symbol == signal.symbol) {
                    row.result = signal.result;
                }
            }
            state.last_refresh = Some(Utc::now());
        }
    })
}

/// Fill rows with REST prices until the feeds report in.
fn seed_prices(rows: &mut [WatchRow], ticks: &[PriceTick]) {
    for row in rows.iter_mut() {
        if let Some(tick) = ticks.iter().find(|t| t.symbol == row.symbol) {
            row.price = Some(tick.price);
            row.change_pct = Some(tick.change_pct);
            row.live = false;
        }
    }
}

fn push_message(state: &mut DashboardState, message: String) {
    state.messages.push(message);
    if state.messages.len() > MAX_MESSAGES {
        let excess = state.messages.len() - MAX_MESSAGES;
        state.messages.drain(..excess);
    }
}
