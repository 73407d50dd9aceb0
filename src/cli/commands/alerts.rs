//! Alert polling command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use super::{load, market_source, scanner};
use crate::cli::AlertsArgs;
use signal_data::TelegramNotifier;
use signal_engine::AlertDispatcher;

pub async fn run(args: AlertsArgs, config_path: &Path) -> Result<()> {
    let config = load(config_path)?;
    let settings = &config.notifications;

    let notifier = TelegramNotifier::from_env(
        settings.telegram_api_url.clone(),
        &settings.bot_token_env,
        settings.chat_id.clone(),
    )
    .context("Telegram notifier is not configured")?;

    if args.check {
        return check(&notifier).await;
    }

    if notifier.chat_id().is_none() {
        warn!("notifications.chat_id is not set, alerts will be computed but not delivered");
    }

    let source = market_source(&config, None)?;
    let scanner = scanner(&config, source, None)?;
    let quote = args
        .quote
        .unwrap_or_else(|| config.market.quote_asset.clone())
        .to_uppercase();
    let mut dispatcher = AlertDispatcher::new(notifier, settings.policy());

    let period = Duration::from_secs(config.scanner.poll_interval_secs);
    info!(
        quote = %quote,
        interval = %scanner.timeframe(),
        period_secs = period.as_secs(),
        "Alert polling started"
    );
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match scanner.scan_market(&quote).await {
                    Ok(signals) => {
                        let sent = dispatcher.process(&signals).await;
                        info!(scanned = signals.len(), alerts = sent.len(), "Poll complete");
                    }
                    Err(e) => warn!(error = %e, "Market scan failed"),
                }
                if args.once {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping alerts");
                break;
            }
        }
    }

    Ok(())
}

async fn check(notifier: &TelegramNotifier) -> Result<()> {
    let bot = notifier.get_me().await.context("Bot token check failed")?;
    println!("Bot token is valid: @{}", bot.username.as_deref().unwrap_or("?"));

    let Some(chat_id) = notifier.chat_id() else {
        println!("No chat id configured; set notifications.chat_id to receive alerts.");
        return Ok(());
    };

    if notifier
        .validate_chat(chat_id)
        .await
        .context("Chat id check failed")?
    {
        println!("Chat {chat_id} accepted the welcome message.");
        Ok(())
    } else {
        bail!("Chat {chat_id} rejected the welcome message")
    }
}
