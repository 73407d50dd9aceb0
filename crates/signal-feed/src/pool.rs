//! Reference-counted pool of per-symbol price feeds.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use signal_core::error::FeedError;
use signal_core::traits::PriceSource;
use signal_core::types::PriceTick;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::state::{ConnectionMachine, FeedState, ReconnectAction, ReconnectPolicy};
use crate::ticker::parse_ticker;

/// Feed settings shared by every connection in a pool.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Stream base URL; the symbol path `/{symbol}@ticker` is appended
    pub ws_base_url: String,
    pub policy: ReconnectPolicy,
    /// Events buffered per symbol before slow subscribers start lagging
    pub channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_base_url: "wss://stream.binance.com:9443/ws".to_string(),
            policy: ReconnectPolicy::default(),
            channel_capacity: 64,
        }
    }
}

/// Event delivered to subscribers of one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceEvent {
    Price(PriceTick),
    State { symbol: String, state: FeedState },
    /// Push stream given up on; polling from now on
    Error { symbol: String, message: String },
}

#[derive(Debug, Default)]
struct Shared {
    state: RwLock<FeedState>,
    last: RwLock<Option<PriceTick>>,
}

struct Feed {
    /// Distinguishes a reopened feed from the one it replaced
    id: u64,
    refs: usize,
    sender: broadcast::Sender<PriceEvent>,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

struct PoolInner {
    config: FeedConfig,
    source: Arc<dyn PriceSource>,
    feeds: Mutex<HashMap<String, Feed>>,
    next_id: AtomicU64,
}

impl PoolInner {
    fn release(&self, symbol: &str, feed_id: u64) {
        let mut feeds = self.feeds.lock();
        let remove = match feeds.get_mut(symbol) {
            Some(feed) if feed.id == feed_id => {
                feed.refs -= 1;
                feed.refs == 0
            }
            _ => false,
        };
        if remove {
            if let Some(feed) = feeds.remove(symbol) {
                feed.task.abort();
                info!(symbol, "Price feed closed");
            }
        }
    }
}

/// One connection per symbol, shared by all of that symbol's subscribers.
///
/// Construct once and pass the handle around; clones share the same pool.
/// Dropping the last [`Subscription`] for a symbol closes its connection.
#[derive(Clone)]
pub struct PricePool {
    inner: Arc<PoolInner>,
}

impl PricePool {
    pub fn new(config: FeedConfig, source: Arc<dyn PriceSource>) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                config,
                source,
                feeds: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Subscribe to a symbol, opening its connection if this is the first
    /// subscriber. Must be called from within a Tokio runtime.
    pub fn subscribe(&self, symbol: &str) -> Subscription {
        let symbol = symbol.to_uppercase();
        let mut feeds = self.inner.feeds.lock();

        let (feed_id, receiver) = match feeds.get_mut(&symbol) {
            Some(feed) => {
                feed.refs += 1;
                (feed.id, feed.sender.subscribe())
            }
            None => {
                let (sender, receiver) =
                    broadcast::channel(self.inner.config.channel_capacity.max(1));
                let shared = Arc::new(Shared::default());
                let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
                let task = tokio::spawn(run_feed(
                    symbol.clone(),
                    self.inner.config.clone(),
                    self.inner.source.clone(),
                    sender.clone(),
                    shared.clone(),
                ));
                info!(symbol = %symbol, "Price feed opened");
                feeds.insert(
                    symbol.clone(),
                    Feed {
                        id,
                        refs: 1,
                        sender,
                        shared,
                        task,
                    },
                );
                (id, receiver)
            }
        };

        Subscription {
            symbol,
            feed_id,
            receiver,
            pool: Arc::downgrade(&self.inner),
        }
    }

    /// Symbols with an open connection, sorted.
    pub fn active_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.inner.feeds.lock().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn subscriber_count(&self, symbol: &str) -> usize {
        self.inner
            .feeds
            .lock()
            .get(&symbol.to_uppercase())
            .map_or(0, |f| f.refs)
    }

    pub fn state(&self, symbol: &str) -> Option<FeedState> {
        self.inner
            .feeds
            .lock()
            .get(&symbol.to_uppercase())
            .map(|f| *f.shared.state.read())
    }

    /// Most recent price seen for a symbol.
    pub fn latest(&self, symbol: &str) -> Option<PriceTick> {
        self.inner
            .feeds
            .lock()
            .get(&symbol.to_uppercase())
            .and_then(|f| f.shared.last.read().clone())
    }

    /// Close every connection. Outstanding subscriptions stop receiving.
    pub fn close_all(&self) {
        let mut feeds = self.inner.feeds.lock();
        for (symbol, feed) in feeds.drain() {
            feed.task.abort();
            debug!(symbol = %symbol, "Price feed closed");
        }
        info!("All price feeds closed");
    }
}

/// A live subscription to one symbol's events.
pub struct Subscription {
    symbol: String,
    feed_id: u64,
    receiver: broadcast::Receiver<PriceEvent>,
    pool: Weak<PoolInner>,
}

impl Subscription {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Next event, or `None` once the feed is closed.
    ///
    /// Events missed by a lagging subscriber are skipped.
    pub async fn recv(&mut self) -> Option<PriceEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(symbol = %self.symbol, skipped, "Subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<PriceEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.upgrade() {
            pool.release(&self.symbol, self.feed_id);
        }
    }
}

fn publish_price(shared: &Shared, sender: &broadcast::Sender<PriceEvent>, tick: PriceTick) {
    *shared.last.write() = Some(tick.clone());
    // No receivers just means every subscriber is between polls
    let _ = sender.send(PriceEvent::Price(tick));
}

fn publish_state(
    symbol: &str,
    shared: &Shared,
    sender: &broadcast::Sender<PriceEvent>,
    state: FeedState,
) {
    let previous = std::mem::replace(&mut *shared.state.write(), state);
    if previous != state {
        let _ = sender.send(PriceEvent::State {
            symbol: symbol.to_string(),
            state,
        });
    }
}

async fn snapshot(
    symbol: &str,
    source: &dyn PriceSource,
    shared: &Shared,
    sender: &broadcast::Sender<PriceEvent>,
) {
    match source.fetch_price(symbol).await {
        Ok(tick) if tick.is_valid() => publish_price(shared, sender, tick),
        Ok(_) => debug!(symbol, "Ignoring empty price snapshot"),
        Err(e) => warn!(symbol, error = %e, "Price snapshot failed"),
    }
}

/// Connection task for one symbol. Runs until aborted.
async fn run_feed(
    symbol: String,
    config: FeedConfig,
    source: Arc<dyn PriceSource>,
    sender: broadcast::Sender<PriceEvent>,
    shared: Arc<Shared>,
) {
    snapshot(&symbol, source.as_ref(), &shared, &sender).await;

    let url = format!(
        "{}/{}@ticker",
        config.ws_base_url.trim_end_matches('/'),
        symbol.to_lowercase()
    );
    let mut machine = ConnectionMachine::new(config.policy);

    loop {
        publish_state(&symbol, &shared, &sender, FeedState::Connecting);

        if let Err(e) = stream_ticks(&url, &symbol, &mut machine, &shared, &sender).await {
            warn!(symbol = %symbol, error = %e, "Ticker stream failed");
        }

        match machine.on_failure() {
            ReconnectAction::Retry(delay) => {
                debug!(
                    symbol = %symbol,
                    retry = machine.retries(),
                    delay_ms = delay.as_millis() as u64,
                    "Reconnecting"
                );
                tokio::time::sleep(delay).await;
            }
            ReconnectAction::Degrade => break,
        }
    }

    let failure = FeedError::RetriesExhausted {
        retries: config.policy.max_retries,
    };
    error!(symbol = %symbol, error = %failure, "Falling back to REST polling");
    publish_state(&symbol, &shared, &sender, FeedState::DegradedPolling);
    let _ = sender.send(PriceEvent::Error {
        symbol: symbol.clone(),
        message: failure.to_string(),
    });

    let mut interval = tokio::time::interval(config.policy.fallback_interval);
    loop {
        interval.tick().await;
        snapshot(&symbol, source.as_ref(), &shared, &sender).await;
    }
}

/// Stream ticker events until the connection drops.
async fn stream_ticks(
    url: &str,
    symbol: &str,
    machine: &mut ConnectionMachine,
    shared: &Shared,
    sender: &broadcast::Sender<PriceEvent>,
) -> Result<(), FeedError> {
    let (ws, _response) = connect_async(url)
        .await
        .map_err(|e| FeedError::WebSocket(e.to_string()))?;

    machine.on_connected();
    publish_state(symbol, shared, sender, FeedState::Live);
    info!(symbol, "Ticker stream live");

    let (_write, mut read) = ws.split();

    while let Some(msg) = read.next().await {
        match msg.map_err(|e| FeedError::WebSocket(e.to_string()))? {
            Message::Text(text) => match parse_ticker(&text) {
                Ok(tick) => publish_price(shared, sender, tick),
                Err(e) => debug!(symbol, error = %e, "Skipping ticker message"),
            },
            Message::Close(_) => return Err(FeedError::Closed),
            _ => {}
        }
    }

    Err(FeedError::Closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use signal_core::error::DataError;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct StaticPrices {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for StaticPrices {
        async fn fetch_price(&self, symbol: &str) -> Result<PriceTick, DataError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(PriceTick {
                symbol: symbol.to_string(),
                price: 100.0 + n as f64,
                change_pct: 0.5,
                volume: 10.0,
                high_24h: None,
                low_24h: None,
            })
        }
    }

    fn pool(max_retries: u32) -> (PricePool, Arc<StaticPrices>) {
        let source = Arc::new(StaticPrices {
            calls: AtomicUsize::new(0),
        });
        let config = FeedConfig {
            // Nothing listens on the discard port
            ws_base_url: "ws://127.0.0.1:9/ws".to_string(),
            policy: ReconnectPolicy {
                max_retries,
                retry_interval: Duration::from_millis(1),
                fallback_interval: Duration::from_millis(10),
            },
            channel_capacity: 64,
        };
        (PricePool::new(config, source.clone()), source)
    }

    async fn next(sub: &mut Subscription) -> PriceEvent {
        tokio::time::timeout(Duration::from_secs(5), sub.recv())
            .await
            .expect("timed out waiting for event")
            .expect("feed closed")
    }

    #[tokio::test]
    async fn test_snapshot_precedes_stream() {
        let (pool, _source) = pool(5);
        let mut sub = pool.subscribe("btcusdt");

        match next(&mut sub).await {
            PriceEvent::Price(tick) => {
                assert_eq!(tick.symbol, "BTCUSDT");
                assert_eq!(tick.price, 100.0);
            }
            other => panic!("expected snapshot price, got {other:?}"),
        }
        assert_eq!(pool.latest("BTCUSDT").map(|t| t.price), Some(100.0));
    }

    #[tokio::test]
    async fn test_degrades_to_polling_after_retries() {
        let (pool, source) = pool(2);
        let mut sub = pool.subscribe("ETHUSDT");

        let mut saw_error = false;
        let mut polled_prices = 0;
        while polled_prices < 2 {
            match next(&mut sub).await {
                PriceEvent::Error { symbol, message } => {
                    assert_eq!(symbol, "ETHUSDT");
                    assert!(message.contains("2 retries"));
                    saw_error = true;
                }
                PriceEvent::Price(_) if saw_error => polled_prices += 1,
                _ => {}
            }
        }

        assert_eq!(pool.state("ETHUSDT"), Some(FeedState::DegradedPolling));
        assert!(source.calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_reference_counting() {
        let (pool, _source) = pool(5);

        let a = pool.subscribe("SOLUSDT");
        let b = pool.subscribe("solusdt");
        let c = pool.subscribe("ADAUSDT");

        assert_eq!(pool.active_symbols(), vec!["ADAUSDT", "SOLUSDT"]);
        assert_eq!(pool.subscriber_count("SOLUSDT"), 2);

        drop(a);
        assert_eq!(pool.subscriber_count("SOLUSDT"), 1);
        drop(b);
        assert_eq!(pool.subscriber_count("SOLUSDT"), 0);
        assert_eq!(pool.active_symbols(), vec!["ADAUSDT"]);

        drop(c);
        assert!(pool.active_symbols().is_empty());
    }

    #[tokio::test]
    async fn test_close_all_ends_subscriptions() {
        let (pool, _source) = pool(5);
        let mut a = pool.subscribe("BTCUSDT");
        let _b = pool.subscribe("ETHUSDT");

        pool.close_all();
        assert!(pool.active_symbols().is_empty());

        let end = tokio::time::timeout(Duration::from_secs(5), async {
            while a.recv().await.is_some() {}
        })
        .await;
        assert!(end.is_ok());
    }

    #[tokio::test]
    async fn test_stale_subscription_does_not_release_reopened_feed() {
        let (pool, _source) = pool(5);
        let old = pool.subscribe("BTCUSDT");
        pool.close_all();

        let _fresh = pool.subscribe("BTCUSDT");
        drop(old);

        assert_eq!(pool.active_symbols(), vec!["BTCUSDT"]);
        assert_eq!(pool.subscriber_count("BTCUSDT"), 1);
    }
}
