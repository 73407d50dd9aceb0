//! Short-lived price snapshot cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use signal_core::types::PriceTick;

/// Price snapshots keyed by symbol.
///
/// Entries older than the TTL are not served as fresh but are kept so a
/// failed refresh can fall back to the last known price.
pub struct PriceCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, PriceTick)>>,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached tick younger than the TTL.
    pub fn get_fresh(&self, symbol: &str) -> Option<PriceTick> {
        self.entries
            .read()
            .get(symbol)
            .filter(|(at, _)| at.elapsed() < self.ttl)
            .map(|(_, tick)| tick.clone())
    }

    /// Cached tick regardless of age.
    pub fn get_stale(&self, symbol: &str) -> Option<PriceTick> {
        self.entries.read().get(symbol).map(|(_, tick)| tick.clone())
    }

    pub fn put(&self, tick: PriceTick) {
        self.entries
            .write()
            .insert(tick.symbol.clone(), (Instant::now(), tick));
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(symbol: &str, price: f64) -> PriceTick {
        PriceTick {
            symbol: symbol.to_string(),
            price,
            change_pct: 0.0,
            volume: 0.0,
            high_24h: None,
            low_24h: None,
        }
    }

    #[test]
    fn test_fresh_then_stale() {
        let cache = PriceCache::new(Duration::from_millis(30));
        cache.put(tick("BTCUSDT", 64_000.0));

        assert_eq!(cache.get_fresh("BTCUSDT").map(|t| t.price), Some(64_000.0));

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get_fresh("BTCUSDT").is_none());
        assert_eq!(cache.get_stale("BTCUSDT").map(|t| t.price), Some(64_000.0));
    }

    #[test]
    fn test_put_replaces_and_clear() {
        let cache = PriceCache::new(Duration::from_secs(1));
        cache.put(tick("ETHUSDT", 3_000.0));
        cache.put(tick("ETHUSDT", 3_100.0));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_fresh("ETHUSDT").map(|t| t.price), Some(3_100.0));

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get_stale("ETHUSDT").is_none());
    }
}
