//! Concurrent signal scanning across a symbol universe.

use std::cmp::Ordering;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use signal_core::error::DataError;
use signal_core::traits::MarketDataSource;
use signal_core::types::{IndicatorResult, SignalKind, SymbolSignal, Timeframe};
use tracing::{debug, info, instrument, warn};

use crate::engine::IndicatorEngine;

/// Fetches series for many symbols and runs the engine on each.
///
/// A symbol whose fetch fails gets the neutral result; the rest of the
/// scan is unaffected.
pub struct SignalScanner {
    source: Arc<dyn MarketDataSource>,
    engine: Arc<IndicatorEngine>,
    timeframe: Timeframe,
    concurrency: usize,
}

impl SignalScanner {
    pub fn new(source: Arc<dyn MarketDataSource>, engine: Arc<IndicatorEngine>) -> Self {
        Self {
            source,
            engine,
            timeframe: Timeframe::default(),
            concurrency: 8,
        }
    }

    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = timeframe;
        self
    }

    /// Maximum number of in-flight fetches.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Analyze one symbol.
    pub async fn analyze(&self, symbol: &str) -> SymbolSignal {
        let result = match self.source.get_series(symbol, self.timeframe).await {
            Ok(series) if !series.is_chronological() => {
                warn!(symbol, candles = series.len(), "Series is out of order, ignoring");
                IndicatorResult::NEUTRAL
            }
            Ok(series) => {
                debug!(symbol, candles = series.len(), "Series fetched");
                self.engine.compute(series.candles())
            }
            Err(e) => {
                warn!(
                    symbol,
                    source = self.source.name(),
                    error = %e,
                    "Series fetch failed"
                );
                IndicatorResult::NEUTRAL
            }
        };
        SymbolSignal::new(symbol, result)
    }

    /// Analyze every symbol, returning results in input order.
    #[instrument(skip(self, symbols), fields(count = symbols.len()))]
    pub async fn scan(&self, symbols: &[String]) -> Vec<SymbolSignal> {
        let results: Vec<SymbolSignal> = stream::iter(symbols)
            .map(|symbol| self.analyze(symbol))
            .buffered(self.concurrency)
            .boxed()
            .collect()
            .await;

        let strong = results
            .iter()
            .filter(|s| s.result.signal != SignalKind::Neutral)
            .count();
        debug!(strong, "Scan complete");
        results
    }

    /// Scan every tradable symbol quoted in `quote`.
    pub async fn scan_market(&self, quote: &str) -> Result<Vec<SymbolSignal>, DataError> {
        let symbols = self.source.list_symbols(quote).await?;
        info!(quote, symbols = symbols.len(), "Scanning market");
        Ok(self.scan(&symbols).await)
    }
}

/// Sort by strength, strongest first. Ties keep their relative order.
pub fn rank_by_strength(signals: &mut [SymbolSignal]) {
    signals.sort_by(|a, b| {
        b.result
            .strength
            .partial_cmp(&a.result.strength)
            .unwrap_or(Ordering::Equal)
    });
}

/// Strong buys with `strength >= min_strength`, strongest first, at most `limit`.
pub fn top_strong_buys(
    signals: &[SymbolSignal],
    min_strength: f64,
    limit: usize,
) -> Vec<SymbolSignal> {
    let mut picks: Vec<SymbolSignal> = signals
        .iter()
        .filter(|s| s.result.signal == SignalKind::StrongBuy && s.result.strength >= min_strength)
        .cloned()
        .collect();
    rank_by_strength(&mut picks);
    picks.truncate(limit);
    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use signal_core::types::{Candle, Series};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    struct MockSource {
        series: HashMap<String, Vec<Candle>>,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn new() -> Self {
            Self {
                series: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        fn with(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
            self.series.insert(symbol.to_string(), candles);
            self
        }
    }

    #[async_trait]
    impl MarketDataSource for MockSource {
        async fn get_series(
            &self,
            symbol: &str,
            timeframe: Timeframe,
        ) -> Result<Series, DataError> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            self.series
                .get(symbol)
                .map(|c| Series::from_candles(symbol, timeframe, c.clone()))
                .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
        }

        async fn list_symbols(&self, _quote: &str) -> Result<Vec<String>, DataError> {
            let mut symbols: Vec<String> = self.series.keys().cloned().collect();
            symbols.sort();
            Ok(symbols)
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn uptrend(n: usize, step: f64) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let close = 100.0 + step * i as f64;
                Candle::new(i as i64 * 900, close, close + 0.5, close - 0.5, close, 1.0)
            })
            .collect()
    }

    fn signal(symbol: &str, kind: SignalKind, strength: f64) -> SymbolSignal {
        SymbolSignal::new(
            symbol,
            IndicatorResult {
                signal: kind,
                strength,
                ..IndicatorResult::NEUTRAL
            },
        )
    }

    fn scanner(source: MockSource) -> SignalScanner {
        SignalScanner::new(Arc::new(source), Arc::new(IndicatorEngine::default()))
            .with_concurrency(2)
    }

    #[tokio::test]
    async fn test_failed_symbol_does_not_affect_others() {
        let source = MockSource::new()
            .with("BTCUSDT", uptrend(250, 0.2))
            .with("ETHUSDT", uptrend(250, 0.3));
        let scanner = scanner(source);

        let symbols: Vec<String> = ["BTCUSDT", "MISSING", "ETHUSDT"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let results = scanner.scan(&symbols).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].symbol, "BTCUSDT");
        assert_eq!(results[0].result.signal, SignalKind::StrongBuy);
        assert_eq!(results[1].symbol, "MISSING");
        assert!(results[1].result.is_sentinel());
        assert_eq!(results[2].result.signal, SignalKind::StrongBuy);
    }

    #[tokio::test]
    async fn test_short_series_is_neutral() {
        let scanner = scanner(MockSource::new().with("NEWUSDT", uptrend(120, 0.2)));

        let result = scanner.analyze("NEWUSDT").await;
        assert!(result.result.is_sentinel());
    }

    #[tokio::test]
    async fn test_out_of_order_series_is_neutral() {
        let mut candles = uptrend(250, 0.2);
        candles.swap(10, 11);
        let scanner = scanner(MockSource::new().with("BTCUSDT", candles));

        assert!(scanner.analyze("BTCUSDT").await.result.is_sentinel());
    }

    #[tokio::test]
    async fn test_scan_market_fetches_every_symbol() {
        let source = Arc::new(
            MockSource::new()
                .with("AUSDT", uptrend(250, 0.1))
                .with("BUSDT", uptrend(250, 0.1))
                .with("CUSDT", uptrend(50, 0.1)),
        );
        let scanner = SignalScanner::new(source.clone(), Arc::new(IndicatorEngine::default()));

        let results = scanner.scan_market("USDT").await.unwrap();
        let names: Vec<&str> = results.iter().map(|s| s.symbol.as_str()).collect();

        assert_eq!(names, vec!["AUSDT", "BUSDT", "CUSDT"]);
        assert_eq!(source.calls.load(AtomicOrdering::SeqCst), 3);
    }

    #[test]
    fn test_top_strong_buys_filters_sorts_and_truncates() {
        let signals = vec![
            signal("A", SignalKind::StrongBuy, 72.0),
            signal("B", SignalKind::StrongBuy, 95.0),
            signal("C", SignalKind::StrongSell, 99.0),
            signal("D", SignalKind::StrongBuy, 69.9),
            signal("E", SignalKind::StrongBuy, 80.0),
            signal("F", SignalKind::Neutral, 100.0),
        ];

        let top = top_strong_buys(&signals, 70.0, 2);
        let names: Vec<&str> = top.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(names, vec!["B", "E"]);

        let all = top_strong_buys(&signals, 70.0, 25);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_rank_by_strength_is_stable() {
        let mut signals = vec![
            signal("A", SignalKind::Neutral, 10.0),
            signal("B", SignalKind::Neutral, 50.0),
            signal("C", SignalKind::Neutral, 10.0),
        ];
        rank_by_strength(&mut signals);

        let names: Vec<&str> = signals.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }
}
