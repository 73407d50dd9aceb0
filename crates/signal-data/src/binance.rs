//! Binance public REST client (market data endpoints only).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use signal_core::error::DataError;
use signal_core::traits::{MarketDataSource, PriceSource};
use signal_core::types::{Candle, PriceTick, Series, SymbolInfo, Timeframe};
use tracing::{debug, instrument, warn};

use crate::cache::PriceCache;
use crate::rate_limit::RateLimiter;

/// Most results `search_symbols` returns.
const SEARCH_LIMIT: usize = 10;

/// Client settings.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    /// REST base URL including the API version path
    pub base_url: String,
    pub timeout: Duration,
    /// Candles requested per series
    pub kline_limit: u32,
    pub requests_per_minute: u32,
    /// How long a price snapshot is served without refetching
    pub cache_ttl: Duration,
    /// Symbols per `/ticker/24hr?symbols=` request
    pub batch_size: usize,
    /// Pause between ticker batches
    pub batch_pause: Duration,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com/api/v3".to_string(),
            timeout: Duration::from_secs(5),
            kline_limit: 500,
            requests_per_minute: 1200,
            cache_ttl: Duration::from_millis(1000),
            batch_size: 20,
            batch_pause: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<RawSymbol>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSymbol {
    symbol: String,
    base_asset: String,
    quote_asset: String,
    status: String,
}

impl From<RawSymbol> for SymbolInfo {
    fn from(raw: RawSymbol) -> Self {
        SymbolInfo {
            symbol: raw.symbol,
            base_asset: raw.base_asset,
            quote_asset: raw.quote_asset,
            status: raw.status,
        }
    }
}

/// `/ticker/24hr` payload; Binance sends decimals as strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTicker {
    symbol: String,
    last_price: String,
    price_change_percent: String,
    volume: String,
    high_price: Option<String>,
    low_price: Option<String>,
}

impl RawTicker {
    fn into_tick(self) -> Result<PriceTick, DataError> {
        Ok(PriceTick {
            price: parse_decimal(&self.last_price)?,
            change_pct: parse_decimal(&self.price_change_percent)?,
            volume: parse_decimal(&self.volume)?,
            high_24h: self.high_price.as_deref().map(parse_decimal).transpose()?,
            low_24h: self.low_price.as_deref().map(parse_decimal).transpose()?,
            symbol: self.symbol,
        })
    }
}

fn parse_decimal(value: &str) -> Result<f64, DataError> {
    value
        .parse::<f64>()
        .map_err(|_| DataError::ParseError(format!("expected decimal string, got {value:?}")))
}

fn parse_value_f64(value: &Value) -> Result<f64, DataError> {
    match value {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| DataError::ParseError(format!("number out of range: {n}"))),
        other => Err(DataError::ParseError(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Parse a `/klines` response body.
///
/// Each entry is `[openTimeMs, open, high, low, close, volume, closeTimeMs, ...]`;
/// open time is converted to Unix seconds.
pub(crate) fn parse_klines(body: &Value) -> Result<Vec<Candle>, DataError> {
    let rows = body
        .as_array()
        .ok_or_else(|| DataError::ParseError("klines response is not an array".into()))?;

    let mut candles = Vec::with_capacity(rows.len());
    for row in rows {
        let fields = row
            .as_array()
            .ok_or_else(|| DataError::ParseError("kline entry is not an array".into()))?;
        if fields.len() < 6 {
            warn!(len = fields.len(), "Skipping malformed kline entry");
            continue;
        }

        let open_ms = fields[0]
            .as_i64()
            .ok_or_else(|| DataError::ParseError("kline open time is not an integer".into()))?;

        candles.push(Candle::new(
            open_ms / 1000,
            parse_value_f64(&fields[1])?,
            parse_value_f64(&fields[2])?,
            parse_value_f64(&fields[3])?,
            parse_value_f64(&fields[4])?,
            parse_value_f64(&fields[5])?,
        ));
    }
    Ok(candles)
}

/// Binance public market data client.
///
/// Requests share one rate limiter; price snapshots are cached briefly and
/// a stale snapshot is served when a refresh fails.
#[derive(Clone)]
pub struct BinanceClient {
    http: reqwest::Client,
    config: BinanceConfig,
    limiter: Arc<RateLimiter>,
    cache: Arc<PriceCache>,
}

impl BinanceClient {
    pub fn new(config: BinanceConfig) -> Result<Self, DataError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataError::Internal(format!("failed to build HTTP client: {e}")))?;

        debug!(base_url = %config.base_url, "BinanceClient initialised");

        Ok(Self {
            http,
            limiter: Arc::new(RateLimiter::per_minute(config.requests_per_minute)),
            cache: Arc::new(PriceCache::new(config.cache_ttl)),
            config,
        })
    }

    pub fn config(&self) -> &BinanceConfig {
        &self.config
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, DataError> {
        self.limiter.acquire().await;

        let url = format!("{}{}", self.config.base_url, endpoint);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(format!("GET {endpoint}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DataError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| DataError::ParseError(format!("GET {endpoint}: {e}")))
    }

    /// GET /klines
    #[instrument(skip(self), name = "binance::get_klines")]
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: Timeframe,
        limit: u32,
    ) -> Result<Vec<Candle>, DataError> {
        let body: Value = self
            .get(
                "/klines",
                &[
                    ("symbol", symbol.to_uppercase()),
                    ("interval", interval.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let candles = parse_klines(&body)?;
        debug!(symbol, %interval, count = candles.len(), "klines fetched");
        Ok(candles)
    }

    /// GET /exchangeInfo
    #[instrument(skip(self), name = "binance::exchange_info")]
    pub async fn exchange_info(&self) -> Result<Vec<SymbolInfo>, DataError> {
        let info: ExchangeInfo = self.get("/exchangeInfo", &[]).await?;
        Ok(info.symbols.into_iter().map(SymbolInfo::from).collect())
    }

    /// Trading symbols quoted in `quote` whose symbol or base asset contains
    /// `query`, at most ten.
    pub async fn search_symbols(
        &self,
        query: &str,
        quote: &str,
    ) -> Result<Vec<SymbolInfo>, DataError> {
        let symbols = self.exchange_info().await?;
        Ok(filter_search(symbols, query, quote))
    }

    /// Latest 24h ticker, cached for the configured TTL.
    ///
    /// On a failed refresh the last cached snapshot is returned if there
    /// is one, whatever its age.
    #[instrument(skip(self), name = "binance::ticker_24h")]
    pub async fn ticker_24h(&self, symbol: &str) -> Result<PriceTick, DataError> {
        let symbol = symbol.to_uppercase();
        if let Some(tick) = self.cache.get_fresh(&symbol) {
            return Ok(tick);
        }

        let fetched = async {
            let raw: RawTicker = self
                .get("/ticker/24hr", &[("symbol", symbol.clone())])
                .await?;
            raw.into_tick()
        }
        .await;

        match fetched {
            Ok(tick) => {
                self.cache.put(tick.clone());
                Ok(tick)
            }
            Err(e) => match self.cache.get_stale(&symbol) {
                Some(stale) => {
                    warn!(symbol = %symbol, error = %e, "Ticker refresh failed, serving stale price");
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }

    /// Tickers for many symbols.
    ///
    /// Fresh cache entries are used as-is. The rest are requested
    /// `batch_size` at a time, one request per batch, with a short pause
    /// between batches. When a batch request fails its symbols fall back to
    /// stale cache entries; symbols with neither are left out.
    pub async fn ticker_batch(&self, symbols: &[String]) -> Vec<PriceTick> {
        let mut ticks = Vec::with_capacity(symbols.len());
        let mut missing = Vec::new();

        for symbol in symbols {
            let symbol = symbol.to_uppercase();
            match self.cache.get_fresh(&symbol) {
                Some(tick) => ticks.push(tick),
                None => missing.push(symbol),
            }
        }

        let batch_size = self.config.batch_size.max(1);
        for (i, batch) in missing.chunks(batch_size).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.batch_pause).await;
            }
            match self.fetch_ticker_batch(batch).await {
                Ok(fetched) => {
                    for tick in fetched {
                        self.cache.put(tick.clone());
                        ticks.push(tick);
                    }
                }
                Err(e) => {
                    warn!(count = batch.len(), error = %e, "Ticker batch failed, serving stale prices");
                    ticks.extend(batch.iter().filter_map(|s| self.cache.get_stale(s)));
                }
            }
        }

        ticks
    }

    /// GET /ticker/24hr?symbols=[...]
    #[instrument(skip(self, symbols), fields(count = symbols.len()), name = "binance::ticker_batch")]
    async fn fetch_ticker_batch(&self, symbols: &[String]) -> Result<Vec<PriceTick>, DataError> {
        let raw: Vec<RawTicker> = self
            .get("/ticker/24hr", &[("symbols", symbols_param(symbols)?)])
            .await?;
        raw.into_iter().map(RawTicker::into_tick).collect()
    }
}

/// The `symbols` query value: a compact JSON array of symbol names.
fn symbols_param(symbols: &[String]) -> Result<String, DataError> {
    serde_json::to_string(symbols)
        .map_err(|e| DataError::Internal(format!("failed to encode symbols: {e}")))
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.config.base_url)
            .field("kline_limit", &self.config.kline_limit)
            .finish()
    }
}

fn filter_search(symbols: Vec<SymbolInfo>, query: &str, quote: &str) -> Vec<SymbolInfo> {
    symbols
        .into_iter()
        .filter(|s| s.quote_asset.eq_ignore_ascii_case(quote) && s.is_trading() && s.matches(query))
        .take(SEARCH_LIMIT)
        .collect()
}

fn filter_quote(symbols: Vec<SymbolInfo>, quote: &str) -> Vec<String> {
    symbols
        .into_iter()
        .filter(|s| s.quote_asset.eq_ignore_ascii_case(quote) && s.is_trading())
        .map(|s| s.symbol)
        .collect()
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    async fn get_series(&self, symbol: &str, timeframe: Timeframe) -> Result<Series, DataError> {
        let candles = self
            .get_klines(symbol, timeframe, self.config.kline_limit)
            .await?;
        if candles.is_empty() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(Series::from_candles(symbol.to_uppercase(), timeframe, candles))
    }

    async fn list_symbols(&self, quote: &str) -> Result<Vec<String>, DataError> {
        let symbols = self.exchange_info().await?;
        Ok(filter_quote(symbols, quote))
    }

    fn name(&self) -> &str {
        "binance"
    }
}

#[async_trait]
impl PriceSource for BinanceClient {
    async fn fetch_price(&self, symbol: &str) -> Result<PriceTick, DataError> {
        self.ticker_24h(symbol).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info(symbol: &str, base: &str, quote: &str, status: &str) -> SymbolInfo {
        SymbolInfo {
            symbol: symbol.to_string(),
            base_asset: base.to_string(),
            quote_asset: quote.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_parse_klines() {
        let body = json!([
            [1705312800000i64, "42000.10", "42100.00", "41900.50", "42050.00", "12.5",
             1705313699999i64, "525000.0", 100, "6.0", "252000.0", "0"],
            [1705313700000i64, "42050.00", "42200.00", "42000.00", "42150.75", "8.25",
             1705314599999i64, "347000.0", 80, "4.0", "168000.0", "0"]
        ]);

        let candles = parse_klines(&body).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 1_705_312_800);
        assert_eq!(candles[0].open, 42_000.10);
        assert_eq!(candles[0].low, 41_900.50);
        assert_eq!(candles[1].close, 42_150.75);
        assert_eq!(candles[1].volume, 8.25);
    }

    #[test]
    fn test_parse_klines_rejects_garbage() {
        assert!(parse_klines(&json!({"code": -1121, "msg": "Invalid symbol."})).is_err());
        assert!(parse_klines(&json!([[1705312800000i64, "abc", "1", "1", "1", "1"]])).is_err());
        // Short rows are skipped rather than failing the batch
        assert!(parse_klines(&json!([[1705312800000i64, "1"]])).unwrap().is_empty());
    }

    #[test]
    fn test_parse_ticker() {
        let raw: RawTicker = serde_json::from_value(json!({
            "symbol": "BTCUSDT",
            "priceChange": "1200.00",
            "priceChangePercent": "2.941",
            "lastPrice": "42000.00",
            "highPrice": "42500.00",
            "lowPrice": "40500.00",
            "volume": "31234.5"
        }))
        .unwrap();

        let tick = raw.into_tick().unwrap();
        assert_eq!(tick.symbol, "BTCUSDT");
        assert_eq!(tick.price, 42_000.0);
        assert_eq!(tick.change_pct, 2.941);
        assert_eq!(tick.high_24h, Some(42_500.0));
        assert_eq!(tick.low_24h, Some(40_500.0));
    }

    #[test]
    fn test_parse_exchange_info() {
        let info: ExchangeInfo = serde_json::from_value(json!({
            "timezone": "UTC",
            "symbols": [
                {"symbol": "BTCUSDT", "status": "TRADING", "baseAsset": "BTC", "quoteAsset": "USDT"},
                {"symbol": "LUNAUSDT", "status": "BREAK", "baseAsset": "LUNA", "quoteAsset": "USDT"},
                {"symbol": "ETHBTC", "status": "TRADING", "baseAsset": "ETH", "quoteAsset": "BTC"}
            ]
        }))
        .unwrap();

        let symbols: Vec<SymbolInfo> = info.symbols.into_iter().map(SymbolInfo::from).collect();
        assert_eq!(filter_quote(symbols, "USDT"), vec!["BTCUSDT"]);
    }

    #[test]
    fn test_search_is_capped() {
        let mut symbols: Vec<SymbolInfo> = (0..15)
            .map(|i| info(&format!("DOGE{i}USDT"), &format!("DOGE{i}"), "USDT", "TRADING"))
            .collect();
        symbols.push(info("DOGEBTC", "DOGE", "BTC", "TRADING"));

        let found = filter_search(symbols.clone(), "doge", "USDT");
        assert_eq!(found.len(), SEARCH_LIMIT);
        assert!(found.iter().all(|s| s.quote_asset == "USDT"));

        assert!(filter_search(symbols, "xrp", "USDT").is_empty());
    }

    #[test]
    fn test_symbols_param_is_compact_json() {
        let symbols = vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()];
        assert_eq!(symbols_param(&symbols).unwrap(), r#"["BTCUSDT","ETHUSDT"]"#);
    }

    #[test]
    fn test_parse_ticker_batch_body() {
        let raw: Vec<RawTicker> = serde_json::from_value(json!([
            {"symbol": "BTCUSDT", "lastPrice": "42000.00", "priceChangePercent": "1.5",
             "volume": "100.0", "highPrice": "42500.00", "lowPrice": "41000.00"},
            {"symbol": "ETHUSDT", "lastPrice": "2500.50", "priceChangePercent": "-0.75",
             "volume": "900.0", "highPrice": "2600.00", "lowPrice": "2450.00"}
        ]))
        .unwrap();

        let ticks: Vec<PriceTick> = raw
            .into_iter()
            .map(RawTicker::into_tick)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[1].symbol, "ETHUSDT");
        assert_eq!(ticks[1].change_pct, -0.75);
    }

    #[tokio::test]
    async fn test_failed_batch_falls_back_to_cache() {
        let client = BinanceClient::new(BinanceConfig {
            base_url: "http://127.0.0.1:9/api/v3".to_string(),
            timeout: Duration::from_millis(200),
            cache_ttl: Duration::from_millis(0),
            batch_size: 2,
            batch_pause: Duration::from_millis(1),
            ..Default::default()
        })
        .unwrap();
        client.cache().put(PriceTick {
            symbol: "ETHUSDT".to_string(),
            price: 2_500.0,
            change_pct: 0.0,
            volume: 1.0,
            high_24h: None,
            low_24h: None,
        });

        let symbols: Vec<String> = ["btcusdt", "ethusdt", "solusdt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let ticks = client.ticker_batch(&symbols).await;

        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].symbol, "ETHUSDT");
        assert_eq!(ticks[0].price, 2_500.0);
    }

    #[tokio::test]
    async fn test_stale_price_served_when_refresh_fails() {
        let client = BinanceClient::new(BinanceConfig {
            base_url: "http://127.0.0.1:9/api/v3".to_string(),
            timeout: Duration::from_millis(200),
            cache_ttl: Duration::from_millis(0),
            ..Default::default()
        })
        .unwrap();

        assert!(client.ticker_24h("BTCUSDT").await.is_err());

        client.cache().put(PriceTick {
            symbol: "BTCUSDT".to_string(),
            price: 41_000.0,
            change_pct: -1.0,
            volume: 10.0,
            high_24h: None,
            low_24h: None,
        });
        let tick = client.ticker_24h("btcusdt").await.unwrap();
        assert_eq!(tick.price, 41_000.0);
    }
}
