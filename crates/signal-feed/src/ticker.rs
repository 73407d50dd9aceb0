//! Binance `<symbol>@ticker` stream messages.

use serde::Deserialize;
use signal_core::error::FeedError;
use signal_core::types::PriceTick;

#[derive(Debug, Deserialize)]
struct TickerMessage {
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "c")]
    last_price: String,
    #[serde(rename = "P")]
    change_pct: String,
    #[serde(rename = "v")]
    volume: String,
    #[serde(rename = "h")]
    high: Option<String>,
    #[serde(rename = "l")]
    low: Option<String>,
}

fn decimal(field: &str, value: &str) -> Result<f64, FeedError> {
    value
        .parse()
        .map_err(|_| FeedError::Malformed(format!("{field}: {value:?}")))
}

/// Parse one 24h ticker event into a price tick.
pub fn parse_ticker(text: &str) -> Result<PriceTick, FeedError> {
    let msg: TickerMessage =
        serde_json::from_str(text).map_err(|e| FeedError::Malformed(e.to_string()))?;

    Ok(PriceTick {
        price: decimal("c", &msg.last_price)?,
        change_pct: decimal("P", &msg.change_pct)?,
        volume: decimal("v", &msg.volume)?,
        high_24h: msg.high.as_deref().map(|h| decimal("h", h)).transpose()?,
        low_24h: msg.low.as_deref().map(|l| decimal("l", l)).transpose()?,
        symbol: msg.symbol,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticker_event() {
        let text = r#"{"e":"24hrTicker","E":1705312800123,"s":"BTCUSDT","p":"850.00",
            "P":"2.07","w":"41500.1","c":"42000.50","Q":"0.01","o":"41150.50",
            "h":"42300.00","l":"40900.00","v":"25432.1","q":"1055000000.0"}"#;

        let tick = parse_ticker(text).unwrap();
        assert_eq!(tick.symbol, "BTCUSDT");
        assert_eq!(tick.price, 42_000.50);
        assert_eq!(tick.change_pct, 2.07);
        assert_eq!(tick.volume, 25_432.1);
        assert_eq!(tick.high_24h, Some(42_300.0));
        assert_eq!(tick.low_24h, Some(40_900.0));
    }

    #[test]
    fn test_parse_ticker_rejects_malformed() {
        assert!(matches!(
            parse_ticker("not json"),
            Err(FeedError::Malformed(_))
        ));
        assert!(matches!(
            parse_ticker(r#"{"s":"BTCUSDT","c":"abc","P":"0","v":"0"}"#),
            Err(FeedError::Malformed(_))
        ));
        // Subscription acknowledgements carry no ticker fields
        assert!(parse_ticker(r#"{"result":null,"id":1}"#).is_err());
    }
}
