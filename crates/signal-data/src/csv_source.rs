//! CSV data source for offline analysis.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use signal_core::error::DataError;
use signal_core::traits::MarketDataSource;
use signal_core::types::{Candle, Series, Timeframe};
use std::path::{Path, PathBuf};
use tracing::debug;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Date",
        alias = "date",
        alias = "timestamp",
        alias = "Timestamp",
        alias = "open_time"
    )]
    time: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: f64,
}

/// Reads `{dir}/{SYMBOL}.csv` files.
///
/// The timeframe is not encoded in the file name; each file holds one
/// interval and the requested timeframe is only attached to the series.
pub struct CsvDataSource {
    dir: PathBuf,
}

impl CsvDataSource {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, DataError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol.to_uppercase()))
    }
}

#[async_trait]
impl MarketDataSource for CsvDataSource {
    async fn get_series(&self, symbol: &str, timeframe: Timeframe) -> Result<Series, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }
        let candles = read_candles(&path)?;
        debug!(symbol, candles = candles.len(), path = %path.display(), "Loaded CSV series");
        Ok(Series::from_candles(symbol, timeframe, candles))
    }

    async fn list_symbols(&self, quote: &str) -> Result<Vec<String>, DataError> {
        let entries =
            std::fs::read_dir(&self.dir).map_err(|e| DataError::Internal(e.to_string()))?;
        let quote = quote.to_uppercase();

        let mut symbols: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_uppercase)
            })
            .filter(|symbol| symbol.ends_with(&quote) && symbol.len() > quote.len())
            .collect();
        symbols.sort();
        Ok(symbols)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Read candles from a CSV file, sorted oldest first.
fn read_candles(path: &Path) -> Result<Vec<Candle>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::ParseError(e.to_string()))?;

    let mut candles = Vec::new();

    for result in reader.deserialize() {
        let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
        let time = parse_timestamp(&record.time)?;

        candles.push(Candle::new(
            time,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    candles.sort_by_key(|c| c.time);

    Ok(candles)
}

/// Parse a timestamp into Unix seconds.
fn parse_timestamp(value: &str) -> Result<i64, DataError> {
    let value = value.trim();

    if let Ok(ts) = value.parse::<i64>() {
        // Exchange exports use milliseconds
        return Ok(if ts > 10_000_000_000 { ts / 1000 } else { ts });
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp());
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(value, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc().timestamp());
            }
        }
    }

    Err(DataError::ParseError(format!("Could not parse date: {value}")))
}
