//! Error types for the signal desk.

use thiserror::Error;

/// Top-level signal desk error.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Market data source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("HTTP {status} from {endpoint}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

/// Indicator calculation errors.
///
/// The indicator engine never hands these to its callers through
/// `compute`; they surface only from the fallible `try_compute`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Non-finite {indicator} value: {value}")]
    NonFinite { indicator: &'static str, value: f64 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Live price feed errors.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Stream closed by peer")]
    Closed,

    #[error("Malformed ticker message: {0}")]
    Malformed(String),

    #[error("Feed connection failed after {retries} retries")]
    RetriesExhausted { retries: u32 },
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notifier not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rejected by API: {0}")]
    Rejected(String),
}

/// Result type alias for signal desk operations.
pub type SignalResult<T> = Result<T, SignalError>;
