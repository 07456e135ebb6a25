use async_trait::async_trait;
use thiserror::Error;

use crate::models::Day;

pub mod yahoo;

pub use yahoo::YahooChartClient;

/// Outcome of asking the remote source for one day's close
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuoteResult {
    /// Exactly one closing price for the day
    Price(f64),
    /// No usable record for the day (holiday, weekend, 404, odd payload)
    NoData,
}

/// Failures talking to the quote API
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Connection, DNS or timeout failure below HTTP
    #[error("request for {day} failed: {message}")]
    Transport { day: Day, message: String },

    /// Throttling or server-side failure that may clear up on retry
    #[error("quote API returned HTTP {status} for {day}")]
    Status { day: Day, status: u16 },

    /// Any other non-success status
    #[error("quote API returned HTTP {status} for {day}: {body}")]
    Http { day: Day, status: u16, body: String },

    /// Body was not the expected chart JSON
    #[error("failed to decode quote for {day}: {message}")]
    Decode { day: Day, message: String },
}

impl QuoteError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, QuoteError::Status { .. })
    }
}

/// A source of daily closing prices
#[async_trait]
pub trait QuoteFetcher: Send + Sync {
    /// Query the close for the 24h window starting at `day`
    async fn fetch(&self, day: Day) -> Result<QuoteResult, QuoteError>;
}
