use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::models::{close_from_envelope, ChartEnvelope};
use crate::api::{QuoteError, QuoteFetcher, QuoteResult};
use crate::models::Day;

/// Yahoo Finance chart API client for one symbol's daily closes
pub struct YahooChartClient {
    http_client: HttpClient,
    base_url: String,
    symbol: String,
}

impl YahooChartClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://query2.finance.yahoo.com/v8/finance/chart";
    const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

    /// Create a client with a per-request timeout
    pub fn new(base_url: String, symbol: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            symbol,
        })
    }

    /// Chart URL for the symbol; `^` must be escaped in the path
    fn chart_url(&self) -> String {
        format!("{}/{}", self.base_url, self.symbol.replace('^', "%5E"))
    }

    /// Query parameters selecting the 24h window anchored at `day`
    fn window_params(day: Day) -> [(&'static str, String); 4] {
        let period1 = day.unix_timestamp();
        let period2 = period1 + Self::SECONDS_PER_DAY;
        [
            ("period1", period1.to_string()),
            ("period2", period2.to_string()),
            ("interval", "1d".to_string()),
            ("events", "history".to_string()),
        ]
    }

    /// Map an unsuccessful status to a quote outcome.
    ///
    /// Error statuses other than 404, 429 and 5xx often still carry a chart
    /// envelope (e.g. `result: null` with an error object); such a body goes
    /// through the same cardinality rule as a success. Only a body that is
    /// not a chart envelope is fatal.
    async fn handle_error_response(
        day: Day,
        status: StatusCode,
        response: reqwest::Response,
    ) -> Result<QuoteResult, QuoteError> {
        let status_code = status.as_u16();
        match status_code {
            404 => {
                debug!("No chart for {} (404)", day);
                Ok(QuoteResult::NoData)
            }
            429 | 500..=599 => {
                warn!("Quote API returned {} for {}", status_code, day);
                Err(QuoteError::Status {
                    day,
                    status: status_code,
                })
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                match serde_json::from_str::<ChartEnvelope>(&body) {
                    Ok(envelope) => {
                        debug!("Quote API returned {} with a chart body for {}", status_code, day);
                        Ok(close_from_envelope(&envelope))
                    }
                    Err(_) => Err(QuoteError::Http {
                        day,
                        status: status_code,
                        body,
                    }),
                }
            }
        }
    }
}

#[async_trait]
impl QuoteFetcher for YahooChartClient {
    async fn fetch(&self, day: Day) -> Result<QuoteResult, QuoteError> {
        let url = self.chart_url();

        let response = self
            .http_client
            .get(&url)
            .query(&Self::window_params(day))
            .send()
            .await
            .map_err(|e| QuoteError::Transport {
                day,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Self::handle_error_response(day, status, response).await;
        }

        let body = response.bytes().await.map_err(|e| QuoteError::Transport {
            day,
            message: format!("failed to read body: {}", e),
        })?;

        let envelope: ChartEnvelope =
            serde_json::from_slice(&body).map_err(|e| QuoteError::Decode {
                day,
                message: e.to_string(),
            })?;

        Ok(close_from_envelope(&envelope))
    }
}
