use serde::Deserialize;

use crate::api::QuoteResult;

/// Top-level chart response
#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chart {
    /// Absent or null when the API reports an error
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Quote {
    /// Closing prices; the API emits `null` for bars without a close
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

/// Pick the single close out of a one-day chart response.
///
/// Exactly one result holding one quote holding one non-null close is a
/// price; every other shape is `NoData`.
pub fn close_from_envelope(envelope: &ChartEnvelope) -> QuoteResult {
    let results = match envelope.chart.result.as_deref() {
        Some([only]) => only,
        _ => return QuoteResult::NoData,
    };

    let quote = match results.indicators.quote.as_slice() {
        [only] => only,
        _ => return QuoteResult::NoData,
    };

    match quote.close.as_slice() {
        [Some(close)] => QuoteResult::Price(*close),
        _ => QuoteResult::NoData,
    }
}
