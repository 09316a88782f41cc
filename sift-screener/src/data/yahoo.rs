//! Yahoo Finance chart adapter.
//!
//! Fetches daily history from the v8 chart endpoint, which needs no
//! authentication. Adjusted closes are preferred when present so splits and
//! dividends do not show up as phantom returns; rows with a null close are
//! dropped.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::provider::{MarketDataProvider, ProviderError};
use super::{PricePoint, PriceSeries};

// ============================================================================
// Constants
// ============================================================================

/// Yahoo Finance API base URL
const YAHOO_API_BASE: &str = "https://query1.finance.yahoo.com";

/// Chart endpoint (history candles)
const CHART_ENDPOINT: &str = "/v8/finance/chart";

/// Ranges the chart endpoint accepts
const VALID_PERIODS: &[&str] = &["1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "max"];

/// HTTP timeout for a single fetch
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Response Payload
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
    #[serde(default)]
    adjclose: Option<Vec<AdjCloseBlock>>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance market data provider.
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooProvider {
    /// Create a provider against the public Yahoo endpoint.
    pub fn new() -> Self {
        Self::with_base_url(YAHOO_API_BASE)
    }

    /// Create a provider against a custom base URL (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent("Mozilla/5.0 (compatible; sift-screener)")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn extract_series(symbol: &str, result: ChartResult) -> Result<PriceSeries, ProviderError> {
        // Adjusted closes when the endpoint provides them, raw closes otherwise.
        let closes = match result.indicators.adjclose.and_then(|mut a| {
            if a.is_empty() {
                None
            } else {
                Some(a.remove(0).adjclose)
            }
        }) {
            Some(adj) if !adj.is_empty() => adj,
            _ => result
                .indicators
                .quote
                .into_iter()
                .next()
                .map(|q| q.close)
                .unwrap_or_default(),
        };

        let points: Vec<PricePoint> = result
            .timestamp
            .iter()
            .zip(closes)
            .filter_map(|(ts, close)| {
                let close = close.filter(|c| c.is_finite())?;
                let date = DateTime::from_timestamp(*ts, 0)?.date_naive();
                Some(PricePoint::new(date, close))
            })
            .collect();

        if points.is_empty() {
            return Err(ProviderError::NoData(format!(
                "{symbol}: chart contained no usable closes"
            )));
        }

        Ok(PriceSeries::new(symbol, points))
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_close_series(
        &self,
        symbol: &str,
        period: &str,
    ) -> Result<PriceSeries, ProviderError> {
        if !VALID_PERIODS.contains(&period) {
            return Err(ProviderError::InvalidRequest(format!(
                "unknown period '{period}', expected one of {VALID_PERIODS:?}"
            )));
        }

        let url = format!("{}{}/{}", self.base_url, CHART_ENDPOINT, symbol);
        debug!(symbol, period, "Fetching close series");

        let response = self
            .client
            .get(&url)
            .query(&[("range", period), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("{symbol}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Network(format!("{symbol}: HTTP {status}")));
        }

        let payload: ChartResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("{symbol}: {e}")))?;

        if let Some(err) = payload.chart.error {
            return Err(ProviderError::NoData(format!("{symbol}: {err}")));
        }

        let result = payload
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| ProviderError::NoData(format!("{symbol}: empty chart result")))?;

        Self::extract_series(symbol, result)
    }
}

// ============================================================================
// Tests
// ============================================================================
