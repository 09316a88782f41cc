//! Market data gateway abstraction.
//!
//! The gateway is treated as unreliable: empty or partial results are
//! expected, not exceptional. No retries, no caching.

use async_trait::async_trait;
use std::fmt;

use super::PriceSeries;

/// Errors specific to market data providers.
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// Network error (connection failed, timeout, non-2xx status)
    Network(String),
    /// The provider returned no usable rows for the symbol
    NoData(String),
    /// The provider answered with a payload we could not interpret
    InvalidResponse(String),
    /// Invalid request parameters (unknown period, malformed symbol)
    InvalidRequest(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::NoData(msg) => write!(f, "No data: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            Self::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// Whether the failure means "symbol has no history" rather than an
    /// infrastructure problem.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData(_))
    }
}

/// Trait for market data providers.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Get the provider name (e.g. "yahoo")
    fn name(&self) -> &'static str;

    /// Fetch daily closes for `symbol` over the lookback `period`
    /// (provider range syntax, e.g. "1y").
    ///
    /// Returns `NoData` instead of an empty series; a returned series always
    /// has at least one point and strictly increasing dates.
    async fn fetch_close_series(
        &self,
        symbol: &str,
        period: &str,
    ) -> Result<PriceSeries, ProviderError>;
}

// ============================================================================
// Tests
// ============================================================================
