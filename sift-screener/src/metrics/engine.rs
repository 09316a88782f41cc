//! Statistic derivation for one (security, proxy) pair.
//!
//! Correlation and beta are computed on aligned daily returns, never on raw
//! prices, so trend does not masquerade as co-movement. The z-score is the
//! opposite: it characterizes the security's own price distribution over the
//! full fetched window, independent of the proxy.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data::PriceSeries;
use crate::metrics::align::align;
use crate::metrics::MetricError;

/// Comparative statistics for one (security, proxy) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Pearson correlation of aligned daily returns, in [-1, 1]
    pub correlation: f64,
    /// Regression slope of security returns on proxy returns
    pub beta: f64,
    /// Standard deviations the last price sits from the trailing mean
    pub z_score: f64,
    /// Most recent close of the security's own series
    pub last_price: f64,
}

/// Compute correlation, beta and z-score for a pair of price series.
///
/// All failure modes are per-ticker and recoverable; see [`MetricError`].
pub fn compute_metrics(
    ticker: &PriceSeries,
    proxy: &PriceSeries,
    min_observations: usize,
) -> Result<MetricResult, MetricError> {
    if ticker.is_empty() {
        return Err(MetricError::DataUnavailable(ticker.symbol().to_string()));
    }
    if proxy.is_empty() {
        return Err(MetricError::DataUnavailable(proxy.symbol().to_string()));
    }

    let aligned = align(ticker, proxy, min_observations)?;
    let ticker_returns = aligned.ticker_returns();
    let proxy_returns = aligned.proxy_returns();

    let correlation = pearson(&ticker_returns, &proxy_returns)?;
    let beta = regression_beta(&ticker_returns, &proxy_returns)?;
    let (z_score, last_price) = price_z_score(ticker)?;

    Ok(MetricResult {
        correlation,
        beta,
        z_score,
        last_price,
    })
}

/// Pearson correlation coefficient of two equal-length return vectors.
fn pearson(ticker_returns: &[f64], proxy_returns: &[f64]) -> Result<f64, MetricError> {
    let std_t = ticker_returns.std_dev();
    let std_p = proxy_returns.std_dev();

    if std_t == 0.0 || std_p == 0.0 {
        return Err(MetricError::DegenerateSeries(
            "zero return variance in aligned window".into(),
        ));
    }

    let cov = ticker_returns.covariance(proxy_returns);
    // Rounding can push |r| marginally past 1.
    Ok((cov / (std_t * std_p)).clamp(-1.0, 1.0))
}

/// Sample covariance of the pair over sample variance of the proxy.
fn regression_beta(ticker_returns: &[f64], proxy_returns: &[f64]) -> Result<f64, MetricError> {
    let var_p = proxy_returns.variance();

    if var_p == 0.0 {
        return Err(MetricError::DegenerateSeries(
            "proxy returns have zero variance".into(),
        ));
    }

    Ok(ticker_returns.covariance(proxy_returns) / var_p)
}

/// Z-score of the last close against the full fetched window, using the
/// population standard deviation (denominator N).
fn price_z_score(ticker: &PriceSeries) -> Result<(f64, f64), MetricError> {
    let closes = ticker.closes();
    let prices = closes.as_slice();

    // Non-empty is checked by the caller.
    let last_price = ticker.last_close().ok_or_else(|| {
        MetricError::DataUnavailable(ticker.symbol().to_string())
    })?;

    let std = prices.population_std_dev();
    if std == 0.0 {
        return Err(MetricError::DegenerateSeries(format!(
            "{}: constant price series",
            ticker.symbol()
        )));
    }

    Ok(((last_price - prices.mean()) / std, last_price))
}

// ============================================================================
// Tests
// ============================================================================
