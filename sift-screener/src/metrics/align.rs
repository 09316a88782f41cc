//! Time-series alignment on common dates.
//!
//! Both series are reduced to simple daily returns, then intersected by
//! date. A date missing from either side is dropped entirely; there is no
//! interpolation and no forward fill.

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::data::PriceSeries;
use crate::metrics::MetricError;

/// One paired return observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub ticker: f64,
    pub proxy: f64,
}

/// Paired daily returns for a (security, proxy) pair, ascending by date.
///
/// Length is always at most `min(len_t, len_p) - 1`: returns lose the
/// leading observation of each series before intersection.
#[derive(Debug, Clone)]
pub struct AlignedReturns {
    rows: Vec<AlignedRow>,
}

impl AlignedReturns {
    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Security-side returns, date order.
    pub fn ticker_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.ticker).collect()
    }

    /// Proxy-side returns, date order.
    pub fn proxy_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.proxy).collect()
    }
}

/// Intersect the daily returns of two series on common dates.
///
/// Fails with [`MetricError::InsufficientHistory`] when fewer than
/// `min_observations` paired rows survive the intersection.
pub fn align(
    ticker: &PriceSeries,
    proxy: &PriceSeries,
    min_observations: usize,
) -> Result<AlignedReturns, MetricError> {
    let ticker_returns = ticker.returns();
    let proxy_returns = proxy.returns();

    // Both vectors are date-sorted, so a two-pointer merge finds the
    // intersection in one pass.
    let mut rows = Vec::with_capacity(ticker_returns.len().min(proxy_returns.len()));
    let (mut i, mut j) = (0, 0);

    while i < ticker_returns.len() && j < proxy_returns.len() {
        match ticker_returns[i].0.cmp(&proxy_returns[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                rows.push(AlignedRow {
                    date: ticker_returns[i].0,
                    ticker: ticker_returns[i].1,
                    proxy: proxy_returns[j].1,
                });
                i += 1;
                j += 1;
            }
        }
    }

    if rows.len() < min_observations {
        return Err(MetricError::InsufficientHistory {
            required: min_observations,
            actual: rows.len(),
        });
    }

    Ok(AlignedReturns { rows })
}

// ============================================================================
// Tests
// ============================================================================
