//! Market data types and the gateway abstraction.

pub mod provider;
pub mod yahoo;

pub use provider::{MarketDataProvider, ProviderError};
pub use yahoo::YahooProvider;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Date-ordered closing prices for one symbol.
///
/// Construction sorts and deduplicates by date, so dates are strictly
/// increasing for the lifetime of the series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from unordered points. Later duplicates of a date win,
    /// matching how data sources emit corrections.
    pub fn new(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// Most recent close, if any.
    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|p| p.close)
    }

    /// Simple daily returns, dated at the later observation. One fewer
    /// element than the series itself; empty for series shorter than two.
    pub fn returns(&self) -> Vec<(NaiveDate, f64)> {
        self.points
            .windows(2)
            .map(|w| (w[1].date, w[1].close / w[0].close - 1.0))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
