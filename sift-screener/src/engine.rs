//! Screening engine: drives the sequential universe loop.
//!
//! One pass per invocation. Each (ticker, proxy) pair is fetched and scored
//! before the next begins; a failing pair is logged and skipped, never
//! fatal.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use sift_common::config::{Config, UniverseEntry};

use crate::data::MarketDataProvider;
use crate::metrics::{compute_metrics, MetricError, MetricResult};
use crate::report::{ReportEntry, ScreeningReport};

/// The screening engine.
///
/// Orchestrates one screening pass:
/// 1. Fetch close series for the security and its proxy
/// 2. Align returns and derive correlation, beta and z-score
/// 3. Collect results into the report, universe order preserved
pub struct ScreenerEngine<P: MarketDataProvider> {
    period: String,
    min_observations: usize,
    universe: Vec<UniverseEntry>,
    provider: Arc<P>,
}

impl<P: MarketDataProvider> ScreenerEngine<P> {
    /// Create an engine for the configured universe.
    pub fn new(config: &Config, provider: Arc<P>) -> Self {
        Self {
            period: config.period.clone(),
            min_observations: config.min_observations,
            universe: config.universe.clone(),
            provider,
        }
    }

    /// Run one screening pass over the universe.
    ///
    /// Per-ticker failures are logged and skipped; the pass itself never
    /// fails. Tickers that failed are absent from the report.
    pub async fn run(&self) -> ScreeningReport {
        let started_at = Utc::now();
        let id = format!("scan_{}", started_at.format("%Y%m%d_%H%M%S"));

        info!(
            scan_id = %id,
            universe = self.universe.len(),
            provider = self.provider.name(),
            period = %self.period,
            "Starting screening pass"
        );

        let mut report = ScreeningReport::at(started_at);

        for entry in &self.universe {
            match self.screen_pair(entry).await {
                Ok(metrics) => {
                    info!(
                        ticker = %entry.ticker,
                        proxy = %entry.proxy,
                        correlation = format!("{:.2}", metrics.correlation),
                        beta = format!("{:.2}", metrics.beta),
                        z_score = format!("{:.2}", metrics.z_score),
                        "Screened pair"
                    );
                    report.push(ReportEntry {
                        ticker: entry.ticker.clone(),
                        proxy: entry.proxy.clone(),
                        metrics,
                    });
                }
                Err(e) => {
                    warn!(ticker = %entry.ticker, proxy = %entry.proxy, error = %e, "Skipping ticker");
                }
            }
        }

        let duration_secs = (Utc::now() - started_at).num_milliseconds() as f64 / 1000.0;
        info!(
            scan_id = %id,
            screened = report.len(),
            skipped = self.universe.len() - report.len(),
            duration = format!("{:.1}s", duration_secs),
            "Screening pass complete"
        );

        report
    }

    async fn screen_pair(&self, entry: &UniverseEntry) -> Result<MetricResult, MetricError> {
        let ticker_series = self
            .provider
            .fetch_close_series(&entry.ticker, &self.period)
            .await
            .map_err(|e| MetricError::DataUnavailable(e.to_string()))?;

        let proxy_series = self
            .provider
            .fetch_close_series(&entry.proxy, &self.period)
            .await
            .map_err(|e| MetricError::DataUnavailable(e.to_string()))?;

        compute_metrics(&ticker_series, &proxy_series, self.min_observations)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PricePoint, PriceSeries, ProviderError};
    use async_trait::async_trait;
    use chrono::{Days, NaiveDate};
    use std::collections::HashMap;

    /// Mock provider serving in-memory series.
    struct MockProvider {
        series: HashMap<String, PriceSeries>,
    }

    impl MockProvider {
        fn new(series: Vec<PriceSeries>) -> Arc<Self> {
            Arc::new(Self {
                series: series
                    .into_iter()
                    .map(|s| (s.symbol().to_string(), s))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn fetch_close_series(
            &self,
            symbol: &str,
            _period: &str,
        ) -> Result<PriceSeries, ProviderError> {
            self.series
                .get(symbol)
                .cloned()
                .ok_or_else(|| ProviderError::NoData(symbol.to_string()))
        }
    }

    fn walk(symbol: &str, start: f64, len: usize) -> PriceSeries {
        let first = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut price = start;
        let points = (0..len)
            .map(|i| {
                price *= if i % 2 == 0 { 1.01 } else { 0.995 };
                PricePoint::new(first + Days::new(i as u64), price)
            })
            .collect();
        PriceSeries::new(symbol, points)
    }

    fn test_config(universe: Vec<UniverseEntry>) -> Config {
        Config {
            universe,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_run_screens_universe_in_order() {
        let provider = MockProvider::new(vec![
            walk("AAA", 100.0, 80),
            walk("BBB", 40.0, 80),
            walk("CL=F", 70.0, 80),
        ]);
        let config = test_config(vec![
            UniverseEntry::new("AAA", "CL=F"),
            UniverseEntry::new("BBB", "CL=F"),
        ]);

        let engine = ScreenerEngine::new(&config, provider);
        let report = engine.run().await;

        assert_eq!(report.len(), 2);
        assert_eq!(report.entries()[0].ticker, "AAA");
        assert_eq!(report.entries()[1].ticker, "BBB");
    }

    #[tokio::test]
    async fn test_failed_ticker_is_skipped_not_fatal() {
        let provider = MockProvider::new(vec![walk("AAA", 100.0, 80), walk("CL=F", 70.0, 80)]);
        let config = test_config(vec![
            UniverseEntry::new("MISSING", "CL=F"),
            UniverseEntry::new("AAA", "CL=F"),
        ]);

        let engine = ScreenerEngine::new(&config, provider);
        let report = engine.run().await;

        assert_eq!(report.len(), 1);
        assert!(report.get("MISSING").is_none());
        assert!(report.get("AAA").is_some());
    }

    #[tokio::test]
    async fn test_short_history_is_skipped() {
        let provider = MockProvider::new(vec![walk("AAA", 100.0, 10), walk("CL=F", 70.0, 10)]);
        let config = test_config(vec![UniverseEntry::new("AAA", "CL=F")]);

        let engine = ScreenerEngine::new(&config, provider);
        let report = engine.run().await;

        assert!(report.is_empty());
    }
}
