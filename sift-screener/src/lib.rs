//! Sift Screener - daily royalty & commodity screener.
//!
//! For each security in a configured universe, fetches a year of daily
//! closes for the security and its commodity proxy, computes correlation,
//! beta and z-score, renders a paginated report artifact, and ships it over
//! the first working delivery channel.
//!
//! ```text
//! Universe ──▶ MarketDataProvider ──▶ align ──▶ compute_metrics
//!                                                     │
//!                          ScreeningReport ◀──────────┘
//!                                 │
//!                 assemble ──▶ RenderSink ──▶ artifact
//!                                                │
//!                              DeliveryRouter ───┘ (API, then SMTP)
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod data;
pub mod engine;
pub mod metrics;
pub mod report;

// Re-export commonly used types
pub use data::{MarketDataProvider, PricePoint, PriceSeries, ProviderError, YahooProvider};
pub use engine::ScreenerEngine;
pub use metrics::{align, compute_metrics, AlignedReturns, MetricError, MetricResult};
pub use report::{
    assemble, save_report, LayoutOp, RenderSink, ReportEntry, ScreeningReport, TextRenderer,
};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use sift_channels::{Artifact, ChannelError, DeliveryRouter};
use sift_common::config::Config;

/// Top-level service: one screening pass, one render, one delivery attempt
/// chain.
pub struct ScreenerService {
    config: Config,
}

impl ScreenerService {
    /// Create the service from resolved configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run one full pass.
    ///
    /// Only artifact I/O can fail the run; data problems skip tickers and
    /// delivery problems are logged.
    pub async fn run(&self) -> Result<()> {
        let output_dir = self.config.expanded_output_dir();
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

        let provider = Arc::new(YahooProvider::new());
        let engine = ScreenerEngine::new(&self.config, provider);
        let screening = engine.run().await;

        if screening.is_empty() {
            warn!("No ticker produced metrics; skipping report and delivery");
            return Ok(());
        }

        let artifact_path = save_report(&screening, &TextRenderer, &output_dir)?;
        info!(path = %artifact_path.display(), "Report artifact written");

        let bytes = tokio::fs::read(&artifact_path)
            .await
            .with_context(|| format!("Failed to read artifact {}", artifact_path.display()))?;
        let file_name = artifact_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("royalty_report.txt")
            .to_string();

        let router = DeliveryRouter::from_config(&self.config.delivery);
        match router.deliver(&Artifact::new(file_name, bytes)).await {
            Ok(channel) => info!(channel, "Report delivered"),
            Err(ChannelError::NotConfigured(msg)) => warn!(%msg, "Delivery skipped"),
            Err(e) => error!(error = %e, "Report delivery failed"),
        }

        Ok(())
    }
}
