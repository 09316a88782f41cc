//! Sift Screener - daily royalty & commodity screener.
//!
//! Fetches price history for a fixed universe of royalty names and their
//! commodity proxies, computes comparative statistics, and emails the
//! rendered report.

use anyhow::Result;
use sift_common::config::Config;
use sift_common::logging::init_logging;
use sift_screener::ScreenerService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load_with_env()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Sift Screener v{}", env!("CARGO_PKG_VERSION"));

    let service = ScreenerService::new(config);
    service.run().await
}
