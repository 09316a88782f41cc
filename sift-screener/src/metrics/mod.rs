//! Metrics pipeline: series alignment and statistic derivation.

pub mod align;
pub mod engine;

pub use align::{align, AlignedReturns, AlignedRow};
pub use engine::{compute_metrics, MetricResult};

/// Per-ticker failure taxonomy.
///
/// Every variant is recoverable: the screening loop logs the error and moves
/// on to the next ticker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricError {
    #[error("no price data: {0}")]
    DataUnavailable(String),

    #[error("insufficient aligned history: {actual} observations, {required} required")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("degenerate series: {0}")]
    DegenerateSeries(String),
}
