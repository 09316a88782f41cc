//! Report assembly and rendering.
//!
//! The assembler turns screening results into ordered layout instructions
//! with explicit page breaks: a title, a column header, then one row per
//! ticker, tracking a vertical cursor that resets on page break. Pagination
//! lives here; drawing lives behind [`RenderSink`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::metrics::MetricResult;

// ============================================================================
// Layout Constants
// ============================================================================

/// A4 page height, cm.
pub const PAGE_HEIGHT_CM: f64 = 29.7;

/// Vertical position of the title and of the first row after a page break.
const TOP_CM: f64 = 27.0;

/// Vertical position of the column header.
const TABLE_TOP_CM: f64 = 25.0;

/// Cursor step after the column header.
const HEADER_STEP_CM: f64 = 0.5;

/// Cursor step after each data row.
const ROW_STEP_CM: f64 = 0.6;

/// Rows are never drawn below this margin.
const BOTTOM_MARGIN_CM: f64 = 2.5;

/// Column header line.
const COLUMNS: &str = "Ticker | Proxy | Corr(1y ret) | Beta | Z-score | Price";

// ============================================================================
// Screening Report
// ============================================================================

/// One report row: a ticker, its proxy, and the computed metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub ticker: String,
    pub proxy: String,
    pub metrics: MetricResult,
}

/// Ordered screening results, one entry per ticker that produced metrics.
///
/// Entries keep universe declaration order; tickers that failed are simply
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningReport {
    entries: Vec<ReportEntry>,
    generated_at: DateTime<Utc>,
}

impl ScreeningReport {
    /// Create an empty report stamped with the current time.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create an empty report with an explicit timestamp.
    pub fn at(generated_at: DateTime<Utc>) -> Self {
        Self {
            entries: Vec::new(),
            generated_at,
        }
    }

    /// Append an entry, preserving insertion order.
    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn get(&self, ticker: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.ticker == ticker)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Timestamp used in the report title and artifact file name.
    pub fn stamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H-%M").to_string()
    }
}

impl Default for ScreeningReport {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assembler
// ============================================================================

/// One layout instruction for the render sink.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOp {
    /// Text to draw
    pub text: String,
    /// Vertical position, cm from the page bottom
    pub y_cm: f64,
    /// Start a new page before drawing this line
    pub page_break: bool,
}

/// Turn a report into ordered layout instructions.
///
/// An empty report still yields the title and column header; assembly never
/// fails.
pub fn assemble(report: &ScreeningReport) -> Vec<LayoutOp> {
    let mut ops = vec![
        LayoutOp {
            text: format!("Royalties & Commodities - Report {}", report.stamp()),
            y_cm: TOP_CM,
            page_break: false,
        },
        LayoutOp {
            text: COLUMNS.to_string(),
            y_cm: TABLE_TOP_CM,
            page_break: false,
        },
    ];

    let mut y = TABLE_TOP_CM - HEADER_STEP_CM;

    for entry in report.entries() {
        let m = &entry.metrics;
        let text = format!(
            "{} | {} | {:.2} | {:.2} | {:.2} | {:.2}",
            entry.ticker, entry.proxy, m.correlation, m.beta, m.z_score, m.last_price
        );

        if y < BOTTOM_MARGIN_CM {
            ops.push(LayoutOp {
                text,
                y_cm: TOP_CM,
                page_break: true,
            });
            y = TOP_CM - ROW_STEP_CM;
        } else {
            ops.push(LayoutOp {
                text,
                y_cm: y,
                page_break: false,
            });
            y -= ROW_STEP_CM;
        }
    }

    ops
}

// ============================================================================
// Render Sink
// ============================================================================

/// Drawing surface abstraction: consumes ordered layout instructions and a
/// page height, persists an artifact, returns its path.
pub trait RenderSink {
    /// File extension this sink produces, without the dot.
    fn extension(&self) -> &'static str;

    /// Persist the instructions to `path`.
    fn render(&self, ops: &[LayoutOp], page_height_cm: f64, path: &Path) -> Result<PathBuf>;
}

/// Paginated plain-text sink. One line per instruction, pages separated by a
/// form feed. Vertical positions are implied by line order.
pub struct TextRenderer;

impl RenderSink for TextRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, ops: &[LayoutOp], _page_height_cm: f64, path: &Path) -> Result<PathBuf> {
        let mut out = String::new();
        for op in ops {
            if op.page_break {
                out.push('\u{c}');
                out.push('\n');
            }
            out.push_str(&op.text);
            out.push('\n');
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create report directory")?;
        }
        std::fs::write(path, out)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        Ok(path.to_path_buf())
    }
}

/// Assemble `report` and persist it into `output_dir` through `sink`.
pub fn save_report(
    report: &ScreeningReport,
    sink: &dyn RenderSink,
    output_dir: &Path,
) -> Result<PathBuf> {
    let ops = assemble(report);
    let file_name = format!("royalty_report_{}.{}", report.stamp(), sink.extension());
    sink.render(&ops, PAGE_HEIGHT_CM, &output_dir.join(file_name))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ticker: &str) -> ReportEntry {
        ReportEntry {
            ticker: ticker.to_string(),
            proxy: "CL=F".to_string(),
            metrics: MetricResult {
                correlation: 0.8312,
                beta: 1.247,
                z_score: -0.456,
                last_price: 27.905,
            },
        }
    }

    fn report_with(n: usize) -> ScreeningReport {
        let mut report = ScreeningReport::new();
        for i in 0..n {
            report.push(entry(&format!("T{i}")));
        }
        report
    }

    #[test]
    fn test_empty_report_is_header_only() {
        let ops = assemble(&report_with(0));
        assert_eq!(ops.len(), 2);
        assert!(ops[0].text.starts_with("Royalties & Commodities"));
        assert_eq!(ops[1].text, COLUMNS);
        assert!(ops.iter().all(|op| !op.page_break));
    }

    #[test]
    fn test_row_formatting_two_decimals() {
        let ops = assemble(&report_with(1));
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[2].text, "T0 | CL=F | 0.83 | 1.25 | -0.46 | 27.91");
        assert!((ops[2].y_cm - 24.5).abs() < 1e-9);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut report = ScreeningReport::new();
        report.push(entry("VNOM"));
        report.push(entry("DMLP"));
        let ops = assemble(&report);
        assert!(ops[2].text.starts_with("VNOM"));
        assert!(ops[3].text.starts_with("DMLP"));
        assert_eq!(report.get("DMLP").unwrap().ticker, "DMLP");
        assert!(report.get("FNV").is_none());
    }

    #[test]
    fn test_page_break_below_margin() {
        // Rows start at 24.5 cm and step 0.6 cm; row 37 would land below the
        // 2.5 cm margin, so it opens page two at the top.
        let ops = assemble(&report_with(40));
        assert_eq!(ops.len(), 42);

        let breaks: Vec<usize> = ops
            .iter()
            .enumerate()
            .filter(|(_, op)| op.page_break)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(breaks, vec![39]);
        assert!((ops[39].y_cm - 27.0).abs() < 1e-9);
        assert!((ops[40].y_cm - 26.4).abs() < 1e-9);

        // Nothing was ever placed below the margin.
        assert!(ops.iter().all(|op| op.y_cm >= 2.5));
    }

    #[test]
    fn test_text_renderer_writes_pages() {
        let dir = tempfile::tempdir().unwrap();
        let report = report_with(40);
        let path = save_report(&report, &TextRenderer, dir.path()).unwrap();

        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("royalty_report_"));
        assert!(path.extension().unwrap() == "txt");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches('\u{c}').count(), 1);
        assert!(content.contains("Ticker | Proxy"));
        assert!(content.lines().count() >= 42);
    }

    #[test]
    fn test_text_renderer_empty_report_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let report = report_with(0);
        let path = save_report(&report, &TextRenderer, dir.path()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches('\u{c}').count(), 0);
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_save_report_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let path = save_report(&report_with(1), &TextRenderer, &nested).unwrap();
        assert!(path.exists());
    }
}
