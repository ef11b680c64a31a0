//! Core library for invoice series analysis.
//!
//! This crate provides:
//! - Pattern notation compiler (`GST/*/[001]`) and auto-detection
//! - Series matching, range, gap and duplicate analysis
//! - GSTR-1 Table 13 report rows
//! - Cross-period continuity checks with Indian financial-year rules

pub mod continuity;
pub mod error;
pub mod fy;
pub mod models;
pub mod pattern;
pub mod report;
pub mod rules;
pub mod series;

pub use continuity::check_continuity;
pub use error::{DetectError, DocSeriesError, PatternError, Result, TaxPeriodError};
pub use fy::{fy_of, same_fy, FinancialYear, TaxPeriod};
pub use models::config::DocSeriesConfig;
pub use models::continuity::{
    ContinuityResult, ContinuityStatus, ContinuitySummary, PreviousSeriesInfo, PreviousSeriesRecord,
};
pub use models::nature::DocumentNature;
pub use models::series::{
    InvoiceFailure, ParsedInvoice, ProcessingResult, SeriesAnalysis, SeriesGroups, Table13Row,
    TABLE13_HEADERS,
};
pub use pattern::{
    compile_pattern, detect_pattern, Detection, DetectionMethod, PatternCompiler, PatternDetector,
    PatternPart, PatternSpec,
};
pub use series::{to_report_rows, SeriesAnalyzer, SeriesMatcher};

use tracing::info;

/// Compile `pattern`, match every line of `text` and analyze each series.
///
/// Only a malformed pattern fails; unusable lines are recorded in the
/// result.
pub fn process(
    pattern: &str,
    text: &str,
    document_nature: &str,
    config: &DocSeriesConfig,
) -> Result<ProcessingResult> {
    let spec = PatternCompiler::with_options(config.compile_options()).compile(pattern)?;
    let matcher = SeriesMatcher::new(spec).with_options(config.matcher_options());
    let outcome = matcher.match_all(text);

    let result = SeriesAnalyzer::new(&matcher)
        .with_config(config.analysis.clone())
        .analyze_outcome(outcome, document_nature);

    info!(
        "Processed {} line(s): {} series, {} unmatched, {} duplicate(s)",
        result.total_input_lines,
        result.series_results.len(),
        result.total_unmatched,
        result.total_duplicates
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_pipeline() {
        let result = process(
            "INV/[001]",
            "INV/001\nINV/003\n",
            "Credit Note",
            &DocSeriesConfig::default(),
        )
        .unwrap();
        assert_eq!(result.series_results.len(), 1);
        assert_eq!(result.series_results[0].cancelled_count, 1);
        assert_eq!(result.document_nature, "Credit Note");
    }

    #[test]
    fn test_process_rejects_bad_pattern() {
        let err = process("INV/*", "INV/1", "Credit Note", &DocSeriesConfig::default()).unwrap_err();
        assert!(matches!(err, DocSeriesError::Pattern(PatternError::MissingSequence)));
    }
}
