//! Range, gap and duplicate analysis of invoice series.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::models::config::AnalysisConfig;
use crate::models::series::{ParsedInvoice, ProcessingResult, SeriesAnalysis, SeriesGroups, Table13Row};

use super::matcher::{MatchOutcome, SeriesMatcher};

/// Analyzes grouped invoices for Table 13 reporting.
pub struct SeriesAnalyzer<'a> {
    matcher: &'a SeriesMatcher,
    config: AnalysisConfig,
}

impl<'a> SeriesAnalyzer<'a> {
    /// Create an analyzer with default thresholds.
    pub fn new(matcher: &'a SeriesMatcher) -> Self {
        Self {
            matcher,
            config: AnalysisConfig::default(),
        }
    }

    /// Set warning thresholds.
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Analyze one series.
    pub fn analyze_series(&self, series_key: &str, invoices: &[ParsedInvoice]) -> SeriesAnalysis {
        let spec = self.matcher.spec();
        let mut result =
            SeriesAnalysis::empty(series_key, self.matcher.display_name(series_key));
        result.sequence_padding = spec.sequence_width();

        let sequences: Vec<(u64, &ParsedInvoice)> = invoices
            .iter()
            .filter_map(|inv| inv.sequence_number.map(|n| (n, inv)))
            .collect();

        if invoices.is_empty() {
            result.warnings.push("No invoices in series".to_string());
            return result;
        }
        if sequences.is_empty() {
            result.warnings.push("No valid sequence numbers found".to_string());
            return result;
        }

        if !self.matcher.options().ignore_leading_zeros {
            let observed = sequences
                .iter()
                .filter_map(|(_, inv)| inv.sequence_str.as_ref().map(String::len))
                .max()
                .unwrap_or(0);
            result.sequence_padding = result.sequence_padding.max(observed);
        }

        let mut unique = HashSet::with_capacity(sequences.len());
        for (n, inv) in &sequences {
            if !unique.insert(*n) {
                result.duplicate_invoices.push(inv.raw.clone());
            }
        }
        result.duplicate_count = result.duplicate_invoices.len() as u64;

        // `sequences` is non-empty, so both bounds exist.
        let start = unique.iter().copied().min().unwrap_or_default();
        let end = unique.iter().copied().max().unwrap_or_default();

        result.wildcard_values = sequences[0].1.wildcard_values.clone();
        result.start_number = start;
        result.end_number = end;
        result.start_invoice =
            self.matcher
                .reconstruct(start, &result.wildcard_values, Some(result.sequence_padding));
        result.end_invoice =
            self.matcher
                .reconstruct(end, &result.wildcard_values, Some(result.sequence_padding));

        result.actual_count = unique.len() as u64;
        result.net_issued = result.actual_count;

        let limit = self.config.max_range_span;
        let shown_limit = if limit == 0 { u64::MAX } else { limit };
        match (end - start)
            .checked_add(1)
            .filter(|&span| limit == 0 || span <= limit)
        {
            Some(span) => {
                result.total_in_range = span;
                result.missing_numbers = (start..=end).filter(|n| !unique.contains(n)).collect();
                let width = result.sequence_padding;
                result.missing_invoices = result
                    .missing_numbers
                    .iter()
                    .map(|n| format!("{:0width$}", n, width = width))
                    .collect();
            }
            None => {
                warn!(
                    "Series {}: range {}..={} too wide, gaps not enumerated",
                    result.series_display_name, start, end
                );
                result.total_in_range = result.actual_count;
                result.warnings.push(format!(
                    "Sequence range {} to {} spans more than {} numbers; gaps were not counted. \
                     Check for mistyped invoice numbers.",
                    start, end, shown_limit
                ));
            }
        }
        result.cancelled_count = result.missing_numbers.len() as u64;

        self.add_warnings(&mut result);

        debug!(
            "Series {}: {}..={} total {} cancelled {} duplicates {}",
            result.series_display_name,
            start,
            end,
            result.total_in_range,
            result.cancelled_count,
            result.duplicate_count
        );

        result
    }

    fn add_warnings(&self, analysis: &mut SeriesAnalysis) {
        let ratio = analysis.cancellation_ratio();
        if ratio > self.config.high_cancellation_ratio {
            let pct = (ratio * 100.0) as u64;
            analysis.warnings.push(format!(
                "High cancellation ratio: {}% of invoice range is missing. \
                 Please verify if this is correct or if multiple series are mixed.",
                pct
            ));
        }

        for (start, end) in consecutive_runs(&analysis.missing_numbers) {
            let size = end - start + 1;
            if size >= self.config.large_gap_threshold {
                analysis.warnings.push(format!(
                    "Large gap detected: {} consecutive numbers missing from {} to {}. \
                     This may indicate a series break.",
                    size, start, end
                ));
            }
        }

        if analysis.duplicate_count > 0 {
            analysis.warnings.push(format!(
                "{} duplicate invoice(s) found and ignored.",
                analysis.duplicate_count
            ));
        }
    }

    /// Analyze every series and assemble the run result.
    pub fn analyze_all(
        &self,
        groups: &SeriesGroups,
        unmatched: Vec<String>,
        invalid: Vec<(String, String)>,
        document_nature: &str,
    ) -> ProcessingResult {
        let total_matched: u64 = groups.values().map(|g| g.len() as u64).sum();

        let mut result = ProcessingResult {
            total_matched,
            total_unmatched: unmatched.len() as u64,
            total_invalid: invalid.len() as u64,
            total_input_lines: total_matched + unmatched.len() as u64 + invalid.len() as u64,
            pattern_used: self.matcher.spec().raw().to_string(),
            document_nature: document_nature.to_string(),
            unmatched_invoices: unmatched,
            invalid_invoices: invalid,
            ..ProcessingResult::default()
        };

        for (key, invoices) in groups {
            let analysis = self.analyze_series(key, invoices);
            result.total_duplicates += analysis.duplicate_count;
            result.series_results.push(analysis);
        }

        result.series_results.sort_by(|a, b| {
            a.series_key
                .cmp(&b.series_key)
                .then(a.start_number.cmp(&b.start_number))
        });

        if result.total_unmatched > 0 {
            result.warnings.push(format!(
                "{} invoice(s) didn't match the pattern. These may belong to a different series.",
                result.total_unmatched
            ));
        }
        if groups.len() > 1 {
            result.warnings.push(format!(
                "Multiple series detected: {} distinct series found based on variable parts in the pattern.",
                groups.len()
            ));
        }

        result
    }

    /// Analyze a [`MatchOutcome`] directly.
    pub fn analyze_outcome(&self, outcome: MatchOutcome, document_nature: &str) -> ProcessingResult {
        self.analyze_all(
            &outcome.groups,
            outcome.unmatched,
            outcome.invalid,
            document_nature,
        )
    }
}

/// One Table 13 row per series.
pub fn to_report_rows(result: &ProcessingResult) -> Vec<Table13Row> {
    result
        .series_results
        .iter()
        .map(|series| Table13Row {
            nature_of_document: result.document_nature.clone(),
            sr_no_from: series.start_invoice.clone(),
            sr_no_to: series.end_invoice.clone(),
            total_number: series.total_in_range,
            cancelled: series.cancelled_count,
            net_issued: series.net_issued,
        })
        .collect()
}

/// Group an ascending list into maximal inclusive runs of consecutive values.
pub fn consecutive_runs(sorted: &[u64]) -> Vec<(u64, u64)> {
    let mut runs = Vec::new();
    let Some((&first, rest)) = sorted.split_first() else {
        return runs;
    };

    let (mut start, mut end) = (first, first);
    for &n in rest {
        if n == end + 1 {
            end = n;
        } else {
            runs.push((start, end));
            start = n;
            end = n;
        }
    }
    runs.push((start, end));
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile_pattern;
    use crate::series::MatcherOptions;
    use pretty_assertions::assert_eq;

    fn matcher(pattern: &str) -> SeriesMatcher {
        SeriesMatcher::new(compile_pattern(pattern).unwrap())
    }

    fn parse_all(m: &SeriesMatcher, lines: &[&str]) -> Vec<ParsedInvoice> {
        lines.iter().map(|l| m.match_line(l)).collect()
    }

    #[test]
    fn test_complete_series() {
        let m = matcher("INV/[001]");
        let invoices = parse_all(&m, &["INV/001", "INV/002", "INV/003"]);
        let result = SeriesAnalyzer::new(&m).analyze_series("INV/{SEQ}", &invoices);

        assert_eq!(result.start_number, 1);
        assert_eq!(result.end_number, 3);
        assert_eq!(result.total_in_range, 3);
        assert_eq!(result.cancelled_count, 0);
        assert_eq!(result.net_issued, 3);
        assert!(result.missing_numbers.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_series_with_gaps() {
        let m = matcher("INV/[001]");
        let invoices = parse_all(&m, &["INV/001", "INV/002", "INV/005", "INV/006"]);
        let result = SeriesAnalyzer::new(&m).analyze_series("INV/{SEQ}", &invoices);

        assert_eq!(result.total_in_range, 6);
        assert_eq!(result.cancelled_count, 2);
        assert_eq!(result.net_issued, 4);
        assert_eq!(result.missing_numbers, vec![3, 4]);
        assert_eq!(result.missing_invoices, vec!["003", "004"]);
        assert_eq!(
            result.cancelled_count + result.actual_count,
            result.total_in_range
        );
    }

    #[test]
    fn test_duplicates_are_isolated() {
        let m = matcher("INV/[001]");
        let invoices = parse_all(&m, &["INV/001", "INV/002", "INV/002", "INV/003", "INV/02"]);
        let result = SeriesAnalyzer::new(&m).analyze_series("INV/{SEQ}", &invoices);

        assert_eq!(result.duplicate_count, 2);
        assert_eq!(result.duplicate_invoices, vec!["INV/002", "INV/02"]);
        assert_eq!(result.actual_count, 3);
        assert_eq!(result.net_issued, 3);
        assert!(result.warnings.iter().any(|w| w.contains("2 duplicate")));
    }

    #[test]
    fn test_start_end_are_reconstructed() {
        let m = matcher("GST/24-25/[0001]");
        let invoices = parse_all(&m, &["GST/24-25/10", "GST/24-25/0005", "GST/24-25/7"]);
        let result = SeriesAnalyzer::new(&m).analyze_series("GST/24-25/{SEQ}", &invoices);

        assert_eq!(result.start_invoice, "GST/24-25/0005");
        assert_eq!(result.end_invoice, "GST/24-25/0010");
    }

    #[test]
    fn test_padding_widens_to_observed() {
        let m = matcher("INV/[01]");
        let invoices = parse_all(&m, &["INV/0098", "INV/0100"]);
        let result = SeriesAnalyzer::new(&m).analyze_series("INV/{SEQ}", &invoices);

        assert_eq!(result.sequence_padding, 4);
        assert_eq!(result.missing_invoices, vec!["0099"]);
        assert_eq!(result.start_invoice, "INV/0098");
    }

    #[test]
    fn test_ignore_leading_zeros_keeps_declared_width() {
        let m = matcher("INV/[01]").with_options(MatcherOptions {
            ignore_leading_zeros: true,
        });
        let invoices = parse_all(&m, &["INV/0098", "INV/0100"]);
        let result = SeriesAnalyzer::new(&m).analyze_series("INV/{SEQ}", &invoices);

        assert_eq!(result.sequence_padding, 2);
        assert_eq!(result.missing_invoices, vec!["99"]);
        assert_eq!(result.end_invoice, "INV/100");
    }

    #[test]
    fn test_high_cancellation_warning() {
        let m = matcher("INV/[001]");
        let invoices = parse_all(&m, &["INV/001", "INV/010"]);
        let result = SeriesAnalyzer::new(&m).analyze_series("INV/{SEQ}", &invoices);

        assert!(result.warnings.iter().any(|w| w.contains("High cancellation ratio: 80%")));
    }

    #[test]
    fn test_large_gap_warning_cites_bounds() {
        let m = matcher("INV/[001]");
        let mut lines: Vec<String> = (1..=300).map(|n| format!("INV/{:03}", n)).collect();
        // Remove 101..=160 (60 numbers) and a small gap 200..=202.
        lines.retain(|l| {
            let n: u64 = l[4..].parse().unwrap();
            !(101..=160).contains(&n) && !(200..=202).contains(&n)
        });
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let invoices = parse_all(&m, &refs);
        let result = SeriesAnalyzer::new(&m).analyze_series("INV/{SEQ}", &invoices);

        let gap_warnings: Vec<&String> = result
            .warnings
            .iter()
            .filter(|w| w.starts_with("Large gap"))
            .collect();
        assert_eq!(gap_warnings.len(), 1);
        assert!(gap_warnings[0].contains("60 consecutive numbers missing from 101 to 160"));
        // 63 of 300 missing is 21%.
        assert!(result.warnings.iter().any(|w| w.contains("High cancellation")));
    }

    #[test]
    fn test_thresholds_from_config() {
        let m = matcher("INV/[001]");
        let invoices = parse_all(&m, &["INV/001", "INV/005"]);
        let config = AnalysisConfig {
            high_cancellation_ratio: 0.9,
            large_gap_threshold: 3,
            ..AnalysisConfig::default()
        };
        let result = SeriesAnalyzer::new(&m)
            .with_config(config)
            .analyze_series("INV/{SEQ}", &invoices);

        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("from 2 to 4"));
    }

    #[test]
    fn test_single_invoice_series() {
        let m = matcher("INV/[001]");
        let invoices = parse_all(&m, &["INV/042"]);
        let result = SeriesAnalyzer::new(&m).analyze_series("INV/{SEQ}", &invoices);

        assert_eq!(result.start_number, 42);
        assert_eq!(result.end_number, 42);
        assert_eq!(result.total_in_range, 1);
        assert_eq!(result.cancelled_count, 0);
        assert_eq!(result.net_issued, 1);
    }

    #[test]
    fn test_full_u64_range_does_not_overflow() {
        let m = matcher("INV/[1]");
        let invoices = parse_all(&m, &["INV/0", "INV/18446744073709551615"]);
        let result = SeriesAnalyzer::new(&m)
            .with_config(AnalysisConfig {
                max_range_span: 0,
                ..AnalysisConfig::default()
            })
            .analyze_series("INV/{SEQ}", &invoices);

        assert_eq!(result.start_number, 0);
        assert_eq!(result.end_number, u64::MAX);
        assert_eq!(result.total_in_range, 2);
        assert_eq!(result.cancelled_count, 0);
        assert_eq!(result.net_issued, 2);
        assert!(result.missing_numbers.is_empty());
        assert!(result.warnings[0].starts_with("Sequence range 0 to 18446744073709551615"));
    }

    #[test]
    fn test_wide_range_is_not_enumerated() {
        let m = matcher("INV/[1]");
        let invoices = parse_all(&m, &["INV/1", "INV/2", "INV/5000000000"]);
        let result = SeriesAnalyzer::new(&m).analyze_series("INV/{SEQ}", &invoices);

        assert_eq!(result.end_invoice, "INV/5000000000");
        assert_eq!(result.total_in_range, 3);
        assert_eq!(result.cancelled_count, 0);
        assert!(result.missing_invoices.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("spans more than 1000000 numbers"));
    }

    #[test]
    fn test_range_limit_is_inclusive() {
        let m = matcher("INV/[001]");
        let invoices = parse_all(&m, &["INV/001", "INV/005"]);
        let config = AnalysisConfig {
            max_range_span: 5,
            high_cancellation_ratio: 1.0,
            ..AnalysisConfig::default()
        };
        let result = SeriesAnalyzer::new(&m)
            .with_config(config)
            .analyze_series("INV/{SEQ}", &invoices);

        assert_eq!(result.total_in_range, 5);
        assert_eq!(result.missing_numbers, vec![2, 3, 4]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_empty_series() {
        let m = matcher("INV/[001]");
        let result = SeriesAnalyzer::new(&m).analyze_series("INV/{SEQ}", &[]);

        assert_eq!(result.total_in_range, 0);
        assert_eq!(result.net_issued, 0);
        assert_eq!(result.warnings, vec!["No invoices in series".to_string()]);
    }

    #[test]
    fn test_analyze_all_sorts_and_counts() {
        let m = matcher("GST/*/[001]");
        let outcome = m.match_all("GST/B/001\nGST/A/002\nGST/A/001\nGST/A/001\nSAL/9\n");
        let result = SeriesAnalyzer::new(&m).analyze_outcome(outcome, "Credit Note");

        let keys: Vec<&str> = result
            .series_results
            .iter()
            .map(|s| s.series_key.as_str())
            .collect();
        assert_eq!(keys, vec!["GST/A/{SEQ}", "GST/B/{SEQ}"]);
        assert_eq!(result.total_matched, 4);
        assert_eq!(result.total_unmatched, 1);
        assert_eq!(result.total_input_lines, 5);
        assert_eq!(result.total_duplicates, 1);
        assert_eq!(result.pattern_used, "GST/*/[001]");
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_report_rows() {
        let m = matcher("INV/[001]");
        let outcome = m.match_all("INV/001\nINV/003\n");
        let result = SeriesAnalyzer::new(&m).analyze_outcome(outcome, "Invoices for outward supply");
        let rows = to_report_rows(&result);

        assert_eq!(
            rows,
            vec![Table13Row {
                nature_of_document: "Invoices for outward supply".to_string(),
                sr_no_from: "INV/001".to_string(),
                sr_no_to: "INV/003".to_string(),
                total_number: 3,
                cancelled: 1,
                net_issued: 2,
            }]
        );
    }

    #[test]
    fn test_consecutive_runs() {
        assert_eq!(consecutive_runs(&[]), Vec::<(u64, u64)>::new());
        assert_eq!(consecutive_runs(&[5]), vec![(5, 5)]);
        assert_eq!(
            consecutive_runs(&[1, 2, 3, 7, 9, 10]),
            vec![(1, 3), (7, 7), (9, 10)]
        );
    }
}
