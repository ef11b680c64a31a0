//! Applies a compiled pattern to invoice lines.

use tracing::{debug, info};

use crate::models::series::{InvoiceFailure, ParsedInvoice, SEQ_PLACEHOLDER, SeriesGroups};
use crate::pattern::PatternSpec;

/// Matching options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatcherOptions {
    /// Treat `01` and `001` alike: observed zero padding never widens the
    /// rendered width beyond the declared one.
    pub ignore_leading_zeros: bool,
}

/// Result of matching a whole invoice list.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Valid invoices by series key, first-seen order.
    pub groups: SeriesGroups,

    /// Lines the pattern rejected.
    pub unmatched: Vec<String>,

    /// Other unusable lines with their reason.
    pub invalid: Vec<(String, String)>,
}

impl MatchOutcome {
    pub fn matched_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Classifies invoice strings into series.
#[derive(Debug, Clone)]
pub struct SeriesMatcher {
    spec: PatternSpec,
    options: MatcherOptions,
}

impl SeriesMatcher {
    /// Create a matcher for a compiled pattern.
    pub fn new(spec: PatternSpec) -> Self {
        Self {
            spec,
            options: MatcherOptions::default(),
        }
    }

    /// Set matching options.
    pub fn with_options(mut self, options: MatcherOptions) -> Self {
        self.options = options;
        self
    }

    pub fn spec(&self) -> &PatternSpec {
        &self.spec
    }

    pub fn options(&self) -> MatcherOptions {
        self.options
    }

    /// Match a single line.
    pub fn match_line(&self, line: &str) -> ParsedInvoice {
        let clean = line.trim();
        if clean.is_empty() {
            return ParsedInvoice::failed(line, InvoiceFailure::Empty);
        }

        let Some(caps) = self.spec.captures(clean) else {
            return ParsedInvoice::failed(clean, InvoiceFailure::NoMatch);
        };

        let Ok(sequence_number) = caps.sequence.parse::<u64>() else {
            return ParsedInvoice::failed(
                clean,
                InvoiceFailure::InvalidSequence(caps.sequence.to_string()),
            );
        };

        let wildcard_values: Vec<String> = caps.wildcards.iter().map(|w| w.to_string()).collect();
        let series_key = self.spec.series_key(&wildcard_values);

        ParsedInvoice {
            raw: clean.to_string(),
            sequence_number: Some(sequence_number),
            sequence_str: Some(caps.sequence.to_string()),
            wildcard_values,
            series_key,
            failure: None,
        }
    }

    /// Match newline-separated text, grouping valid lines by series.
    ///
    /// CR, LF and CRLF line endings are accepted; blank lines are skipped.
    pub fn match_all(&self, text: &str) -> MatchOutcome {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        let mut outcome = MatchOutcome::default();

        for line in normalized.split('\n') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parsed = self.match_line(line);
            match &parsed.failure {
                None => outcome
                    .groups
                    .entry(parsed.series_key.clone())
                    .or_default()
                    .push(parsed),
                Some(InvoiceFailure::NoMatch) => outcome.unmatched.push(line.to_string()),
                Some(failure) => {
                    debug!("Invalid invoice {:?}: {}", line, failure);
                    outcome.invalid.push((line.to_string(), failure.to_string()));
                }
            }
        }

        info!(
            "Matched {} invoice(s) into {} series, {} unmatched, {} invalid",
            outcome.matched_count(),
            outcome.groups.len(),
            outcome.unmatched.len(),
            outcome.invalid.len()
        );

        outcome
    }

    /// Rebuild a full invoice number from its components.
    pub fn reconstruct<S: AsRef<str>>(
        &self,
        sequence_number: u64,
        wildcard_values: &[S],
        padding: Option<usize>,
    ) -> String {
        let width = padding.unwrap_or(self.spec.sequence_width());
        let sequence = format!("{:0width$}", sequence_number, width = width);
        self.spec.assemble(wildcard_values, &sequence)
    }

    /// Readable series name: `GST/A/{SEQ}` becomes `GST/A/<seq>`.
    pub fn display_name(&self, series_key: &str) -> String {
        series_key.replace(SEQ_PLACEHOLDER, "<seq>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::compile_pattern;
    use pretty_assertions::assert_eq;

    fn matcher(pattern: &str) -> SeriesMatcher {
        SeriesMatcher::new(compile_pattern(pattern).unwrap())
    }

    #[test]
    fn test_match_simple_invoice() {
        let m = matcher("GST/24-25/[0001]");
        let parsed = m.match_line("  GST/24-25/0042 ");
        assert!(parsed.is_valid());
        assert_eq!(parsed.raw, "GST/24-25/0042");
        assert_eq!(parsed.sequence_number, Some(42));
        assert_eq!(parsed.sequence_str.as_deref(), Some("0042"));
        assert_eq!(parsed.series_key, "GST/24-25/{SEQ}");
    }

    #[test]
    fn test_match_with_wildcard() {
        let m = matcher("GST/*/[001]");
        let parsed = m.match_line("GST/MUM/007");
        assert_eq!(parsed.wildcard_values, vec!["MUM".to_string()]);
        assert_eq!(parsed.series_key, "GST/MUM/{SEQ}");
    }

    #[test]
    fn test_empty_and_unmatched() {
        let m = matcher("GST/[001]");
        assert_eq!(m.match_line("   ").failure, Some(InvoiceFailure::Empty));
        let parsed = m.match_line("SAL/001");
        assert!(parsed.is_unmatched());
    }

    #[test]
    fn test_overflowing_sequence_is_invalid() {
        let m = matcher("GST/[001]");
        let parsed = m.match_line("GST/99999999999999999999999");
        assert_eq!(
            parsed.failure,
            Some(InvoiceFailure::InvalidSequence(
                "99999999999999999999999".to_string()
            ))
        );
    }

    #[test]
    fn test_match_all_groups_and_collects() {
        let m = matcher("GST/*/[001]");
        let text = "GST/B/001\r\nGST/A/001\r\n\r\nGST/A/002\rSAL/001\nGST/A/99999999999999999999999\n";
        let outcome = m.match_all(text);

        let keys: Vec<&String> = outcome.groups.keys().collect();
        assert_eq!(keys, vec!["GST/B/{SEQ}", "GST/A/{SEQ}"]);
        assert_eq!(outcome.groups["GST/A/{SEQ}"].len(), 2);
        assert_eq!(outcome.unmatched, vec!["SAL/001".to_string()]);
        assert_eq!(outcome.invalid.len(), 1);
        assert_eq!(outcome.matched_count(), 3);
    }

    #[test]
    fn test_reconstruct() {
        let m = matcher("*/INV/[00001]/*");
        assert_eq!(m.reconstruct(42, &["MUM", "Q1"], None), "MUM/INV/00042/Q1");
        assert_eq!(m.reconstruct(42, &["MUM", "Q1"], Some(2)), "MUM/INV/42/Q1");
        assert_eq!(m.reconstruct(123456, &["MUM", "Q1"], None), "MUM/INV/123456/Q1");
    }

    #[test]
    fn test_round_trip() {
        let m = matcher("*-GST/*/[0001]");
        for (n, wc) in [(1u64, ["A", "X"]), (77, ["BR-2", "Y/Z"]), (12345, ["q", "r"])] {
            let rendered = m.reconstruct(n, &wc, None);
            let parsed = m.match_line(&rendered);
            assert_eq!(parsed.sequence_number, Some(n), "{}", rendered);
            assert_eq!(parsed.wildcard_values, wc.to_vec(), "{}", rendered);
        }
    }

    #[test]
    fn test_display_name() {
        let m = matcher("GST/*/[001]");
        assert_eq!(m.display_name("GST/A/{SEQ}"), "GST/A/<seq>");
    }
}
