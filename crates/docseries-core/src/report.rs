//! Plain-text and TSV renderings of results.

use crate::models::continuity::{ContinuityResult, ContinuityStatus, ContinuitySummary};
use crate::models::series::{ProcessingResult, SeriesAnalysis, Table13Row, TABLE13_HEADERS};

const RULE_WIDTH: usize = 60;

/// Comma-separated list, truncated after `max_display` items.
pub fn format_missing_list<S: AsRef<str>>(items: &[S], max_display: usize) -> String {
    if items.is_empty() {
        return "None".to_string();
    }

    let shown: Vec<&str> = items.iter().take(max_display).map(|s| s.as_ref()).collect();
    let mut out = shown.join(", ");
    if items.len() > max_display {
        out.push_str(&format!("\n... and {} more", items.len() - max_display));
    }
    out
}

/// Multi-line summary of one series.
pub fn format_series_summary(analysis: &SeriesAnalysis, max_missing: usize) -> String {
    let mut lines = vec![
        format!("Series: {}", analysis.series_display_name),
        format!("  From: {}", analysis.start_invoice),
        format!("  To: {}", analysis.end_invoice),
        format!("  Total in Range: {}", format_indian_number(analysis.total_in_range)),
        format!("  Cancelled/Missing: {}", format_indian_number(analysis.cancelled_count)),
        format!("  Net Issued: {}", format_indian_number(analysis.net_issued)),
    ];

    if analysis.duplicate_count > 0 {
        lines.push(format!("  Duplicates Ignored: {}", analysis.duplicate_count));
    }
    if !analysis.missing_invoices.is_empty() {
        lines.push(format!(
            "  Missing Numbers: {}",
            format_missing_list(&analysis.missing_invoices, max_missing)
        ));
    }
    if !analysis.warnings.is_empty() {
        lines.push("  Warnings:".to_string());
        lines.extend(analysis.warnings.iter().map(|w| format!("    {}", w)));
    }

    lines.join("\n")
}

/// Full text report for a processing run.
pub fn format_result_summary(result: &ProcessingResult, max_missing: usize) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let thin = "-".repeat(RULE_WIDTH);

    let mut lines = vec![
        rule.clone(),
        "GSTR-1 TABLE 13 - DOCUMENT SUMMARY".to_string(),
        rule.clone(),
        String::new(),
        format!("Document Nature: {}", result.document_nature),
        format!("Pattern Used: {}", result.pattern_used),
        String::new(),
        format!("Total Lines Processed: {}", result.total_input_lines),
        format!("Matched: {}", result.total_matched),
        format!("Unmatched: {}", result.total_unmatched),
        format!("Invalid: {}", result.total_invalid),
        format!("Duplicates Found: {}", result.total_duplicates),
        String::new(),
        thin.clone(),
    ];

    for (i, series) in result.series_results.iter().enumerate() {
        lines.push(format!("\nSeries {}:", i + 1));
        lines.push(format_series_summary(series, max_missing));
    }

    if !result.warnings.is_empty() {
        lines.extend([String::new(), thin.clone(), "WARNINGS:".to_string(), String::new()]);
        lines.extend(result.warnings.iter().map(|w| format!("  {}", w)));
    }

    if !result.unmatched_invoices.is_empty() {
        lines.extend([String::new(), thin.clone(), "UNMATCHED INVOICES:".to_string(), String::new()]);
        lines.push(format!("  {}", format_missing_list(&result.unmatched_invoices, 10)));
    }

    if !result.invalid_invoices.is_empty() {
        lines.extend([String::new(), thin, "INVALID INVOICES:".to_string(), String::new()]);
        lines.extend(
            result
                .invalid_invoices
                .iter()
                .map(|(line, reason)| format!("  {} ({})", line, reason)),
        );
    }

    lines.push(String::new());
    lines.push(rule);
    lines.join("\n")
}

/// Table 13 rows as TSV with a header line, ready to paste.
pub fn format_table13_tsv(rows: &[Table13Row]) -> String {
    std::iter::once(TABLE13_HEADERS.join("\t"))
        .chain(rows.iter().map(Table13Row::to_tsv))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Indian digit grouping: `123456` becomes `1,23,456`.
pub fn format_indian_number(number: u64) -> String {
    let digits = number.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Text report of continuity results.
pub fn format_continuity_report(results: &[ContinuityResult]) -> String {
    let rule = "=".repeat(50);
    let summary = ContinuitySummary::from_results(results);

    let mut lines = vec![
        rule.clone(),
        "CONTINUITY CHECK REPORT".to_string(),
        rule,
        String::new(),
        format!(
            "Summary: {} OK, {} with gaps, {} overlapping, {} year rollover, {} new, {} discontinued",
            summary.continuous,
            summary.gaps,
            summary.overlaps,
            summary.year_rollovers,
            summary.new_series,
            summary.discontinued
        ),
        String::new(),
    ];

    for result in results {
        lines.push(format!("Series: {}", result.series_display_name));
        if let (Some(from), Some(to)) = (&result.current_from, &result.current_to) {
            lines.push(format!("  Current: {} -> {}", from, to));
        }
        if let Some(prev) = &result.previous_to {
            lines.push(format!("  Previous ended: {}", prev));
        }
        lines.push(format!("  Status: {}", result.message));
        if result.status == ContinuityStatus::Gap {
            lines.push(format!("  Gap: {} invoice(s) missing", result.gap_count));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
