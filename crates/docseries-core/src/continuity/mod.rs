//! Cross-period continuity checking.
//!
//! Each current series is paired with a previous-period series by the text
//! around its sequence number (prefix and suffix of the start invoice).
//! Only previous records from the same financial year as the current
//! period take part.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::fy::{fy_of, same_fy};
use crate::models::continuity::{ContinuityResult, ContinuityStatus, PreviousSeriesInfo};
use crate::models::series::{SeriesAnalysis, SEQ_PLACEHOLDER};
use crate::rules::{locate_sequence_run, strip_year_tokens};

type Signature<'a> = (&'a str, &'a str);

/// Check current series against the previous period.
///
/// Results follow `current` order, followed by one
/// [`ContinuityStatus::Discontinued`] entry per unpaired previous series.
pub fn check_continuity(
    previous: &[PreviousSeriesInfo],
    current: &[SeriesAnalysis],
    period: &str,
) -> Vec<ContinuityResult> {
    let latest = latest_by_signature(eligible_records(previous, period));
    let mut paired: HashSet<Signature> = HashSet::new();

    let mut results: Vec<ContinuityResult> = current
        .iter()
        .map(|series| check_series(series, &latest, &mut paired))
        .collect();

    results.extend(
        latest
            .iter()
            .filter(|(signature, _)| !paired.contains(*signature))
            .map(|(_, prev)| discontinued(prev)),
    );

    debug!(
        "Continuity: {} current series, {} discontinued",
        current.len(),
        results.len() - current.len()
    );
    results
}

/// Previous records in the same financial year as `period`.
///
/// Records without a tax period are kept. An invalid `period` keeps every
/// record.
fn eligible_records<'a>(previous: &'a [PreviousSeriesInfo], period: &str) -> Vec<&'a PreviousSeriesInfo> {
    if let Err(err) = fy_of(period) {
        warn!(
            "Invalid tax period {:?} ({}), comparing against all previous series",
            period, err
        );
        return previous.iter().collect();
    }

    previous
        .iter()
        .filter(|prev| match prev.tax_period.as_deref() {
            None => true,
            Some(tp) => {
                let same = same_fy(tp, period);
                if !same {
                    debug!(
                        "Skipping {} ({}): different financial year than {}",
                        prev.to_invoice, tp, period
                    );
                }
                same
            }
        })
        .collect()
}

/// One record per signature, the one with the highest end sequence.
fn latest_by_signature<'a>(
    records: Vec<&'a PreviousSeriesInfo>,
) -> IndexMap<Signature<'a>, &'a PreviousSeriesInfo> {
    let mut latest: IndexMap<Signature, &PreviousSeriesInfo> = IndexMap::new();
    for prev in records {
        if locate_sequence_run(&prev.to_invoice).is_none() {
            debug!("Skipping {:?}: no sequence number", prev.to_invoice);
            continue;
        }
        latest
            .entry(prev.signature())
            .and_modify(|kept| {
                if prev.end_sequence > kept.end_sequence {
                    *kept = prev;
                }
            })
            .or_insert(prev);
    }
    latest
}

fn check_series<'a>(
    series: &SeriesAnalysis,
    latest: &IndexMap<Signature<'a>, &'a PreviousSeriesInfo>,
    paired: &mut HashSet<Signature<'a>>,
) -> ContinuityResult {
    let mut result = ContinuityResult {
        series_key: series.series_key.clone(),
        series_display_name: series.series_display_name.clone(),
        current_from: Some(series.start_invoice.clone()),
        current_to: Some(series.end_invoice.clone()),
        previous_to: None,
        status: ContinuityStatus::New,
        gap_count: 0,
        missing_range: None,
        message: "New series (no matching series in previous period)".to_string(),
    };

    let Some(start) = locate_sequence_run(&series.start_invoice) else {
        return result;
    };

    let exact = latest
        .iter()
        .find(|((prefix, suffix), _)| *prefix == start.prefix && *suffix == start.suffix);
    if let Some((&signature, prev)) = exact {
        paired.insert(signature);
        result.previous_to = Some(prev.to_invoice.clone());
        compare_sequences(&mut result, prev, &series.start_invoice, start.value);
        return result;
    }

    let residue = strip_year_tokens(start.prefix);
    let rollover = latest.iter().find(|(signature, _)| {
        let (prefix, suffix) = **signature;
        !paired.contains(*signature)
            && suffix == start.suffix
            && strip_year_tokens(prefix) == residue
    });
    if let Some((&signature, prev)) = rollover {
        paired.insert(signature);
        result.previous_to = Some(prev.to_invoice.clone());
        result.status = ContinuityStatus::YearRollover;
        result.message = format!(
            "New series year assumed: previous {}, current {}. \
             Continuity across the financial-year change is not verified.",
            prev.to_invoice, series.start_invoice
        );
    }

    result
}

fn compare_sequences(
    result: &mut ContinuityResult,
    prev: &PreviousSeriesInfo,
    start_invoice: &str,
    start: u64,
) {
    let end = prev.end_sequence;
    if start <= end {
        result.status = ContinuityStatus::Overlap;
        result.message = format!(
            "Overlap: previous ended at {} (seq {}), current starts at {} (seq {})",
            prev.to_invoice, end, start_invoice, start
        );
    } else if start - end == 1 {
        result.status = ContinuityStatus::Continuous;
        result.message = format!(
            "Continuity OK: previous ended at {}, current starts at {}",
            prev.to_invoice, start_invoice
        );
    } else {
        let gap = start - end - 1;
        result.status = ContinuityStatus::Gap;
        result.gap_count = gap;
        result.missing_range = Some((end + 1, start - 1));
        result.message = format!(
            "Gap detected: previous ended at {} (seq {}), current starts at {} (seq {}). \
             Missing {} invoice(s): {} to {}",
            prev.to_invoice,
            end,
            start_invoice,
            start,
            gap,
            end + 1,
            start - 1
        );
    }
}

fn discontinued(prev: &PreviousSeriesInfo) -> ContinuityResult {
    let display = format!("{}<seq>{}", prev.prefix, prev.suffix);
    ContinuityResult {
        series_key: format!("{}{}{}", prev.prefix, SEQ_PLACEHOLDER, prev.suffix),
        series_display_name: display,
        current_from: None,
        current_to: None,
        previous_to: Some(prev.to_invoice.clone()),
        status: ContinuityStatus::Discontinued,
        gap_count: 0,
        missing_range: None,
        message: format!(
            "Discontinued: previous series ended at {} has no invoices this period",
            prev.to_invoice
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prev(to: &str, period: Option<&str>) -> PreviousSeriesInfo {
        PreviousSeriesInfo::new(
            "Invoices for outward supply",
            "",
            to,
            0,
            0,
            period.map(str::to_string),
        )
    }

    fn current(key: &str, from: &str, to: &str) -> SeriesAnalysis {
        SeriesAnalysis {
            start_invoice: from.to_string(),
            end_invoice: to.to_string(),
            ..SeriesAnalysis::empty(key, key.replace("{SEQ}", "<seq>"))
        }
    }

    #[test]
    fn test_continuous() {
        let results = check_continuity(
            &[prev("GST/24-25/0500", Some("052024"))],
            &[current("GST/24-25/{SEQ}", "GST/24-25/0501", "GST/24-25/0620")],
            "062024",
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ContinuityStatus::Continuous);
        assert_eq!(results[0].gap_count, 0);
        assert_eq!(results[0].previous_to.as_deref(), Some("GST/24-25/0500"));
        assert!(results[0].is_continuous());
    }

    #[test]
    fn test_gap() {
        let results = check_continuity(
            &[prev("INV/100", None)],
            &[current("INV/{SEQ}", "INV/105", "INV/120")],
            "062024",
        );
        assert_eq!(results[0].status, ContinuityStatus::Gap);
        assert_eq!(results[0].gap_count, 4);
        assert_eq!(results[0].missing_range, Some((101, 104)));
        assert!(results[0].message.contains("101 to 104"));
    }

    #[test]
    fn test_overlap() {
        let results = check_continuity(
            &[prev("INV/100", None)],
            &[current("INV/{SEQ}", "INV/099", "INV/120")],
            "062024",
        );
        assert_eq!(results[0].status, ContinuityStatus::Overlap);
        assert_eq!(results[0].gap_count, 0);
        assert!(!results[0].is_continuous());
    }

    #[test]
    fn test_new_and_discontinued() {
        let results = check_continuity(
            &[prev("SAL/77", None)],
            &[current("INV/{SEQ}", "INV/001", "INV/010")],
            "062024",
        );
        let statuses: Vec<_> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![ContinuityStatus::New, ContinuityStatus::Discontinued]
        );
        assert_eq!(results[1].series_display_name, "SAL/<seq>");
        assert_eq!(results[1].current_from, None);
    }

    #[test]
    fn test_other_financial_year_is_ignored() {
        let results = check_continuity(
            &[prev("INV/100", Some("032024"))],
            &[current("INV/{SEQ}", "INV/101", "INV/110")],
            "042024",
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ContinuityStatus::New);
    }

    #[test]
    fn test_invalid_period_keeps_all_records() {
        let results = check_continuity(
            &[prev("INV/100", Some("032020"))],
            &[current("INV/{SEQ}", "INV/101", "INV/110")],
            "13-2024",
        );
        assert_eq!(results[0].status, ContinuityStatus::Continuous);
    }

    #[test]
    fn test_year_rollover() {
        let results = check_continuity(
            &[prev("GST/23-24/0950", None)],
            &[current("GST/24-25/{SEQ}", "GST/24-25/0001", "GST/24-25/0040")],
            "042024",
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ContinuityStatus::YearRollover);
        assert!(results[0].is_continuous());
        assert!(results[0].message.contains("not verified"));
    }

    #[test]
    fn test_paired_record_is_not_claimed_again_by_rollover() {
        let results = check_continuity(
            &[prev("GST/24-25/0100", None)],
            &[
                current("GST/24-25/{SEQ}", "GST/24-25/0101", "GST/24-25/0150"),
                current("GST/25-26/{SEQ}", "GST/25-26/0001", "GST/25-26/0009"),
            ],
            "062024",
        );
        let statuses: Vec<_> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![ContinuityStatus::Continuous, ContinuityStatus::New]
        );
        assert_eq!(results[1].previous_to, None);
    }

    #[test]
    fn test_latest_record_wins() {
        let results = check_continuity(
            &[prev("INV/050", None), prev("INV/100", None)],
            &[current("INV/{SEQ}", "INV/101", "INV/110")],
            "062024",
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ContinuityStatus::Continuous);
        assert_eq!(results[0].previous_to.as_deref(), Some("INV/100"));
    }

    #[test]
    fn test_start_without_digits_is_new() {
        let results = check_continuity(
            &[prev("INV/100", None)],
            &[current("X", "ABC", "ABC")],
            "062024",
        );
        assert_eq!(results[0].status, ContinuityStatus::New);
        assert_eq!(results[1].status, ContinuityStatus::Discontinued);
    }
}
