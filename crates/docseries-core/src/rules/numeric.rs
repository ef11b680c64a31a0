//! Numeric-run heuristics shared by detection and continuity matching.
//!
//! Invoice numbers often carry more than one digit run, e.g.
//! `GST/24-25/0042`. Only one of them is the running serial; the others are
//! usually year codes. [`locate_sequence_run`] picks the serial.

use super::patterns::{DIGIT_RUN, FOUR_DIGIT_YEAR, RUN_SPLIT, YEAR_SPAN};

/// Kind of a run produced by [`split_runs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunKind {
    Text,
    Digits,
}

/// A maximal literal or digit run inside an invoice string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run<'a> {
    pub kind: RunKind,
    pub text: &'a str,
}

impl Run<'_> {
    pub fn is_digits(&self) -> bool {
        self.kind == RunKind::Digits
    }
}

/// The digit run chosen as the sequence number, with its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceRun<'a> {
    /// Everything before the run.
    pub prefix: &'a str,
    /// The digits as written (padding preserved).
    pub digits: &'a str,
    /// Everything after the run.
    pub suffix: &'a str,
    /// Parsed value of `digits`.
    pub value: u64,
}

/// Split into alternating literal and digit runs.
pub fn split_runs(s: &str) -> Vec<Run<'_>> {
    RUN_SPLIT
        .find_iter(s)
        .map(|m| {
            let text = m.as_str();
            let kind = if text.as_bytes()[0].is_ascii_digit() {
                RunKind::Digits
            } else {
                RunKind::Text
            };
            Run { kind, text }
        })
        .collect()
}

/// Whether a digit run looks like a year rather than a serial.
///
/// Values 1900-2100 are treated as four-digit years, two-character runs
/// 00-50 as short year codes (`24` in `24-25`).
pub fn is_year_like(digits: &str) -> bool {
    let Ok(value) = digits.parse::<u64>() else {
        return false;
    };
    if (1900..=2100).contains(&value) {
        return true;
    }
    digits.len() == 2 && value <= 50
}

/// Locate the sequence number in an invoice or series string.
///
/// Year-like runs are skipped and the last remaining run wins. When every
/// run looks like a year the last run is used. Returns `None` when the
/// string holds no digits that fit in a `u64`.
pub fn locate_sequence_run(s: &str) -> Option<SequenceRun<'_>> {
    let runs: Vec<_> = DIGIT_RUN
        .find_iter(s)
        .filter_map(|m| m.as_str().parse::<u64>().ok().map(|value| (m, value)))
        .collect();

    let (m, value) = runs
        .iter()
        .rev()
        .find(|(m, _)| !is_year_like(m.as_str()))
        .or_else(|| runs.last())
        .copied()?;

    Some(SequenceRun {
        prefix: &s[..m.start()],
        digits: m.as_str(),
        suffix: &s[m.end()..],
        value,
    })
}

/// Remove year-like substrings (`24-25`, `2024/25`, `2024`) and trim.
pub fn strip_year_tokens(s: &str) -> String {
    let without_spans = YEAR_SPAN.replace_all(s, "");
    FOUR_DIGIT_YEAR
        .replace_all(&without_spans, "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_runs() {
        let runs = split_runs("INV-001/A");
        let kinds: Vec<_> = runs.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RunKind::Text, RunKind::Digits, RunKind::Text]);
        assert_eq!(runs[1].text, "001");
    }

    #[test]
    fn test_year_like() {
        assert!(is_year_like("2024"));
        assert!(is_year_like("24"));
        assert!(is_year_like("00"));
        assert!(!is_year_like("51"));
        assert!(!is_year_like("0500"));
        assert!(!is_year_like("7"));
    }

    #[test]
    fn test_locate_skips_year_codes() {
        let run = locate_sequence_run("GST/24-25/0500").unwrap();
        assert_eq!(run.prefix, "GST/24-25/");
        assert_eq!(run.suffix, "");
        assert_eq!(run.value, 500);
        assert_eq!(run.digits, "0500");
    }

    #[test]
    fn test_locate_prefers_last_candidate() {
        let run = locate_sequence_run("B7/INV/0042/X").unwrap();
        assert_eq!(run.value, 42);
        assert_eq!(run.prefix, "B7/INV/");
        assert_eq!(run.suffix, "/X");
    }

    #[test]
    fn test_locate_falls_back_to_last_run() {
        // Both runs look like years, so the last one is taken.
        let run = locate_sequence_run("INV/2024/25").unwrap();
        assert_eq!(run.value, 25);
        assert_eq!(run.prefix, "INV/2024/");
    }

    #[test]
    fn test_locate_without_digits() {
        assert!(locate_sequence_run("NO-DIGITS").is_none());
    }

    #[test]
    fn test_strip_year_tokens() {
        assert_eq!(strip_year_tokens("GST/24-25/"), "GST//");
        assert_eq!(strip_year_tokens("GST/25-26/"), "GST//");
        assert_eq!(strip_year_tokens("INV2024-"), "INV-");
    }
}
