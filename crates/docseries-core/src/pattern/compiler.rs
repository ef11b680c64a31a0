//! Compiles pattern notation into a [`PatternSpec`].
//!
//! Notation:
//! - `[NNN]` sequence marker, exactly one. The digit count sets the default
//!   zero padding (`[001]` = 3 digits).
//! - `*` wildcard, any number. Matches one or more characters and
//!   distinguishes sub-series (branch codes and the like).
//! - everything else is fixed text.
//!
//! `GST/24-25/[0001]`, `GST/*/[001]`, `*/INV/[00001]/*`, `[001]-SAL`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PatternError;
use crate::models::series::SEQ_PLACEHOLDER;
use crate::rules::patterns::{BRACKET_PAIR, SEQUENCE_MARKER};

/// One structural element of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PatternPart {
    /// Literal text that must match exactly.
    Fixed(String),
    /// Variable text identifying a sub-series.
    Wildcard,
    /// The running serial; holds the declared padding width.
    Sequence(usize),
}

/// How strictly bracket characters are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketPolicy {
    /// Only the `[digits]` marker count is checked; other brackets are
    /// fixed text.
    #[default]
    Lenient,
    /// Brackets must be balanced and only the sequence marker may use them.
    Strict,
}

/// Options for [`PatternCompiler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub bracket_policy: BracketPolicy,
}

/// Values captured from one invoice string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternCaptures<'t> {
    /// Sequence digits as written.
    pub sequence: &'t str,
    /// Wildcard values in declared order.
    pub wildcards: Vec<&'t str>,
}

/// A compiled, immutable invoice pattern.
#[derive(Debug, Clone)]
pub struct PatternSpec {
    raw: String,
    parts: Vec<PatternPart>,
    sequence_width: usize,
    wildcard_count: usize,
    matcher: Regex,
    /// Capture group index for each wildcard, in declared order.
    wildcard_groups: Vec<usize>,
    sequence_group: usize,
}

impl PatternSpec {
    /// The pattern text as compiled (trimmed).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn parts(&self) -> &[PatternPart] {
        &self.parts
    }

    /// Declared padding width of the sequence marker.
    pub fn sequence_width(&self) -> usize {
        self.sequence_width
    }

    pub fn wildcard_count(&self) -> usize {
        self.wildcard_count
    }

    /// The anchored regular expression built from the parts.
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    /// Match a whole (already trimmed) invoice string.
    pub fn captures<'t>(&self, text: &'t str) -> Option<PatternCaptures<'t>> {
        let caps = self.matcher.captures(text)?;
        let sequence = caps.get(self.sequence_group)?.as_str();
        let wildcards = self
            .wildcard_groups
            .iter()
            .map(|&group| caps.get(group).map_or("", |m| m.as_str()))
            .collect();
        Some(PatternCaptures {
            sequence,
            wildcards,
        })
    }

    /// Emit the parts with wildcard values and a rendered sequence.
    ///
    /// Missing wildcard values render as empty text.
    pub fn assemble<S: AsRef<str>>(&self, wildcards: &[S], sequence: &str) -> String {
        let mut out = String::with_capacity(self.raw.len() + sequence.len());
        let mut wildcard_index = 0;
        for part in &self.parts {
            match part {
                PatternPart::Fixed(text) => out.push_str(text),
                PatternPart::Wildcard => {
                    if let Some(value) = wildcards.get(wildcard_index) {
                        out.push_str(value.as_ref());
                    }
                    wildcard_index += 1;
                }
                PatternPart::Sequence(_) => out.push_str(sequence),
            }
        }
        out
    }

    /// Series key: fixed text and wildcard values with `{SEQ}` in place of
    /// the sequence.
    pub fn series_key<S: AsRef<str>>(&self, wildcards: &[S]) -> String {
        self.assemble(wildcards, SEQ_PLACEHOLDER)
    }

    /// Human-readable description of the pattern structure.
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .parts
            .iter()
            .map(|part| match part {
                PatternPart::Fixed(text) => format!("\"{}\"", text),
                PatternPart::Wildcard => "[variable part - series identifier]".to_string(),
                PatternPart::Sequence(width) => format!("[{}-digit sequence number]", width),
            })
            .collect();

        let mut desc = parts.join(" + ");
        if self.wildcard_count > 0 {
            desc.push_str(&format!(
                "\n\nThis pattern has {} wildcard(s), so invoices will be grouped into \
                 separate series based on the variable part(s).",
                self.wildcard_count
            ));
        }
        desc
    }
}

impl PartialEq for PatternSpec {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.parts == other.parts
    }
}

impl Eq for PatternSpec {}

/// Pattern compiler.
#[derive(Debug, Clone, Default)]
pub struct PatternCompiler {
    options: CompileOptions,
}

impl PatternCompiler {
    /// Create a compiler with lenient bracket handling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compiler from explicit options.
    pub fn with_options(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Set the bracket policy.
    pub fn with_bracket_policy(mut self, policy: BracketPolicy) -> Self {
        self.options.bracket_policy = policy;
        self
    }

    /// Compile pattern text.
    pub fn compile(&self, pattern: &str) -> Result<PatternSpec, PatternError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let markers: Vec<_> = SEQUENCE_MARKER.captures_iter(pattern).collect();
        let seq = match markers.as_slice() {
            [] => {
                return Err(match BRACKET_PAIR.captures(pattern) {
                    Some(caps) => PatternError::NonNumericSequence(caps[1].to_string()),
                    None => PatternError::MissingSequence,
                });
            }
            [single] => single,
            many => return Err(PatternError::MultipleSequences(many.len())),
        };

        if self.options.bracket_policy == BracketPolicy::Strict {
            let open = pattern.matches('[').count();
            let close = pattern.matches(']').count();
            if open != close {
                return Err(PatternError::UnbalancedBrackets);
            }
            if open > 1 {
                return Err(PatternError::ExtraBrackets);
            }
        }

        let (Some(whole), Some(digits)) = (seq.get(0), seq.get(1)) else {
            return Err(PatternError::MissingSequence);
        };
        let sequence_width = digits.as_str().len();

        let parts = build_parts(pattern, whole.start(), whole.end(), sequence_width);
        let (regex_src, wildcard_groups, sequence_group) = build_regex(&parts);
        let matcher = Regex::new(&regex_src).map_err(|e| PatternError::Regex(e.to_string()))?;

        debug!(
            "Compiled pattern {:?}: {} part(s), {} wildcard(s), width {}",
            pattern,
            parts.len(),
            wildcard_groups.len(),
            sequence_width
        );

        Ok(PatternSpec {
            raw: pattern.to_string(),
            wildcard_count: wildcard_groups.len(),
            parts,
            sequence_width,
            matcher,
            wildcard_groups,
            sequence_group,
        })
    }
}

/// Compile with default options.
pub fn compile_pattern(pattern: &str) -> Result<PatternSpec, PatternError> {
    PatternCompiler::new().compile(pattern)
}

/// Check pattern text without keeping the compiled spec.
pub fn validate_pattern(pattern: &str, options: CompileOptions) -> Result<(), PatternError> {
    PatternCompiler::with_options(options)
        .compile(pattern)
        .map(|_| ())
}

enum Marker {
    Sequence(usize),
    Wildcard,
}

fn build_parts(pattern: &str, seq_start: usize, seq_end: usize, width: usize) -> Vec<PatternPart> {
    let mut markers: Vec<(usize, usize, Marker)> = pattern
        .match_indices('*')
        .map(|(pos, s)| (pos, pos + s.len(), Marker::Wildcard))
        .collect();
    markers.push((seq_start, seq_end, Marker::Sequence(width)));
    markers.sort_by_key(|(start, _, _)| *start);

    let mut parts = Vec::with_capacity(markers.len() * 2 + 1);
    let mut pos = 0;
    for (start, end, marker) in markers {
        if start > pos {
            parts.push(PatternPart::Fixed(pattern[pos..start].to_string()));
        }
        parts.push(match marker {
            Marker::Sequence(width) => PatternPart::Sequence(width),
            Marker::Wildcard => PatternPart::Wildcard,
        });
        pos = end;
    }
    if pos < pattern.len() {
        parts.push(PatternPart::Fixed(pattern[pos..].to_string()));
    }
    parts
}

/// Build the anchored regex and record which capture group holds what.
fn build_regex(parts: &[PatternPart]) -> (String, Vec<usize>, usize) {
    let mut src = String::from("^");
    let mut wildcard_groups = Vec::new();
    let mut sequence_group = 0;
    let mut group = 0;

    for part in parts {
        match part {
            PatternPart::Fixed(text) => src.push_str(&regex::escape(text)),
            PatternPart::Wildcard => {
                group += 1;
                wildcard_groups.push(group);
                src.push_str("(.+?)");
            }
            PatternPart::Sequence(_) => {
                group += 1;
                sequence_group = group;
                src.push_str("([0-9]+)");
            }
        }
    }
    src.push('$');
    (src, wildcard_groups, sequence_group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_pattern() {
        let spec = compile_pattern("GST/24-25/[0001]").unwrap();
        assert_eq!(
            spec.parts(),
            &[
                PatternPart::Fixed("GST/24-25/".to_string()),
                PatternPart::Sequence(4),
            ]
        );
        assert_eq!(spec.sequence_width(), 4);
        assert_eq!(spec.wildcard_count(), 0);
        assert_eq!(spec.raw(), "GST/24-25/[0001]");
    }

    #[test]
    fn test_wildcards_in_declared_order() {
        let spec = compile_pattern("*/INV/[00001]/*").unwrap();
        assert_eq!(
            spec.parts(),
            &[
                PatternPart::Wildcard,
                PatternPart::Fixed("/INV/".to_string()),
                PatternPart::Sequence(5),
                PatternPart::Fixed("/".to_string()),
                PatternPart::Wildcard,
            ]
        );
        let caps = spec.captures("MUM/INV/00042/Q1").unwrap();
        assert_eq!(caps.sequence, "00042");
        assert_eq!(caps.wildcards, vec!["MUM", "Q1"]);
    }

    #[test]
    fn test_sequence_first() {
        let spec = compile_pattern("[001]-SAL").unwrap();
        assert_eq!(spec.parts()[0], PatternPart::Sequence(3));
        assert!(spec.captures("042-SAL").is_some());
        assert!(spec.captures("042-SALE").is_none());
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let spec = compile_pattern("INV.(A)+[01]").unwrap();
        assert!(spec.captures("INV.(A)+07").is_some());
        assert!(spec.captures("INVx(A)+07").is_none());
    }

    #[test]
    fn test_sequence_width_is_not_a_length_limit() {
        let spec = compile_pattern("GST/[001]").unwrap();
        assert_eq!(spec.captures("GST/12345").unwrap().sequence, "12345");
        assert_eq!(spec.captures("GST/7").unwrap().sequence, "7");
    }

    #[test]
    fn test_pattern_is_trimmed() {
        let spec = compile_pattern("  GST/[001]  ").unwrap();
        assert_eq!(spec.raw(), "GST/[001]");
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(compile_pattern("").unwrap_err(), PatternError::Empty);
        assert_eq!(compile_pattern("   ").unwrap_err(), PatternError::Empty);
    }

    #[test]
    fn test_rejects_missing_sequence() {
        assert_eq!(
            compile_pattern("GST/*/001").unwrap_err(),
            PatternError::MissingSequence
        );
    }

    #[test]
    fn test_rejects_multiple_sequences() {
        assert_eq!(
            compile_pattern("GST/[01]/[001]").unwrap_err(),
            PatternError::MultipleSequences(2)
        );
    }

    #[test]
    fn test_rejects_non_numeric_marker() {
        assert_eq!(
            compile_pattern("GST/[ab]").unwrap_err(),
            PatternError::NonNumericSequence("ab".to_string())
        );
        assert_eq!(
            compile_pattern("GST/[]").unwrap_err(),
            PatternError::NonNumericSequence(String::new())
        );
    }

    #[test]
    fn test_lenient_allows_stray_brackets() {
        let spec = compile_pattern("GST[X/[001]").unwrap();
        assert_eq!(spec.parts()[0], PatternPart::Fixed("GST[X/".to_string()));
        assert!(spec.captures("GST[X/005").is_some());
    }

    #[test]
    fn test_strict_rejects_stray_brackets() {
        let strict = PatternCompiler::new().with_bracket_policy(BracketPolicy::Strict);
        assert_eq!(
            strict.compile("GST[X/[001]").unwrap_err(),
            PatternError::UnbalancedBrackets
        );
        assert_eq!(
            strict.compile("[A]/[001]").unwrap_err(),
            PatternError::ExtraBrackets
        );
        assert!(strict.compile("GST/*/[001]").is_ok());
    }

    #[test]
    fn test_series_key_and_assemble() {
        let spec = compile_pattern("GST/*/[001]").unwrap();
        assert_eq!(spec.series_key(&["A"]), "GST/A/{SEQ}");
        assert_eq!(spec.assemble(&["B"], "007"), "GST/B/007");
    }

    #[test]
    fn test_describe() {
        let spec = compile_pattern("GST/*/[001]").unwrap();
        let desc = spec.describe();
        assert!(desc.starts_with(
            "\"GST/\" + [variable part - series identifier] + \"/\" + [3-digit sequence number]"
        ));
        assert!(desc.contains("1 wildcard(s)"));
    }

    #[test]
    fn test_validate_pattern() {
        assert!(validate_pattern("GST/[001]", CompileOptions::default()).is_ok());
        assert!(validate_pattern("GST", CompileOptions::default()).is_err());
    }
}
