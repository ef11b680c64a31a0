//! Infers pattern notation from sample invoice numbers.
//!
//! Three strategies are tried in order of confidence:
//!
//! 1. **Single series**: every sample has the same literal/digit runs and
//!    exactly one digit run varies. That run becomes the sequence marker.
//! 2. **Positional scan**: samples of different shapes are compared column
//!    by column. Differing text becomes a wildcard, the first differing
//!    number becomes the sequence marker.
//! 3. **Bucketed**: samples are grouped by structural signature and the
//!    largest group is analyzed on its own.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DetectError;
use crate::rules::{split_runs, Run};

use super::compiler::PatternCompiler;

/// Strategy that produced a [`Detection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    SingleSeries,
    Bucketed,
    PositionalScan,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleSeries => "single series",
            Self::Bucketed => "dominant structure",
            Self::PositionalScan => "positional scan",
        }
    }
}

/// A detected pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Pattern notation, ready for [`PatternCompiler`].
    pub pattern: String,
    /// Heuristic confidence, 0-100.
    pub confidence: u8,
    pub method: DetectionMethod,
    /// Unique samples the result is based on.
    pub samples: usize,
}

impl Detection {
    pub fn message(&self) -> String {
        format!("Detected pattern with {}% confidence", self.confidence)
    }
}

/// Pattern detector.
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    max_sample: usize,
}

impl PatternDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use at most `max_sample` unique samples (0 = all).
    pub fn with_max_sample(mut self, max_sample: usize) -> Self {
        self.max_sample = max_sample;
        self
    }

    /// Detect a pattern from sample invoice numbers.
    pub fn detect<S: AsRef<str>>(&self, samples: &[S]) -> Result<Detection, DetectError> {
        let unique = self.prepare(samples);
        if unique.len() < 2 {
            return Err(DetectError::TooFewSamples);
        }

        let detection = match single_series(&unique)? {
            Some(detection) => detection,
            None => multi_series(&unique)?,
        };

        // Sample text may contain marker characters of its own.
        if PatternCompiler::new().compile(&detection.pattern).is_err() {
            debug!("Detected pattern {:?} does not compile", detection.pattern);
            return Err(DetectError::NoSequence);
        }

        debug!(
            "Detected {:?} via {} from {} sample(s)",
            detection.pattern,
            detection.method.as_str(),
            detection.samples
        );
        Ok(detection)
    }

    fn prepare<'s, S: AsRef<str>>(&self, samples: &'s [S]) -> Vec<&'s str> {
        let mut seen = HashSet::new();
        let mut unique: Vec<&str> = samples
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty() && seen.insert(*s))
            .collect();
        if self.max_sample > 0 {
            unique.truncate(self.max_sample);
        }
        unique
    }
}

/// Detect with default settings.
pub fn detect_pattern<S: AsRef<str>>(samples: &[S]) -> Result<Detection, DetectError> {
    PatternDetector::new().detect(samples)
}

/// `Ok(None)` when the samples do not share one structure.
fn single_series(samples: &[&str]) -> Result<Option<Detection>, DetectError> {
    let parts: Vec<Vec<Run>> = samples.iter().map(|s| split_runs(s)).collect();
    let first = &parts[0];

    let mut varying = None;
    for (idx, run) in first.iter().enumerate().filter(|(_, r)| r.is_digits()) {
        let varies = parts
            .iter()
            .any(|p| p.get(idx).is_some_and(|r| r.is_digits() && r.text != run.text));
        if varies {
            if varying.is_some() {
                return Err(DetectError::Ambiguous);
            }
            varying = Some(idx);
        }
    }
    let Some(seq_idx) = varying else {
        return Err(DetectError::NoSequence);
    };

    let consistent = parts.iter().all(|p| {
        p.len() == first.len()
            && p[seq_idx].is_digits()
            && p.iter()
                .zip(first)
                .enumerate()
                .all(|(i, (a, b))| i == seq_idx || a == b)
    });
    if !consistent {
        return Ok(None);
    }

    let values: Vec<&str> = parts.iter().map(|p| p[seq_idx].text).collect();
    let pattern = first
        .iter()
        .enumerate()
        .map(|(i, run)| {
            if i == seq_idx {
                sequence_marker(&values)
            } else {
                run.text.to_string()
            }
        })
        .collect();

    Ok(Some(Detection {
        pattern,
        confidence: confidence(50, 5, samples.len(), 95),
        method: DetectionMethod::SingleSeries,
        samples: samples.len(),
    }))
}

fn multi_series(samples: &[&str]) -> Result<Detection, DetectError> {
    let mut buckets: IndexMap<String, Vec<&str>> = IndexMap::new();
    for &sample in samples {
        buckets.entry(signature(sample)).or_default().push(sample);
    }

    if buckets.len() > 1 {
        if let Some(detection) = positional_scan(samples) {
            return Ok(detection);
        }
        debug!("Positional scan failed across {} structure(s)", buckets.len());
    }

    // First bucket wins ties.
    let dominant = buckets
        .values()
        .rev()
        .max_by_key(|group| group.len())
        .ok_or(DetectError::NoSequence)?;
    bucket_analysis(dominant)
}

/// `T:<text>` / `N:<len>` fingerprint of the run structure.
fn signature(sample: &str) -> String {
    split_runs(sample)
        .iter()
        .map(|run| {
            if run.is_digits() {
                format!("N:{}", run.text.len())
            } else {
                format!("T:{}", run.text)
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn bucket_analysis(group: &[&str]) -> Result<Detection, DetectError> {
    if group.len() < 2 {
        return Err(DetectError::NoSequence);
    }
    let parts: Vec<Vec<Run>> = group.iter().map(|s| split_runs(s)).collect();
    let first = &parts[0];

    let mut varying = HashSet::new();
    let mut seq_position = None;
    for pos in 0..first.len() {
        let values: Vec<&str> = parts.iter().map(|p| p[pos].text).collect();
        if values.iter().all(|v| *v == values[0]) {
            continue;
        }
        varying.insert(pos);

        if first[pos].is_digits() {
            let numbers: Option<HashSet<u64>> = values.iter().map(|v| v.parse().ok()).collect();
            if numbers.is_some_and(|n| n.len() == values.len()) {
                seq_position = Some(pos);
            }
        }
    }

    let seq_position = seq_position.ok_or(DetectError::NoSequence)?;
    let values: Vec<&str> = parts.iter().map(|p| p[seq_position].text).collect();

    let pattern = first
        .iter()
        .enumerate()
        .map(|(i, run)| {
            if i == seq_position {
                sequence_marker(&values)
            } else if varying.contains(&i) {
                "*".to_string()
            } else {
                run.text.to_string()
            }
        })
        .collect();

    Ok(Detection {
        pattern,
        confidence: confidence(40, 3, group.len(), 80),
        method: DetectionMethod::Bucketed,
        samples: group.len(),
    })
}

fn positional_scan(samples: &[&str]) -> Option<Detection> {
    let chars: Vec<Vec<char>> = samples.iter().map(|s| s.chars().collect()).collect();
    let mut cursors = vec![0usize; chars.len()];
    let mut pattern = String::new();
    let mut has_sequence = false;

    while chars.iter().zip(&cursors).all(|(c, &i)| i < c.len()) {
        let column: Vec<char> = chars.iter().zip(&cursors).map(|(c, &i)| c[i]).collect();
        let head = column[0];

        if column.iter().all(|&c| c == head) {
            pattern.push(head);
            cursors.iter_mut().for_each(|i| *i += 1);
            continue;
        }

        if column.iter().all(char::is_ascii_digit) {
            // Leading digits shared by every sample were emitted as literal
            // text; they belong to this run.
            let carried = pop_trailing(&mut pattern, |c| c.is_ascii_digit());
            let mut values = Vec::with_capacity(chars.len());
            for (c, i) in chars.iter().zip(cursors.iter_mut()) {
                let start = *i - carried;
                let mut end = *i;
                while end < c.len() && c[end].is_ascii_digit() {
                    end += 1;
                }
                values.push(c[start..end].iter().collect::<String>());
                *i = end;
            }

            let numbers: Option<Vec<u64>> = values.iter().map(|v| v.parse().ok()).collect();
            match numbers {
                Some(nums) if !has_sequence && nums.iter().any(|&n| n != nums[0]) => {
                    let refs: Vec<&str> = values.iter().map(String::as_str).collect();
                    pattern.push_str(&sequence_marker(&refs));
                    has_sequence = true;
                }
                _ => pattern.push('*'),
            }
            continue;
        }

        pop_trailing(&mut pattern, char::is_alphabetic);
        pattern.push('*');
        skip_wildcard(&chars, &mut cursors);
    }

    while pattern.contains("**") {
        pattern = pattern.replace("**", "*");
    }

    if !has_sequence {
        return None;
    }
    Some(Detection {
        pattern,
        confidence: confidence(30, 5, samples.len(), 70),
        method: DetectionMethod::PositionalScan,
        samples: samples.len(),
    })
}

/// Advance every cursor past a wildcard span, stopping at the next common
/// delimiter.
fn skip_wildcard(chars: &[Vec<char>], cursors: &mut [usize]) {
    // Delimiter following the span in the first sample, located in each
    // sample on its own.
    let delimiter = chars[0][cursors[0] + 1..]
        .iter()
        .copied()
        .find(|c| !c.is_alphanumeric());
    let jumps: Option<Vec<usize>> = delimiter.and_then(|d| {
        chars
            .iter()
            .zip(cursors.iter())
            .map(|(c, &i)| c[i + 1..].iter().position(|&x| x == d).map(|p| i + 1 + p))
            .collect()
    });

    if let Some(jumps) = jumps {
        cursors.copy_from_slice(&jumps);
        return;
    }

    // Lockstep until every sample holds the same delimiter in one column.
    let mut offset = 1;
    loop {
        let column: Option<Vec<char>> = chars
            .iter()
            .zip(cursors.iter())
            .map(|(c, &i)| c.get(i + offset).copied())
            .collect();
        match column {
            Some(col) if !col.iter().all(|&c| c == col[0] && !c.is_alphanumeric()) => offset += 1,
            _ => break,
        }
    }
    cursors.iter_mut().for_each(|i| *i += offset);
}

fn pop_trailing(pattern: &mut String, pred: impl Fn(char) -> bool) -> usize {
    let mut count = 0;
    while pattern.chars().next_back().is_some_and(&pred) {
        pattern.pop();
        count += 1;
    }
    count
}

/// `[001]`-style marker when any value carries a leading zero, `[1]`
/// otherwise.
fn sequence_marker(values: &[&str]) -> String {
    let padded = values.iter().any(|v| v.len() > 1 && v.starts_with('0'));
    if padded {
        let width = values.iter().map(|v| v.len()).max().unwrap_or(1);
        format!("[{:0>width$}]", 1, width = width)
    } else {
        "[1]".to_string()
    }
}

fn confidence(base: usize, step: usize, samples: usize, cap: usize) -> u8 {
    base.saturating_add(step.saturating_mul(samples)).min(cap) as u8
}
