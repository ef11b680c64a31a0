//! Prior-period series records and continuity results.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::rules::locate_sequence_run;

/// A series row as exported from a previous GSTR-1 return.
///
/// This is the raw shape handed over by spreadsheet/CSV readers. Column
/// aliases cover the usual portal export headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousSeriesRecord {
    #[serde(alias = "Doc Type", alias = "Nature", alias = "doc_type", rename = "docType")]
    pub doc_type: String,

    #[serde(alias = "From", alias = "from_invoice", rename = "from")]
    pub from_invoice: String,

    #[serde(alias = "To", alias = "to_invoice", rename = "to")]
    pub to_invoice: String,

    #[serde(default, alias = "Total", deserialize_with = "lenient_count")]
    pub total: u64,

    #[serde(default, alias = "Cancelled", deserialize_with = "lenient_count")]
    pub cancelled: u64,

    #[serde(default, alias = "Tax Period", alias = "tax_period", rename = "taxPeriod")]
    pub tax_period: Option<String>,
}

/// Informational counts: blank, negative or unreadable cells read as 0.
fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Whole(u64),
        Fraction(f64),
        Text(String),
        Other(IgnoredAny),
    }

    let count = match Option::<Cell>::deserialize(deserializer)? {
        Some(Cell::Whole(n)) => n,
        Some(Cell::Fraction(f)) if f.is_finite() && f >= 0.0 => f as u64,
        Some(Cell::Text(text)) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && *f >= 0.0)
                        .map(|f| f as u64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    };
    Ok(count)
}

/// A previous-period series with its derived signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousSeriesInfo {
    pub doc_type: String,
    pub from_invoice: String,
    pub to_invoice: String,
    pub total: u64,
    pub cancelled: u64,

    /// `MMYYYY`; `None` for exports without period metadata.
    pub tax_period: Option<String>,

    /// Text before the sequence number of `to_invoice`.
    pub prefix: String,

    /// Text after the sequence number of `to_invoice`.
    pub suffix: String,

    /// Last sequence number issued.
    pub end_sequence: u64,
}

impl PreviousSeriesInfo {
    /// Build a record and derive prefix/suffix/end sequence from `to_invoice`.
    pub fn new(
        doc_type: impl Into<String>,
        from_invoice: impl Into<String>,
        to_invoice: impl Into<String>,
        total: u64,
        cancelled: u64,
        tax_period: Option<String>,
    ) -> Self {
        let to_invoice: String = to_invoice.into();
        let (prefix, suffix, end_sequence) = match locate_sequence_run(&to_invoice) {
            Some(run) => (run.prefix.to_string(), run.suffix.to_string(), run.value),
            None => (String::new(), String::new(), 0),
        };
        Self {
            doc_type: doc_type.into(),
            from_invoice: from_invoice.into(),
            tax_period: tax_period.filter(|p| !p.trim().is_empty()),
            to_invoice,
            total,
            cancelled,
            prefix,
            suffix,
            end_sequence,
        }
    }

    /// `(prefix, suffix)` used to pair series across periods.
    pub fn signature(&self) -> (&str, &str) {
        (&self.prefix, &self.suffix)
    }
}

impl From<PreviousSeriesRecord> for PreviousSeriesInfo {
    fn from(record: PreviousSeriesRecord) -> Self {
        Self::new(
            record.doc_type.trim(),
            record.from_invoice.trim(),
            record.to_invoice.trim(),
            record.total,
            record.cancelled,
            record.tax_period.map(|p| p.trim().to_string()),
        )
    }
}

/// Outcome of pairing a series with the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuityStatus {
    /// Starts exactly one after the previous end.
    Continuous,
    /// Numbers between the previous end and the current start are missing.
    Gap,
    /// Starts at or before the previous end.
    Overlap,
    /// Prefix differs only by year tokens; assumed to be a new financial
    /// year series. Not verified.
    YearRollover,
    /// No previous series matches.
    New,
    /// A previous series with no current counterpart.
    Discontinued,
}

impl ContinuityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continuous => "continuous",
            Self::Gap => "gap",
            Self::Overlap => "overlap",
            Self::YearRollover => "year_rollover",
            Self::New => "new",
            Self::Discontinued => "discontinued",
        }
    }
}

/// Continuity check result for one series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuityResult {
    pub series_key: String,
    pub series_display_name: String,

    /// Current period range; `None` for discontinued series.
    pub current_from: Option<String>,
    pub current_to: Option<String>,

    /// End invoice of the matched previous series.
    pub previous_to: Option<String>,

    pub status: ContinuityStatus,

    /// Missing count between periods; non-zero only for [`ContinuityStatus::Gap`].
    pub gap_count: u64,

    /// Inclusive missing range for [`ContinuityStatus::Gap`].
    pub missing_range: Option<(u64, u64)>,

    pub message: String,
}

impl ContinuityResult {
    /// Continuous, or assumed continuous across a year rollover.
    pub fn is_continuous(&self) -> bool {
        matches!(
            self.status,
            ContinuityStatus::Continuous | ContinuityStatus::YearRollover
        )
    }
}

/// Per-status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuitySummary {
    pub continuous: usize,
    pub gaps: usize,
    pub overlaps: usize,
    pub year_rollovers: usize,
    pub new_series: usize,
    pub discontinued: usize,
}

impl ContinuitySummary {
    pub fn from_results(results: &[ContinuityResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            match r.status {
                ContinuityStatus::Continuous => acc.continuous += 1,
                ContinuityStatus::Gap => acc.gaps += 1,
                ContinuityStatus::Overlap => acc.overlaps += 1,
                ContinuityStatus::YearRollover => acc.year_rollovers += 1,
                ContinuityStatus::New => acc.new_series += 1,
                ContinuityStatus::Discontinued => acc.discontinued += 1,
            }
            acc
        })
    }
}
