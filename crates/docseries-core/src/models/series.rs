//! Series data models: parsed invoices, per-series analysis and
//! GSTR-1 Table 13 rows.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Placeholder standing in for the sequence inside a series key.
pub const SEQ_PLACEHOLDER: &str = "{SEQ}";

/// Column headers of Table 13.
pub const TABLE13_HEADERS: [&str; 6] = [
    "Nature of Document",
    "Sr. No. From",
    "Sr. No. To",
    "Total Number",
    "Cancelled",
    "Net Issued",
];

/// Why a line could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum InvoiceFailure {
    /// Blank after trimming.
    Empty,
    /// The pattern did not match (reported as unmatched).
    NoMatch,
    /// Matched, but the sequence digits are unusable.
    InvalidSequence(String),
}

impl fmt::Display for InvoiceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty invoice"),
            Self::NoMatch => write!(f, "Does not match pattern"),
            Self::InvalidSequence(seq) => write!(f, "Invalid sequence number: {}", seq),
        }
    }
}

/// One invoice line after matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInvoice {
    /// Original line as provided.
    pub raw: String,

    /// Sequence number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,

    /// Sequence digits as written (keeps padding).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_str: Option<String>,

    /// Wildcard values in declared order.
    pub wildcard_values: Vec<String>,

    /// Fixed text plus wildcard values, sequence replaced by `{SEQ}`.
    pub series_key: String,

    /// Set when the line could not be used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<InvoiceFailure>,
}

impl ParsedInvoice {
    /// An unusable line.
    pub fn failed(raw: impl Into<String>, failure: InvoiceFailure) -> Self {
        Self {
            raw: raw.into(),
            sequence_number: None,
            sequence_str: None,
            wildcard_values: Vec::new(),
            series_key: String::new(),
            failure: Some(failure),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }

    /// Rejected by the pattern itself, as opposed to other failures.
    pub fn is_unmatched(&self) -> bool {
        self.failure == Some(InvoiceFailure::NoMatch)
    }
}

/// Valid invoices grouped by series key, in first-seen key order.
pub type SeriesGroups = IndexMap<String, Vec<ParsedInvoice>>;

/// Analysis of a single series; one Table 13 row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesAnalysis {
    /// Unique series key.
    pub series_key: String,

    /// Series key with the placeholder rendered as `<seq>`.
    pub series_display_name: String,

    /// Wildcard values shared by the series.
    pub wildcard_values: Vec<String>,

    pub start_number: u64,
    pub end_number: u64,

    /// Reconstructed invoice number for "From".
    pub start_invoice: String,

    /// Reconstructed invoice number for "To".
    pub end_invoice: String,

    /// `end - start + 1`.
    pub total_in_range: u64,

    /// Unique invoices present.
    pub actual_count: u64,

    /// Missing (inferred cancelled) numbers.
    pub cancelled_count: u64,

    /// Unique invoices issued.
    pub net_issued: u64,

    pub missing_numbers: Vec<u64>,

    /// Missing numbers zero-padded to the series padding.
    pub missing_invoices: Vec<String>,

    /// Raw strings of repeated occurrences.
    pub duplicate_invoices: Vec<String>,

    pub duplicate_count: u64,

    pub warnings: Vec<String>,

    /// Padding width actually used (may exceed the declared width).
    pub sequence_padding: usize,
}

impl SeriesAnalysis {
    /// Zeroed analysis for a series key.
    pub fn empty(series_key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            series_key: series_key.into(),
            series_display_name: display_name.into(),
            ..Self::default()
        }
    }

    /// Share of the range that is missing (0.0 - 1.0).
    pub fn cancellation_ratio(&self) -> f64 {
        if self.total_in_range == 0 {
            0.0
        } else {
            self.cancelled_count as f64 / self.total_in_range as f64
        }
    }
}

/// Complete result of processing an invoice list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Per-series analyses, sorted by `(series_key, start_number)`.
    pub series_results: Vec<SeriesAnalysis>,

    /// Lines the pattern did not match.
    pub unmatched_invoices: Vec<String>,

    /// Lines that matched but were unusable, with the reason.
    pub invalid_invoices: Vec<(String, String)>,

    pub total_input_lines: u64,
    pub total_matched: u64,
    pub total_unmatched: u64,
    pub total_invalid: u64,
    pub total_duplicates: u64,

    pub pattern_used: String,
    pub document_nature: String,

    /// Run-level warnings.
    pub warnings: Vec<String>,
}

/// A single GSTR-1 Table 13 row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table13Row {
    pub nature_of_document: String,
    pub sr_no_from: String,
    pub sr_no_to: String,
    pub total_number: u64,
    pub cancelled: u64,
    pub net_issued: u64,
}

impl Table13Row {
    /// Cell values in column order.
    pub fn to_record(&self) -> [String; 6] {
        [
            self.nature_of_document.clone(),
            self.sr_no_from.clone(),
            self.sr_no_to.clone(),
            self.total_number.to_string(),
            self.cancelled.to_string(),
            self.net_issued.to_string(),
        ]
    }

    /// Tab-separated line for spreadsheet paste.
    pub fn to_tsv(&self) -> String {
        self.to_record().join("\t")
    }
}
