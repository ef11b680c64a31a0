//! Error types for the docseries-core library.

use thiserror::Error;

/// Main error type for the docseries library.
#[derive(Error, Debug)]
pub enum DocSeriesError {
    /// Pattern compilation error.
    #[error("pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// Pattern auto-detection error.
    #[error("detection error: {0}")]
    Detect(#[from] DetectError),

    /// Tax period parsing error.
    #[error("tax period error: {0}")]
    TaxPeriod(#[from] TaxPeriodError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while compiling a pattern such as `GST/*/[001]`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The pattern is empty or whitespace only.
    #[error("pattern cannot be empty")]
    Empty,

    /// No `[NNN]` sequence marker was found.
    #[error("pattern must contain exactly one sequence marker [NNN], e.g. GST/[001]")]
    MissingSequence,

    /// More than one `[NNN]` sequence marker was found.
    #[error("pattern must contain only one sequence marker [NNN], found {0}")]
    MultipleSequences(usize),

    /// A bracket pair holds something other than digits.
    #[error("sequence marker must contain only digits, found: [{0}]")]
    NonNumericSequence(String),

    /// Opening and closing bracket counts differ (strict policy).
    #[error("unbalanced brackets in pattern")]
    UnbalancedBrackets,

    /// Brackets used outside the sequence marker (strict policy).
    #[error("only one pair of square brackets allowed for the sequence marker")]
    ExtraBrackets,

    /// The generated matcher failed to compile.
    #[error("failed to build matcher: {0}")]
    Regex(String),
}

/// Errors raised by pattern auto-detection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// Fewer than two unique, non-blank samples.
    #[error("need at least 2 unique invoices to detect a pattern")]
    TooFewSamples,

    /// More than one numeric field varies across the samples.
    #[error("multiple numeric fields vary; the sequence position is ambiguous")]
    Ambiguous,

    /// No varying numeric field could be located.
    #[error("could not detect a consistent pattern, please enter it manually")]
    NoSequence,
}

/// Errors related to MMYYYY tax periods.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxPeriodError {
    /// Input is not exactly six characters.
    #[error("tax period must be in MMYYYY format, got: {0:?}")]
    Length(String),

    /// Input contains non-digit characters.
    #[error("tax period must be numeric, got: {0:?}")]
    NonNumeric(String),

    /// Month outside 1-12.
    #[error("invalid month in tax period: {0}")]
    Month(u32),

    /// Year outside 2000-2100.
    #[error("invalid year in tax period: {0}")]
    Year(i32),

    /// Display text is not `Month YYYY`.
    #[error("invalid display format, expected 'Month YYYY', got: {0:?}")]
    Display(String),
}

/// Result type for the docseries library.
pub type Result<T> = std::result::Result<T, DocSeriesError>;
