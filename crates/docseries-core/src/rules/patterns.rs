//! Common regex patterns for invoice-number analysis.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Sequence marker in pattern notation: [001]
    pub static ref SEQUENCE_MARKER: Regex = Regex::new(r"\[([0-9]+)\]").unwrap();

    // Any bracket pair, used to report non-digit marker content: [ab]
    pub static ref BRACKET_PAIR: Regex = Regex::new(r"\[([^\[\]]*)\]").unwrap();

    // Digit runs inside invoice numbers (ASCII only)
    pub static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();

    // Alternating literal/digit runs
    pub static ref RUN_SPLIT: Regex = Regex::new(r"[0-9]+|[^0-9]+").unwrap();

    // Financial-year spans such as 24-25, 2024-25, 2024/2025
    pub static ref YEAR_SPAN: Regex = Regex::new(r"[0-9]{2,4}[-/][0-9]{2,4}").unwrap();

    // Bare four-digit groups (2024)
    pub static ref FOUR_DIGIT_YEAR: Regex = Regex::new(r"[0-9]{4}").unwrap();
}
