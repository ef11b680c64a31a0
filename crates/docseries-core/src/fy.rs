//! Indian financial-year arithmetic.
//!
//! The financial year runs from 1 April to 31 March. Tax periods are
//! written `MMYYYY` (`042024` is April 2024, which belongs to FY 2024-25).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, Month};

use crate::error::TaxPeriodError;

/// A calendar month used as a GST return period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaxPeriod {
    year: i32,
    month: u32,
}

impl TaxPeriod {
    /// Build a period from a month (1-12) and year (2000-2100).
    pub fn new(month: u32, year: i32) -> Result<Self, TaxPeriodError> {
        if !(1..=12).contains(&month) {
            return Err(TaxPeriodError::Month(month));
        }
        if !(2000..=2100).contains(&year) {
            return Err(TaxPeriodError::Year(year));
        }
        Ok(Self { year, month })
    }

    /// Parse `MMYYYY`.
    pub fn parse(s: &str) -> Result<Self, TaxPeriodError> {
        if s.chars().count() != 6 {
            return Err(TaxPeriodError::Length(s.to_string()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TaxPeriodError::NonNumeric(s.to_string()));
        }
        // Six ASCII digits always parse.
        let month: u32 = s[..2].parse().map_err(|_| TaxPeriodError::NonNumeric(s.to_string()))?;
        let year: i32 = s[2..].parse().map_err(|_| TaxPeriodError::NonNumeric(s.to_string()))?;
        Self::new(month, year)
    }

    /// Parse a display string such as `April 2024`.
    pub fn from_display(s: &str) -> Result<Self, TaxPeriodError> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        let [month_name, year] = parts.as_slice() else {
            return Err(TaxPeriodError::Display(s.to_string()));
        };
        let month = Month::from_str(month_name)
            .map_err(|_| TaxPeriodError::Display(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| TaxPeriodError::Display(s.to_string()))?;
        Self::new(month.number_from_month(), year)
    }

    /// The period containing today's date.
    pub fn current() -> Result<Self, TaxPeriodError> {
        let today = Local::now().date_naive();
        Self::new(today.month(), today.year())
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Financial year this period belongs to.
    pub fn financial_year(&self) -> FinancialYear {
        let start_year = if self.month >= 4 {
            self.year
        } else {
            self.year - 1
        };
        FinancialYear { start_year }
    }

    /// April opens a new financial year.
    pub fn is_fy_boundary(&self) -> bool {
        self.month == 4
    }

    /// Human-readable form, e.g. `April 2024`.
    pub fn display(&self) -> String {
        let name = u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown");
        format!("{} {}", name, self.year)
    }

    /// The month before this one, if still within range.
    pub fn previous(&self) -> Option<Self> {
        if self.month == 1 {
            Self::new(12, self.year - 1).ok()
        } else {
            Self::new(self.month - 1, self.year).ok()
        }
    }
}

impl fmt::Display for TaxPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:04}", self.month, self.year)
    }
}

impl FromStr for TaxPeriod {
    type Err = TaxPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An April-March financial year, displayed as `2024-25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FinancialYear {
    start_year: i32,
}

impl FinancialYear {
    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.start_year + 1
    }

    pub fn contains(&self, period: &TaxPeriod) -> bool {
        period.financial_year() == *self
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.start_year, self.end_year().rem_euclid(100))
    }
}

/// Financial year of an `MMYYYY` period.
pub fn fy_of(period: &str) -> Result<FinancialYear, TaxPeriodError> {
    TaxPeriod::parse(period).map(|p| p.financial_year())
}

/// Whether two `MMYYYY` periods fall in the same financial year.
///
/// Malformed input on either side yields `false`.
pub fn same_fy(a: &str, b: &str) -> bool {
    match (fy_of(a), fy_of(b)) {
        (Ok(fa), Ok(fb)) => fa == fb,
        _ => false,
    }
}

/// `count` periods ending at `from`, newest first.
pub fn recent_periods(from: TaxPeriod, count: usize) -> Vec<TaxPeriod> {
    std::iter::successors(Some(from), |p| p.previous())
        .take(count)
        .collect()
}
