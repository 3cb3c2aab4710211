//! Human-readable date parsing and display.

use super::ErrorTally;
use crate::schema::Field;
use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Display format for resolved dates, e.g. "May 28, 2023".
pub const DEFAULT_DATE_FORMAT: &str = "%B %d, %Y";

/// Excel stores dates as days since 1899-12-30. Serial numbers outside this
/// window (1954..2119) are not treated as dates.
const EXCEL_SERIAL_RANGE: std::ops::RangeInclusive<u64> = 20_000..=80_000;

/// Parsed years below this are two-digit years read through `%Y`.
const MIN_YEAR: i32 = 1900;

static ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("ordinal pattern"));
static ABBREV_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z])\.").expect("abbreviation pattern"));
static SEPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsept\b").expect("sept pattern"));
static ISO_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{1,2}-\d{1,2})[T ]\d").expect("iso datetime pattern")
});
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("space pattern"));

/// Formats with a spelled-out month, tried after commas are removed.
const NAMED_FORMATS: &[&str] = &[
    "%B %d %Y",
    "%d %B %Y",
    "%Y %B %d",
    "%A %B %d %Y",
    "%A %d %B %Y",
    "%B %d %y",
    "%d %B %y",
];

const ISO_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];

const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y", "%m/%d/%y", "%m-%d-%y", "%m.%d.%y",
];

const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y", "%d-%m-%y", "%d.%m.%y",
];

/// Date parsing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("unrecognized date {0:?}")]
    Unparseable(String),

    #[error("invalid date display format {0:?}")]
    BadFormat(String),
}

/// Parse a free-text date.
///
/// All-numeric forms with both day and month at most 12 are read month
/// first unless `day_first` is set; the preference is applied the same way
/// to every value in a run.
pub fn parse_date(raw: &str, day_first: bool) -> Result<NaiveDate, DateError> {
    let trimmed = raw.trim();
    let fail = || DateError::Unparseable(trimmed.to_string());
    if trimmed.is_empty() {
        return Err(fail());
    }

    if let Some(date) = parse_excel_serial(trimmed) {
        return Ok(date);
    }

    if let Some(caps) = ISO_DATETIME.captures(trimmed) {
        return try_formats(&caps[1], ISO_FORMATS).ok_or_else(fail);
    }

    let cleaned = ORDINAL.replace_all(trimmed, "$1");
    let cleaned = ABBREV_DOT.replace_all(&cleaned, "$1");
    let cleaned = SEPT.replace_all(&cleaned, "Sep");
    let cleaned = cleaned.replace(',', " ");
    let cleaned = SPACES.replace_all(cleaned.trim(), " ");

    let (first, second) = if day_first {
        (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS)
    } else {
        (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS)
    };

    [ISO_FORMATS, first, second, NAMED_FORMATS]
        .iter()
        .find_map(|formats| try_formats(&cleaned, formats))
        .ok_or_else(fail)
}

fn try_formats(input: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .find(|date| date.year() >= MIN_YEAR)
}

fn parse_excel_serial(input: &str) -> Option<NaiveDate> {
    let value: f64 = input.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let days = value.trunc() as u64;
    if !EXCEL_SERIAL_RANGE.contains(&days) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days))
}

/// Resolves application dates against a fixed "today".
#[derive(Debug, Clone)]
pub struct DateResolver {
    today: NaiveDate,
    day_first: bool,
    display_format: String,
}

impl DateResolver {
    /// Create a resolver that falls back to `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            day_first: false,
            display_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Read ambiguous numeric dates day first.
    pub fn with_day_first(mut self, day_first: bool) -> Self {
        self.day_first = day_first;
        self
    }

    /// Set the strftime-style display format.
    pub fn with_display_format(mut self, format: &str) -> Result<Self, DateError> {
        let valid = !format.is_empty()
            && StrftimeItems::new(format).all(|item| !matches!(item, Item::Error));
        if !valid {
            return Err(DateError::BadFormat(format.to_string()));
        }
        self.display_format = format.to_string();
        Ok(self)
    }

    /// The fallback date.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Format a date for display.
    pub fn display(&self, date: NaiveDate) -> String {
        date.format(&self.display_format).to_string()
    }

    /// Resolve a raw date cell to its display form.
    ///
    /// A missing or unparseable value falls back to today and is recorded
    /// in the tally. Only parse failures are logged as warnings.
    pub fn resolve(&self, raw: Option<&str>, tally: &mut ErrorTally) -> String {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            tracing::debug!(field = %Field::Date, "no date given; using today's date");
            tally.record(Field::Date);
            return self.display(self.today);
        };
        match parse_date(raw, self.day_first) {
            Ok(date) => self.display(date),
            Err(err) => {
                tracing::warn!(field = %Field::Date, "{err}; using today's date");
                tally.record(Field::Date);
                self.display(self.today)
            }
        }
    }
}
