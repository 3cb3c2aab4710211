//! Per-field value resolution.
//!
//! Resolvers turn free-text cells into display values. Malformed input never
//! fails a row: the resolver falls back, logs a warning, and records the
//! failure in the caller's [`ErrorTally`].

mod address;
mod applied;
mod date;

pub use address::{format_address, AddressError};
pub use applied::is_applied;
pub use date::{parse_date, DateError, DateResolver, DEFAULT_DATE_FORMAT};

use crate::schema::Field;
use serde::Serialize;
use std::collections::BTreeMap;

/// Salutation used when no hiring manager is known.
pub const DEFAULT_SALUTATION: &str = "Dear Hiring Manager";

/// Per-field count of recoverable parse failures in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorTally {
    counts: BTreeMap<Field, usize>,
}

impl ErrorTally {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure for a field.
    pub fn record(&mut self, field: Field) {
        *self.counts.entry(field).or_default() += 1;
    }

    /// Failures recorded for a field.
    pub fn count(&self, field: Field) -> usize {
        self.counts.get(&field).copied().unwrap_or(0)
    }

    /// Failures across all fields.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over fields with at least one failure.
    pub fn iter(&self) -> impl Iterator<Item = (Field, usize)> + '_ {
        self.counts.iter().map(|(f, n)| (*f, *n))
    }

    /// Add another tally into this one.
    pub fn merge(&mut self, other: &ErrorTally) {
        for (field, n) in other.iter() {
            *self.counts.entry(field).or_default() += n;
        }
    }
}

/// Resolve an address cell, recording malformed input.
///
/// Absent or blank input resolves to an empty string without counting as a
/// failure.
pub fn resolve_address(raw: Option<&str>, tally: &mut ErrorTally) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    match format_address(raw) {
        Ok(formatted) => formatted,
        Err(err) => {
            tracing::warn!(field = %Field::Address, input = raw, "{err}; leaving address empty");
            tally.record(Field::Address);
            String::new()
        }
    }
}

/// Render the hiring manager as a salutation line.
pub fn salutation(hiring_manager: Option<&str>, fallback: &str) -> String {
    match hiring_manager.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => format!("Dear {}", name),
        None => fallback.to_string(),
    }
}
