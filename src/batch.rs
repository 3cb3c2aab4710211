//! Batch and single-application drivers.
//!
//! A batch reads the application list once, maps its header, and then
//! generates one letter per row in table order. Rows already marked as
//! applied are skipped. A row that fails (empty company or role, render or
//! save trouble) is recorded and the batch moves on; only an unusable
//! header aborts the run.

use crate::error::{Error, Result};
use crate::generator::{Generator, Mode, Output};
use crate::record::ApplicationRecord;
use crate::resolve::{is_applied, ErrorTally};
use crate::schema::{ColumnMapping, Field};
use crate::table::Table;
use serde::Serialize;

/// A row that could not be generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    /// 1-based data row number (header excluded)
    pub row: usize,
    /// What went wrong
    pub message: String,
}

/// What happened to one row, as reported to batch observers.
#[derive(Debug, Clone, Copy)]
pub enum RowOutcome<'a> {
    /// A letter was generated
    Generated(&'a Output),
    /// The row is already marked as applied
    Skipped,
    /// The row failed
    Failed(&'a RowFailure),
}

/// Totals for a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    /// Letters generated
    pub generated: usize,
    /// PDF copies produced
    pub converted: usize,
    /// Rows skipped as already applied
    pub skipped: usize,
    /// Rows that failed
    pub failures: Vec<RowFailure>,
    /// Recoverable field problems across all rows
    pub tally: ErrorTally,
    /// Generated letters in order
    pub outputs: Vec<Output>,
}

impl Summary {
    fn push(&mut self, output: Output) {
        self.generated += 1;
        if output.converted {
            self.converted += 1;
        }
        self.outputs.push(output);
    }

    /// Whether any row failed.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Generate a letter for every unapplied row of `table`.
///
/// `observer` is called once per data row, after the row is handled.
pub fn run_batch<F>(generator: &Generator, table: &Table, mut observer: F) -> Result<Summary>
where
    F: FnMut(usize, RowOutcome<'_>),
{
    let mapping = ColumnMapping::from_header(&table.header)?;
    let default_name = generator.options().name.as_str();
    let mut summary = Summary::default();

    tracing::info!(rows = table.len(), "processing application list");
    for (index, cells) in table.rows.iter().enumerate() {
        let row = index + 1;
        let span = tracing::info_span!("row", row);
        let _enter = span.enter();

        if is_applied(mapping.cell(cells, Field::Applied)) {
            tracing::debug!("already applied; skipping");
            summary.skipped += 1;
            observer(row, RowOutcome::Skipped);
            continue;
        }

        let result = ApplicationRecord::from_row(row, cells, &mapping, default_name)
            .and_then(|record| generator.process(&record, Mode::Batch, &mut summary.tally));
        match result {
            Ok(output) => {
                observer(row, RowOutcome::Generated(&output));
                summary.push(output);
            }
            Err(err) => {
                let message = match err {
                    Error::Row { message, .. } => message,
                    other => other.to_string(),
                };
                tracing::error!(row, "{message}");
                let failure = RowFailure { row, message };
                observer(row, RowOutcome::Failed(&failure));
                summary.failures.push(failure);
            }
        }
    }

    tracing::info!(
        generated = summary.generated,
        skipped = summary.skipped,
        failed = summary.failures.len(),
        "application list done"
    );
    Ok(summary)
}

/// Generate a single letter. Any failure is returned.
pub fn run_single(generator: &Generator, record: &ApplicationRecord) -> Result<Summary> {
    if let Some(field) = record.missing_required() {
        return Err(Error::InvalidOption(format!("{} must not be empty", field)));
    }
    let mut tally = ErrorTally::new();
    let output = generator.process(record, Mode::Single, &mut tally)?;

    let mut summary = Summary {
        tally,
        ..Default::default()
    };
    summary.push(output);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = Summary::default();
        assert!(!summary.has_failures());
        summary.failures.push(RowFailure {
            row: 2,
            message: "empty role cell".to_string(),
        });
        assert!(summary.has_failures());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["generated"], 0);
        assert_eq!(json["failures"][0]["row"], 2);
        assert!(json["tally"].as_object().unwrap().is_empty());
    }
}
