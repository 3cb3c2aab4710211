//! Application list readers.
//!
//! Both delimited text and `.xlsx` workbooks are read into the same
//! [`Table`]: a header row followed by data rows of plain strings. Entirely
//! blank rows are dropped; everything else is kept in file order.
//!
//! # Example
//!
//! ```no_run
//! use covergen::table::read_table;
//!
//! let table = read_table("applications.xlsx")?;
//! println!("{} columns, {} rows", table.header.len(), table.rows.len());
//! # Ok::<(), covergen::Error>(())
//! ```

mod delimited;
mod shared_strings;
mod xlsx;

pub use delimited::parse_delimited;
pub use xlsx::XlsxReader;

use crate::detect::{detect_table_format, TableFormat};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// A header row and its data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column names, as written in the file
    pub header: Vec<String>,
    /// Data rows; may be shorter or longer than the header
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from raw rows, using the first non-blank row as header.
    pub fn from_rows(rows: impl IntoIterator<Item = Vec<String>>) -> Self {
        let mut rows = rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()));
        let header = rows.next().unwrap_or_default();
        Self {
            header,
            rows: rows.collect(),
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read an application list, detecting its format from content.
pub fn read_table(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::Table(format!(
            "no \".xlsx\" or \".csv\" file found at {}",
            path.display()
        )),
        _ => Error::Io(e),
    })?;
    read_table_bytes(data, Some(path))
}

/// Read an application list from memory.
pub fn read_table_bytes(data: Vec<u8>, path: Option<&Path>) -> Result<Table> {
    let format = detect_table_format(&data, path)?;
    tracing::debug!(?format, "reading application list");
    match format {
        TableFormat::Delimited(delimiter) => parse_delimited(&data, delimiter),
        TableFormat::Xlsx => XlsxReader::from_bytes(data)?.first_sheet(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_rows_skips_blank() {
        let table = Table::from_rows(vec![
            strings(&["", ""]),
            strings(&["company", "role"]),
            strings(&["Acme", "QA"]),
            strings(&[" ", ""]),
            strings(&["Globex", "Dev"]),
        ]);
        assert_eq!(table.header, strings(&["company", "role"]));
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1], strings(&["Globex", "Dev"]));
    }

    #[test]
    fn test_read_table_missing_file() {
        let err = read_table("/nonexistent/apps.csv").unwrap_err();
        assert!(matches!(err, Error::Table(_)));
    }

    #[test]
    fn test_read_table_csv_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("apps.csv");
        fs::write(&path, "Company,Role\nAcme,Engineer\n").unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.header, strings(&["Company", "Role"]));
        assert_eq!(table.rows, vec![strings(&["Acme", "Engineer"])]);
    }
}
