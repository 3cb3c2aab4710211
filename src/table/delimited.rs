//! Delimited text tables (CSV, TSV, semicolon lists).

use super::Table;
use crate::container::decode_text_bytes;
use crate::error::Result;

/// Parse delimited text. Ragged rows are accepted; cells are trimmed.
pub fn parse_delimited(data: &[u8], delimiter: u8) -> Result<Table> {
    let text = decode_text_bytes(data)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect::<Vec<_>>());
    }
    Ok(Table::from_rows(rows))
}
