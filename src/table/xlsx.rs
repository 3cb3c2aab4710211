//! XLSX worksheet reader.

use super::shared_strings::SharedStrings;
use super::Table;
use crate::container::OoxmlContainer;
use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use std::path::Path;

const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Sheet info from workbook.xml.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    rel_id: String,
}

/// Reads worksheets of an Excel workbook as plain string tables.
pub struct XlsxReader {
    container: OoxmlContainer,
    shared_strings: SharedStrings,
    sheets: Vec<SheetInfo>,
}

impl XlsxReader {
    /// Open an XLSX file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_container(OoxmlContainer::open(path)?)
    }

    /// Create a reader from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_container(OoxmlContainer::from_bytes(data)?)
    }

    fn from_container(container: OoxmlContainer) -> Result<Self> {
        let shared_strings = match container.read_xml("xl/sharedStrings.xml") {
            Ok(xml) => SharedStrings::parse(&xml)?,
            Err(_) => SharedStrings::default(),
        };
        let sheets = Self::parse_workbook(&container.read_xml(WORKBOOK_PART)?)?;

        Ok(Self {
            container,
            shared_strings,
            sheets,
        })
    }

    /// Parse workbook.xml for sheet info.
    fn parse_workbook(xml: &str) -> Result<Vec<SheetInfo>> {
        let mut sheets = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = String::new();
                    let mut rel_id = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => name = String::from_utf8_lossy(&attr.value).to_string(),
                            b"r:id" => rel_id = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }

                    if !name.is_empty() {
                        sheets.push(SheetInfo { name, rel_id });
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Read the first worksheet.
    pub fn first_sheet(&self) -> Result<Table> {
        let sheet = self
            .sheets
            .first()
            .ok_or_else(|| Error::Table("workbook has no sheets".to_string()))?;
        self.read_sheet(&sheet.name)
    }

    /// Read a worksheet by name.
    pub fn read_sheet(&self, name: &str) -> Result<Table> {
        let sheet = self
            .sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::Table(format!("no sheet named {:?}", name)))?;

        let rels = self.container.read_relationships(WORKBOOK_PART)?;
        let target = rels
            .get(&sheet.rel_id)
            .map(|rel| rel.target.clone())
            .ok_or_else(|| Error::MissingComponent(format!("worksheet for sheet {:?}", name)))?;
        let sheet_path = OoxmlContainer::resolve_path(WORKBOOK_PART, &target);

        let xml = self.container.read_xml(&sheet_path)?;
        self.parse_sheet(&xml)
    }

    /// Parse worksheet XML into rows, placing cells by their `r` reference
    /// so skipped (empty) cells keep later columns aligned.
    fn parse_sheet(&self, xml: &str) -> Result<Table> {
        let mut reader = quick_xml::Reader::from_str(xml);

        let mut buf = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut current_row: Option<Vec<String>> = None;
        let mut cell: Option<CellState> = None;
        let mut in_value = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"row" => current_row = Some(Vec::new()),
                    b"c" => {
                        let next_col = current_row.as_ref().map_or(0, |r| r.len());
                        cell = Some(CellState::from_start(e, next_col));
                    }
                    b"v" | b"t" if cell.is_some() => in_value = true,
                    _ => {}
                },
                Ok(Event::Text(ref e)) if in_value => {
                    if let Some(c) = cell.as_mut() {
                        c.value.push_str(&e.unescape().unwrap_or_default());
                    }
                }
                Ok(Event::End(ref e)) => match e.name().as_ref() {
                    b"row" => {
                        if let Some(row) = current_row.take() {
                            rows.push(row);
                        }
                    }
                    b"c" => {
                        if let (Some(c), Some(row)) = (cell.take(), current_row.as_mut()) {
                            let value = self.resolve_cell_value(&c.value, c.cell_type.as_deref());
                            if row.len() <= c.column {
                                row.resize(c.column + 1, String::new());
                            }
                            row[c.column] = value.trim().to_string();
                        }
                    }
                    b"v" | b"t" => in_value = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Table::from_rows(rows))
    }

    /// Resolve a cell value based on its type.
    fn resolve_cell_value(&self, value: &str, cell_type: Option<&str>) -> String {
        match cell_type {
            Some("s") => match value.trim().parse::<usize>() {
                Ok(idx) => self.shared_strings.get(idx).unwrap_or("").to_string(),
                Err(_) => value.to_string(),
            },
            Some("b") => {
                if value.trim() == "1" {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
            // Error cells (#N/A, #REF!) carry no usable value
            Some("e") => String::new(),
            _ => value.to_string(),
        }
    }
}

/// The cell currently being read.
struct CellState {
    column: usize,
    cell_type: Option<String>,
    value: String,
}

impl CellState {
    fn from_start(e: &BytesStart<'_>, fallback_column: usize) -> Self {
        let mut column = fallback_column;
        let mut cell_type = None;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    if let Some(col) = column_index(&String::from_utf8_lossy(&attr.value)) {
                        column = col;
                    }
                }
                b"t" => cell_type = Some(String::from_utf8_lossy(&attr.value).to_string()),
                _ => {}
            }
        }
        Self {
            column,
            cell_type,
            value: String::new(),
        }
    }
}

/// Columns a worksheet can hold (A..XFD).
const MAX_COLUMNS: usize = 16_384;

/// Zero-based column index of an A1-style reference ("C7" -> 2).
///
/// `None` for references without letters or past the last sheet column.
fn column_index(reference: &str) -> Option<usize> {
    let letters: String = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let index = letters.chars().try_fold(0usize, |acc, c| {
        let digit = c.to_ascii_uppercase() as usize - 'A' as usize + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })?;
    (index <= MAX_COLUMNS).then(|| index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn workbook(sheet_xml: &str) -> Vec<u8> {
        let parts = [
            (
                "[Content_Types].xml",
                r#"<Types><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#,
            ),
            (
                "xl/workbook.xml",
                r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Apps" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships><Relationship Id="rId1" Type="http://x/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
            ),
            (
                "xl/sharedStrings.xml",
                r#"<sst><si><t>Company</t></si><si><t>Role</t></si><si><t>Date</t></si><si><t>Acme</t></si><si><t>Engineer</t></si></sst>"#,
            ),
            ("xl/worksheets/sheet1.xml", sheet_xml),
        ];
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("C7"), Some(2));
        assert_eq!(column_index("AA10"), Some(26));
        assert_eq!(column_index("12"), None);
        assert_eq!(column_index("XFD1"), Some(16_383));
        assert_eq!(column_index("XFE1"), None);
        assert_eq!(column_index("ZZZZZZZZZZZZZZZ1"), None);
    }

    #[test]
    fn test_read_first_sheet() {
        let sheet = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="s"><v>2</v></c></row>
<row r="2"><c r="A2" t="s"><v>3</v></c><c r="B2" t="s"><v>4</v></c><c r="C2"><v>45074</v></c></row>
</sheetData></worksheet>"#;
        let reader = XlsxReader::from_bytes(workbook(sheet)).unwrap();
        assert_eq!(reader.sheet_names(), vec!["Apps"]);

        let table = reader.first_sheet().unwrap();
        assert_eq!(table.header, vec!["Company", "Role", "Date"]);
        assert_eq!(table.rows, vec![vec!["Acme", "Engineer", "45074"]]);
    }

    #[test]
    fn test_sparse_cells_stay_aligned() {
        let sheet = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="D1" t="inlineStr"><is><t>Applied</t></is></c></row>
<row r="2"><c r="A2" t="s"><v>3</v></c><c r="D2" t="b"><v>1</v></c></row>
</sheetData></worksheet>"#;
        let table = XlsxReader::from_bytes(workbook(sheet))
            .unwrap()
            .first_sheet()
            .unwrap();
        assert_eq!(table.header, vec!["Company", "Role", "", "Applied"]);
        assert_eq!(table.rows[0], vec!["Acme", "", "", "TRUE"]);
    }

    #[test]
    fn test_malformed_reference_falls_back_to_position() {
        let sheet = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="ZZZZZZZZZZZZZZZ1" t="s"><v>1</v></c></row>
<row r="2"><c r="A2" t="s"><v>3</v></c><c r="ZZZZZZ2" t="s"><v>4</v></c></row>
</sheetData></worksheet>"#;
        let table = XlsxReader::from_bytes(workbook(sheet))
            .unwrap()
            .first_sheet()
            .unwrap();
        assert_eq!(table.header, vec!["Company", "Role"]);
        assert_eq!(table.rows, vec![vec!["Acme", "Engineer"]]);
    }
}
