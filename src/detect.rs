//! Format detection for templates and application lists.
//!
//! Detection looks at content, not just the file name: OOXML packages are
//! ZIP archives told apart by `[Content_Types].xml`, legacy Office files
//! carry the OLE2 signature, and anything that decodes as text is treated as
//! a delimited table.

use crate::container::decode_text_bytes;
use crate::error::{Error, Result};
use std::io::{Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// OLE2 compound file signature used by legacy .doc/.xls files.
const OLE2_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Content type for DOCX main document part.
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Content type for DOCX templates (.dotx) main part.
const DOTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";

/// Content type for XLSX workbook part.
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Detected Office package format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Microsoft Word document (.docx)
    Docx,
    /// Microsoft Excel workbook (.xlsx)
    Xlsx,
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Docx => "docx",
            FormatType::Xlsx => "xlsx",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Docx => "Word Document",
            FormatType::Xlsx => "Excel Workbook",
        }
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How an application list file is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Delimited text with the given field separator
    Delimited(u8),
    /// Excel workbook
    Xlsx,
}

/// Detect the package format from a byte slice.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }
    detect_format_from_reader(std::io::Cursor::new(data))
}

/// Detect the package format from a reader.
pub fn detect_format_from_reader<R: Read + Seek>(reader: R) -> Result<FormatType> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            decode_text_bytes(&bytes)?
        }
        Err(_) => {
            return Err(Error::MissingComponent("[Content_Types].xml".to_string()));
        }
    };

    if content_types.contains(DOCX_CONTENT_TYPE) || content_types.contains(DOTX_CONTENT_TYPE) {
        Ok(FormatType::Docx)
    } else if content_types.contains(XLSX_CONTENT_TYPE) {
        Ok(FormatType::Xlsx)
    } else {
        detect_by_folder_structure(&mut archive)
    }
}

/// Fallback detection by checking folder structure.
fn detect_by_folder_structure<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<FormatType> {
    let names: Vec<String> = archive.file_names().map(String::from).collect();

    let has_word = names.iter().any(|n| n.starts_with("word/"));
    let has_xl = names.iter().any(|n| n.starts_with("xl/"));

    match (has_word, has_xl) {
        (true, false) => Ok(FormatType::Docx),
        (false, true) => Ok(FormatType::Xlsx),
        _ => Err(Error::UnknownFormat),
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

/// Check if data starts with the OLE2 compound file signature.
pub fn is_ole2_file(data: &[u8]) -> bool {
    data.len() >= 8 && data[..8] == OLE2_MAGIC
}

/// Detect how an application list is stored.
///
/// `path` is only a hint for delimited text: `.tsv`/`.tab` files are tab
/// separated; otherwise the separator occurring most often in the header
/// line wins, with comma as the default.
pub fn detect_table_format(data: &[u8], path: Option<&Path>) -> Result<TableFormat> {
    if is_zip_file(data) {
        return match detect_format_from_bytes(data)? {
            FormatType::Xlsx => Ok(TableFormat::Xlsx),
            other => Err(Error::UnsupportedFormat(format!(
                "{} as an application list",
                other
            ))),
        };
    }

    if is_ole2_file(data) {
        return Err(Error::UnsupportedFormat(
            "legacy binary Office file (save it as .xlsx or .csv)".to_string(),
        ));
    }

    let text = decode_text_bytes(data)?;
    if text.contains('\0') || text.trim().is_empty() {
        return Err(Error::UnknownFormat);
    }

    let extension = path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    if matches!(extension.as_deref(), Some("tsv") | Some("tab")) {
        return Ok(TableFormat::Delimited(b'\t'));
    }

    Ok(TableFormat::Delimited(sniff_delimiter(&text)))
}

/// Pick the separator that occurs most often in the first line.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    [b',', b'\t', b';', b'|']
        .into_iter()
        .map(|d| (d, header.bytes().filter(|b| *b == d).count()))
        .filter(|(_, n)| *n > 0)
        // max_by_key keeps the last maximum; reverse so earlier candidates win ties
        .rev()
        .max_by_key(|(_, n)| *n)
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn package_with_content_type(content_type: &str) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        write!(
            zip,
            r#"<Types><Override PartName="/main.xml" ContentType="{}"/></Types>"#,
            content_type
        )
        .unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_format_type_display() {
        assert_eq!(FormatType::Docx.to_string(), "Word Document");
        assert_eq!(FormatType::Xlsx.to_string(), "Excel Workbook");
        assert_eq!(FormatType::Docx.extension(), "docx");
    }

    #[test]
    fn test_is_zip_file() {
        assert!(is_zip_file(&[0x50, 0x4B, 0x03, 0x04, 0x00]));
        assert!(!is_zip_file(&[0x00, 0x00, 0x00, 0x00]));
        assert!(!is_zip_file(&[0x50, 0x4B])); // Too short
    }

    #[test]
    fn test_detect_invalid_data() {
        let result = detect_format_from_bytes(&[0x00, 0x00, 0x00, 0x00]);
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_packages() {
        let docx = package_with_content_type(DOCX_CONTENT_TYPE);
        assert_eq!(detect_format_from_bytes(&docx).unwrap(), FormatType::Docx);

        let xlsx = package_with_content_type(XLSX_CONTENT_TYPE);
        assert_eq!(detect_format_from_bytes(&xlsx).unwrap(), FormatType::Xlsx);
        assert_eq!(detect_table_format(&xlsx, None).unwrap(), TableFormat::Xlsx);

        assert!(matches!(
            detect_table_format(&docx, None),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_detect_delimited() {
        assert_eq!(
            detect_table_format(b"company,role\nAcme,QA\n", None).unwrap(),
            TableFormat::Delimited(b',')
        );
        assert_eq!(
            detect_table_format(b"company;role;notes, misc\n", None).unwrap(),
            TableFormat::Delimited(b';')
        );
        assert_eq!(
            detect_table_format(b"company,role\n", Some(Path::new("apps.TSV"))).unwrap(),
            TableFormat::Delimited(b'\t')
        );
        assert_eq!(
            detect_table_format(b"company\n", None).unwrap(),
            TableFormat::Delimited(b',')
        );
    }

    #[test]
    fn test_detect_legacy_and_binary() {
        let mut ole = OLE2_MAGIC.to_vec();
        ole.extend_from_slice(&[0u8; 16]);
        assert!(matches!(
            detect_table_format(&ole, None),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            detect_table_format(b"", None),
            Err(Error::UnknownFormat)
        ));
    }
}
