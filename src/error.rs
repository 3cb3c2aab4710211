//! Error types for the covergen library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for covergen operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating cover letters.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading or writing a ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Error reading a delimited table.
    #[error("Table error: {0}")]
    Table(String),

    /// The batch table header lacks required columns.
    #[error("Application list is missing required column(s): {}", .missing.join(", "))]
    Schema {
        /// Canonical identifiers of the missing columns
        missing: Vec<&'static str>,
    },

    /// The template file could not be opened.
    #[error("Template not found: {}", .path.display())]
    TemplateNotFound {
        /// Path that was tried
        path: PathBuf,
    },

    /// The template opened but is not a usable Word document.
    #[error("Invalid template {}: {reason}", .path.display())]
    InvalidTemplate {
        /// Template path
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// A generation option has an unusable value.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Neither company and role nor an application list was supplied.
    #[error("Must enter either both company and role or a \".csv\"/\".xlsx\" application list")]
    MissingApplication,

    /// The fixed-layout converter failed.
    #[error("Conversion of {} failed: {message}", .path.display())]
    Conversion {
        /// Source document
        path: PathBuf,
        /// Converter output or failure reason
        message: String,
    },

    /// A single batch row could not be processed.
    #[error("Row {row}: {message}")]
    Row {
        /// 1-based data row number (header excluded)
        row: usize,
        /// Failure description
        message: String,
    },
}

impl Error {
    /// Whether this error must abort the whole run.
    ///
    /// Row-local errors and converter failures are absorbed by the batch
    /// driver; everything else ends the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Row { .. } | Error::Conversion { .. })
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<crate::resolve::DateError> for Error {
    fn from(err: crate::resolve::DateError) -> Self {
        Error::InvalidOption(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Table(err.to_string())
    }
}
