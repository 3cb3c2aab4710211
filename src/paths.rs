//! Output path derivation.

use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of the editable document.
pub const DOCUMENT_EXTENSION: &str = "docx";

/// Extension of the fixed-layout copy.
pub const FIXED_LAYOUT_EXTENSION: &str = "pdf";

/// Characters that cannot appear in a file or directory name on common
/// filesystems.
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace path separators and reserved characters with `_`.
///
/// Ordinary names pass through unchanged.
pub fn sanitize_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".repeat(cleaned.len().max(1)),
        _ => cleaned,
    }
}

/// Where one cover letter is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    /// Directory holding the outputs
    pub directory: PathBuf,
    /// File name without extension
    pub base_name: String,
    /// Editable document path
    pub document: PathBuf,
    /// Fixed-layout copy path, when conversion is enabled
    pub fixed_layout: Option<PathBuf>,
}

impl OutputPaths {
    /// Derive output paths. Pure: the filesystem is not touched.
    ///
    /// The directory is `root/{company}` when `subfolder` is set and `root`
    /// otherwise. The base name is always `{name}-{company}-{role}-Cover-Letter`.
    pub fn build(
        root: &Path,
        name: &str,
        company: &str,
        role: &str,
        subfolder: bool,
        fixed_layout: bool,
    ) -> Self {
        let directory = if subfolder {
            root.join(sanitize_component(company))
        } else {
            root.to_path_buf()
        };

        let base_name = format!(
            "{}-{}-{}-Cover-Letter",
            sanitize_component(name),
            sanitize_component(company),
            sanitize_component(role)
        );

        let document = directory.join(format!("{}.{}", base_name, DOCUMENT_EXTENSION));
        let fixed_layout = fixed_layout
            .then(|| directory.join(format!("{}.{}", base_name, FIXED_LAYOUT_EXTENSION)));

        Self {
            directory,
            base_name,
            document,
            fixed_layout,
        }
    }

    /// Create the output directory if it does not exist yet.
    pub fn create_dir(&self) -> Result<()> {
        if !self.directory.as_os_str().is_empty() {
            fs::create_dir_all(&self.directory)?;
        }
        Ok(())
    }
}
