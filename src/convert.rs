//! Fixed-layout (PDF) conversion.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default LibreOffice executable name.
pub const DEFAULT_SOFFICE: &str = "soffice";

/// Converts a saved document into a fixed-layout copy.
pub trait Converter {
    /// Convert `source` and write the result to `target`.
    fn convert(&self, source: &Path, target: &Path) -> Result<()>;
}

/// Converter running LibreOffice in headless mode.
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    program: OsString,
}

impl SofficeConverter {
    /// Use the given `soffice` executable.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Executable that will be run.
    pub fn program(&self) -> &Path {
        Path::new(&self.program)
    }
}

impl Default for SofficeConverter {
    fn default() -> Self {
        Self::new(DEFAULT_SOFFICE)
    }
}

impl Converter for SofficeConverter {
    fn convert(&self, source: &Path, target: &Path) -> Result<()> {
        let failed = |message: String| Error::Conversion {
            path: source.to_path_buf(),
            message,
        };

        let out_dir = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        tracing::debug!(program = ?self.program, source = %source.display(), "converting");
        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(&out_dir)
            .arg(source)
            .output()
            .map_err(|e| failed(format!("could not run {:?}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!("{} ({})", stderr.trim(), output.status)));
        }

        // soffice names the output after the source stem; the stem may itself contain dots
        let stem = source.file_stem().unwrap_or_default().to_string_lossy();
        let produced = out_dir.join(format!("{}.pdf", stem));
        if produced != target {
            fs::rename(&produced, target).map_err(|e| {
                failed(format!("expected output {}: {}", produced.display(), e))
            })?;
        } else if !target.exists() {
            return Err(failed(format!("no output written to {}", target.display())));
        }
        Ok(())
    }
}
