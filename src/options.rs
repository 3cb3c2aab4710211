//! Generation options.

use crate::error::Result;
use crate::resolve::{DateResolver, DEFAULT_DATE_FORMAT, DEFAULT_SALUTATION};
use chrono::{Local, NaiveDate};
use std::path::PathBuf;

/// Template looked up in the working directory when none is given.
pub const DEFAULT_TEMPLATE: &str = "cover-letter-template.docx";

/// Options for generating cover letters.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Word template path
    pub template: PathBuf,

    /// Directory outputs are written under (empty = working directory)
    pub output_root: PathBuf,

    /// Applicant name used when a row has no name of its own
    pub name: String,

    /// Put each letter in a `{company}` subfolder (single mode only;
    /// batches always use subfolders)
    pub subfolder: bool,

    /// Also produce a PDF copy
    pub fixed_layout: bool,

    /// Read ambiguous numeric dates day first
    pub day_first: bool,

    /// strftime-style format for the DATE placeholder
    pub date_format: String,

    /// Salutation when no hiring manager is known
    pub salutation: String,

    /// Fixed fallback date instead of the local date
    pub today: Option<NaiveDate>,

    /// Resolve and report only; write nothing
    pub dry_run: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            template: PathBuf::from(DEFAULT_TEMPLATE),
            output_root: PathBuf::new(),
            name: String::new(),
            subfolder: true,
            fixed_layout: true,
            day_first: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            salutation: DEFAULT_SALUTATION.to_string(),
            today: None,
            dry_run: false,
        }
    }
}

impl GenerateOptions {
    /// Create new generation options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the template path.
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = path.into();
        self
    }

    /// Set the output root directory.
    pub fn with_output_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_root = dir.into();
        self
    }

    /// Set the applicant name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enable or disable the per-company subfolder.
    pub fn with_subfolder(mut self, subfolder: bool) -> Self {
        self.subfolder = subfolder;
        self
    }

    /// Enable or disable PDF conversion.
    pub fn with_fixed_layout(mut self, fixed_layout: bool) -> Self {
        self.fixed_layout = fixed_layout;
        self
    }

    /// Read ambiguous numeric dates day first.
    pub fn with_day_first(mut self, day_first: bool) -> Self {
        self.day_first = day_first;
        self
    }

    /// Set the date display format.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Set the fallback salutation.
    pub fn with_salutation(mut self, salutation: impl Into<String>) -> Self {
        self.salutation = salutation.into();
        self
    }

    /// Pin "today" for reproducible output.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Enable dry run.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Date resolver configured from these options.
    ///
    /// Fails when the display format is not a valid strftime format.
    pub fn date_resolver(&self) -> Result<DateResolver> {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        Ok(DateResolver::new(today)
            .with_day_first(self.day_first)
            .with_display_format(&self.date_format)?)
    }
}
