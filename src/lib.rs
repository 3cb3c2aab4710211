//! # covergen
//!
//! Cover letter generation from a Word template.
//!
//! A template is an ordinary `.docx` file with `{{ COMPANY }}`, `{{ ROLE }}`,
//! `{{ DATE }}` and similar markers. Letters are generated either for one
//! application given field by field, or for every row of an application
//! list (`.csv`, `.tsv` or `.xlsx`) that is not yet marked as applied. Each
//! letter can also be converted to PDF through LibreOffice.
//!
//! ## Quick Start
//!
//! ```no_run
//! use covergen::{generate, ApplicationRecord, GenerateOptions};
//!
//! let options = GenerateOptions::new()
//!     .with_template("cover-letter-template.docx")
//!     .with_name("Jane Doe");
//! let record = ApplicationRecord::new("Jane Doe", "Acme", "Engineer");
//!
//! let summary = generate(options, &record)?;
//! println!("{}", summary.outputs[0].paths.document.display());
//! # Ok::<(), covergen::Error>(())
//! ```
//!
//! ## Application Lists
//!
//! ```no_run
//! use covergen::{generate_batch, GenerateOptions};
//!
//! let options = GenerateOptions::new()
//!     .with_name("Jane Doe")
//!     .with_output_root("letters")
//!     .with_fixed_layout(false);
//!
//! let summary = generate_batch(options, "applications.xlsx")?;
//! println!("{} generated, {} skipped", summary.generated, summary.skipped);
//! # Ok::<(), covergen::Error>(())
//! ```
//!
//! Column headers are matched loosely ("Hiring Manager", "hiring_manager"
//! and "HMANAGER" are the same column); see [`schema`].

pub mod batch;
pub mod container;
pub mod context;
pub mod convert;
pub mod detect;
pub mod error;
pub mod generator;
pub mod options;
pub mod paths;
pub mod record;
pub mod resolve;
pub mod schema;
pub mod table;
pub mod template;

// Re-exports
pub use batch::{run_batch, run_single, RowFailure, RowOutcome, Summary};
pub use context::RenderContext;
pub use convert::{Converter, SofficeConverter};
pub use error::{Error, Result};
pub use generator::{Generator, Mode, Output};
pub use options::GenerateOptions;
pub use paths::OutputPaths;
pub use record::ApplicationRecord;
pub use resolve::ErrorTally;
pub use schema::{ColumnMapping, Field};
pub use table::{read_table, Table};
pub use template::DocxTemplate;

use std::path::Path;

/// Generate one letter with the default LibreOffice converter.
pub fn generate(options: GenerateOptions, record: &ApplicationRecord) -> Result<Summary> {
    let generator = Generator::new(options, SofficeConverter::default())?;
    run_single(&generator, record)
}

/// Generate letters for an application list with the default LibreOffice
/// converter.
pub fn generate_batch(options: GenerateOptions, list: impl AsRef<Path>) -> Result<Summary> {
    let table = read_table(list)?;
    let generator = Generator::new(options, SofficeConverter::default())?;
    run_batch(&generator, &table, |_, _| {})
}
