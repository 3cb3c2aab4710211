//! Per-application letter generation.

use crate::context::RenderContext;
use crate::convert::Converter;
use crate::error::Result;
use crate::options::GenerateOptions;
use crate::paths::OutputPaths;
use crate::record::ApplicationRecord;
use crate::resolve::{DateResolver, ErrorTally};
use crate::template::DocxTemplate;
use serde::Serialize;

/// Where a record comes from, which decides the folder layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Fields given directly; the subfolder option applies
    Single,
    /// A row of an application list; always written to a subfolder
    Batch,
}

/// Result of generating one letter.
#[derive(Debug, Clone, Serialize)]
pub struct Output {
    /// Resolved placeholder values
    pub context: RenderContext,
    /// Output locations
    pub paths: OutputPaths,
    /// Whether the document was written (false on dry runs)
    pub written: bool,
    /// Whether a PDF copy was produced
    pub converted: bool,
}

/// Renders letters from one loaded template.
pub struct Generator {
    options: GenerateOptions,
    template: DocxTemplate,
    dates: DateResolver,
    converter: Box<dyn Converter>,
}

impl Generator {
    /// Load the template and prepare for generation.
    ///
    /// Fails when the template cannot be opened or is not a Word document,
    /// or when the date format is invalid.
    pub fn new(options: GenerateOptions, converter: impl Converter + 'static) -> Result<Self> {
        let dates = options.date_resolver()?;
        let template = DocxTemplate::open(&options.template)?;

        let known = RenderContext::empty();
        for name in template.placeholders() {
            if !known.contains_key(name) && !known.contains_key(&name.to_ascii_uppercase()) {
                tracing::warn!(
                    placeholder = %name,
                    template = %template.path().display(),
                    "unknown placeholder will render empty"
                );
            }
        }

        Ok(Self {
            options,
            template,
            dates,
            converter: Box::new(converter),
        })
    }

    /// Generation options in use.
    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// The loaded template.
    pub fn template(&self) -> &DocxTemplate {
        &self.template
    }

    /// Generate the letter for one record.
    ///
    /// Date and address problems are recorded in `tally` and never fail the
    /// call. A failed PDF conversion is logged and reported through
    /// [`Output::converted`]. Render and save errors are returned.
    pub fn process(
        &self,
        record: &ApplicationRecord,
        mode: Mode,
        tally: &mut ErrorTally,
    ) -> Result<Output> {
        let span = tracing::info_span!("letter", company = %record.company);
        let _enter = span.enter();

        let context = RenderContext::build(record, &self.dates, &self.options.salutation, tally);
        let subfolder = match mode {
            Mode::Single => self.options.subfolder,
            Mode::Batch => true,
        };
        let paths = OutputPaths::build(
            &self.options.output_root,
            &record.name,
            &record.company,
            &record.role,
            subfolder,
            self.options.fixed_layout,
        );

        let document = self.template.render(&context)?;
        if self.options.dry_run {
            tracing::debug!(path = %paths.document.display(), "dry run; not writing");
            return Ok(Output {
                context,
                paths,
                written: false,
                converted: false,
            });
        }

        paths.create_dir()?;
        document.save(&paths.document)?;
        tracing::debug!(path = %paths.document.display(), "saved letter");

        let converted = match &paths.fixed_layout {
            Some(target) => match self.converter.convert(&paths.document, target) {
                Ok(()) => {
                    tracing::debug!(path = %target.display(), "converted letter");
                    true
                }
                Err(err) => {
                    tracing::warn!("{err}");
                    false
                }
            },
            None => false,
        };

        Ok(Output {
            context,
            paths,
            written: true,
            converted,
        })
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("options", &self.options)
            .field("template", &self.template.path())
            .finish()
    }
}
