//! cover-gen CLI - cover letter generation tool
//!
//! Fills a Word template for one application or for every row of an
//! application list, optionally converting each letter to PDF.

use clap::Parser;
use colored::*;
use covergen::{
    read_table, run_batch, run_single, ApplicationRecord, Error, Field, GenerateOptions,
    Generator, RowOutcome, SofficeConverter, Summary,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Cover letters from a Word template
#[derive(Parser)]
#[command(
    name = "cover-gen",
    version,
    about = "Generate cover letters from a Word template",
    long_about = "cover-gen - cover letter generation from a Word template.\n\n\
                  Give --company and --role for a single letter, or --app-list with a \
                  .csv/.xlsx file to generate one letter per application not yet applied to."
)]
struct Cli {
    /// Applicant name
    #[arg(short, long)]
    name: String,

    /// Word template with {{ PLACEHOLDER }} markers
    #[arg(short, long, default_value = covergen::options::DEFAULT_TEMPLATE)]
    template: PathBuf,

    /// Application list (.csv, .tsv or .xlsx)
    #[arg(short = 'l', long)]
    app_list: Option<PathBuf>,

    /// Company name
    #[arg(long)]
    company: Option<String>,

    /// Role applied for
    #[arg(long)]
    role: Option<String>,

    /// Company address ("street, city, STATE POSTAL")
    #[arg(long)]
    address: Option<String>,

    /// Event where you met the company
    #[arg(long)]
    event: Option<String>,

    /// Contact at the company
    #[arg(long)]
    contact: Option<String>,

    /// Who referred you
    #[arg(long)]
    referral: Option<String>,

    /// Hiring manager name
    #[arg(long)]
    hiring_manager: Option<String>,

    /// First conversation note
    #[arg(long)]
    convo1: Option<String>,

    /// Second conversation note
    #[arg(long)]
    convo2: Option<String>,

    /// Free text for {{ OTHER1 }}
    #[arg(long)]
    other1: Option<String>,

    /// Free text for {{ OTHER2 }}
    #[arg(long)]
    other2: Option<String>,

    /// Letter date (default: today)
    #[arg(long)]
    date: Option<String>,

    /// Put each letter in a folder named after the company (default)
    #[arg(long, overrides_with = "no_folder")]
    folder: bool,

    /// Write letters directly into the output directory
    #[arg(long, overrides_with = "folder")]
    no_folder: bool,

    /// Also produce a PDF copy (default)
    #[arg(long, overrides_with = "no_pdf")]
    pdf: bool,

    /// Skip PDF conversion
    #[arg(long, overrides_with = "pdf")]
    no_pdf: bool,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Read ambiguous numeric dates as day/month
    #[arg(long)]
    day_first: bool,

    /// Salutation when no hiring manager is known
    #[arg(long, default_value = covergen::resolve::DEFAULT_SALUTATION)]
    salutation: String,

    /// LibreOffice executable used for PDF conversion
    #[arg(long, env = "COVERGEN_SOFFICE", default_value = covergen::convert::DEFAULT_SOFFICE)]
    soffice: PathBuf,

    /// Print the resolved placeholder values as JSON; write nothing
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// What to generate letters for.
enum Source {
    Single(ApplicationRecord),
    Batch(PathBuf),
}

impl Cli {
    fn options(&self) -> GenerateOptions {
        let mut options = GenerateOptions::new()
            .with_template(&self.template)
            .with_name(&self.name)
            .with_subfolder(!self.no_folder)
            .with_fixed_layout(!self.no_pdf && !self.dry_run)
            .with_day_first(self.day_first)
            .with_salutation(&self.salutation)
            .with_dry_run(self.dry_run);
        if let Some(dir) = &self.out_dir {
            options = options.with_output_root(dir);
        }
        options
    }

    /// Company and role win over an application list.
    fn source(&self) -> Result<Source, Error> {
        match (&self.company, &self.role, &self.app_list) {
            (Some(company), Some(role), _) => {
                let record = ApplicationRecord::new(&self.name, company, role)
                    .with(Field::Address, self.address.as_deref())
                    .with(Field::Event, self.event.as_deref())
                    .with(Field::Contact, self.contact.as_deref())
                    .with(Field::Referral, self.referral.as_deref())
                    .with(Field::HiringManager, self.hiring_manager.as_deref())
                    .with(Field::Convo1, self.convo1.as_deref())
                    .with(Field::Convo2, self.convo2.as_deref())
                    .with(Field::Other1, self.other1.as_deref())
                    .with(Field::Other2, self.other2.as_deref())
                    .with(Field::Date, self.date.as_deref());
                Ok(Source::Single(record))
            }
            (_, _, Some(list)) => Ok(Source::Batch(list.clone())),
            _ => Err(Error::MissingApplication),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("covergen={}", level))),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let source = cli.source()?;
    let generator = Generator::new(cli.options(), SofficeConverter::new(&cli.soffice))?;

    let summary = match source {
        Source::Single(record) => run_single(&generator, &record)?,
        Source::Batch(path) => {
            let table = read_table(&path)?;
            tracing::debug!(path = %path.display(), rows = table.len(), "read application list");
            let pb = if cli.json || cli.dry_run {
                ProgressBar::hidden()
            } else {
                create_progress(table.len() as u64)
            };

            let summary = run_batch(&generator, &table, |_, outcome| {
                if let RowOutcome::Generated(output) = outcome {
                    pb.set_message(output.paths.base_name.clone());
                }
                pb.inc(1);
            });
            pb.finish_and_clear();
            summary?
        }
    };

    if cli.dry_run {
        let contexts: Vec<_> = summary.outputs.iter().map(|o| &o.context).collect();
        println!("{}", serde_json::to_string_pretty(&contexts)?);
    } else if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    if let [output] = summary.outputs.as_slice() {
        println!(
            "{} Saved: {}",
            "✓".green().bold(),
            output.paths.document.display()
        );
    }

    println!(
        "{} Generated {} cover letters and {} PDFs",
        "✓".green().bold(),
        summary.generated,
        summary.converted
    );

    if summary.skipped > 0 {
        println!("  {} already applied, skipped", summary.skipped);
    }

    if summary.has_failures() {
        println!(
            "{} {} row(s) failed",
            "!".yellow().bold(),
            summary.failures.len()
        );
        for failure in &summary.failures {
            println!("  {} {}: {}", "row".dimmed(), failure.row, failure.message);
        }
    }

    for (field, count) in summary.tally.iter() {
        println!(
            "{} {} {} value(s) missing or unreadable, defaults used",
            "!".yellow().bold(),
            count,
            field.to_string().bold()
        );
    }
}

fn create_progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.blue} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
