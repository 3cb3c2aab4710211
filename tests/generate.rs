//! End-to-end generation tests.
//!
//! Templates and workbooks are built in memory; letters are written to
//! temporary directories and converted by a fake converter.

use chrono::NaiveDate;
use covergen::container::OoxmlContainer;
use covergen::table::read_table_bytes;
use covergen::{
    run_batch, run_single, ApplicationRecord, Converter, Error, Field, GenerateOptions,
    Generator, Result, RowOutcome,
};
use std::cell::RefCell;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use zip::write::SimpleFileOptions;

const LETTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>{{ DATE }}</w:t></w:r></w:p>
    <w:p><w:r><w:t>{{ COMPANY }}</w:t></w:r></w:p>
    <w:p><w:r><w:t>{{ ADDRESS }}</w:t></w:r></w:p>
    <w:p><w:r><w:t>{{ HMAN</w:t></w:r><w:r><w:t>AGER }},</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">I am applying for the {{ ROLE }} role.</w:t></w:r></w:p>
    <w:p><w:r><w:t>{{ NAME }}</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

fn zip_package(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn template_bytes() -> Vec<u8> {
    zip_package(&[
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
        ),
        ("word/document.xml", LETTER),
    ])
}

fn workbook_bytes() -> Vec<u8> {
    zip_package(&[
        (
            "[Content_Types].xml",
            r#"<Types><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<Relationships><Relationship Id="rId1" Type="http://x/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#,
        ),
        (
            "xl/sharedStrings.xml",
            r#"<sst><si><t>Company Name</t></si><si><t>Job Title</t></si><si><t>Date Applied</t></si><si><t>Globex</t></si><si><t>Analyst</t></si></sst>"#,
        ),
        (
            "xl/worksheets/sheet1.xml",
            r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="s"><v>2</v></c></row><row r="2"><c r="A2" t="s"><v>3</v></c><c r="B2" t="s"><v>4</v></c><c r="C2"><v>45074</v></c></row></sheetData></worksheet>"#,
        ),
    ])
}

/// Records conversions and writes a placeholder PDF.
#[derive(Clone, Default)]
struct FakeConverter {
    calls: Rc<RefCell<Vec<PathBuf>>>,
    fail: bool,
}

impl Converter for FakeConverter {
    fn convert(&self, source: &Path, target: &Path) -> Result<()> {
        self.calls.borrow_mut().push(source.to_path_buf());
        if self.fail {
            return Err(Error::Conversion {
                path: source.to_path_buf(),
                message: "converter unavailable".to_string(),
            });
        }
        fs::write(target, b"%PDF-1.4")?;
        Ok(())
    }
}

struct Fixture {
    dir: tempfile::TempDir,
    template: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("cover-letter-template.docx");
        fs::write(&template, template_bytes()).unwrap();
        Self { dir, template }
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn options(&self) -> GenerateOptions {
        GenerateOptions::new()
            .with_template(&self.template)
            .with_output_root(self.out())
            .with_name("Jane Doe")
            .with_today(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    }
}

fn document_text(path: &Path) -> String {
    OoxmlContainer::open(path)
        .unwrap()
        .read_xml("word/document.xml")
        .unwrap()
}

fn table(csv: &str) -> covergen::Table {
    read_table_bytes(csv.as_bytes().to_vec(), None).unwrap()
}

#[test]
fn test_single_with_folder() {
    let fx = Fixture::new();
    let converter = FakeConverter::default();
    let generator = Generator::new(fx.options(), converter.clone()).unwrap();

    let record = ApplicationRecord::new("Jane Doe", "Acme", "Engineer")
        .with(Field::HiringManager, Some("Ms. Smith"))
        .with(Field::Date, Some("May 28, 2023"));
    let summary = run_single(&generator, &record).unwrap();

    let document = fx.out().join("Acme/Jane Doe-Acme-Engineer-Cover-Letter.docx");
    let pdf = fx.out().join("Acme/Jane Doe-Acme-Engineer-Cover-Letter.pdf");
    assert!(document.is_file());
    assert!(pdf.is_file());
    assert_eq!(summary.generated, 1);
    assert_eq!(summary.converted, 1);
    assert_eq!(converter.calls.borrow().as_slice(), [document.clone()]);

    let text = document_text(&document);
    assert!(text.contains("May 28, 2023"));
    assert!(text.contains("Dear Ms. Smith,"));
    assert!(text.contains("I am applying for the Engineer role."));
    assert!(!text.contains("{{"));
}

#[test]
fn test_single_without_folder_or_pdf() {
    let fx = Fixture::new();
    let converter = FakeConverter::default();
    let options = fx.options().with_subfolder(false).with_fixed_layout(false);
    let generator = Generator::new(options, converter.clone()).unwrap();

    let record = ApplicationRecord::new("Jane Doe", "Acme", "Engineer");
    let summary = run_single(&generator, &record).unwrap();

    let document = fx.out().join("Jane Doe-Acme-Engineer-Cover-Letter.docx");
    assert!(document.is_file());
    assert_eq!(summary.outputs[0].paths.fixed_layout, None);
    assert_eq!(summary.converted, 0);
    assert!(converter.calls.borrow().is_empty());

    let text = document_text(&document);
    assert!(text.contains("January 15, 2024"));
    assert!(text.contains("Dear Hiring Manager,"));
}

#[test]
fn test_single_rejects_blank_company_or_role() {
    let fx = Fixture::new();
    let converter = FakeConverter::default();
    let generator = Generator::new(fx.options(), converter.clone()).unwrap();

    let err = run_single(&generator, &ApplicationRecord::new("Jane", "", "")).unwrap_err();
    assert_eq!(err.to_string(), "Invalid option: company must not be empty");

    let err = run_single(&generator, &ApplicationRecord::new("Jane", "Acme", "  ")).unwrap_err();
    assert!(matches!(err, Error::InvalidOption(ref m) if m == "role must not be empty"));

    assert!(!fx.out().exists());
    assert!(converter.calls.borrow().is_empty());
}

#[test]
fn test_batch_skips_applied_and_isolates_failures() {
    let fx = Fixture::new();
    let generator = Generator::new(fx.options(), FakeConverter::default()).unwrap();
    let apps = table(
        "Company,Role,Hiring Manager,Date,Address,Status\n\
         Acme,Engineer,Ms. Smith,2023-05-28,\"123 Main St, Springfield, IL 62701\",\n\
         Globex,Dev,,not-a-date,Springfield,Applied\n\
         Initech,,,,,\n\
         Umbrella,QA,,,Springfield,Not Applied\n",
    );

    let mut seen = Vec::new();
    let summary = run_batch(&generator, &apps, |row, outcome| {
        let kind = match outcome {
            RowOutcome::Generated(_) => "generated",
            RowOutcome::Skipped => "skipped",
            RowOutcome::Failed(_) => "failed",
        };
        seen.push((row, kind));
    })
    .unwrap();

    assert_eq!(
        seen,
        vec![(1, "generated"), (2, "skipped"), (3, "failed"), (4, "generated")]
    );
    assert_eq!(summary.generated, 2);
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].row, 3);
    assert_eq!(summary.failures[0].message, "empty role cell");
    assert_eq!(summary.tally.count(Field::Address), 1);
    // Umbrella has no date; Initech fails before its fields are resolved
    assert_eq!(summary.tally.count(Field::Date), 1);

    let acme = fx.out().join("Acme/Jane Doe-Acme-Engineer-Cover-Letter.docx");
    let text = document_text(&acme);
    assert!(text.contains("123 Main St</w:t><w:br/>"));
    assert!(text.contains("Springfield, IL 62701"));
    assert!(text.contains("May 28, 2023"));
    assert!(fx.out().join("Umbrella/Jane Doe-Umbrella-QA-Cover-Letter.docx").is_file());
    assert!(!fx.out().join("Globex").exists());
}

#[test]
fn test_batch_missing_role_column_is_fatal() {
    let fx = Fixture::new();
    let generator = Generator::new(fx.options(), FakeConverter::default()).unwrap();
    let apps = table("Company,Hiring Manager\nAcme,Ms. Smith\n");

    let err = run_batch(&generator, &apps, |_, _| {}).unwrap_err();
    match err {
        Error::Schema { missing } => assert_eq!(missing, vec!["role"]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!fx.out().exists());
}

#[test]
fn test_batch_from_workbook() {
    let fx = Fixture::new();
    let generator = Generator::new(fx.options(), FakeConverter::default()).unwrap();
    let apps = read_table_bytes(workbook_bytes(), Some(Path::new("apps.xlsx"))).unwrap();

    let summary = run_batch(&generator, &apps, |_, _| {}).unwrap();
    assert_eq!(summary.generated, 1);

    let document = fx.out().join("Globex/Jane Doe-Globex-Analyst-Cover-Letter.docx");
    let text = document_text(&document);
    // Serial 45074 is 2023-05-28
    assert!(text.contains("May 28, 2023"));
    assert!(text.contains("Analyst"));
}

#[test]
fn test_name_column_overrides_default() {
    let fx = Fixture::new();
    let generator = Generator::new(fx.options(), FakeConverter::default()).unwrap();
    let apps = table("company,role,name\nAcme,QA,John Roe\nGlobex,QA,\n");

    let summary = run_batch(&generator, &apps, |_, _| {}).unwrap();
    assert_eq!(summary.outputs[0].paths.base_name, "John Roe-Acme-QA-Cover-Letter");
    assert_eq!(summary.outputs[1].paths.base_name, "Jane Doe-Globex-QA-Cover-Letter");
}

#[test]
fn test_conversion_failure_keeps_document() {
    let fx = Fixture::new();
    let converter = FakeConverter {
        fail: true,
        ..Default::default()
    };
    let generator = Generator::new(fx.options(), converter).unwrap();

    let record = ApplicationRecord::new("Jane Doe", "Acme", "Engineer");
    let summary = run_single(&generator, &record).unwrap();

    assert_eq!(summary.generated, 1);
    assert_eq!(summary.converted, 0);
    assert!(!summary.outputs[0].converted);
    assert!(summary.outputs[0].paths.document.is_file());
}

#[test]
fn test_dry_run_writes_nothing() {
    let fx = Fixture::new();
    let converter = FakeConverter::default();
    let generator = Generator::new(fx.options().with_dry_run(true), converter.clone()).unwrap();
    let apps = table("company,role,event\nAcme,QA,RustConf\n");

    let summary = run_batch(&generator, &apps, |_, _| {}).unwrap();
    assert_eq!(summary.generated, 1);
    assert!(!summary.outputs[0].written);
    assert_eq!(summary.outputs[0].context.get("EVENT"), Some("RustConf"));
    assert!(!fx.out().exists());
    assert!(converter.calls.borrow().is_empty());
}

#[test]
fn test_missing_template() {
    let fx = Fixture::new();
    let options = fx.options().with_template(fx.dir.path().join("nope.docx"));
    let err = Generator::new(options, FakeConverter::default()).unwrap_err();
    assert!(matches!(err, Error::TemplateNotFound { .. }));
    assert!(err.is_fatal());
}
