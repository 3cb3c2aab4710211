//! Application records.

use crate::error::{Error, Result};
use crate::schema::{ColumnMapping, Field};
use serde::Serialize;

/// One cover letter to generate.
///
/// Optional members are `None` when the value is absent or blank; setters
/// trim and collapse blanks so callers never see `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationRecord {
    pub name: String,
    pub company: String,
    pub role: String,
    pub address: Option<String>,
    pub event: Option<String>,
    pub contact: Option<String>,
    pub referral: Option<String>,
    pub hiring_manager: Option<String>,
    pub convo1: Option<String>,
    pub convo2: Option<String>,
    pub other1: Option<String>,
    pub other2: Option<String>,
    /// Raw date text, resolved at render time
    pub date: Option<String>,
    /// Raw applied marker
    pub applied: Option<String>,
}

fn clean(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ApplicationRecord {
    /// Create a record with the identifying fields set.
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            company: company.into().trim().to_string(),
            role: role.into().trim().to_string(),
            ..Default::default()
        }
    }

    /// Set a field from raw text. Blank text clears optional fields and
    /// leaves required ones untouched.
    pub fn set(&mut self, field: Field, value: &str) {
        let value = clean(value);
        match field {
            Field::Name | Field::Company | Field::Role => {
                if let Some(v) = value {
                    *self.required_mut(field) = v;
                }
            }
            _ => {
                if let Some(slot) = self.optional_mut(field) {
                    *slot = value;
                }
            }
        }
    }

    /// Builder form of [`set`](Self::set) for optional values.
    pub fn with(mut self, field: Field, value: Option<&str>) -> Self {
        if let Some(v) = value {
            self.set(field, v);
        }
        self
    }

    /// Value of a field, `None` when absent.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => Some(self.name.as_str()),
            Field::Company => Some(self.company.as_str()),
            Field::Role => Some(self.role.as_str()),
            Field::Address => self.address.as_deref(),
            Field::Event => self.event.as_deref(),
            Field::Contact => self.contact.as_deref(),
            Field::Referral => self.referral.as_deref(),
            Field::HiringManager => self.hiring_manager.as_deref(),
            Field::Convo1 => self.convo1.as_deref(),
            Field::Convo2 => self.convo2.as_deref(),
            Field::Other1 => self.other1.as_deref(),
            Field::Other2 => self.other2.as_deref(),
            Field::Date => self.date.as_deref(),
            Field::Applied => self.applied.as_deref(),
        }
        .filter(|s| !s.is_empty())
    }

    /// Build a record from one batch row.
    ///
    /// `row` is the 1-based data row number used in errors. A `name` column
    /// overrides `default_name` when the cell is filled in.
    pub fn from_row(
        row: usize,
        cells: &[String],
        mapping: &ColumnMapping,
        default_name: &str,
    ) -> Result<Self> {
        let mut record = ApplicationRecord::new(default_name, "", "");
        for field in mapping.fields() {
            if let Some(cell) = mapping.cell(cells, field) {
                record.set(field, cell);
            }
        }

        if let Some(field) = record.missing_required() {
            return Err(Error::Row {
                row,
                message: format!("empty {} cell", field),
            });
        }
        Ok(record)
    }

    /// First required field (company, role) left blank.
    pub fn missing_required(&self) -> Option<Field> {
        Field::REQUIRED
            .into_iter()
            .find(|field| self.get(*field).is_none())
    }

    fn required_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Company => &mut self.company,
            _ => &mut self.role,
        }
    }

    fn optional_mut(&mut self, field: Field) -> Option<&mut Option<String>> {
        match field {
            Field::Address => Some(&mut self.address),
            Field::Event => Some(&mut self.event),
            Field::Contact => Some(&mut self.contact),
            Field::Referral => Some(&mut self.referral),
            Field::HiringManager => Some(&mut self.hiring_manager),
            Field::Convo1 => Some(&mut self.convo1),
            Field::Convo2 => Some(&mut self.convo2),
            Field::Other1 => Some(&mut self.other1),
            Field::Other2 => Some(&mut self.other2),
            Field::Date => Some(&mut self.date),
            Field::Applied => Some(&mut self.applied),
            Field::Name | Field::Company | Field::Role => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_set_trims_and_clears() {
        let mut record = ApplicationRecord::new("Jane Doe", "Acme", "Engineer");
        record.set(Field::Event, "  Career Fair ");
        assert_eq!(record.get(Field::Event), Some("Career Fair"));

        record.set(Field::Event, "   ");
        assert_eq!(record.get(Field::Event), None);

        record.set(Field::Company, "");
        assert_eq!(record.company, "Acme");
    }

    #[test]
    fn test_from_row() {
        let header = ["Company", "Role", "Hiring Manager", "Applied", "Salary"];
        let mapping = ColumnMapping::from_header(&header).unwrap();
        let cells = row(&["Acme", "Engineer", "Ms. Smith", "", "100k"]);

        let record = ApplicationRecord::from_row(1, &cells, &mapping, "Jane Doe").unwrap();
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.company, "Acme");
        assert_eq!(record.hiring_manager.as_deref(), Some("Ms. Smith"));
        assert_eq!(record.applied, None);
        assert_eq!(record.event, None);
    }

    #[test]
    fn test_from_row_name_override() {
        let header = ["Name", "Company", "Role"];
        let mapping = ColumnMapping::from_header(&header).unwrap();

        let record =
            ApplicationRecord::from_row(1, &row(&["John Roe", "Acme", "QA"]), &mapping, "Jane Doe")
                .unwrap();
        assert_eq!(record.name, "John Roe");

        let record =
            ApplicationRecord::from_row(2, &row(&["", "Acme", "QA"]), &mapping, "Jane Doe").unwrap();
        assert_eq!(record.name, "Jane Doe");
    }

    #[test]
    fn test_from_row_empty_role() {
        let header = ["Company", "Role"];
        let mapping = ColumnMapping::from_header(&header).unwrap();

        let err = ApplicationRecord::from_row(4, &row(&["Acme"]), &mapping, "Jane Doe").unwrap_err();
        match err {
            Error::Row { row, message } => {
                assert_eq!(row, 4);
                assert_eq!(message, "empty role cell");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
