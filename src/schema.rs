//! Canonical field set and batch header normalization.
//!
//! Application lists come from hand-maintained spreadsheets, so column names
//! drift in spelling and case. Every header is normalized once and matched
//! against a declarative synonym table; the resulting [`ColumnMapping`] is
//! the only way downstream code looks up a cell.

use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// A recognized application attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Company,
    Role,
    Date,
    Address,
    Event,
    Contact,
    Referral,
    #[serde(rename = "hmanager")]
    HiringManager,
    Convo1,
    Convo2,
    Other1,
    Other2,
    Applied,
    Name,
}

impl Field {
    /// Every canonical field, in declaration order.
    pub const ALL: [Field; 14] = [
        Field::Company,
        Field::Role,
        Field::Date,
        Field::Address,
        Field::Event,
        Field::Contact,
        Field::Referral,
        Field::HiringManager,
        Field::Convo1,
        Field::Convo2,
        Field::Other1,
        Field::Other2,
        Field::Applied,
        Field::Name,
    ];

    /// Fields a batch table must provide.
    pub const REQUIRED: [Field; 2] = [Field::Company, Field::Role];

    /// Returns the canonical lowercase identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Field::Company => "company",
            Field::Role => "role",
            Field::Date => "date",
            Field::Address => "address",
            Field::Event => "event",
            Field::Contact => "contact",
            Field::Referral => "referral",
            Field::HiringManager => "hmanager",
            Field::Convo1 => "convo1",
            Field::Convo2 => "convo2",
            Field::Other1 => "other1",
            Field::Other2 => "other2",
            Field::Applied => "applied",
            Field::Name => "name",
        }
    }

    /// Returns the template placeholder filled from this field, if any.
    ///
    /// The applied marker only drives row filtering and never reaches the
    /// template.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Field::Company => Some("COMPANY"),
            Field::Role => Some("ROLE"),
            Field::Date => Some("DATE"),
            Field::Address => Some("ADDRESS"),
            Field::Event => Some("EVENT"),
            Field::Contact => Some("CONTACT"),
            Field::Referral => Some("REFERRAL"),
            Field::HiringManager => Some("HMANAGER"),
            Field::Convo1 => Some("CONVO1"),
            Field::Convo2 => Some("CONVO2"),
            Field::Other1 => Some("OTHER1"),
            Field::Other2 => Some("OTHER2"),
            Field::Applied => None,
            Field::Name => Some("NAME"),
        }
    }

    /// Looks up a field by its canonical identifier.
    pub fn from_id(id: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.id() == id)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// One row of the synonym table.
struct Synonym {
    pattern: Regex,
    field: Field,
}

fn synonym(pattern: &str, field: Field) -> Synonym {
    Synonym {
        pattern: Regex::new(pattern).expect("synonym patterns are valid"),
        field,
    }
}

/// Header synonyms, matched against normalized names (see [`normalize_header`]).
///
/// Each canonical identifier must match its own pattern so that normalizing
/// an already-canonical header is a no-op. New spellings go here.
static SYNONYMS: LazyLock<Vec<Synonym>> = LazyLock::new(|| {
    vec![
        synonym(r"^(company|company name|employer|organi[sz]ation|firm)$", Field::Company),
        synonym(r"^(role|position|job|job title|title|role name)$", Field::Role),
        synonym(r"^(date|date applied|application date|applied on|deadline date)$", Field::Date),
        synonym(r"^(address|company address|location|mailing address)$", Field::Address),
        synonym(r"^(events?|event name|events attended)$", Field::Event),
        synonym(r"^(contacts?|contact name|point of contact)$", Field::Contact),
        synonym(r"^(referral|referrer|referred by|referee)$", Field::Referral),
        synonym(r"^(h ?manager|hiring ?manager|recruiter|hiring contact)$", Field::HiringManager),
        synonym(r"^(conv(o|ersation)? ?1|conv(o|ersation)?)$", Field::Convo1),
        synonym(r"^conv(o|ersation)? ?2$", Field::Convo2),
        synonym(r"^(other ?1|other|notes?)$", Field::Other1),
        synonym(r"^other ?2$", Field::Other2),
        synonym(r"^(applied\??|status|application status|sent)$", Field::Applied),
        synonym(r"^(name|applicant|applicant name|your name)$", Field::Name),
    ]
});

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_\-.]+").expect("separator pattern is valid"));

/// Normalize a raw header name for synonym matching.
///
/// NFKC-folds compatibility characters (non-breaking spaces, full-width
/// letters), lowercases, and collapses whitespace, `_`, `-` and `.` runs to
/// a single space.
pub fn normalize_header(raw: &str) -> String {
    let folded: String = raw.nfkc().collect::<String>().to_lowercase();
    SEPARATORS.replace_all(folded.trim(), " ").trim().to_string()
}

/// Resolve a raw header name to a canonical field.
pub fn canonical_field(raw: &str) -> Option<Field> {
    let name = normalize_header(raw);
    if name.is_empty() {
        return None;
    }
    SYNONYMS
        .iter()
        .find(|s| s.pattern.is_match(&name))
        .map(|s| s.field)
}

/// Association between batch table columns and canonical fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Field to column position
    positions: BTreeMap<Field, usize>,
    /// Column position to field (None for dropped columns)
    columns: Vec<Option<Field>>,
}

impl ColumnMapping {
    /// Build a mapping from a table header.
    ///
    /// Unrecognized columns are dropped. When two columns resolve to the
    /// same field the first one wins. Fails when `company` or `role` is not
    /// present.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Result<Self> {
        let mut mapping = ColumnMapping {
            positions: BTreeMap::new(),
            columns: Vec::with_capacity(header.len()),
        };

        for (pos, raw) in header.iter().enumerate() {
            let raw = raw.as_ref();
            let field = match canonical_field(raw) {
                Some(field) if mapping.positions.contains_key(&field) => {
                    tracing::warn!(column = raw, %field, "duplicate column ignored");
                    None
                }
                Some(field) => {
                    mapping.positions.insert(field, pos);
                    Some(field)
                }
                None => {
                    tracing::debug!(column = raw, "unrecognized column dropped");
                    None
                }
            };
            mapping.columns.push(field);
        }

        let missing: Vec<&'static str> = Field::REQUIRED
            .iter()
            .filter(|f| !mapping.positions.contains_key(*f))
            .map(|f| f.id())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Schema { missing });
        }

        Ok(mapping)
    }

    /// Column position of a field, if the table has it.
    pub fn position(&self, field: Field) -> Option<usize> {
        self.positions.get(&field).copied()
    }

    /// Field stored at a column position, if the column was recognized.
    pub fn field_at(&self, position: usize) -> Option<Field> {
        self.columns.get(position).copied().flatten()
    }

    /// Whether the table has a column for this field.
    pub fn contains(&self, field: Field) -> bool {
        self.positions.contains_key(&field)
    }

    /// The set of canonical fields present in the table.
    pub fn fields(&self) -> BTreeSet<Field> {
        self.positions.keys().copied().collect()
    }

    /// Raw cell for a field in a row; `None` when the column is absent or
    /// the row is shorter than the header.
    pub fn cell<'r>(&self, row: &'r [String], field: Field) -> Option<&'r str> {
        self.position(field)
            .and_then(|pos| row.get(pos))
            .map(|s| s.as_str())
    }
}
