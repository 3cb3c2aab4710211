//! Template render context.

use crate::record::ApplicationRecord;
use crate::resolve::{resolve_address, salutation, DateResolver, ErrorTally};
use crate::schema::Field;
use serde::Serialize;
use std::collections::BTreeMap;

/// Older placeholder spellings and the placeholder they read from.
const ALIASES: &[(&str, &str)] = &[("OTHER", "OTHER1")];

fn canonical(placeholder: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == placeholder)
        .map_or(placeholder, |(_, target)| *target)
}

/// Placeholder values for one rendered letter.
///
/// Every placeholder of the canonical field set has a key; `None` marks an
/// absent value and renders as empty text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderContext {
    values: BTreeMap<&'static str, Option<String>>,
}

impl RenderContext {
    /// All placeholder names the context provides.
    pub fn placeholders() -> impl Iterator<Item = &'static str> {
        Field::ALL.iter().filter_map(|f| f.placeholder())
    }

    /// Context with every placeholder present and absent.
    pub fn empty() -> Self {
        Self {
            values: Self::placeholders().map(|p| (p, None)).collect(),
        }
    }

    /// Resolve every field of a record.
    ///
    /// Date and address failures fall back (today / empty) and are counted
    /// in `tally`. The hiring manager is rendered as a salutation.
    pub fn build(
        record: &ApplicationRecord,
        dates: &DateResolver,
        salutation_fallback: &str,
        tally: &mut ErrorTally,
    ) -> Self {
        let mut ctx = Self::empty();
        for field in Field::ALL {
            let Some(key) = field.placeholder() else {
                continue;
            };
            let value = match field {
                Field::Date => Some(dates.resolve(record.get(Field::Date), tally)),
                Field::Address => Some(resolve_address(record.get(Field::Address), tally)),
                Field::HiringManager => Some(salutation(
                    record.get(Field::HiringManager),
                    salutation_fallback,
                )),
                other => record.get(other).map(str::to_string),
            };
            ctx.values.insert(key, value.filter(|v| !v.is_empty()));
        }
        ctx
    }

    /// Value for a placeholder; `None` when absent or unknown.
    ///
    /// `OTHER` reads the `OTHER1` value.
    pub fn get(&self, placeholder: &str) -> Option<&str> {
        self.values
            .get(canonical(placeholder))
            .and_then(|v| v.as_deref())
    }

    /// Whether the placeholder (or an alias of it) is part of the context.
    pub fn contains_key(&self, placeholder: &str) -> bool {
        self.values.contains_key(canonical(placeholder))
    }

    /// Override a placeholder value.
    pub fn insert(&mut self, placeholder: &'static str, value: Option<String>) {
        self.values.insert(placeholder, value);
    }

    /// Iterate over placeholder/value pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        self.values.iter().map(|(k, v)| (*k, v.as_deref()))
    }

    /// Number of placeholders.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the context has no placeholders.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
