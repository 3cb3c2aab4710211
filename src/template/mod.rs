//! Cover-letter templates.
//!
//! A template is an ordinary Word document containing `{{ NAME }}` markers
//! (see [`crate::schema::Field::placeholder`] for the names). Only plain
//! substitution is supported; run formatting around a marker is kept.

mod docx;
mod placeholder;

pub use docx::{DocxTemplate, RenderedDocument};
pub use placeholder::{find_placeholders, substitute_segments};
