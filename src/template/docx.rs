//! Word template rendering.

use super::placeholder::{find_placeholders, substitute_segments};
use crate::container::OoxmlContainer;
use crate::context::RenderContext;
use crate::detect::{detect_format_from_bytes, FormatType};
use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

const DOCUMENT_PART: &str = "word/document.xml";

/// A `.docx` template with `{{ NAME }}` placeholders.
///
/// The package is read once; every [`render`](Self::render) writes a fresh
/// copy with placeholders in the body, headers and footers replaced.
#[derive(Debug)]
pub struct DocxTemplate {
    path: PathBuf,
    container: OoxmlContainer,
    parts: Vec<String>,
    placeholders: BTreeSet<String>,
}

impl DocxTemplate {
    /// Open a template file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|_| Error::TemplateNotFound {
            path: path.to_path_buf(),
        })?;
        Self::from_bytes(path, data)
    }

    /// Load a template from memory. `path` is only used in messages.
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self> {
        let path = path.into();
        let invalid = |reason: String| Error::InvalidTemplate {
            path: path.clone(),
            reason,
        };

        match detect_format_from_bytes(&data) {
            Ok(FormatType::Docx) => {}
            Ok(other) => return Err(invalid(format!("expected a Word document, found {}", other))),
            Err(e) => return Err(invalid(e.to_string())),
        }

        let container = OoxmlContainer::from_bytes(data).map_err(|e| invalid(e.to_string()))?;
        if !container.exists(DOCUMENT_PART) {
            return Err(invalid(format!("missing {}", DOCUMENT_PART)));
        }

        let mut parts = vec![DOCUMENT_PART.to_string()];
        parts.extend(
            container
                .list_files_with_prefix("word/")
                .into_iter()
                .filter(|name| is_header_or_footer(name)),
        );

        let mut placeholders = BTreeSet::new();
        for part in &parts {
            let xml = container.read_xml(part)?;
            collect_placeholders(&xml, &mut placeholders).map_err(|e| invalid(e.to_string()))?;
        }
        tracing::debug!(path = %path.display(), parts = parts.len(), "loaded template");

        Ok(Self {
            path,
            container,
            parts,
            placeholders,
        })
    }

    /// Template file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Placeholder names used anywhere in the template.
    pub fn placeholders(&self) -> &BTreeSet<String> {
        &self.placeholders
    }

    /// Render the template with `context`.
    ///
    /// Names are looked up as written, then upper-cased; placeholders the
    /// context does not know render as empty text.
    pub fn render(&self, context: &RenderContext) -> Result<RenderedDocument> {
        let mut lookup = |name: &str| {
            context
                .get(name)
                .or_else(|| context.get(&name.to_ascii_uppercase()))
                .unwrap_or_default()
                .to_string()
        };

        let mut replacements = HashMap::new();
        for part in &self.parts {
            let xml = self.container.read_xml(part)?;
            if let Some(rendered) = render_part(&xml, &mut lookup)? {
                replacements.insert(part.clone(), rendered);
            }
        }

        Ok(RenderedDocument {
            bytes: self.container.repack(&replacements)?,
        })
    }
}

/// A rendered `.docx` package.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    bytes: Vec<u8>,
}

impl RenderedDocument {
    /// Package bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume into package bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write the package to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }
}

fn is_header_or_footer(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    !file.contains('/')
        && file.ends_with(".xml")
        && (file.starts_with("header") || file.starts_with("footer"))
}

/// Gather placeholder names paragraph by paragraph.
fn collect_placeholders(xml: &str, names: &mut BTreeSet<String>) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut in_text = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:p" => paragraphs.push(String::new()),
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::End(e) if e.name().as_ref() == b"w:p" => {
                if let Some(text) = paragraphs.pop() {
                    names.extend(find_placeholders(&text).into_iter().map(String::from));
                }
            }
            Event::Text(e) if in_text => {
                if let Some(text) = paragraphs.last_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

/// Substitute placeholders in one XML part.
///
/// Returns `None` when the part has no placeholders, so it can be copied
/// unchanged.
fn render_part(xml: &str, lookup: &mut dyn FnMut(&str) -> String) -> Result<Option<Vec<u8>>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut events: Vec<Event<'static>> = Vec::new();
    // Indices of `w:t` text events, grouped by enclosing paragraph. Text
    // boxes nest paragraphs, hence the stack.
    let mut open: Vec<Vec<usize>> = Vec::new();
    let mut paragraphs: Vec<Vec<usize>> = Vec::new();
    let mut in_text = false;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(e) if e.name().as_ref() == b"w:p" => open.push(Vec::new()),
            Event::End(e) if e.name().as_ref() == b"w:p" => paragraphs.extend(open.pop()),
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) if e.name().as_ref() == b"w:t" => in_text = false,
            Event::Text(_) if in_text => {
                if let Some(group) = open.last_mut() {
                    group.push(events.len());
                }
            }
            Event::Eof => break,
            _ => {}
        }
        events.push(event.into_owned());
    }

    let mut expanded: HashMap<usize, Vec<Event<'static>>> = HashMap::new();
    for group in paragraphs {
        let mut segments = group
            .iter()
            .map(|&i| match &events[i] {
                Event::Text(t) => t.unescape().map(|s| s.into_owned()),
                _ => Ok(String::new()),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if !substitute_segments(&mut segments, &mut *lookup) {
            continue;
        }

        for (&index, text) in group.iter().zip(segments) {
            if let Some(Event::Start(start)) = index.checked_sub(1).map(|i| &events[i]) {
                if start.name().as_ref() == b"w:t" {
                    let preserved = preserve_space(start);
                    events[index - 1] = Event::Start(preserved);
                }
            }
            expanded.insert(index, text_with_breaks(&text));
        }
    }

    if expanded.is_empty() {
        return Ok(None);
    }

    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    for (index, event) in events.into_iter().enumerate() {
        match expanded.remove(&index) {
            Some(replacement) => {
                for e in replacement {
                    writer.write_event(e)?;
                }
            }
            None => writer.write_event(event)?,
        }
    }
    Ok(Some(writer.into_inner()))
}

/// Copy a `w:t` start tag with `xml:space="preserve"` set, so leading and
/// trailing spaces of substituted values survive.
fn preserve_space(start: &BytesStart<'_>) -> BytesStart<'static> {
    let mut tag = BytesStart::new("w:t");
    tag.extend_attributes(
        start
            .attributes()
            .flatten()
            .filter(|a| a.key.as_ref() != b"xml:space"),
    );
    tag.push_attribute(("xml:space", "preserve"));
    tag.into_owned()
}

/// Text events for a substituted `w:t` body; `\n` becomes `<w:br/>`.
fn text_with_breaks(text: &str) -> Vec<Event<'static>> {
    let mut events = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            events.push(Event::End(BytesEnd::new("w:t")));
            events.push(Event::Empty(BytesStart::new("w:br")));
            events.push(Event::Start(
                BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
            ));
        }
        events.push(Event::Text(
            BytesText::new(line.trim_end_matches('\r')).into_owned(),
        ));
    }
    events
}
