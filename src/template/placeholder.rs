//! `{{ NAME }}` placeholder matching.
//!
//! Word splits text into runs wherever formatting, spell-check state or edit
//! history changes, so a placeholder typed as `{{ COMPANY }}` may arrive as
//! `{{ COMP`, `ANY }`, `}`. Substitution therefore works on the concatenated
//! text of a paragraph and writes the result back into the original runs.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid placeholder regex")
});

/// Placeholder names used in `text`, in order of appearance.
pub fn find_placeholders(text: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Replace every placeholder spanning `segments` with `value_for(name)`.
///
/// The replacement lands in the segment where the placeholder starts; the
/// rest of the placeholder is removed from the segments it spills into.
/// Text outside placeholders stays in its segment. Returns whether anything
/// was replaced.
pub fn substitute_segments<F>(segments: &mut [String], mut value_for: F) -> bool
where
    F: FnMut(&str) -> String,
{
    let joined = segments.concat();
    let matches: Vec<(Range<usize>, String)> = PLACEHOLDER
        .captures_iter(&joined)
        .filter_map(|c| {
            let whole = c.get(0)?;
            let name = c.get(1)?;
            Some((whole.range(), value_for(name.as_str())))
        })
        .collect();
    if matches.is_empty() {
        return false;
    }

    // Original segment bounds within `joined`
    let mut bounds = Vec::with_capacity(segments.len());
    let mut offset = 0;
    for segment in segments.iter() {
        bounds.push(offset..offset + segment.len());
        offset += segment.len();
    }

    // Back to front, so local offsets of earlier matches stay valid
    for (range, value) in matches.into_iter().rev() {
        let mut value = Some(value);
        for (segment, bound) in segments.iter_mut().zip(&bounds) {
            let start = range.start.max(bound.start);
            let end = range.end.min(bound.end);
            if start >= end {
                continue;
            }
            let local = (start - bound.start)..(end - bound.start);
            segment.replace_range(local, value.take().as_deref().unwrap_or(""));
        }
    }
    true
}
