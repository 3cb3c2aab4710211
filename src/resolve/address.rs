//! Free-text mailing address formatting.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// `<state> <postal>`: the postal code starts alphanumeric and carries a digit.
static STATE_POSTAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<state>[^\d,]+)\s+(?P<postal>[A-Za-z0-9][A-Za-z0-9 \-]*)$")
        .expect("state/postal pattern is valid")
});

/// Why an address could not be formatted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address needs street, city and \"state postal\" segments, found {0}")]
    TooFewSegments(usize),

    #[error("address segment {0:?} is not \"state postal_code\"")]
    BadStatePostal(String),

    #[error("address has an empty street or city")]
    EmptySegment,
}

/// Format `"street, city, STATE POSTAL"` as a two-line address.
///
/// Everything before the last two segments is the street, so suite or unit
/// segments stay on the first line.
///
/// ```
/// use covergen::resolve::format_address;
///
/// let formatted = format_address("123 Main St, Springfield, IL 62701").unwrap();
/// assert_eq!(formatted, "123 Main St\nSpringfield, IL 62701");
/// ```
pub fn format_address(raw: &str) -> Result<String, AddressError> {
    let segments: Vec<&str> = raw.split(',').map(str::trim).collect();
    if segments.len() < 3 {
        return Err(AddressError::TooFewSegments(segments.len()));
    }

    let (street, rest) = segments.split_at(segments.len() - 2);
    let city = rest[0];
    let state_postal = rest[1];

    if street.iter().any(|s| s.is_empty()) || city.is_empty() {
        return Err(AddressError::EmptySegment);
    }

    let caps = STATE_POSTAL
        .captures(state_postal)
        .filter(|c| c["postal"].chars().any(|ch| ch.is_ascii_digit()))
        .ok_or_else(|| AddressError::BadStatePostal(state_postal.to_string()))?;

    let state = caps["state"].trim();
    let postal = caps["postal"].trim();

    Ok(format!("{}\n{}, {} {}", street.join(", "), city, state, postal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_segments() {
        assert_eq!(
            format_address("123 Main St, Springfield, IL 62701").unwrap(),
            "123 Main St\nSpringfield, IL 62701"
        );
    }

    #[test]
    fn test_extra_whitespace() {
        assert_eq!(
            format_address("  1 Infinite Loop ,Cupertino,   CA   95014 ").unwrap(),
            "1 Infinite Loop\nCupertino, CA 95014"
        );
    }

    #[test]
    fn test_multi_word_state_and_suite() {
        assert_eq!(
            format_address("Suite 400, 350 5th Ave, New York, New York 10118").unwrap(),
            "Suite 400, 350 5th Ave\nNew York, New York 10118"
        );
    }

    #[test]
    fn test_alphanumeric_postal() {
        assert_eq!(
            format_address("80 Wellington St, Ottawa, ON K1A 0A2").unwrap(),
            "80 Wellington St\nOttawa, ON K1A 0A2"
        );
    }

    #[test]
    fn test_too_few_segments() {
        assert_eq!(
            format_address("Springfield"),
            Err(AddressError::TooFewSegments(1))
        );
        assert_eq!(
            format_address("123 Main St, Springfield"),
            Err(AddressError::TooFewSegments(2))
        );
    }

    #[test]
    fn test_malformed_state_postal() {
        assert!(matches!(
            format_address("123 Main St, Springfield, IL"),
            Err(AddressError::BadStatePostal(_))
        ));
        assert!(matches!(
            format_address("123 Main St, Springfield, Illinois USA"),
            Err(AddressError::BadStatePostal(_))
        ));
    }

    #[test]
    fn test_empty_city() {
        assert_eq!(
            format_address("123 Main St, , IL 62701"),
            Err(AddressError::EmptySegment)
        );
    }
}
