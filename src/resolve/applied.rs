//! "Applied" marker normalization.

/// Spellings that mean the application is still to be sent.
const NOT_APPLIED: &[&str] = &[
    "", "not applied", "not sent", "no", "n", "false", "0", "pending", "todo", "to do", "-",
];

/// Spellings that mean the application was already sent.
const APPLIED: &[&str] = &[
    "applied", "sent", "submitted", "done", "yes", "y", "x", "true", "1", "✓", "✔",
];

/// Whether an applied-marker cell marks the row as already sent.
///
/// Unknown non-empty values count as applied, so a row is only regenerated
/// when its marker is blank or explicitly negative.
pub fn is_applied(raw: Option<&str>) -> bool {
    let Some(raw) = raw else {
        return false;
    };
    let value = raw.trim().to_lowercase();
    if NOT_APPLIED.contains(&value.as_str()) {
        return false;
    }
    if !APPLIED.contains(&value.as_str()) {
        tracing::debug!(marker = raw, "unrecognized applied marker treated as applied");
    }
    true
}
