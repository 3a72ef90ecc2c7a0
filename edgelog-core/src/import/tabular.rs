//! Tolerant delimited-text splitting.
//!
//! Broker exports are messy: quoted fields with embedded commas, stray
//! whitespace, CRLF line endings. The splitter never rejects a line; a
//! malformed row simply produces fields that fail the downstream checks.

/// Split a document into lines. Leading/trailing whitespace of the whole
/// document is dropped; blank interior lines are kept and fail row checks
/// downstream.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.trim().split('\n').collect()
}

/// Split one line on commas, honoring double-quoted fields.
///
/// A `"` toggles quoted state; commas inside a quoted span are not
/// delimiters. Each field is trimmed, then one pair of wrapping quotes is
/// stripped. No error for malformed quoting: an unbalanced quote swallows
/// the rest of the line into the final field, wrapping quote intact.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (at, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(clean_field(&line[start..at]));
                start = at + 1;
            }
            _ => {}
        }
    }
    fields.push(clean_field(&line[start..]));
    fields
}

fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}
