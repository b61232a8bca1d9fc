use crate::error::CoreError;

pub const MAX_DIGITS: usize = 8;
const GROUP: usize = 4;

pub fn digits(value: &str) -> String {
    value.chars().filter(|ch| ch.is_ascii_digit()).collect()
}

pub fn format(value: &str) -> String {
    let mut out = digits(value);
    out.truncate(MAX_DIGITS);
    if out.len() > GROUP {
        out.insert(GROUP, ' ');
    }
    out
}

// Cursor rule from the incremental formatter: a cursor at or past the group
// boundary moves one further to account for the inserted space.
pub fn remap_cursor(cursor: usize, formatted: &str) -> usize {
    let len = formatted.chars().count();
    if len > GROUP && cursor > GROUP {
        (cursor + 1).min(len)
    } else {
        cursor.min(len)
    }
}

pub fn is_complete(value: &str) -> bool {
    let compact: String = value.chars().filter(|ch| !ch.is_whitespace()).collect();
    compact.len() == MAX_DIGITS && compact.chars().all(|ch| ch.is_ascii_digit())
}

pub fn full_number(prefix: &str, value: &str) -> Option<String> {
    let body = digits(value);
    if body.len() == MAX_DIGITS {
        Some(format!("{prefix}{body}"))
    } else {
        None
    }
}

pub fn normalize_prefix(value: &str) -> Result<String, CoreError> {
    let compact: String = value.chars().filter(|ch| !ch.is_whitespace()).collect();
    let compact = compact.strip_prefix('+').unwrap_or(&compact);
    if compact.is_empty() || !compact.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(CoreError::InvalidPrefix);
    }
    Ok(compact.to_string())
}
