pub const MAX_SIGNIFICANT: usize = 9;
const MAX_BODY_DIGITS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub value: String,
    pub cursor: usize,
}

pub fn significant(value: &str) -> String {
    value
        .chars()
        .filter(|ch| ch.is_ascii_digit() || ch.eq_ignore_ascii_case(&'k'))
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

pub fn format(value: &str) -> String {
    let mut sig = significant(value);
    if sig.is_empty() {
        return String::new();
    }

    // A verifier letter stranded in second-to-last position is left over from
    // an edit in the middle of the field; the trailing character wins.
    if sig.len() >= 2 && sig.as_bytes()[sig.len() - 2] == b'k' {
        sig.remove(sig.len() - 2);
    }

    let verifier = match sig.pop() {
        Some(ch) => ch,
        None => return String::new(),
    };

    let mut body = sig;
    if body.len() > MAX_BODY_DIGITS {
        body.truncate(MAX_BODY_DIGITS);
    }

    let mut out = String::with_capacity(body.len() + body.len() / 3 + 2);
    for (idx, ch) in body.chars().enumerate() {
        if idx > 0 && (body.len() - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out.push('-');
    out.push(verifier);
    out
}

pub fn apply_edit(previous: &str, raw: &str, cursor: usize) -> EditOutcome {
    let raw_len = raw.chars().count();
    let previous_len = previous.chars().count();

    if significant(raw).len() > MAX_SIGNIFICANT {
        // Reject the edit outright instead of truncating what was typed.
        let inserted = raw_len.saturating_sub(previous_len);
        return EditOutcome {
            value: previous.to_string(),
            cursor: cursor.saturating_sub(inserted).min(previous_len),
        };
    }

    let formatted = format(raw);
    let formatted_len = formatted.chars().count();
    let cursor = if cursor >= raw_len {
        formatted_len
    } else {
        let old_separators = count_separators(raw, cursor);
        let new_separators = count_separators(&formatted, cursor);
        (cursor + new_separators)
            .saturating_sub(old_separators)
            .min(formatted_len)
    };

    EditOutcome {
        value: formatted,
        cursor,
    }
}

pub fn validate(value: &str) -> bool {
    let sig = significant(value);
    if sig.len() < MAX_SIGNIFICANT - 1 || sig.len() > MAX_SIGNIFICANT {
        return false;
    }
    !sig.contains('k') || sig.ends_with('k')
}

fn count_separators(value: &str, end: usize) -> usize {
    value
        .chars()
        .take(end)
        .filter(|ch| *ch == '.' || *ch == '-')
        .count()
}
