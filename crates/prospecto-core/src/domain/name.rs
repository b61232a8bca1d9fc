pub fn is_allowed_char(ch: char) -> bool {
    ch.is_whitespace()
        || ch.is_ascii_alphabetic()
        || matches!(
            ch,
            'á' | 'é' | 'í' | 'ó' | 'ú' | 'Á' | 'É' | 'Í' | 'Ó' | 'Ú' | 'ñ' | 'Ñ'
        )
}

pub fn sanitize_with_cursor(raw: &str, cursor: usize) -> (String, usize) {
    let mut out = String::with_capacity(raw.len());
    let mut new_cursor = 0;
    for (idx, ch) in raw.chars().enumerate() {
        if is_allowed_char(ch) {
            out.push(ch);
            if idx < cursor {
                new_cursor += 1;
            }
        }
    }
    (out, new_cursor)
}
