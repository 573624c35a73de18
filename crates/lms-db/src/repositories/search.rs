//! Helpers for free-text search filters

/// Build an `ILIKE` pattern matching `term` anywhere, with `%`, `_` and `\`
/// in the term taken literally. Blank terms yield `None` (no filter).
pub fn like_pattern(term: Option<&str>) -> Option<String> {
    let term = term?.trim();
    if term.is_empty() {
        return None;
    }

    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}
