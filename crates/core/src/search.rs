//! Free-text project search helpers.

/// Maximum number of projects a search returns.
pub const SEARCH_RESULT_LIMIT: i64 = 50;

/// Build an `ILIKE` substring pattern, escaping `%`, `_` and `\`.
///
/// Returns `None` for a blank query, meaning "no text filter".
pub fn like_pattern(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}
