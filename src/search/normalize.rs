/// Cache key and staleness ticket for a raw query.
///
/// Trims the input, replaces the first space with `-`, then lower-cases.
/// Only the first space is replaced, so `"a b c"` becomes `"a-b c"`.
pub fn normalize_query(query: &str) -> String {
    query.trim().replacen(' ', "-", 1).to_lowercase()
}
