use crate::data::{Country, Dataset};

/// Autocomplete result cap: every candidate gets a single-digit hotkey (1-9).
pub const MAX_MATCHES: usize = 9;

/// Lowercases, trims and collapses internal whitespace runs to one space.
pub fn normalize_query(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns up to [`MAX_MATCHES`] countries matching the query, in code order.
///
/// A query that normalizes to nothing (or a lone `.`) matches no candidates,
/// so the caller can suppress the dropdown entirely. A country matches when
/// its code or domain starts with the query, its domain equals the query
/// prefixed with a dot, or any alias name contains the query.
pub fn find_matches<'a>(dataset: &'a Dataset, query: &str) -> Vec<&'a Country> {
    let query = normalize_query(query);
    if query.is_empty() || query == "." {
        return Vec::new();
    }
    dataset
        .countries()
        .filter(|country| matches_query(country, &query))
        .take(MAX_MATCHES)
        .collect()
}

fn matches_query(country: &Country, query: &str) -> bool {
    country.code.starts_with(query)
        || country.domain.starts_with(query)
        || country.domain == format!(".{query}")
        || country
            .names
            .iter()
            .any(|name| name.to_lowercase().contains(query))
}
