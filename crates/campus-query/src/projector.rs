//! Result projector
//!
//! Pure client-side narrowing and summary counts over an already fetched
//! result set. Nothing here talks to the backend.

use campus_core::Searchable;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Category of rows without a terminal state
pub const NO_STATE: &str = "SIN_ESTADO";

/// Whether any searchable field contains `needle` (already lowercased)
fn matches<R: Searchable + ?Sized>(row: &R, needle: &str) -> bool {
    row.for_each_search_field(&mut |field| field.to_lowercase().contains(needle))
}

/// Rows whose searchable fields contain the trimmed query, ignoring case
///
/// A blank query yields every row.
pub fn filter<'a, R: Searchable>(rows: &'a [R], query: &str) -> impl Iterator<Item = &'a R> + 'a {
    let needle = query.trim().to_lowercase();
    rows.iter()
        .filter(move |row| needle.is_empty() || matches(*row, &needle))
}

/// Narrowed copy of `rows`; a blank query returns `rows` itself
pub fn filter_slice<'a, R: Searchable + Clone>(rows: &'a [R], query: &str) -> Cow<'a, [R]> {
    if query.trim().is_empty() {
        return Cow::Borrowed(rows);
    }
    Cow::Owned(filter(rows, query).cloned().collect())
}

/// Count rows per uppercased terminal state, in key order
pub fn summarize<R: Searchable>(rows: &[R]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        let category = row
            .terminal_state()
            .map(str::trim)
            .filter(|state| !state.is_empty())
            .map_or_else(|| NO_STATE.to_string(), str::to_uppercase);
        *counts.entry(category).or_insert(0) += 1;
    }
    counts
}
