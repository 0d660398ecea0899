//! Name-based deduplication of discovered tools.

use std::collections::HashSet;

use crate::models::Item;

/// Canonical dedupe key: lowercase name with every non-alphanumeric removed.
pub fn canonical_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Keep the first item per canonical name, preserving input order.
///
/// First wins, not best wins: order the input by desirability beforehand.
pub fn dedupe(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(canonical_key(&item.name)))
        .collect()
}
