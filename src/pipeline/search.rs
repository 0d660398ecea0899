// src/pipeline/search.rs

//! Case-insensitive text search and tool filters.

use crate::models::{Category, CuratedRecord, Item};

/// True when any searchable field of `record` contains `term`.
///
/// An empty or blank term matches everything.
pub fn matches_term<R: CuratedRecord>(record: &R, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty()
        || record
            .haystack()
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
}

/// Records of one collection that match `term`, in stored order.
pub fn search<'a, R: CuratedRecord>(records: &'a [R], term: &str) -> Vec<&'a R> {
    records.iter().filter(|r| matches_term(*r, term)).collect()
}

/// Filter for the tools list: text, primary category and audience.
#[derive(Debug, Clone, Default)]
pub struct ToolQuery {
    pub term: String,
    pub category: Option<Category>,
    pub audience: Option<Category>,
}

impl ToolQuery {
    pub fn matches(&self, item: &Item) -> bool {
        matches_term(item, &self.term)
            && self.category.is_none_or(|c| item.category == c)
            && self.audience.is_none_or(|a| item.audience.contains(&a))
    }

    pub fn apply<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// Mean rating of `items`, one decimal, `None` for an empty list.
pub fn average_rating(items: &[&Item]) -> Option<f64> {
    if items.is_empty() {
        return None;
    }
    let total: f64 = items.iter().map(|i| i.rating).sum();
    Some((total / items.len() as f64 * 10.0).round() / 10.0)
}
