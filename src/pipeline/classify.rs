//! Keyword classifiers for discovered tools.
//!
//! Everything here is pure: the same description and tags always produce the
//! same category, audience, feature labels and rating. Matching is
//! case-insensitive and anchored at word starts, so `design` matches
//! "designers" while `ui` does not match "suite".

use crate::models::Category;
use crate::utils::normalize_words;

/// Feature label used when no keyword matches.
pub const DEFAULT_FEATURE: &str = "AI/ML Capabilities";

const DESIGNER: &[&str] = &["design", "ui", "creative"];
const BUSINESS: &[&str] = &["business", "enterprise", "analytics"];
const PRODUCT_CATEGORY: &[&str] = &["project", "management", "planning"];
const PRODUCT_AUDIENCE: &[&str] = &["product", "management", "planning"];
const DEVELOPER: &[&str] = &["developer", "programming", "code"];

/// Category keyword buckets in priority order.
const CATEGORY_BUCKETS: &[(Category, &[&str])] = &[
    (Category::Designer, DESIGNER),
    (Category::Business, BUSINESS),
    (Category::ProductManager, PRODUCT_CATEGORY),
];

/// Audience keyword buckets in output order.
const AUDIENCE_BUCKETS: &[(Category, &[&str])] = &[
    (Category::Developer, DEVELOPER),
    (Category::Designer, DESIGNER),
    (Category::Business, BUSINESS),
    (Category::ProductManager, PRODUCT_AUDIENCE),
];

const FEATURES: &[(&str, &[&str])] = &[
    ("Natural Language Processing", &["natural language", "nlp"]),
    ("Computer Vision", &["computer vision", "image"]),
    ("Deep Learning", &["deep learning", "neural"]),
    ("API Integration", &["api", "rest"]),
    ("Web Interface", &["web", "frontend"]),
    ("Mobile App", &["mobile", "app"]),
];

/// Normalized text that keyword lookups run against.
#[derive(Debug, Clone)]
pub struct Haystack(String);

impl Haystack {
    pub fn new(text: &str, tags: &[String]) -> Self {
        let mut combined = String::from(text);
        for tag in tags {
            combined.push(' ');
            combined.push_str(tag);
        }
        Self(normalize_words(&combined))
    }

    /// True when `keyword` occurs starting at a word boundary.
    pub fn has(&self, keyword: &str) -> bool {
        let needle = normalize_words(keyword);
        let needle = needle.trim_end();
        needle.len() > 1 && self.0.contains(needle)
    }

    pub fn has_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.has(k))
    }
}

/// Primary category: first matching bucket, Developer otherwise.
pub fn categorize(text: &str) -> Category {
    let hay = Haystack::new(text, &[]);
    CATEGORY_BUCKETS
        .iter()
        .find(|(_, keywords)| hay.has_any(keywords))
        .map_or(Category::Developer, |(category, _)| *category)
}

/// Every audience the text speaks to, `[Developer]` when none.
pub fn audiences(text: &str, tags: &[String]) -> Vec<Category> {
    let hay = Haystack::new(text, tags);
    let found: Vec<Category> = AUDIENCE_BUCKETS
        .iter()
        .filter(|(_, keywords)| hay.has_any(keywords))
        .map(|(category, _)| *category)
        .collect();

    if found.is_empty() {
        vec![Category::Developer]
    } else {
        found
    }
}

/// Feature labels, `[DEFAULT_FEATURE]` when none.
pub fn features(text: &str, tags: &[String]) -> Vec<String> {
    let hay = Haystack::new(text, tags);
    let found: Vec<String> = FEATURES
        .iter()
        .filter(|(_, keywords)| hay.has_any(keywords))
        .map(|(label, _)| (*label).to_string())
        .collect();

    if found.is_empty() {
        vec![DEFAULT_FEATURE.to_string()]
    } else {
        found
    }
}

/// Popularity rating from several counters: `clamp(1, 5, Σ log10(c + 1))`.
pub fn rating(counters: &[u64]) -> f64 {
    let score: f64 = counters.iter().map(|&c| log_count(c)).sum();
    round_rating(score)
}

/// Popularity rating from a single counter: `clamp(1, 5, log10(c + 1) + 1)`.
pub fn single_rating(counter: u64) -> f64 {
    round_rating(log_count(counter) + 1.0)
}

fn log_count(counter: u64) -> f64 {
    (counter as f64 + 1.0).log10()
}

fn round_rating(score: f64) -> f64 {
    let clamped = score.clamp(1.0, 5.0);
    (clamped * 10.0).round() / 10.0
}
