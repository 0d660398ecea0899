//! Utility functions and helpers.

pub mod http;

use scraper::Html;
use sha2::{Digest, Sha256};
use unicode_segmentation::UnicodeSegmentation;
use url::Url;

/// Lowercase `text` and collapse every run of non-alphanumerics to one space.
///
/// The result starts with a space so word-start matches can be written as
/// `contains(" keyword")`.
pub fn normalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    let mut gap = true;
    out.push(' ');
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            out.push(c);
            gap = false;
        } else if !gap {
            out.push(' ');
            gap = true;
        }
    }
    out
}

/// Plain text of an HTML fragment, whitespace-normalized.
pub fn strip_html(fragment: &str) -> String {
    let doc = Html::parse_fragment(fragment);
    let text: String = doc.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep the first `max` grapheme clusters of `text`, appending `...` when cut
/// or when `always_ellipsis` is set.
pub fn excerpt(text: &str, max: usize, always_ellipsis: bool) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if always_ellipsis || graphemes.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Extract the host from a URL string.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_string()))
}

/// Short stable hex digest of `input`.
pub fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..6])
}
