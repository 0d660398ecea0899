//! Discovery predicates.
//!
//! Each check is an [`ItemFilter`] over `(text, tags)` so adapters can take
//! them as plain values and tests can swap in closures.

use std::sync::Arc;

use crate::models::FilterConfig;
use crate::pipeline::classify::Haystack;

/// A yes/no predicate over free text and a tag list.
pub trait ItemFilter: Send + Sync {
    fn matches(&self, text: &str, tags: &[String]) -> bool;
}

impl<F> ItemFilter for F
where
    F: Fn(&str, &[String]) -> bool + Send + Sync,
{
    fn matches(&self, text: &str, tags: &[String]) -> bool {
        self(text, tags)
    }
}

/// Shared, swappable filter handle.
pub type SharedFilter = Arc<dyn ItemFilter>;

const AI_TOOL_KEYWORDS: &[&str] = &[
    "ai",
    "artificial intelligence",
    "machine learning",
    "ml",
    "deep learning",
    "neural network",
    "llm",
    "large language model",
    "natural language",
    "computer vision",
    "nlp",
    "chatbot",
    "ai tool",
    "ai assistant",
    "ai powered",
    "automation",
    "ai generator",
    "ai platform",
    "transformer",
    "gpt",
    "embedding",
    "prompt",
    "inference",
];

const AI_NEWS_KEYWORDS: &[&str] = &[
    "artificial intelligence",
    "ai",
    "machine learning",
    "ml",
    "deep learning",
    "neural network",
    "chatgpt",
    "gpt",
    "llm",
    "natural language",
    "computer vision",
    "robotics",
    "automation",
    "algorithm",
];

/// Does the text look like it describes an AI tool?
#[derive(Debug, Clone, Copy, Default)]
pub struct AiToolDetector;

impl ItemFilter for AiToolDetector {
    fn matches(&self, text: &str, tags: &[String]) -> bool {
        Haystack::new(text, tags).has_any(AI_TOOL_KEYWORDS)
    }
}

/// Is a news headline/body about AI?
#[derive(Debug, Clone, Copy, Default)]
pub struct AiNewsDetector;

impl ItemFilter for AiNewsDetector {
    fn matches(&self, text: &str, tags: &[String]) -> bool {
        Haystack::new(text, tags).has_any(AI_NEWS_KEYWORDS)
    }
}

/// Large incumbent vendors excluded from indie discovery.
///
/// A name (organization, maker team, or URL) is denied when it contains any
/// entry as a case-insensitive substring.
#[derive(Debug, Clone, Default)]
pub struct Denylist {
    entries: Vec<String>,
}

impl Denylist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.as_ref().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn is_denied(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let name = name.to_lowercase();
        self.entries.iter().any(|entry| name.contains(entry.as_str()))
    }
}

impl ItemFilter for Denylist {
    fn matches(&self, text: &str, tags: &[String]) -> bool {
        self.is_denied(text) || tags.iter().any(|t| self.is_denied(t))
    }
}

/// The predicates a discovery pass applies, bundled for the adapters.
#[derive(Clone)]
pub struct DiscoveryFilters {
    /// Names, makers or URLs belonging to excluded vendors
    pub vendor: SharedFilter,
    /// Tool descriptions worth keeping
    pub ai_tool: SharedFilter,
    /// News entries worth keeping
    pub ai_news: SharedFilter,
}

impl DiscoveryFilters {
    pub fn new(denylist: Denylist) -> Self {
        Self {
            vendor: Arc::new(denylist),
            ai_tool: Arc::new(AiToolDetector),
            ai_news: Arc::new(AiNewsDetector),
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(Denylist::new(&config.denylist))
    }

    /// True when a vendor name or URL is excluded.
    pub fn is_vendor(&self, name: &str) -> bool {
        self.vendor.matches(name, &[])
    }
}

impl Default for DiscoveryFilters {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

impl std::fmt::Debug for DiscoveryFilters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryFilters").finish_non_exhaustive()
    }
}
