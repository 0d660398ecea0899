//! Source adapters for the aggregator.
//!
//! One adapter per upstream provider:
//! - Repository search (`GithubAdapter`)
//! - Link-aggregator hot posts (`RedditAdapter`)
//! - Show-style submissions (`HackerNewsAdapter`)
//! - RSS feeds through a JSON proxy (`RssAdapter`)
//! - Product discovery feed (`ProductHuntAdapter`)

mod github;
mod hackernews;
mod producthunt;
mod reddit;
mod rss;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Config, Item, NewsItem, RecordId};
use crate::pipeline::DiscoveryFilters;
use crate::pipeline::classify;
use crate::utils::http::create_async_client;

pub use github::GithubAdapter;
pub use hackernews::HackerNewsAdapter;
pub use producthunt::ProductHuntAdapter;
pub use reddit::RedditAdapter;
pub use rss::RssAdapter;

/// What one source contributed during a pass.
#[derive(Debug, Clone, PartialEq)]
pub enum SourcePayload {
    /// Tool records, merged into `newTools`
    Tools(Vec<Item>),
    /// Link-aggregator posts, merged into `aiNews`
    News(Vec<NewsItem>),
    /// RSS entries, merged into `rssUpdates`
    Feed(Vec<NewsItem>),
}

impl SourcePayload {
    pub fn len(&self) -> usize {
        match self {
            SourcePayload::Tools(items) => items.len(),
            SourcePayload::News(items) | SourcePayload::Feed(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One integration against an external data provider.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable key used for caching and logs.
    fn key(&self) -> &str;

    /// Human-readable provider name.
    fn label(&self) -> &str;

    /// Tools this source may place into one merge.
    fn merge_cap(&self) -> usize {
        usize::MAX
    }

    /// Fetch and normalize one batch from the provider.
    async fn fetch(&self) -> Result<SourcePayload>;

    /// Static data to show when the provider is unreachable.
    fn fallback(&self) -> Option<SourcePayload> {
        None
    }
}

/// Placeholder for records that arrive without a description.
pub const NO_DESCRIPTION: &str = "No description available";

/// Provider fields of a discovered tool; classification fills in the rest.
pub(crate) struct Discovered<'a> {
    pub id: String,
    pub name: String,
    pub description: Option<&'a str>,
    pub tags: &'a [String],
    pub release_date: String,
    pub company: String,
    pub rating: f64,
    pub pricing: &'a str,
    pub link: String,
    pub source: &'a str,
}

impl Discovered<'_> {
    pub fn into_item(self) -> Item {
        let text = self.description.unwrap_or("");
        let description = match self.description.map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => NO_DESCRIPTION.to_string(),
        };

        Item {
            id: RecordId::Text(self.id),
            name: self.name,
            category: classify::categorize(text),
            description,
            release_date: self.release_date,
            company: self.company,
            features: classify::features(text, self.tags),
            audience: classify::audiences(text, self.tags),
            rating: self.rating,
            pricing: self.pricing.to_string(),
            link: self.link,
            stars: None,
            forks: None,
            votes: None,
            score: None,
            comments: None,
            language: None,
            source: Some(self.source.to_string()),
            is_indie: true,
        }
    }
}

/// Build every enabled adapter, sharing one HTTP client.
pub fn build_adapters(
    config: &Config,
    filters: &DiscoveryFilters,
) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    let client = create_async_client(&config.http)?;
    let sources = &config.sources;
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    // Registration order is merge order for tools.
    if sources.github.enabled {
        adapters.push(Arc::new(GithubAdapter::new(
            client.clone(),
            sources.github.clone(),
            filters.clone(),
        )));
    }
    if sources.producthunt.enabled {
        adapters.push(Arc::new(ProductHuntAdapter::new(
            client.clone(),
            sources.producthunt.clone(),
            filters.clone(),
        )));
    }
    if sources.hackernews.enabled {
        adapters.push(Arc::new(HackerNewsAdapter::new(
            client.clone(),
            sources.hackernews.clone(),
            config.http.max_concurrent,
            filters.clone(),
        )));
    }
    if sources.reddit.enabled {
        adapters.push(Arc::new(RedditAdapter::new(
            client.clone(),
            sources.reddit.clone(),
        )));
    }
    if sources.rss.enabled {
        adapters.push(Arc::new(RssAdapter::new(
            client,
            sources.rss.clone(),
            filters.clone(),
        )));
    }

    Ok(adapters)
}
