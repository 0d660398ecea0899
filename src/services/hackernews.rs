// src/services/hackernews.rs

//! "Show HN" submissions that launch AI tools.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{HackerNewsConfig, Item};
use crate::pipeline::{DiscoveryFilters, classify};
use crate::services::{Discovered, SourceAdapter, SourcePayload};
use crate::utils::http::get_json;

#[derive(Debug, Clone, Deserialize)]
struct Story {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    score: u64,
    #[serde(default)]
    descendants: u64,
    #[serde(default)]
    time: Option<i64>,
}

pub struct HackerNewsAdapter {
    client: Client,
    config: HackerNewsConfig,
    concurrency: usize,
    filters: DiscoveryFilters,
}

impl HackerNewsAdapter {
    pub fn new(
        client: Client,
        config: HackerNewsConfig,
        concurrency: usize,
        filters: DiscoveryFilters,
    ) -> Self {
        Self {
            client,
            config,
            concurrency: concurrency.max(1),
            filters,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn story(&self, id: u64) -> Result<Option<Story>> {
        let url = self.endpoint(&format!("item/{id}.json"));
        get_json(&self.client, &url, None).await
    }

    fn keep(&self, story: &Story) -> bool {
        match story.url.as_deref() {
            Some(url) if !url.is_empty() => {
                self.filters.ai_tool.matches(&story.title, &[]) && !self.filters.is_vendor(url)
            }
            _ => false,
        }
    }
}

#[async_trait]
impl SourceAdapter for HackerNewsAdapter {
    fn key(&self) -> &str {
        "hackernews"
    }

    fn label(&self) -> &str {
        "Hacker News"
    }

    fn merge_cap(&self) -> usize {
        self.config.merge_cap
    }

    async fn fetch(&self) -> Result<SourcePayload> {
        let ids: Vec<u64> = get_json(&self.client, &self.endpoint("showstories.json"), None).await?;

        let mut stories = stream::iter(ids.into_iter().take(self.config.scan_limit))
            .map(|id| async move { (id, self.story(id).await) })
            .buffered(self.concurrency);

        let fetched_at = Utc::now();
        let mut items = Vec::new();
        while let Some((id, result)) = stories.next().await {
            match result {
                Ok(Some(story)) if self.keep(&story) => {
                    items.push(to_item(story, fetched_at))
                }
                Ok(_) => {}
                Err(e) => log::warn!("Hacker News item {id} failed: {e}"),
            }
        }

        items.truncate(self.config.max_items);
        Ok(SourcePayload::Tools(items))
    }
}

/// Tool name from a submission title.
///
/// Drops the "Show HN:" prefix, then takes the text before the first dash,
/// or the first three words when there is no dash.
pub fn extract_tool_name(title: &str) -> String {
    let stripped = match Regex::new(r"(?i)^\s*show\s+hn\s*:\s*") {
        Ok(prefix) => prefix.replace(title, "").into_owned(),
        Err(_) => title.to_string(),
    };
    let stripped = stripped.trim();

    let head = stripped
        .split(['-', '\u{2013}', '\u{2014}'])
        .next()
        .map(str::trim)
        .unwrap_or("");
    if !head.is_empty() && head.len() < stripped.len() {
        return head.to_string();
    }

    stripped.split_whitespace().take(3).collect::<Vec<_>>().join(" ")
}

/// Builds the tool record; `fetched_at` stands in for a missing post time.
fn to_item(story: Story, fetched_at: DateTime<Utc>) -> Item {
    let release_date = story
        .time
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or(fetched_at)
        .to_rfc3339();
    let link = story.url.clone().unwrap_or_default();

    let draft = Discovered {
        id: format!("hn_{}", story.id),
        name: extract_tool_name(&story.title),
        description: Some(story.title.as_str()),
        tags: &[],
        release_date,
        company: "Independent".to_string(),
        rating: classify::single_rating(story.score),
        pricing: "Check Website",
        link,
        source: "Hacker News",
    };

    Item {
        score: Some(story.score),
        comments: Some(story.descendants),
        ..draft.into_item()
    }
}
