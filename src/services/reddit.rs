// src/services/reddit.rs

//! Hot posts from a machine-learning community listing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::Result;
use crate::models::{NewsItem, RedditConfig};
use crate::services::{SourceAdapter, SourcePayload};
use crate::utils::excerpt;
use crate::utils::http::get_json;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    permalink: String,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    link_flair_text: Option<String>,
}

pub struct RedditAdapter {
    client: Client,
    config: RedditConfig,
}

impl RedditAdapter {
    pub fn new(client: Client, config: RedditConfig) -> Self {
        Self { client, config }
    }

    fn listing_url(&self) -> Result<Url> {
        let limit = self.config.limit.to_string();
        Ok(Url::parse_with_params(
            &self.config.endpoint,
            &[("limit", limit.as_str())],
        )?)
    }
}

#[async_trait]
impl SourceAdapter for RedditAdapter {
    fn key(&self) -> &str {
        "reddit"
    }

    fn label(&self) -> &str {
        "Reddit"
    }

    async fn fetch(&self) -> Result<SourcePayload> {
        let url = self.listing_url()?;
        let listing: Listing = get_json(&self.client, url.as_str(), None).await?;
        let posts = listing
            .data
            .children
            .into_iter()
            .map(|child| to_news(child.data))
            .collect();
        Ok(SourcePayload::News(posts))
    }
}

fn to_news(post: Post) -> NewsItem {
    let description = if post.selftext.trim().is_empty() {
        "No description".to_string()
    } else {
        excerpt(&post.selftext, 200, true)
    };

    let published = DateTime::<Utc>::from_timestamp(post.created_utc as i64, 0)
        .unwrap_or_default()
        .to_rfc3339();

    NewsItem {
        id: post.id,
        title: post.title,
        description,
        url: format!("https://reddit.com{}", post.permalink),
        published,
        source: "Reddit".to_string(),
        score: Some(post.score),
        comments: Some(post.num_comments),
        author: post.author,
        flair: post.link_flair_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "kind": "Listing",
        "data": {
            "children": [
                {"kind": "t3", "data": {
                    "id": "abc123",
                    "title": "[R] Sparse attention at scale",
                    "selftext": "",
                    "permalink": "/r/MachineLearning/comments/abc123/sparse/",
                    "created_utc": 1717200000.0,
                    "score": 412,
                    "num_comments": 57,
                    "author": "researcher",
                    "link_flair_text": "Research"
                }},
                {"kind": "t3", "data": {
                    "id": "def456",
                    "title": "[D] Long discussion",
                    "selftext": "word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word word",
                    "permalink": "/r/MachineLearning/comments/def456/long/",
                    "created_utc": 1717203600,
                    "score": -3,
                    "num_comments": 2
                }}
            ]
        }
    }"#;

    fn posts() -> Vec<NewsItem> {
        let listing: Listing = serde_json::from_str(FIXTURE).unwrap();
        listing
            .data
            .children
            .into_iter()
            .map(|c| to_news(c.data))
            .collect()
    }

    #[test]
    fn test_empty_selftext_placeholder() {
        let news = posts();
        assert_eq!(news[0].description, "No description");
        assert_eq!(
            news[0].url,
            "https://reddit.com/r/MachineLearning/comments/abc123/sparse/"
        );
        assert_eq!(news[0].source, "Reddit");
        assert_eq!(news[0].flair.as_deref(), Some("Research"));
        assert!(news[0].published.starts_with("2024-06-01"));
    }

    #[test]
    fn test_long_selftext_is_truncated() {
        let news = posts();
        assert!(news[1].description.ends_with("..."));
        assert!(news[1].description.chars().count() <= 203);
        assert_eq!(news[1].score, Some(-3));
        assert!(news[1].author.is_none());
    }

    #[test]
    fn test_listing_url_has_limit() {
        let adapter = RedditAdapter::new(Client::new(), RedditConfig::default());
        let url = adapter.listing_url().unwrap();
        assert_eq!(url.query(), Some("limit=10"));
    }
}
