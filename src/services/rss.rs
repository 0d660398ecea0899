// src/services/rss.rs

//! AI news from RSS feeds, parsed through a JSON conversion proxy.

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{NewsItem, RssConfig};
use crate::pipeline::DiscoveryFilters;
use crate::services::{SourceAdapter, SourcePayload};
use crate::utils::http::get_json;
use crate::utils::{excerpt, get_domain, short_hash, strip_html};

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    items: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default, rename = "pubDate")]
    pub_date: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: Option<String>,
}

pub struct RssAdapter {
    client: Client,
    config: RssConfig,
    filters: DiscoveryFilters,
}

impl RssAdapter {
    pub fn new(client: Client, config: RssConfig, filters: DiscoveryFilters) -> Self {
        Self {
            client,
            config,
            filters,
        }
    }

    fn feed_url(&self, feed: &str) -> Result<Url> {
        let count = self.config.per_feed.to_string();
        let mut params = vec![("rss_url", feed), ("count", count.as_str())];
        if let Some(key) = self.config.api_key.as_deref() {
            params.push(("api_key", key));
        }
        Ok(Url::parse_with_params(&self.config.proxy, &params)?)
    }

    async fn feed(&self, feed: &str) -> Result<Vec<Entry>> {
        let url = self.feed_url(feed)?;
        let response: FeedResponse = get_json(&self.client, url.as_str(), None).await?;
        if response.status == "error" {
            let message = response.message.unwrap_or_else(|| "proxy error".to_string());
            return Err(AppError::source("rss", format!("{feed}: {message}")));
        }
        Ok(response.items)
    }

    fn to_news(&self, entries: Vec<Entry>) -> Vec<NewsItem> {
        entries
            .into_iter()
            .filter(|entry| {
                let text = format!("{} {}", entry.title, entry.description);
                self.filters.ai_news.matches(&text, &[])
            })
            .map(to_news)
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for RssAdapter {
    fn key(&self) -> &str {
        "rss"
    }

    fn label(&self) -> &str {
        "RSS feeds"
    }

    async fn fetch(&self) -> Result<SourcePayload> {
        let results = join_all(self.config.feeds.iter().map(|feed| self.feed(feed))).await;

        let mut entries = Vec::new();
        let mut failures = 0;
        for (feed, result) in self.config.feeds.iter().zip(results) {
            match result {
                Ok(found) => entries.extend(found),
                Err(e) => {
                    failures += 1;
                    log::warn!("RSS feed {feed} failed: {e}");
                }
            }
        }

        if failures > 0 && failures == self.config.feeds.len() {
            return Err(AppError::source("rss", "every feed failed"));
        }

        Ok(SourcePayload::Feed(self.to_news(entries)))
    }
}

fn to_news(entry: Entry) -> NewsItem {
    let source = get_domain(&entry.link).unwrap_or_else(|| "rss".to_string());
    NewsItem {
        id: format!("rss_{}", short_hash(&entry.link)),
        description: excerpt(&strip_html(&entry.description), 200, true),
        url: entry.link,
        title: entry.title,
        published: entry.pub_date,
        source,
        score: None,
        comments: None,
        author: entry.author.filter(|a| !a.is_empty()),
        flair: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "status": "ok",
        "feed": {"title": "The Verge"},
        "items": [
            {
                "title": "A new open model tops the leaderboard",
                "pubDate": "2024-06-01 12:00:00",
                "link": "https://www.theverge.com/2024/6/1/open-model",
                "description": "<p>The <b>machine learning</b> community reacts.</p>",
                "author": "Reporter"
            },
            {
                "title": "Phone review",
                "pubDate": "2024-06-01 13:00:00",
                "link": "https://www.theverge.com/2024/6/1/phone",
                "description": "<p>Battery life is great.</p>",
                "author": ""
            }
        ]
    }"#;

    fn adapter(api_key: Option<&str>) -> RssAdapter {
        let config = RssConfig {
            api_key: api_key.map(String::from),
            ..RssConfig::default()
        };
        RssAdapter::new(Client::new(), config, DiscoveryFilters::default())
    }

    #[test]
    fn test_non_ai_entries_filtered() {
        let response: FeedResponse = serde_json::from_str(FIXTURE).unwrap();
        let news = adapter(None).to_news(response.items);
        assert_eq!(news.len(), 1);

        let item = &news[0];
        assert_eq!(item.source, "www.theverge.com");
        assert_eq!(item.description, "The machine learning community reacts....");
        assert!(item.id.starts_with("rss_"));
        assert_eq!(item.id.len(), "rss_".len() + 12);
        assert_eq!(item.author.as_deref(), Some("Reporter"));
    }

    #[test]
    fn test_ids_are_stable_per_link() {
        let a = to_news(Entry {
            title: "t".into(),
            link: "https://example.com/a".into(),
            pub_date: String::new(),
            description: String::new(),
            author: None,
        });
        let b = to_news(Entry {
            title: "different title".into(),
            link: "https://example.com/a".into(),
            pub_date: String::new(),
            description: String::new(),
            author: None,
        });
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_feed_url_optional_key() {
        let feed = "https://example.com/rss.xml";
        let without = adapter(None).feed_url(feed).unwrap();
        assert!(!without.query().unwrap().contains("api_key"));

        let with = adapter(Some("k1")).feed_url(feed).unwrap();
        let query = with.query().unwrap();
        assert!(query.contains("api_key=k1"));
        assert!(query.contains("count=5"));
        assert!(query.contains("rss_url=https%3A%2F%2Fexample.com%2Frss.xml"));
    }

    #[test]
    fn test_error_status_parses() {
        let response: FeedResponse =
            serde_json::from_str(r#"{"status":"error","message":"Invalid feed"}"#).unwrap();
        assert_eq!(response.status, "error");
        assert!(response.items.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_fails_when_every_feed_fails() {
        let config = RssConfig {
            proxy: "http://127.0.0.1:9/v1/api.json".to_string(),
            ..RssConfig::default()
        };
        let adapter = RssAdapter::new(Client::new(), config, DiscoveryFilters::default());

        assert!(matches!(
            adapter.fetch().await,
            Err(AppError::Source { .. })
        ));
    }
}
