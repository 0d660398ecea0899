// src/services/producthunt.rs

//! Recent launches in the artificial-intelligence category.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::Result;
use crate::models::{Category, Item, ProductHuntConfig, RecordId};
use crate::pipeline::{DiscoveryFilters, classify};
use crate::services::{Discovered, SourceAdapter, SourcePayload};
use crate::utils::http::get_json;

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: u64,
    name: String,
    #[serde(default)]
    tagline: Option<String>,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    maker_inside_team: Option<Team>,
    #[serde(default)]
    votes_count: u64,
    #[serde(default)]
    comments_count: u64,
    #[serde(default)]
    discussion_url: Option<String>,
    #[serde(default)]
    redirect_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Team {
    #[serde(default)]
    name: Option<String>,
}

impl Post {
    fn maker(&self) -> Option<&str> {
        self.maker_inside_team
            .as_ref()
            .and_then(|team| team.name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

pub struct ProductHuntAdapter {
    client: Client,
    config: ProductHuntConfig,
    filters: DiscoveryFilters,
}

impl ProductHuntAdapter {
    pub fn new(client: Client, config: ProductHuntConfig, filters: DiscoveryFilters) -> Self {
        Self {
            client,
            config,
            filters,
        }
    }

    fn posts_url(&self) -> Result<Url> {
        let per_page = self.config.max_items.to_string();
        Ok(Url::parse_with_params(
            &self.config.endpoint,
            &[
                ("search[category]", "artificial-intelligence"),
                ("sort_by", "created_at"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ],
        )?)
    }

    fn to_items(&self, posts: Vec<Post>) -> Vec<Item> {
        let mut items: Vec<Item> = posts
            .into_iter()
            .filter(|post| !post.maker().is_some_and(|m| self.filters.is_vendor(m)))
            .map(to_item)
            .collect();
        items.sort_by_key(|item| std::cmp::Reverse(item.popularity()));
        items.truncate(self.config.max_items);
        items
    }
}

#[async_trait]
impl SourceAdapter for ProductHuntAdapter {
    fn key(&self) -> &str {
        "producthunt"
    }

    fn label(&self) -> &str {
        "Product Hunt"
    }

    fn merge_cap(&self) -> usize {
        self.config.merge_cap
    }

    async fn fetch(&self) -> Result<SourcePayload> {
        let url = self.posts_url()?;
        let response: PostsResponse =
            get_json(&self.client, url.as_str(), self.config.token.as_deref()).await?;
        Ok(SourcePayload::Tools(self.to_items(response.posts)))
    }

    fn fallback(&self) -> Option<SourcePayload> {
        Some(SourcePayload::Tools(vec![fallback_tool()]))
    }
}

fn to_item(post: Post) -> Item {
    let company = post.maker().unwrap_or("Independent").to_string();
    let link = post
        .discussion_url
        .clone()
        .or_else(|| post.redirect_url.clone())
        .unwrap_or_default();

    let draft = Discovered {
        id: format!("ph_{}", post.id),
        name: post.name.clone(),
        description: post.tagline.as_deref(),
        tags: &[],
        release_date: post.created_at.clone(),
        company,
        rating: classify::single_rating(post.votes_count),
        pricing: "Check Website",
        link,
        source: "Product Hunt",
    };

    Item {
        votes: Some(post.votes_count),
        comments: Some(post.comments_count),
        ..draft.into_item()
    }
}

/// Sample indie tool shown while the launch feed is unreachable.
fn fallback_tool() -> Item {
    Item {
        id: RecordId::from("ph_fallback_1"),
        name: "IndieLLM".to_string(),
        category: Category::Developer,
        description: "Open-source language model for indie developers".to_string(),
        release_date: Utc::now().to_rfc3339(),
        company: "IndieAI".to_string(),
        features: vec![
            "Open Source".to_string(),
            "Developer Tools".to_string(),
            "API".to_string(),
        ],
        audience: vec![Category::Developer],
        rating: 4.2,
        pricing: "Open Source".to_string(),
        link: "#".to_string(),
        stars: None,
        forks: None,
        votes: Some(150),
        score: None,
        comments: Some(25),
        language: None,
        source: Some("Product Hunt".to_string()),
        is_indie: true,
    }
}
