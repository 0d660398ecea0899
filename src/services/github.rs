// src/services/github.rs

//! Repository search adapter.
//!
//! Runs each configured search query in turn, keeps independent AI
//! repositories and ranks them by stars.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{GithubConfig, Item};
use crate::pipeline::{DiscoveryFilters, classify};
use crate::services::{Discovered, SourceAdapter, SourcePayload};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Repository>,
}

#[derive(Debug, Clone, Deserialize)]
struct Repository {
    id: u64,
    name: String,
    owner: Owner,
    #[serde(default)]
    description: Option<String>,
    html_url: String,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Owner {
    login: String,
}

pub struct GithubAdapter {
    client: Client,
    config: GithubConfig,
    filters: DiscoveryFilters,
}

impl GithubAdapter {
    pub fn new(client: Client, config: GithubConfig, filters: DiscoveryFilters) -> Self {
        Self {
            client,
            config,
            filters,
        }
    }

    fn search_url(&self, query: &str) -> Result<Url> {
        let per_page = self.config.per_page.to_string();
        Ok(Url::parse_with_params(
            &self.config.endpoint,
            &[
                ("q", query),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ],
        )?)
    }

    async fn search(&self, query: &str) -> Result<Vec<Repository>> {
        let url = self.search_url(query)?;
        let response: SearchResponse = crate::utils::http::get_json(
            &self.client,
            url.as_str(),
            self.config.token.as_deref(),
        )
        .await?;
        Ok(response.items)
    }

    fn keep(&self, repo: &Repository) -> bool {
        let description = repo.description.as_deref().unwrap_or("");
        !self.filters.is_vendor(&repo.owner.login)
            && self.filters.ai_tool.matches(description, &repo.topics)
    }
}

#[async_trait]
impl SourceAdapter for GithubAdapter {
    fn key(&self) -> &str {
        "github"
    }

    fn label(&self) -> &str {
        "GitHub"
    }

    fn merge_cap(&self) -> usize {
        self.config.merge_cap
    }

    async fn fetch(&self) -> Result<SourcePayload> {
        let mut repos = Vec::new();
        let mut failures = 0;

        // Sequential on purpose: the search API rate-limits bursts.
        for query in &self.config.queries {
            match self.search(query).await {
                Ok(found) => repos.extend(found.into_iter().filter(|r| self.keep(r))),
                Err(e) => {
                    failures += 1;
                    log::warn!("GitHub query '{query}' failed: {e}");
                }
            }
        }

        if failures > 0 && failures == self.config.queries.len() {
            return Err(AppError::source("github", "every search query failed"));
        }

        let items = rank(repos, self.config.max_items)
            .into_iter()
            .map(to_item)
            .collect();
        Ok(SourcePayload::Tools(items))
    }
}

/// Unique by repository id, most-starred first, at most `limit`.
fn rank(repos: Vec<Repository>, limit: usize) -> Vec<Repository> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Repository> = repos.into_iter().filter(|r| seen.insert(r.id)).collect();
    unique.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    unique.truncate(limit);
    unique
}

fn to_item(repo: Repository) -> Item {
    let pricing = if repo.private { "Private" } else { "Open Source" };
    let draft = Discovered {
        id: format!("github_{}", repo.id),
        name: repo.name.clone(),
        description: repo.description.as_deref(),
        tags: &repo.topics,
        release_date: repo.created_at.clone(),
        company: repo.owner.login.clone(),
        rating: classify::rating(&[repo.stargazers_count, repo.forks_count]),
        pricing,
        link: repo.html_url.clone(),
        source: "GitHub",
    };

    Item {
        stars: Some(repo.stargazers_count),
        forks: Some(repo.forks_count),
        language: repo.language.clone(),
        ..draft.into_item()
    }
}
