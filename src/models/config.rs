//! Application configuration structures.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Per-source response cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Merge and polling behavior
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Upstream source settings
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Discovery noise filters
    #[serde(default)]
    pub filters: FilterConfig,

    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Fill API credentials from the environment when the file leaves them unset.
    pub fn apply_env(&mut self) {
        fn var(name: &str) -> Option<String> {
            env::var(name).ok().filter(|v| !v.trim().is_empty())
        }

        if self.sources.github.token.is_none() {
            self.sources.github.token = var("GITHUB_TOKEN");
        }
        if self.sources.producthunt.token.is_none() {
            self.sources.producthunt.token = var("PRODUCTHUNT_TOKEN");
        }
        if self.sources.rss.api_key.is_none() {
            self.sources.rss.api_key = var("RSS2JSON_API_KEY");
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(AppError::validation("cache.ttl_secs must be > 0"));
        }
        if self.aggregation.poll_interval_secs == 0 {
            return Err(AppError::validation(
                "aggregation.poll_interval_secs must be > 0",
            ));
        }
        if self.sources.github.enabled && self.sources.github.queries.is_empty() {
            return Err(AppError::validation(
                "sources.github is enabled but has no queries",
            ));
        }
        if self.sources.rss.enabled && self.sources.rss.feeds.is_empty() {
            return Err(AppError::validation(
                "sources.rss is enabled but has no feeds",
            ));
        }
        if !self.sources.any_enabled() {
            return Err(AppError::validation("No sources enabled"));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent requests within one source
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a source response stays fresh, in seconds
    #[serde(default = "defaults::cache_ttl")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::cache_ttl(),
        }
    }
}

/// Where discovered tools go relative to the curated ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Append,
    Prepend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Discovered tools merged per pass, after dedupe
    #[serde(default = "defaults::max_discovered")]
    pub max_discovered: usize,

    #[serde(default)]
    pub placement: Placement,

    /// Link-aggregator posts kept in `aiNews`
    #[serde(default = "defaults::news_limit")]
    pub news_limit: usize,

    /// RSS entries kept in `rssUpdates`
    #[serde(default = "defaults::news_limit")]
    pub rss_limit: usize,

    /// Seconds between passes in watch mode
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_discovered: defaults::max_discovered(),
            placement: Placement::default(),
            news_limit: defaults::news_limit(),
            rss_limit: defaults::news_limit(),
            poll_interval_secs: defaults::poll_interval(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub reddit: RedditConfig,
    #[serde(default)]
    pub hackernews: HackerNewsConfig,
    #[serde(default)]
    pub rss: RssConfig,
    #[serde(default)]
    pub producthunt: ProductHuntConfig,
}

impl SourcesConfig {
    pub fn any_enabled(&self) -> bool {
        self.github.enabled
            || self.reddit.enabled
            || self.hackernews.enabled
            || self.rss.enabled
            || self.producthunt.enabled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
    #[serde(default = "defaults::github_endpoint")]
    pub endpoint: String,

    /// Search queries, run one after another
    #[serde(default = "defaults::github_queries")]
    pub queries: Vec<String>,
    #[serde(default = "defaults::github_per_page")]
    pub per_page: usize,

    /// Items returned by the adapter
    #[serde(default = "defaults::github_max_items")]
    pub max_items: usize,

    /// Items taken into the merge
    #[serde(default = "defaults::github_merge_cap")]
    pub merge_cap: usize,

    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: defaults::github_endpoint(),
            queries: defaults::github_queries(),
            per_page: defaults::github_per_page(),
            max_items: defaults::github_max_items(),
            merge_cap: defaults::github_merge_cap(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
    #[serde(default = "defaults::reddit_endpoint")]
    pub endpoint: String,
    #[serde(default = "defaults::reddit_limit")]
    pub limit: usize,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: defaults::reddit_endpoint(),
            limit: defaults::reddit_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackerNewsConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
    #[serde(default = "defaults::hackernews_base")]
    pub base_url: String,

    /// Story ids inspected per pass
    #[serde(default = "defaults::hackernews_scan")]
    pub scan_limit: usize,
    #[serde(default = "defaults::hackernews_max_items")]
    pub max_items: usize,
    #[serde(default = "defaults::hackernews_merge_cap")]
    pub merge_cap: usize,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: defaults::hackernews_base(),
            scan_limit: defaults::hackernews_scan(),
            max_items: defaults::hackernews_max_items(),
            merge_cap: defaults::hackernews_merge_cap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
    #[serde(default = "defaults::rss_proxy")]
    pub proxy: String,
    #[serde(default = "defaults::rss_feeds")]
    pub feeds: Vec<String>,

    /// Entries requested per feed
    #[serde(default = "defaults::rss_per_feed")]
    pub per_feed: usize,
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            proxy: defaults::rss_proxy(),
            feeds: defaults::rss_feeds(),
            per_feed: defaults::rss_per_feed(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductHuntConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,
    #[serde(default = "defaults::producthunt_endpoint")]
    pub endpoint: String,
    #[serde(default = "defaults::producthunt_max_items")]
    pub max_items: usize,
    #[serde(default = "defaults::producthunt_merge_cap")]
    pub merge_cap: usize,
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

impl Default for ProductHuntConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: defaults::producthunt_endpoint(),
            max_items: defaults::producthunt_max_items(),
            merge_cap: defaults::producthunt_merge_cap(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Organization names excluded from discovery (case-insensitive substring)
    #[serde(default = "defaults::denylist")]
    pub denylist: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            denylist: defaults::denylist(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Curated baseline JSON; the embedded baseline is used when unset
    #[serde(default)]
    pub baseline_file: Option<PathBuf>,

    /// Directory receiving dataset exports
    #[serde(default = "defaults::export_dir")]
    pub export_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            baseline_file: None,
            export_dir: defaults::export_dir(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn enabled() -> bool {
        true
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "AINow-Tool-Discovery/0.1 (+https://github.com/ainow)".into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn max_concurrent() -> usize {
        8
    }

    pub fn cache_ttl() -> u64 {
        30 * 60
    }

    // Aggregation defaults
    pub fn max_discovered() -> usize {
        15
    }
    pub fn news_limit() -> usize {
        5
    }
    pub fn poll_interval() -> u64 {
        60 * 60
    }

    // GitHub defaults
    pub fn github_endpoint() -> String {
        "https://api.github.com/search/repositories".into()
    }
    pub fn github_queries() -> Vec<String> {
        vec![
            "ai tool NOT google NOT microsoft NOT meta NOT openai created:>2024-01-01".into(),
            "machine-learning library NOT facebook NOT amazon created:>2024-01-01".into(),
            "llm open-source NOT anthropic NOT nvidia created:>2024-01-01".into(),
            "ai startup indie created:>2024-01-01".into(),
        ]
    }
    pub fn github_per_page() -> usize {
        15
    }
    pub fn github_max_items() -> usize {
        20
    }
    pub fn github_merge_cap() -> usize {
        8
    }

    // Reddit defaults
    pub fn reddit_endpoint() -> String {
        "https://www.reddit.com/r/MachineLearning/hot.json".into()
    }
    pub fn reddit_limit() -> usize {
        10
    }

    // Hacker News defaults
    pub fn hackernews_base() -> String {
        "https://hacker-news.firebaseio.com/v0".into()
    }
    pub fn hackernews_scan() -> usize {
        50
    }
    pub fn hackernews_max_items() -> usize {
        15
    }
    pub fn hackernews_merge_cap() -> usize {
        5
    }

    // RSS defaults
    pub fn rss_proxy() -> String {
        "https://api.rss2json.com/v1/api.json".into()
    }
    pub fn rss_feeds() -> Vec<String> {
        vec![
            "https://feeds.feedburner.com/oreilly/radar".into(),
            "https://rss.cnn.com/rss/cnn_tech.rss".into(),
            "https://www.theverge.com/ai-artificial-intelligence/rss/index.xml".into(),
        ]
    }
    pub fn rss_per_feed() -> usize {
        5
    }

    // Product Hunt defaults
    pub fn producthunt_endpoint() -> String {
        "https://api.producthunt.com/v1/posts".into()
    }
    pub fn producthunt_max_items() -> usize {
        20
    }
    pub fn producthunt_merge_cap() -> usize {
        7
    }

    pub fn denylist() -> Vec<String> {
        [
            "google",
            "microsoft",
            "meta",
            "facebook",
            "amazon",
            "apple",
            "openai",
            "anthropic",
            "nvidia",
            "adobe",
            "salesforce",
            "oracle",
            "ibm",
            "tesla",
            "uber",
            "airbnb",
            "netflix",
            "spotify",
            "twitter",
            "linkedin",
            "huggingface",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    pub fn export_dir() -> PathBuf {
        PathBuf::from("exports")
    }
}
