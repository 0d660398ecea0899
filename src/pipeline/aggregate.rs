// src/pipeline/aggregate.rs

//! Aggregation pass: fan out to every source, then merge into the baseline.
//!
//! A pass never fails. Each source ends in one [`SourceState`]; when none of
//! them produced data the caller gets the baseline back with
//! `metadata.error` set.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::error::Result;
use crate::models::{
    AggregationConfig, Config, Dataset, Item, NewsItem, Placement, SourceState, SourceStatus,
};
use crate::pipeline::{DiscoveryFilters, SourceCache, canonical_key, dedupe};
use crate::services::{SourceAdapter, SourcePayload, build_adapters};

/// Label appended to every data source description.
pub const MANUAL_CURATION: &str = "Manual curation";
/// `metadata.dataSource` when no source produced data.
pub const FALLBACK_SOURCE: &str = "fallback";
pub const UPDATE_METHOD: &str = "Automated aggregation";
pub const FOCUS_AREA: &str = "Emerging & Indie AI Tools";

/// What one source produced in a pass.
#[derive(Debug, Clone)]
struct SourceOutcome {
    label: String,
    merge_cap: usize,
    state: SourceState,
    payload: Option<SourcePayload>,
    detail: Option<String>,
}

impl SourceOutcome {
    fn status(&self) -> SourceStatus {
        SourceStatus {
            name: self.label.clone(),
            state: self.state,
            items: self.payload.as_ref().map_or(0, SourcePayload::len),
            detail: self.detail.clone(),
        }
    }

    /// Live or cached data counts; an adapter's static sample does not.
    fn contributed(&self) -> bool {
        matches!(
            self.state,
            SourceState::Fresh | SourceState::Cached | SourceState::Stale
        ) && self.payload.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Normalized results of one fan-out, ready to merge.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Deduplicated tools, capped per source and overall
    pub tools: Vec<Item>,
    pub news: Vec<NewsItem>,
    pub feed: Vec<NewsItem>,
    pub statuses: Vec<SourceStatus>,
    /// Labels of sources whose items made it in
    pub sources_with_data: Vec<String>,
    /// Labels of every registered source
    pub api_sources: Vec<String>,
    pub contributed: bool,
    pub fetched_at: DateTime<Utc>,
}

impl Discovery {
    /// Reason string for a pass where nothing contributed.
    fn failure_reason(&self) -> String {
        if self.statuses.is_empty() {
            return "No sources registered".to_string();
        }
        let details: Vec<String> = self
            .statuses
            .iter()
            .map(|s| match &s.detail {
                Some(detail) => format!("{}: {}", s.name, detail),
                None => format!("{}: no data", s.name),
            })
            .collect();
        format!("No source returned data ({})", details.join("; "))
    }
}

/// Runs aggregation passes against a fixed set of adapters.
pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    cache: Arc<SourceCache>,
    config: AggregationConfig,
}

impl Aggregator {
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        cache: Arc<SourceCache>,
        config: AggregationConfig,
    ) -> Self {
        Self {
            adapters,
            cache,
            config,
        }
    }

    /// Build the adapters, filters and cache described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let filters = DiscoveryFilters::from_config(&config.filters);
        let adapters = build_adapters(config, &filters)?;
        let cache = Arc::new(SourceCache::new(config.cache.ttl()));
        Ok(Self::new(adapters, cache, config.aggregation.clone()))
    }

    pub fn cache(&self) -> &Arc<SourceCache> {
        &self.cache
    }

    pub fn sources(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.label()).collect()
    }

    /// One full pass: discover, then merge into `baseline`.
    pub async fn aggregate_all(&self, baseline: &Dataset) -> Dataset {
        let discovery = self.discover().await;
        self.merge(baseline, &discovery)
    }

    /// Query every source concurrently and normalize what came back.
    pub async fn discover(&self) -> Discovery {
        let fetched_at = Utc::now();
        let outcomes = join_all(self.adapters.iter().map(|a| self.collect(a.as_ref()))).await;

        let mut tools = Vec::new();
        let mut news = Vec::new();
        let mut feed = Vec::new();
        let mut sources_with_data = Vec::new();

        // Registration order decides which duplicate survives.
        for outcome in &outcomes {
            let Some(payload) = &outcome.payload else {
                continue;
            };
            if !payload.is_empty() {
                sources_with_data.push(outcome.label.clone());
            }
            match payload {
                SourcePayload::Tools(items) => {
                    tools.extend(items.iter().take(outcome.merge_cap).cloned());
                }
                SourcePayload::News(items) => news.extend(items.iter().cloned()),
                SourcePayload::Feed(items) => feed.extend(items.iter().cloned()),
            }
        }

        let mut tools = dedupe(tools);
        tools.truncate(self.config.max_discovered);
        news.truncate(self.config.news_limit);
        feed.truncate(self.config.rss_limit);

        let discovery = Discovery {
            tools,
            news,
            feed,
            statuses: outcomes.iter().map(SourceOutcome::status).collect(),
            sources_with_data,
            api_sources: self.adapters.iter().map(|a| a.label().to_string()).collect(),
            contributed: outcomes.iter().any(SourceOutcome::contributed),
            fetched_at,
        };

        log::info!(
            "Aggregation pass: {} tools, {} news, {} feed items from {}/{} sources",
            discovery.tools.len(),
            discovery.news.len(),
            discovery.feed.len(),
            discovery.sources_with_data.len(),
            self.adapters.len()
        );
        if !discovery.contributed {
            log::warn!("{}; serving curated baseline", discovery.failure_reason());
        }
        discovery
    }

    /// Combine `baseline` with a finished discovery. Pure.
    pub fn merge(&self, baseline: &Dataset, discovery: &Discovery) -> Dataset {
        let mut merged = baseline.clone();
        merged.metadata.last_updated = discovery.fetched_at;
        merged.metadata.source_status = discovery.statuses.clone();

        if !discovery.contributed {
            merged.metadata.data_source = FALLBACK_SOURCE.to_string();
            merged.metadata.error = Some(discovery.failure_reason());
            return merged;
        }

        let discovered = not_curated(&baseline.new_tools, &discovery.tools);
        let found = discovered.len();
        let indie = discovered.iter().filter(|t| t.is_indie).count();
        merged.new_tools = match self.config.placement {
            Placement::Append => baseline.new_tools.iter().cloned().chain(discovered).collect(),
            Placement::Prepend => discovered
                .into_iter()
                .chain(baseline.new_tools.iter().cloned())
                .collect(),
        };
        merged.ai_news = discovery.news.clone();
        merged.rss_updates = discovery.feed.clone();

        let summary = &mut merged.summary;
        summary.total_tools = baseline.summary.total_tools + found;
        summary.new_tools = merged.new_tools.len();
        summary.major_updates = merged.major_updates.len();
        summary.breakthroughs = merged.breakthroughs.len();
        summary.concerns = merged.concerns.len();
        summary.last_api_update = Some(discovery.fetched_at);
        summary.indie_tools_found = Some(indie);

        let metadata = &mut merged.metadata;
        let mut labels = discovery.sources_with_data.clone();
        labels.push(MANUAL_CURATION.to_string());
        metadata.data_source = labels.join(" + ");
        metadata.api_sources = discovery.api_sources.clone();
        metadata.update_method = UPDATE_METHOD.to_string();
        metadata.focus_area = Some(FOCUS_AREA.to_string());
        metadata.error = None;

        merged
    }

    async fn collect(&self, adapter: &dyn SourceAdapter) -> SourceOutcome {
        let mut outcome = SourceOutcome {
            label: adapter.label().to_string(),
            merge_cap: adapter.merge_cap(),
            state: SourceState::Unavailable,
            payload: None,
            detail: None,
        };

        if let Some(cached) = self.cache.get(adapter.key()) {
            log::debug!("{} served from cache", adapter.label());
            outcome.state = SourceState::Cached;
            outcome.payload = Some(cached);
            return outcome;
        }

        match adapter.fetch().await {
            Ok(payload) => {
                self.cache.put(adapter.key(), payload.clone());
                outcome.state = SourceState::Fresh;
                outcome.payload = Some(payload);
            }
            Err(e) => {
                log::warn!("{} unavailable: {e}", adapter.label());
                outcome.detail = Some(e.to_string());
                if let Some(stale) = self.cache.get_stale(adapter.key()) {
                    outcome.state = SourceState::Stale;
                    outcome.payload = Some(stale);
                } else if let Some(sample) = adapter.fallback() {
                    outcome.state = SourceState::Fallback;
                    outcome.payload = Some(sample);
                }
            }
        }
        outcome
    }
}

/// Discovered tools whose id or name is not already curated.
fn not_curated(curated: &[Item], discovered: &[Item]) -> Vec<Item> {
    let ids: HashSet<_> = curated.iter().map(|t| &t.id).collect();
    let names: HashSet<_> = curated.iter().map(|t| canonical_key(&t.name)).collect();
    discovered
        .iter()
        .filter(|t| !ids.contains(&t.id) && !names.contains(&canonical_key(&t.name)))
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::{Category, RecordId, seed};

    /// Adapter whose next answer is set by the test.
    pub(crate) struct MockAdapter {
        key: String,
        cap: usize,
        next: Mutex<Option<SourcePayload>>,
        sample: Option<SourcePayload>,
        pub calls: AtomicUsize,
    }

    impl MockAdapter {
        pub fn new(key: &str, next: Option<SourcePayload>) -> Self {
            Self {
                key: key.to_string(),
                cap: usize::MAX,
                next: Mutex::new(next),
                sample: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_cap(mut self, cap: usize) -> Self {
            self.cap = cap;
            self
        }

        pub fn with_fallback(mut self, sample: SourcePayload) -> Self {
            self.sample = Some(sample);
            self
        }

        pub fn set(&self, next: Option<SourcePayload>) {
            *self.next.lock().unwrap() = next;
        }
    }

    #[async_trait]
    impl SourceAdapter for MockAdapter {
        fn key(&self) -> &str {
            &self.key
        }

        fn label(&self) -> &str {
            &self.key
        }

        fn merge_cap(&self) -> usize {
            self.cap
        }

        async fn fetch(&self) -> Result<SourcePayload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.next
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| AppError::source(&self.key, "mock failure"))
        }

        fn fallback(&self) -> Option<SourcePayload> {
            self.sample.clone()
        }
    }

    pub(crate) fn tool(id: &str, name: &str) -> Item {
        Item {
            id: RecordId::from(id),
            name: name.to_string(),
            category: Category::Developer,
            description: "An LLM helper".into(),
            release_date: "2024-06-01T00:00:00Z".into(),
            company: "Independent".into(),
            features: vec!["AI/ML Capabilities".into()],
            audience: vec![Category::Developer],
            rating: 3.0,
            pricing: "Open Source".into(),
            link: format!("https://example.com/{id}"),
            stars: None,
            forks: None,
            votes: None,
            score: None,
            comments: None,
            language: None,
            source: Some("test".into()),
            is_indie: true,
        }
    }

    fn news(id: &str) -> NewsItem {
        NewsItem {
            id: id.to_string(),
            title: format!("AI story {id}"),
            description: "No description".into(),
            url: format!("https://news.example.com/{id}"),
            published: "2024-06-01T00:00:00Z".into(),
            source: "news.example.com".into(),
            score: None,
            comments: None,
            author: None,
            flair: None,
        }
    }

    fn tools(prefix: &str, n: usize) -> SourcePayload {
        SourcePayload::Tools(
            (0..n)
                .map(|i| tool(&format!("{prefix}_{i}"), &format!("{prefix} tool {i}")))
                .collect(),
        )
    }

    fn aggregator(adapters: Vec<Arc<dyn SourceAdapter>>) -> Aggregator {
        Aggregator::new(
            adapters,
            Arc::new(SourceCache::new(Duration::from_secs(1800))),
            AggregationConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_all_sources_failing_returns_baseline_with_error() {
        let baseline = seed::builtin().unwrap();
        let agg = aggregator(vec![
            Arc::new(MockAdapter::new("github", None)),
            Arc::new(MockAdapter::new("reddit", None)),
        ]);

        let result = agg.aggregate_all(&baseline).await;
        assert_eq!(result.new_tools, baseline.new_tools);
        assert_eq!(result.summary, baseline.summary);
        assert_eq!(result.metadata.data_source, FALLBACK_SOURCE);
        assert!(result.metadata.error.as_deref().unwrap().contains("mock failure"));
        assert!(
            result
                .metadata
                .source_status
                .iter()
                .all(|s| s.state == SourceState::Unavailable)
        );
    }

    #[tokio::test]
    async fn test_all_sources_empty_is_total_failure() {
        let baseline = seed::builtin().unwrap();
        let agg = aggregator(vec![
            Arc::new(MockAdapter::new("github", Some(SourcePayload::Tools(vec![])))),
            Arc::new(MockAdapter::new("rss", Some(SourcePayload::Feed(vec![])))),
        ]);

        let result = agg.aggregate_all(&baseline).await;
        assert_eq!(result.new_tools, baseline.new_tools);
        assert!(result.metadata.error.is_some());
        assert_eq!(result.metadata.source_status[0].state, SourceState::Fresh);
    }

    #[tokio::test]
    async fn test_no_sources_registered() {
        let baseline = seed::builtin().unwrap();
        let result = aggregator(vec![]).aggregate_all(&baseline).await;
        assert_eq!(result.new_tools, baseline.new_tools);
        assert_eq!(result.metadata.error.as_deref(), Some("No sources registered"));
    }

    #[tokio::test]
    async fn test_duplicates_across_sources_collapse() {
        let baseline = seed::builtin().unwrap();
        let agg = aggregator(vec![
            Arc::new(MockAdapter::new(
                "github",
                Some(SourcePayload::Tools(vec![tool("github_1", "GPT Helper")])),
            )),
            Arc::new(MockAdapter::new(
                "hackernews",
                Some(SourcePayload::Tools(vec![tool("hn_2", "gpt-helper!!")])),
            )),
        ]);

        let result = agg.aggregate_all(&baseline).await;
        let discovered = &result.new_tools[baseline.new_tools.len()..];
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].name, "GPT Helper");
        assert_eq!(result.summary.total_tools, baseline.summary.total_tools + 1);
        assert_eq!(result.summary.new_tools, baseline.new_tools.len() + 1);
        assert_eq!(result.summary.indie_tools_found, Some(1));
        assert!(result.metadata.error.is_none());
        assert_eq!(
            result.metadata.data_source,
            "github + hackernews + Manual curation"
        );
    }

    #[tokio::test]
    async fn test_per_source_and_total_caps() {
        let baseline = seed::builtin().unwrap();
        let agg = aggregator(vec![
            Arc::new(MockAdapter::new("github", Some(tools("gh", 20))).with_cap(8)),
            Arc::new(MockAdapter::new("producthunt", Some(tools("ph", 20))).with_cap(7)),
            Arc::new(MockAdapter::new("hackernews", Some(tools("hn", 20))).with_cap(5)),
        ]);

        let discovery = agg.discover().await;
        assert_eq!(discovery.tools.len(), 15);
        let from_hn = discovery
            .tools
            .iter()
            .filter(|t| t.id.to_string().starts_with("hn_"))
            .count();
        assert_eq!(from_hn, 0);

        let merged = agg.merge(&baseline, &discovery);
        assert_eq!(merged.new_tools.len(), baseline.new_tools.len() + 15);
        assert_eq!(merged.new_tools[..baseline.new_tools.len()], baseline.new_tools[..]);
    }

    #[tokio::test]
    async fn test_prepend_placement() {
        let baseline = seed::builtin().unwrap();
        let agg = Aggregator::new(
            vec![Arc::new(MockAdapter::new("github", Some(tools("gh", 2))))],
            Arc::new(SourceCache::new(Duration::from_secs(60))),
            AggregationConfig {
                placement: Placement::Prepend,
                ..AggregationConfig::default()
            },
        );

        let result = agg.aggregate_all(&baseline).await;
        assert_eq!(result.new_tools[0].id, RecordId::from("gh_0"));
        assert_eq!(result.new_tools[2..], baseline.new_tools[..]);
    }

    #[tokio::test]
    async fn test_news_limits() {
        let baseline = seed::builtin().unwrap();
        let posts = SourcePayload::News((0..10).map(|i| news(&format!("r{i}"))).collect());
        let entries = SourcePayload::Feed((0..8).map(|i| news(&format!("f{i}"))).collect());
        let agg = aggregator(vec![
            Arc::new(MockAdapter::new("reddit", Some(posts))),
            Arc::new(MockAdapter::new("rss", Some(entries))),
        ]);

        let result = agg.aggregate_all(&baseline).await;
        assert_eq!(result.ai_news.len(), 5);
        assert_eq!(result.rss_updates.len(), 5);
        assert_eq!(result.ai_news[0].id, "r0");
        assert_eq!(result.new_tools, baseline.new_tools);
    }

    #[tokio::test]
    async fn test_second_pass_served_from_cache() {
        let baseline = seed::builtin().unwrap();
        let github = Arc::new(MockAdapter::new("github", Some(tools("gh", 1))));
        let agg = aggregator(vec![github.clone()]);

        agg.aggregate_all(&baseline).await;
        let second = agg.aggregate_all(&baseline).await;

        assert_eq!(github.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.metadata.source_status[0].state, SourceState::Cached);
        assert_eq!(second.new_tools.len(), baseline.new_tools.len() + 1);
    }

    #[tokio::test]
    async fn test_failed_source_uses_stale_entry() {
        let baseline = seed::builtin().unwrap();
        let github = Arc::new(MockAdapter::new("github", Some(tools("gh", 2))));
        let agg = Aggregator::new(
            vec![github.clone()],
            Arc::new(SourceCache::new(Duration::ZERO)),
            AggregationConfig::default(),
        );

        agg.aggregate_all(&baseline).await;
        github.set(None);
        let result = agg.aggregate_all(&baseline).await;

        assert_eq!(github.calls.load(Ordering::SeqCst), 2);
        let status = &result.metadata.source_status[0];
        assert_eq!(status.state, SourceState::Stale);
        assert_eq!(status.items, 2);
        assert!(status.detail.is_some());
        assert!(result.metadata.error.is_none());
        assert_eq!(result.new_tools.len(), baseline.new_tools.len() + 2);
    }

    #[tokio::test]
    async fn test_static_fallback_used_but_not_counted() {
        let baseline = seed::builtin().unwrap();
        let producthunt = MockAdapter::new("producthunt", None)
            .with_fallback(SourcePayload::Tools(vec![tool("ph_fallback_1", "IndieLLM")]));
        let github = Arc::new(MockAdapter::new("github", Some(tools("gh", 1))));
        let agg = aggregator(vec![github.clone(), Arc::new(producthunt)]);

        let result = agg.aggregate_all(&baseline).await;
        assert_eq!(result.metadata.source_status[1].state, SourceState::Fallback);
        assert!(result.new_tools.iter().any(|t| t.name == "IndieLLM"));

        // Only the sample left: treated as a total outage.
        let producthunt = MockAdapter::new("producthunt", None)
            .with_fallback(SourcePayload::Tools(vec![tool("ph_fallback_1", "IndieLLM")]));
        let alone = aggregator(vec![Arc::new(producthunt)]);
        let result = alone.aggregate_all(&baseline).await;
        assert_eq!(result.new_tools, baseline.new_tools);
        assert_eq!(result.metadata.data_source, FALLBACK_SOURCE);
    }

    #[tokio::test]
    async fn test_summary_recount() {
        let mut baseline = seed::builtin().unwrap();
        baseline.concerns.truncate(1);
        let agg = aggregator(vec![Arc::new(MockAdapter::new("github", Some(tools("gh", 3))))]);

        let result = agg.aggregate_all(&baseline).await;
        assert_eq!(result.summary.concerns, 1);
        assert_eq!(result.summary.major_updates, baseline.major_updates.len());
        assert_eq!(result.summary.breakthroughs, baseline.breakthroughs.len());
        assert_eq!(result.summary.weekly_growth, baseline.summary.weekly_growth);
        assert!(result.summary.last_api_update.is_some());
        assert_eq!(result.metadata.api_sources, vec!["github"]);
        assert_eq!(result.metadata.focus_area.as_deref(), Some(FOCUS_AREA));
    }

    #[tokio::test]
    async fn test_curated_tools_win_over_rediscovered_ones() {
        let mut baseline = seed::builtin().unwrap();
        baseline.new_tools.push(tool("github_1", "Tiny LLM"));
        let agg = aggregator(vec![Arc::new(MockAdapter::new(
            "github",
            Some(SourcePayload::Tools(vec![
                tool("github_1", "Tiny LLM"),
                tool("github_2", "cursor-ide"),
                tool("github_3", "Vector Box"),
            ])),
        ))]);

        let result = agg.aggregate_all(&baseline).await;
        let ids: Vec<_> = result.new_tools.iter().map(|t| t.id.clone()).collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(result.new_tools.len(), baseline.new_tools.len() + 1);
        assert_eq!(result.new_tools.last().unwrap().id, RecordId::from("github_3"));
        assert_eq!(result.summary.total_tools, baseline.summary.total_tools + 1);
        assert_eq!(result.summary.indie_tools_found, Some(1));
    }
}
