//! The dataset aggregate root and its curated record types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Item, NewsItem, RecordId};

/// Impact level of a product update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// Significance of a research breakthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    Revolutionary,
    High,
    Medium,
    Low,
}

/// Severity of a risk concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorUpdate {
    pub id: RecordId,
    pub tool: String,
    pub company: String,
    pub update: String,
    pub date: String,
    pub description: String,
    pub impact: Impact,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakthrough {
    pub id: RecordId,
    pub title: String,
    pub organization: String,
    pub date: String,
    pub description: String,
    pub significance: Significance,
    pub applications: Vec<String>,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concern {
    pub id: RecordId,
    pub title: String,
    pub severity: Severity,
    pub description: String,
    pub affected_areas: Vec<String>,
    pub mitigation_strategies: Vec<String>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrend {
    pub id: RecordId,
    pub trend: String,
    pub description: String,
    pub growth: String,
    pub timeframe: String,
}

/// How a source fared during the last aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceState {
    /// Fetched during this pass
    Fresh,
    /// Served from a cache entry inside its window
    Cached,
    /// Fetch failed, an expired cache entry was used
    Stale,
    /// Fetch failed, the adapter's static sample was used
    Fallback,
    /// Fetch failed, nothing was contributed
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub name: String,
    pub state: SourceState,
    pub items: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub last_updated: DateTime<Utc>,
    pub data_source: String,
    #[serde(default)]
    pub api_sources: Vec<String>,
    #[serde(default)]
    pub update_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_status: Vec<SourceStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_tools: usize,
    pub new_tools: usize,
    pub major_updates: usize,
    pub breakthroughs: usize,
    pub concerns: usize,
    pub weekly_growth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_api_update: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indie_tools_found: Option<usize>,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub metadata: Metadata,
    pub summary: Summary,
    pub new_tools: Vec<Item>,
    pub major_updates: Vec<MajorUpdate>,
    pub breakthroughs: Vec<Breakthrough>,
    pub concerns: Vec<Concern>,
    pub market_trends: Vec<MarketTrend>,
    #[serde(default)]
    pub ai_news: Vec<NewsItem>,
    #[serde(default)]
    pub rss_updates: Vec<NewsItem>,
}

/// Editable collections of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Tools,
    Updates,
    Breakthroughs,
    Concerns,
    Trends,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Tools,
        Collection::Updates,
        Collection::Breakthroughs,
        Collection::Concerns,
        Collection::Trends,
    ];

    /// JSON field name of the collection.
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Tools => "newTools",
            Collection::Updates => "majorUpdates",
            Collection::Breakthroughs => "breakthroughs",
            Collection::Concerns => "concerns",
            Collection::Trends => "marketTrends",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Collection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tools" | "newtools" => Ok(Collection::Tools),
            "updates" | "majorupdates" => Ok(Collection::Updates),
            "breakthroughs" => Ok(Collection::Breakthroughs),
            "concerns" => Ok(Collection::Concerns),
            "trends" | "markettrends" => Ok(Collection::Trends),
            _ => Err(AppError::validation(format!("Unknown collection '{s}'"))),
        }
    }
}

/// A record living in one of the curated collections.
pub trait CuratedRecord: Clone + Serialize + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &RecordId;
    fn set_id(&mut self, id: RecordId);

    /// Text fields the dashboard search looks at.
    fn haystack(&self) -> Vec<&str>;

    fn items(dataset: &Dataset) -> &[Self];
    fn items_mut(dataset: &mut Dataset) -> &mut Vec<Self>;
}

impl CuratedRecord for Item {
    const COLLECTION: Collection = Collection::Tools;

    fn id(&self) -> &RecordId {
        &self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn haystack(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str(), self.company.as_str()]
    }
    fn items(dataset: &Dataset) -> &[Self] {
        &dataset.new_tools
    }
    fn items_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.new_tools
    }
}

impl CuratedRecord for MajorUpdate {
    const COLLECTION: Collection = Collection::Updates;

    fn id(&self) -> &RecordId {
        &self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn haystack(&self) -> Vec<&str> {
        vec![
            self.tool.as_str(),
            self.company.as_str(),
            self.update.as_str(),
            self.description.as_str(),
        ]
    }
    fn items(dataset: &Dataset) -> &[Self] {
        &dataset.major_updates
    }
    fn items_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.major_updates
    }
}

impl CuratedRecord for Breakthrough {
    const COLLECTION: Collection = Collection::Breakthroughs;

    fn id(&self) -> &RecordId {
        &self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn haystack(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.organization.as_str(),
            self.description.as_str(),
            self.impact.as_str(),
        ]
    }
    fn items(dataset: &Dataset) -> &[Self] {
        &dataset.breakthroughs
    }
    fn items_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.breakthroughs
    }
}

impl CuratedRecord for Concern {
    const COLLECTION: Collection = Collection::Concerns;

    fn id(&self) -> &RecordId {
        &self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn haystack(&self) -> Vec<&str> {
        let mut fields = vec![
            self.title.as_str(),
            self.description.as_str(),
            self.status.as_str(),
        ];
        fields.extend(self.affected_areas.iter().map(String::as_str));
        fields
    }
    fn items(dataset: &Dataset) -> &[Self] {
        &dataset.concerns
    }
    fn items_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.concerns
    }
}

impl CuratedRecord for MarketTrend {
    const COLLECTION: Collection = Collection::Trends;

    fn id(&self) -> &RecordId {
        &self.id
    }
    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
    fn haystack(&self) -> Vec<&str> {
        vec![
            self.trend.as_str(),
            self.description.as_str(),
            self.timeframe.as_str(),
        ]
    }
    fn items(dataset: &Dataset) -> &[Self] {
        &dataset.market_trends
    }
    fn items_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.market_trends
    }
}

impl Dataset {
    /// Look up a record by id.
    pub fn find<R: CuratedRecord>(&self, id: &RecordId) -> Option<&R> {
        R::items(self).iter().find(|r| r.id() == id)
    }

    /// Number of records in a collection.
    pub fn count(&self, collection: Collection) -> usize {
        match collection {
            Collection::Tools => self.new_tools.len(),
            Collection::Updates => self.major_updates.len(),
            Collection::Breakthroughs => self.breakthroughs.len(),
            Collection::Concerns => self.concerns.len(),
            Collection::Trends => self.market_trends.len(),
        }
    }

    /// A fresh id for a new record: the current time in milliseconds, bumped
    /// past any numeric id already present in the collection.
    pub fn next_id<R: CuratedRecord>(&self, now: DateTime<Utc>) -> RecordId {
        let stamp = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let highest = R::items(self)
            .iter()
            .filter_map(|r| r.id().as_num())
            .max()
            .map_or(0, |n| n + 1);
        RecordId::Num(stamp.max(highest))
    }

    /// Return a copy with `record` prepended under a newly generated id.
    pub fn with_created<R: CuratedRecord>(&self, mut record: R) -> (Dataset, RecordId) {
        let id = self.next_id::<R>(Utc::now());
        record.set_id(id.clone());

        let mut next = self.clone();
        R::items_mut(&mut next).insert(0, record);
        (next, id)
    }

    /// Return a copy with the record `id` replaced by `record`.
    pub fn with_updated<R: CuratedRecord>(&self, id: &RecordId, mut record: R) -> Result<Dataset> {
        let position = R::items(self)
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| AppError::not_found(R::COLLECTION, id))?;

        record.set_id(id.clone());
        let mut next = self.clone();
        R::items_mut(&mut next)[position] = record;
        Ok(next)
    }

    /// Return a copy without the record `id` in `collection`.
    pub fn with_deleted(&self, collection: Collection, id: &RecordId) -> Result<Dataset> {
        match collection {
            Collection::Tools => self.remove::<Item>(id),
            Collection::Updates => self.remove::<MajorUpdate>(id),
            Collection::Breakthroughs => self.remove::<Breakthrough>(id),
            Collection::Concerns => self.remove::<Concern>(id),
            Collection::Trends => self.remove::<MarketTrend>(id),
        }
    }

    fn remove<R: CuratedRecord>(&self, id: &RecordId) -> Result<Dataset> {
        if self.find::<R>(id).is_none() {
            return Err(AppError::not_found(R::COLLECTION, id));
        }
        let mut next = self.clone();
        R::items_mut(&mut next).retain(|r| r.id() != id);
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed;

    fn baseline() -> Dataset {
        seed::builtin().unwrap()
    }

    fn blank_update() -> MajorUpdate {
        MajorUpdate {
            id: RecordId::Num(0),
            tool: "Zed".into(),
            company: "Zed Industries".into(),
            update: "Agent panel".into(),
            date: "2024-07-01".into(),
            description: "Inline assistant".into(),
            impact: Impact::Medium,
            category: "Development".into(),
        }
    }

    #[test]
    fn test_create_prepends_with_fresh_id() {
        let data = baseline();
        let (next, id) = data.with_created(blank_update());

        assert_eq!(next.major_updates.len(), data.major_updates.len() + 1);
        assert_eq!(next.major_updates[0].id, id);
        assert!(data.find::<MajorUpdate>(&id).is_none());
    }

    #[test]
    fn test_create_then_delete_restores_collection() {
        let data = baseline();
        let (created, id) = data.with_created(blank_update());
        let restored = created.with_deleted(Collection::Updates, &id).unwrap();

        assert_eq!(restored.major_updates, data.major_updates);
        assert_eq!(restored, data);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let data = baseline();
        let target = data.concerns[1].clone();
        let mut edited = target.clone();
        edited.severity = Severity::Low;
        edited.id = RecordId::Num(999);

        let next = data.with_updated(&target.id, edited).unwrap();
        assert_eq!(next.concerns[1].severity, Severity::Low);
        assert_eq!(next.concerns[1].id, target.id);
        assert_eq!(next.concerns.len(), data.concerns.len());
    }

    #[test]
    fn test_missing_id_is_reported_and_leaves_data_alone() {
        let data = baseline();
        let missing = RecordId::Num(123_456);

        assert!(matches!(
            data.with_deleted(Collection::Trends, &missing),
            Err(AppError::RecordNotFound { .. })
        ));
        assert!(data.with_updated(&missing, blank_update()).is_err());
    }

    #[test]
    fn test_next_id_skips_existing() {
        let data = baseline();
        let epoch = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let max = data.new_tools.iter().filter_map(|t| t.id.as_num()).max().unwrap();
        assert_eq!(data.next_id::<Item>(epoch), RecordId::Num(max + 1));
    }

    #[test]
    fn test_collection_parse() {
        assert_eq!("tools".parse::<Collection>().unwrap(), Collection::Tools);
        assert_eq!("marketTrends".parse::<Collection>().unwrap(), Collection::Trends);
        assert!("widgets".parse::<Collection>().is_err());
    }
}
