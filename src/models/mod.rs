// src/models/mod.rs

//! Domain models for the aggregator.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod dataset;
mod item;
pub mod seed;

// Re-export all public types
pub use config::{
    AggregationConfig, CacheConfig, Config, FilterConfig, GithubConfig, HackerNewsConfig,
    HttpConfig, PathsConfig, Placement, ProductHuntConfig, RedditConfig, RssConfig,
    SourcesConfig,
};
pub use dataset::{
    Breakthrough, Collection, Concern, CuratedRecord, Dataset, Impact, MajorUpdate, MarketTrend,
    Metadata, Severity, Significance, SourceState, SourceStatus, Summary,
};
pub use item::{Category, Item, NewsItem, RecordId};
