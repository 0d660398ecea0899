//! Aggregation pipeline.
//!
//! - `classify`: keyword categorization and popularity ratings
//! - `filter`: AI detectors and the vendor denylist
//! - `dedup`: name-based duplicate removal
//! - `cache`: per-source response cache
//! - `aggregate`: fan-out, merge and fallback
//! - `search`: text search and tool filters

pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod dedup;
pub mod filter;
pub mod search;

pub use aggregate::{Aggregator, Discovery};
pub use cache::SourceCache;
pub use dedup::{canonical_key, dedupe};
pub use filter::{AiNewsDetector, AiToolDetector, Denylist, DiscoveryFilters, ItemFilter, SharedFilter};
pub use search::{ToolQuery, search};
