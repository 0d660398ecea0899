//! Tool and news item data structures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Audience/category bucket shared by `category` and `audience`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Developer,
    Designer,
    #[serde(rename = "Product Manager")]
    ProductManager,
    Business,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Developer,
        Category::Designer,
        Category::ProductManager,
        Category::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Developer => "Developer",
            Category::Designer => "Designer",
            Category::ProductManager => "Product Manager",
            Category::Business => "Business",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "developer" | "dev" => Ok(Category::Developer),
            "designer" | "design" => Ok(Category::Designer),
            "productmanager" | "pm" => Ok(Category::ProductManager),
            "business" => Ok(Category::Business),
            _ => Err(AppError::validation(format!("Unknown category '{s}'"))),
        }
    }
}

/// Record identifier.
///
/// Curated records carry numeric ids, discovered items carry
/// source-namespaced strings such as `github_123`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Num(u64),
    Text(String),
}

impl RecordId {
    pub fn as_num(&self) -> Option<u64> {
        match self {
            RecordId::Num(n) => Some(*n),
            RecordId::Text(_) => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Num(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        RecordId::Num(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    /// Digits parse as numeric ids, anything else is kept as text.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(s.parse::<u64>()
            .map(RecordId::Num)
            .unwrap_or_else(|_| RecordId::Text(s.to_string())))
    }
}

/// A unified AI tool record, curated or discovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: RecordId,
    pub name: String,
    pub category: Category,
    pub description: String,

    /// ISO-8601 date or timestamp
    pub release_date: String,
    pub company: String,
    pub features: Vec<String>,
    pub audience: Vec<Category>,

    /// 1.0 to 5.0, one decimal place
    pub rating: f64,
    pub pricing: String,
    pub link: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forks: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Provenance tag ("GitHub", "Hacker News", ...); absent for curated tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_indie: bool,
}

impl Item {
    /// Highest raw popularity signal carried by the item.
    pub fn popularity(&self) -> u64 {
        [self.stars, self.votes, self.score]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(0)
    }
}

/// A news entry from a link aggregator or RSS feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,

    /// ISO-8601 publication time as reported upstream
    pub published: String,
    pub source: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flair: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&Category::ProductManager).unwrap();
        assert_eq!(json, "\"Product Manager\"");
        let back: Category = serde_json::from_str("\"Product Manager\"").unwrap();
        assert_eq!(back, Category::ProductManager);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("product-manager".parse::<Category>().unwrap(), Category::ProductManager);
        assert_eq!("DESIGNER".parse::<Category>().unwrap(), Category::Designer);
        assert!("astronaut".parse::<Category>().is_err());
    }

    #[test]
    fn test_record_id_untagged() {
        let num: RecordId = serde_json::from_str("7").unwrap();
        let text: RecordId = serde_json::from_str("\"github_7\"").unwrap();
        assert_eq!(num, RecordId::Num(7));
        assert_eq!(text, RecordId::Text("github_7".into()));
        assert_eq!("42".parse::<RecordId>().unwrap(), RecordId::Num(42));
        assert_eq!("hn_1".parse::<RecordId>().unwrap(), RecordId::from("hn_1"));
    }

    #[test]
    fn test_item_camel_case_and_optional_fields() {
        let json = r#"{
            "id": 1, "name": "Cursor IDE", "category": "Developer",
            "description": "AI editor", "releaseDate": "2024-06-15",
            "company": "Cursor", "features": ["Smart autocomplete"],
            "audience": ["Developer"], "rating": 4.7,
            "pricing": "Free + Pro", "link": "https://cursor.sh"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.release_date, "2024-06-15");
        assert!(!item.is_indie);
        assert_eq!(item.popularity(), 0);

        let out = serde_json::to_value(&item).unwrap();
        assert!(out.get("stars").is_none());
        assert!(out.get("isIndie").is_none());
        assert_eq!(out["releaseDate"], "2024-06-15");
    }
}
