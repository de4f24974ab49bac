//! Source-family configuration
//!
//! Grounded on `config.py::SourcesConfig` and friends. Content is opaque
//! to the rest of the core per `spec.md` §9 — no fetch adapter reads
//! these structs in this crate, they are carried for a caller outside the
//! pipeline's scope to configure its adapters against.

use std::path::Path;

use amonhen_core_types::{AmError, AmErrorKind, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssSourceConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u32,
}

fn default_category() -> String {
    "uncategorized".to_string()
}

fn default_refresh_minutes() -> u32 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdeltQueryConfig {
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(default = "default_gdelt_refresh")]
    pub refresh_minutes: u32,
}

fn default_gdelt_refresh() -> u32 {
    15
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GdeltConfig {
    pub enabled: bool,
    pub queries: Vec<GdeltQueryConfig>,
}

impl Default for GdeltConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueskyConfig {
    pub enabled: bool,
    pub filter_mode: String,
    pub keywords: Vec<String>,
    pub max_posts_per_cycle: u32,
    pub refresh_minutes: u32,
}

impl Default for BlueskyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filter_mode: "keyword".to_string(),
            keywords: Vec::new(),
            max_posts_per_cycle: 200,
            refresh_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditSubredditConfig {
    pub name: String,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_subreddit_limit")]
    pub limit: u32,
}

fn default_sort() -> String {
    "hot".to_string()
}

fn default_subreddit_limit() -> u32 {
    25
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub enabled: bool,
    pub subreddits: Vec<RedditSubredditConfig>,
    pub include_top_comments: u32,
    pub refresh_minutes: u32,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            subreddits: Vec::new(),
            include_top_comments: 3,
            refresh_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub rss: Vec<RssSourceConfig>,
    pub gdelt: GdeltConfig,
    pub bluesky: BlueskyConfig,
    pub reddit: RedditConfig,
}

impl SourcesConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AmError::new(AmErrorKind::Io)
                .with_op("sources_load")
                .with_message(e.to_string())
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            AmError::new(AmErrorKind::Serialization)
                .with_op("sources_load")
                .with_message(format!("invalid sources YAML at {}: {e}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_sources_document() {
        let yaml = r#"
rss:
  - name: "bbc-world"
    url: "https://feeds.bbci.co.uk/news/world/rss.xml"
reddit:
  subreddits:
    - name: "worldnews"
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.yaml");
        std::fs::write(&path, yaml).unwrap();

        let config = SourcesConfig::load(&path).unwrap();
        assert_eq!(config.rss.len(), 1);
        assert_eq!(config.rss[0].category, "uncategorized");
        assert_eq!(config.reddit.subreddits[0].sort, "hot");
        assert!(config.gdelt.enabled);
    }
}
