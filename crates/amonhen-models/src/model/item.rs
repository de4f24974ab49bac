use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::enums::{EntityRole, EntityType, SourceFamily};
use super::metadata::Metadata;

/// A single entity extracted from an item's content by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityType,
    pub role: EntityRole,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Raw item as produced by a fetch adapter, before enrichment
///
/// Never persisted in this form — promoted to [`EnrichedItem`] or dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub id: String,
    pub source_family: SourceFamily,
    pub source_name: String,
    /// Canonical URL — the dedup key
    pub canonical_url: String,
    pub title: Option<String>,
    pub content_text: String,
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub source_metadata: Metadata,
}

fn default_language() -> String {
    "en".to_string()
}

impl RawItem {
    pub fn new(
        source_family: SourceFamily,
        source_name: impl Into<String>,
        canonical_url: impl Into<String>,
        content_text: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_family,
            source_name: source_name.into(),
            canonical_url: canonical_url.into(),
            title: None,
            content_text: content_text.into(),
            author: None,
            published_at,
            ingested_at: Utc::now(),
            language: default_language(),
            source_metadata: Metadata::new(),
        }
    }
}

/// Pure LLM parse result for a single item — the "intelligence signal"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub summary: String,
    pub entities: Vec<Entity>,
    pub claims: Vec<String>,
    pub framing: String,
    /// Always in [-1.0, 1.0] post-clamp
    pub sentiment: f64,
    pub topic_tags: Vec<String>,
}

/// RawItem identity + EnrichmentResult + embedding/cost/cluster metadata,
/// persisted in the MetaStore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedItem {
    pub id: String,
    pub source_family: SourceFamily,
    pub source_name: String,
    pub canonical_url: String,
    pub title: Option<String>,
    pub published_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
    pub language: String,

    pub summary: String,
    pub entities: Vec<Entity>,
    pub claims: Vec<String>,
    pub framing: String,
    pub sentiment: f64,
    pub topic_tags: Vec<String>,

    /// Equal to `id`
    pub embedding_id: String,
    pub embedding_model: String,

    pub cluster_id: Option<String>,
    pub cluster_label: Option<String>,

    pub enrichment_model: String,
    pub enrichment_cost_usd: f64,

    pub archived: bool,
}

impl EnrichedItem {
    /// Build the embedding input for the vector payload (see §6 of the spec)
    pub fn vector_payload(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert(
            "source_type".to_string(),
            serde_json::Value::String(self.source_family.as_str().to_string()),
        );
        map.insert(
            "source_name".to_string(),
            serde_json::Value::String(self.source_name.clone()),
        );
        map.insert(
            "published_at".to_string(),
            serde_json::Value::String(self.published_at.to_rfc3339()),
        );
        map.insert(
            "title".to_string(),
            serde_json::Value::String(self.title.clone().unwrap_or_default()),
        );
        map.insert(
            "summary".to_string(),
            serde_json::Value::String(self.summary.clone()),
        );
        map
    }
}
