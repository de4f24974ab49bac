use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::enums::ClusterStatus;

/// A group of enriched items whose embeddings are mutually close in cosine
/// space, treated as a single evolving story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeCluster {
    /// May be inherited from a prior run's cluster (see Clusterer §4.4(d))
    pub id: String,
    pub label: String,
    pub summary: String,
    pub item_count: usize,
    /// Earliest publication time of any member; preserved across inheritance
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub centroid: Vec<f32>,
    pub source_distribution: HashMap<String, usize>,
    pub sentiment_distribution: SentimentDistribution,
    pub key_entities: Vec<String>,
    pub key_claims: Vec<String>,
    pub status: ClusterStatus,
    pub parent_id: Option<String>,
}

/// Five-bin sentiment histogram for a cluster's members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub very_negative: usize,
    pub negative: usize,
    pub neutral: usize,
    pub positive: usize,
    pub very_positive: usize,
}

/// (item_id, cluster_id, assigned_at) — wiped and rewritten on each run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMembership {
    pub item_id: String,
    pub cluster_id: String,
    pub assigned_at: DateTime<Utc>,
}
