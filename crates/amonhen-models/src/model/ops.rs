use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::SourceFamily;

/// Append-only record of a single LLM call's cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLogEntry {
    pub item_id: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub timestamp: DateTime<Utc>,
}

/// Per-source-family fetch health, one row per source name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceHealth {
    pub source_name: String,
    pub source_family: SourceFamily,
    pub last_fetch_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub items_fetched: u64,
    pub error_count: u64,
    pub last_error: Option<String>,
}

/// A generated daily intelligence digest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDigest {
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub content: String,
    pub cluster_count: usize,
    pub item_count: usize,
    pub model: String,
}
