//! In-process VectorIndex
//!
//! Grounded on the Qdrant-backed `storage/vectors.py`: a single fixed-size
//! collection, cosine distance, `source_type`/`published_at` payload
//! filters on search and scroll. Qdrant itself is out of scope for an
//! embedded single-node deployment — this is a process-local stand-in with
//! the same call surface.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use amonhen_core_types::{AmError, AmErrorKind, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cosine::cosine_similarity;

/// Dimensionality of every vector in the collection (`all-MiniLM-L6-v2`)
pub const VECTOR_SIZE: usize = 384;

pub const COLLECTION_NAME: &str = "amon_hen_items";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Point {
    vector: Vec<f32>,
    payload: HashMap<String, Value>,
}

/// A single scored search hit
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f32,
    pub payload: HashMap<String, Value>,
}

/// Optional filter applied to [`VectorIndex::search`] and
/// [`VectorIndex::scroll_all`]
#[derive(Debug, Clone, Default)]
pub struct PointFilter {
    pub source_type: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

impl PointFilter {
    fn matches(&self, payload: &HashMap<String, Value>) -> bool {
        if let Some(source_type) = &self.source_type {
            let matches = payload
                .get("source_type")
                .and_then(Value::as_str)
                .map(|v| v == source_type)
                .unwrap_or(false);
            if !matches {
                return false;
            }
        }
        if let Some(since) = self.since {
            let published_at = payload
                .get("published_at")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc));
            match published_at {
                Some(dt) if dt >= since => {}
                _ => return false,
            }
        }
        true
    }
}

/// Collection summary returned by [`VectorIndex::collection_info`]
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    pub name: String,
    pub points_count: usize,
}

/// Process-local, fixed-dimension cosine vector index
pub struct VectorIndex {
    points: RwLock<HashMap<String, Point>>,
}

impl Default for VectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorIndex {
    pub fn new() -> Self {
        Self {
            points: RwLock::new(HashMap::new()),
        }
    }

    /// Load a previously [`save`](Self::save)d collection from `path`, or
    /// start empty if the file does not exist yet — mirrors
    /// `MetaStore::open`'s create-if-missing semantics, since this is the
    /// only persistence this process-local index has: restart loses
    /// anything not saved since.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AmError::new(AmErrorKind::Io)
                .with_op("vectorindex_open")
                .with_message(e.to_string())
        })?;
        let points: HashMap<String, Point> = serde_json::from_str(&raw).map_err(|e| {
            AmError::new(AmErrorKind::Serialization)
                .with_op("vectorindex_open")
                .with_message(format!("invalid vector snapshot at {}: {e}", path.display()))
        })?;
        Ok(Self {
            points: RwLock::new(points),
        })
    }

    /// Persist the current collection to `path` as a JSON snapshot.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let points = self.points.read().unwrap();
        let raw = serde_json::to_string(&*points).map_err(|e| {
            AmError::new(AmErrorKind::Serialization)
                .with_op("vectorindex_save")
                .with_message(e.to_string())
        })?;
        std::fs::write(path, raw).map_err(|e| {
            AmError::new(AmErrorKind::Io)
                .with_op("vectorindex_save")
                .with_message(e.to_string())
        })
    }

    fn validate_dimension(vector: &[f32]) -> Result<()> {
        if vector.len() != VECTOR_SIZE {
            return Err(AmError::new(AmErrorKind::InvalidInput)
                .with_op("vectorindex_upsert")
                .with_message(format!(
                    "expected a {VECTOR_SIZE}-dimension vector, got {}",
                    vector.len()
                )));
        }
        Ok(())
    }

    /// Insert or replace the point at `point_id`
    pub fn upsert_item(
        &self,
        point_id: &str,
        vector: Vec<f32>,
        payload: HashMap<String, Value>,
    ) -> Result<()> {
        Self::validate_dimension(&vector)?;
        let mut points = self.points.write().unwrap();
        points.insert(point_id.to_string(), Point { vector, payload });
        Ok(())
    }

    /// Top-`limit` nearest neighbors to `query_vector` by cosine similarity,
    /// highest score first
    pub fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        filter: &PointFilter,
    ) -> Result<Vec<ScoredPoint>> {
        Self::validate_dimension(query_vector)?;
        let points = self.points.read().unwrap();
        let mut hits: Vec<ScoredPoint> = points
            .iter()
            .filter(|(_, p)| filter.matches(&p.payload))
            .map(|(id, p)| ScoredPoint {
                id: id.clone(),
                score: cosine_similarity(query_vector, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }

    /// All (id, vector) pairs matching `filter`, for the clustering pass
    pub fn scroll_all(&self, filter: &PointFilter) -> Vec<(String, Vec<f32>)> {
        let points = self.points.read().unwrap();
        points
            .iter()
            .filter(|(_, p)| filter.matches(&p.payload))
            .map(|(id, p)| (id.clone(), p.vector.clone()))
            .collect()
    }

    /// Retrieve vectors for a specific set of ids
    pub fn get_vectors_by_ids(&self, ids: &[String]) -> HashMap<String, Vec<f32>> {
        let points = self.points.read().unwrap();
        ids.iter()
            .filter_map(|id| points.get(id).map(|p| (id.clone(), p.vector.clone())))
            .collect()
    }

    /// Remove points by id; ids not present are silently ignored
    pub fn delete_points(&self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }
        let mut points = self.points.write().unwrap();
        for id in ids {
            points.remove(id);
        }
    }

    pub fn collection_info(&self) -> CollectionInfo {
        let points = self.points.read().unwrap();
        CollectionInfo {
            name: COLLECTION_NAME.to_string(),
            points_count: points.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_vector(lead: f32) -> Vec<f32> {
        let mut v = vec![0.0; VECTOR_SIZE];
        v[0] = lead;
        v[1] = (1.0 - lead * lead).max(0.0).sqrt();
        v
    }

    #[test]
    fn rejects_wrong_dimension_vectors() {
        let index = VectorIndex::new();
        let err = index
            .upsert_item("a", vec![0.1, 0.2], HashMap::new())
            .unwrap_err();
        assert_eq!(err.kind(), AmErrorKind::InvalidInput);
    }

    #[test]
    fn search_orders_by_similarity_descending() {
        let index = VectorIndex::new();
        index.upsert_item("close", unit_vector(0.99), HashMap::new()).unwrap();
        index.upsert_item("far", unit_vector(0.1), HashMap::new()).unwrap();

        let query = unit_vector(1.0);
        let hits = index.search(&query, 2, &PointFilter::default()).unwrap();
        assert_eq!(hits[0].id, "close");
        assert_eq!(hits[1].id, "far");
    }

    #[test]
    fn search_respects_source_type_filter() {
        let index = VectorIndex::new();
        let mut rss_payload = HashMap::new();
        rss_payload.insert("source_type".to_string(), Value::String("rss".to_string()));
        index.upsert_item("rss-item", unit_vector(0.9), rss_payload).unwrap();

        let mut reddit_payload = HashMap::new();
        reddit_payload.insert("source_type".to_string(), Value::String("reddit".to_string()));
        index.upsert_item("reddit-item", unit_vector(0.9), reddit_payload).unwrap();

        let filter = PointFilter {
            source_type: Some("reddit".to_string()),
            since: None,
        };
        let hits = index.search(&unit_vector(0.9), 10, &filter).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "reddit-item");
    }

    #[test]
    fn delete_then_scroll_omits_deleted_points() {
        let index = VectorIndex::new();
        index.upsert_item("a", unit_vector(0.5), HashMap::new()).unwrap();
        index.upsert_item("b", unit_vector(0.6), HashMap::new()).unwrap();

        index.delete_points(&["a".to_string()]);
        let remaining = index.scroll_all(&PointFilter::default());
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].0, "b");
    }

    #[test]
    fn collection_info_reports_point_count() {
        let index = VectorIndex::new();
        index.upsert_item("a", unit_vector(0.5), HashMap::new()).unwrap();
        let info = index.collection_info();
        assert_eq!(info.points_count, 1);
        assert_eq!(info.name, COLLECTION_NAME);
    }

    #[test]
    fn opening_a_missing_path_yields_an_empty_index() {
        let index = VectorIndex::open("/nonexistent/path/vectors.json").unwrap();
        assert_eq!(index.collection_info().points_count, 0);
    }

    #[test]
    fn save_then_open_round_trips_points_and_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.json");

        let index = VectorIndex::new();
        let mut payload = HashMap::new();
        payload.insert("source_type".to_string(), Value::String("rss".to_string()));
        index.upsert_item("a", unit_vector(0.5), payload).unwrap();
        index.save(&path).unwrap();

        let reopened = VectorIndex::open(&path).unwrap();
        assert_eq!(reopened.collection_info().points_count, 1);
        let vectors = reopened.get_vectors_by_ids(&["a".to_string()]);
        assert_eq!(vectors["a"], unit_vector(0.5));
        let hits = reopened.search(&unit_vector(0.5), 1, &PointFilter::default()).unwrap();
        assert_eq!(
            hits[0].payload.get("source_type").and_then(Value::as_str),
            Some("rss")
        );
    }
}
