//! MetaStore: the relational half of the dual-store substrate
//!
//! Backed by a single SQLite connection behind a [`std::sync::Mutex`] — WAL
//! mode allows concurrent readers elsewhere in the process, but this crate
//! serializes all access through one connection, matching the single-writer
//! model described for the pipeline as a whole.

use std::path::Path;
use std::sync::Mutex;

use amonhen_models::{
    ClusterMembership, ClusterStatus, CostLogEntry, DailyDigest, EnrichedItem, Entity,
    NarrativeCluster, SentimentDistribution, SourceFamily, SourceHealth,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db;
use crate::errors::{duplicate_url, from_rusqlite, not_found, Result};
use crate::migrations::apply_migrations;

/// The relational metadata store
pub struct MetaStore {
    conn: Mutex<Connection>,
}

impl MetaStore {
    /// Open (creating if absent) a SQLite-backed store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut conn = db::open(path)?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store, for tests
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // --- Items ---

    /// Insert a newly enriched item. Returns [`amonhen_core_types::AmErrorKind::DuplicateUrl`]
    /// if `canonical_url` already exists.
    pub fn insert_item(&self, item: &EnrichedItem) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let entities_json = serde_json::to_string(&item.entities).map_err(from_rusqlite_json)?;
        let claims_json = serde_json::to_string(&item.claims).map_err(from_rusqlite_json)?;
        let topic_tags_json =
            serde_json::to_string(&item.topic_tags).map_err(from_rusqlite_json)?;

        let result = conn.execute(
            "INSERT INTO items (
                id, source_type, source_name, source_url, title,
                published_at, ingested_at, language,
                summary, entities_json, claims_json, framing,
                sentiment, topic_tags_json,
                embedding_id, embedding_model,
                cluster_id, cluster_label,
                enrichment_model, enrichment_cost_usd, archived
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
            params![
                item.id,
                item.source_family.as_str(),
                item.source_name,
                item.canonical_url,
                item.title,
                item.published_at.to_rfc3339(),
                item.ingested_at.to_rfc3339(),
                item.language,
                item.summary,
                entities_json,
                claims_json,
                item.framing,
                item.sentiment,
                topic_tags_json,
                item.embedding_id,
                item.embedding_model,
                item.cluster_id,
                item.cluster_label,
                item.enrichment_model,
                item.enrichment_cost_usd,
                item.archived as i64,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(duplicate_url(&item.canonical_url))
            }
            Err(e) => Err(from_rusqlite(e)),
        }
    }

    /// Fetch a single item by id
    pub fn get_item(&self, item_id: &str) -> Result<Option<EnrichedItem>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM items WHERE id = ?1", params![item_id], row_to_item)
            .optional()
            .map_err(from_rusqlite)
    }

    /// Fetch non-archived items, newest-published first
    pub fn get_items(
        &self,
        since: Option<DateTime<Utc>>,
        limit: u32,
        source_family: Option<SourceFamily>,
    ) -> Result<Vec<EnrichedItem>> {
        let conn = self.conn.lock().unwrap();
        let query = match (since.is_some(), source_family.is_some()) {
            (true, true) => {
                "SELECT * FROM items WHERE archived = 0 AND published_at >= ?1 AND source_type = ?2 \
                 ORDER BY published_at DESC LIMIT ?3"
            }
            (true, false) => {
                "SELECT * FROM items WHERE archived = 0 AND published_at >= ?1 \
                 ORDER BY published_at DESC LIMIT ?2"
            }
            (false, true) => {
                "SELECT * FROM items WHERE archived = 0 AND source_type = ?1 \
                 ORDER BY published_at DESC LIMIT ?2"
            }
            (false, false) => {
                "SELECT * FROM items WHERE archived = 0 ORDER BY published_at DESC LIMIT ?1"
            }
        };

        let mut stmt = conn.prepare(query).map_err(from_rusqlite)?;
        let rows = match (since, source_family) {
            (Some(s), Some(sf)) => {
                stmt.query_map(params![s.to_rfc3339(), sf.as_str(), limit], row_to_item)
            }
            (Some(s), None) => stmt.query_map(params![s.to_rfc3339(), limit], row_to_item),
            (None, Some(sf)) => stmt.query_map(params![sf.as_str(), limit], row_to_item),
            (None, None) => stmt.query_map(params![limit], row_to_item),
        }
        .map_err(from_rusqlite)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)
    }

    /// Check whether `canonical_url` has already been ingested
    pub fn item_url_exists(&self, url: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let exists: Option<i64> = conn
            .query_row("SELECT 1 FROM items WHERE source_url = ?1", params![url], |r| r.get(0))
            .optional()
            .map_err(from_rusqlite)?;
        Ok(exists.is_some())
    }

    /// Stamp an item with its assigned cluster
    pub fn update_item_cluster(&self, item_id: &str, cluster_id: &str, cluster_label: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                "UPDATE items SET cluster_id = ?1, cluster_label = ?2 WHERE id = ?3",
                params![cluster_id, cluster_label, item_id],
            )
            .map_err(from_rusqlite)?;
        if changed == 0 {
            return Err(not_found("update_item_cluster", item_id));
        }
        Ok(())
    }

    /// All non-archived items currently assigned to `cluster_id`
    pub fn get_items_by_cluster(&self, cluster_id: &str) -> Result<Vec<EnrichedItem>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT * FROM items WHERE cluster_id = ?1 AND archived = 0 ORDER BY published_at DESC")
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params![cluster_id], row_to_item)
            .map_err(from_rusqlite)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)
    }

    /// Mark items published before `before` as archived. Returns the count changed.
    pub fn archive_older_than(&self, before: DateTime<Utc>) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                "UPDATE items SET archived = 1 WHERE published_at < ?1 AND archived = 0",
                params![before.to_rfc3339()],
            )
            .map_err(from_rusqlite)?;
        Ok(changed as u64)
    }

    pub fn get_item_count(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM items WHERE archived = 0", [], |r| r.get(0))
            .map_err(from_rusqlite)?;
        Ok(count as u64)
    }

    // --- Clusters ---

    /// Insert or fully replace a cluster row
    pub fn upsert_cluster(&self, cluster: &NarrativeCluster) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let centroid_json = serde_json::to_string(&cluster.centroid).map_err(from_rusqlite_json)?;
        let source_distribution_json =
            serde_json::to_string(&cluster.source_distribution).map_err(from_rusqlite_json)?;
        let sentiment_distribution_json =
            serde_json::to_string(&cluster.sentiment_distribution).map_err(from_rusqlite_json)?;
        let key_entities_json =
            serde_json::to_string(&cluster.key_entities).map_err(from_rusqlite_json)?;
        let key_claims_json =
            serde_json::to_string(&cluster.key_claims).map_err(from_rusqlite_json)?;

        conn.execute(
            "INSERT OR REPLACE INTO clusters (
                id, label, summary, item_count,
                first_seen, last_updated,
                centroid_json, source_distribution_json,
                sentiment_distribution_json,
                key_entities_json, key_claims_json,
                status, parent_cluster_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                cluster.id,
                cluster.label,
                cluster.summary,
                cluster.item_count as i64,
                cluster.first_seen.to_rfc3339(),
                cluster.last_updated.to_rfc3339(),
                centroid_json,
                source_distribution_json,
                sentiment_distribution_json,
                key_entities_json,
                key_claims_json,
                cluster.status.as_str(),
                cluster.parent_id,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn get_cluster(&self, cluster_id: &str) -> Result<Option<NarrativeCluster>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM clusters WHERE id = ?1", params![cluster_id], row_to_cluster)
            .optional()
            .map_err(from_rusqlite)
    }

    /// Clusters with status `emerging` or `active`, largest first
    pub fn get_active_clusters(&self) -> Result<Vec<NarrativeCluster>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT * FROM clusters WHERE status IN ('emerging', 'active') ORDER BY item_count DESC")
            .map_err(from_rusqlite)?;
        let rows = stmt.query_map([], row_to_cluster).map_err(from_rusqlite)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)
    }

    pub fn update_cluster_status(&self, cluster_id: &str, status: ClusterStatus) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let changed = conn
            .execute(
                "UPDATE clusters SET status = ?1 WHERE id = ?2",
                params![status.as_str(), cluster_id],
            )
            .map_err(from_rusqlite)?;
        if changed == 0 {
            return Err(not_found("update_cluster_status", cluster_id));
        }
        Ok(())
    }

    pub fn get_cluster_count(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM clusters", [], |r| r.get(0))
            .map_err(from_rusqlite)?;
        Ok(count as u64)
    }

    // --- Cluster membership ---

    /// Record (or reassert) that `item_id` belongs to `cluster_id`
    pub fn set_cluster_membership(&self, item_id: &str, cluster_id: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO cluster_membership (item_id, cluster_id, assigned_at) VALUES (?1, ?2, ?3)",
            params![item_id, cluster_id, Utc::now().to_rfc3339()],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Wipe all membership rows — the Clusterer rebuilds this fully on every run
    pub fn clear_all_memberships(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM cluster_membership", [])
            .map_err(from_rusqlite)?;
        Ok(())
    }

    /// All current membership rows, for tests and the identity-matching step
    pub fn get_all_memberships(&self) -> Result<Vec<ClusterMembership>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT item_id, cluster_id, assigned_at FROM cluster_membership")
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ClusterMembership {
                    item_id: row.get(0)?,
                    cluster_id: row.get(1)?,
                    assigned_at: parse_rfc3339(row.get::<_, String>(2)?),
                })
            })
            .map_err(from_rusqlite)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)
    }

    // --- Digests ---

    pub fn insert_digest(&self, digest: &DailyDigest) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO digests (id, generated_at, content, cluster_count, item_count, model) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                digest.id,
                digest.generated_at.to_rfc3339(),
                digest.content,
                digest.cluster_count as i64,
                digest.item_count as i64,
                digest.model,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn get_latest_digest(&self) -> Result<Option<DailyDigest>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, generated_at, content, cluster_count, item_count, model FROM digests ORDER BY generated_at DESC LIMIT 1",
            [],
            |row| {
                Ok(DailyDigest {
                    id: row.get(0)?,
                    generated_at: parse_rfc3339(row.get::<_, String>(1)?),
                    content: row.get(2)?,
                    cluster_count: row.get::<_, i64>(3)? as usize,
                    item_count: row.get::<_, i64>(4)? as usize,
                    model: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(from_rusqlite)
    }

    // --- Source health ---

    pub fn upsert_source_health(&self, health: &SourceHealth) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO source_status (
                source_name, source_type, last_fetch_at, last_success_at,
                items_fetched, error_count, last_error
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                health.source_name,
                health.source_family.as_str(),
                health.last_fetch_at.map(|t| t.to_rfc3339()),
                health.last_success_at.map(|t| t.to_rfc3339()),
                health.items_fetched as i64,
                health.error_count as i64,
                health.last_error,
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn get_all_source_health(&self) -> Result<Vec<SourceHealth>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT * FROM source_status ORDER BY source_name")
            .map_err(from_rusqlite)?;
        let rows = stmt.query_map([], row_to_source_health).map_err(from_rusqlite)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)
    }

    // --- Cost tracking ---

    pub fn append_cost_log(&self, entry: &CostLogEntry) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO cost_log (item_id, model, input_tokens, output_tokens, cost_usd, timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.item_id,
                entry.model,
                entry.input_tokens as i64,
                entry.output_tokens as i64,
                entry.cost_usd,
                entry.timestamp.to_rfc3339(),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Total cost_usd for the UTC calendar day containing `date`
    pub fn daily_cost_usd(&self, date: DateTime<Utc>) -> Result<f64> {
        let day_start = date
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        let day_end = date
            .date_naive()
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc();
        let conn = self.conn.lock().unwrap();
        let total: f64 = conn
            .query_row(
                "SELECT COALESCE(SUM(cost_usd), 0.0) FROM cost_log WHERE timestamp >= ?1 AND timestamp <= ?2",
                params![day_start.to_rfc3339(), day_end.to_rfc3339()],
                |r| r.get(0),
            )
            .map_err(from_rusqlite)?;
        Ok(total)
    }

    pub fn total_cost_usd(&self) -> Result<f64> {
        let conn = self.conn.lock().unwrap();
        let total: f64 = conn
            .query_row("SELECT COALESCE(SUM(cost_usd), 0.0) FROM cost_log", [], |r| r.get(0))
            .map_err(from_rusqlite)?;
        Ok(total)
    }
}

fn from_rusqlite_json(err: serde_json::Error) -> amonhen_core_types::AmError {
    amonhen_core_types::AmError::new(amonhen_core_types::AmErrorKind::Serialization)
        .with_op("sqlite_encode")
        .with_message(err.to_string())
}

fn parse_rfc3339(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .expect("timestamps are always written via to_rfc3339")
        .with_timezone(&Utc)
}

fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<EnrichedItem> {
    let entities_json: String = row.get("entities_json")?;
    let claims_json: String = row.get("claims_json")?;
    let topic_tags_json: String = row.get("topic_tags_json")?;
    let entities: Vec<Entity> = serde_json::from_str(&entities_json).unwrap_or_default();
    let claims: Vec<String> = serde_json::from_str(&claims_json).unwrap_or_default();
    let topic_tags: Vec<String> = serde_json::from_str(&topic_tags_json).unwrap_or_default();
    let source_family: String = row.get("source_type")?;

    Ok(EnrichedItem {
        id: row.get("id")?,
        source_family: source_family.parse().unwrap_or(SourceFamily::Rss),
        source_name: row.get("source_name")?,
        canonical_url: row.get("source_url")?,
        title: row.get("title")?,
        published_at: parse_rfc3339(row.get("published_at")?),
        ingested_at: parse_rfc3339(row.get("ingested_at")?),
        language: row.get("language")?,
        summary: row.get("summary")?,
        entities,
        claims,
        framing: row.get("framing")?,
        sentiment: row.get("sentiment")?,
        topic_tags,
        embedding_id: row.get("embedding_id")?,
        embedding_model: row.get("embedding_model")?,
        cluster_id: row.get("cluster_id")?,
        cluster_label: row.get("cluster_label")?,
        enrichment_model: row.get("enrichment_model")?,
        enrichment_cost_usd: row.get("enrichment_cost_usd")?,
        archived: row.get::<_, i64>("archived")? != 0,
    })
}

fn row_to_cluster(row: &rusqlite::Row) -> rusqlite::Result<NarrativeCluster> {
    let centroid_json: String = row.get("centroid_json")?;
    let source_distribution_json: String = row.get("source_distribution_json")?;
    let sentiment_distribution_json: String = row.get("sentiment_distribution_json")?;
    let key_entities_json: String = row.get("key_entities_json")?;
    let key_claims_json: String = row.get("key_claims_json")?;
    let status: String = row.get("status")?;

    Ok(NarrativeCluster {
        id: row.get("id")?,
        label: row.get("label")?,
        summary: row.get("summary")?,
        item_count: row.get::<_, i64>("item_count")? as usize,
        first_seen: parse_rfc3339(row.get("first_seen")?),
        last_updated: parse_rfc3339(row.get("last_updated")?),
        centroid: serde_json::from_str(&centroid_json).unwrap_or_default(),
        source_distribution: serde_json::from_str(&source_distribution_json).unwrap_or_default(),
        sentiment_distribution: serde_json::from_str(&sentiment_distribution_json)
            .unwrap_or_else(|_| SentimentDistribution::default()),
        key_entities: serde_json::from_str(&key_entities_json).unwrap_or_default(),
        key_claims: serde_json::from_str(&key_claims_json).unwrap_or_default(),
        status: status.parse().unwrap_or(ClusterStatus::Emerging),
        parent_id: row.get("parent_cluster_id")?,
    })
}

fn row_to_source_health(row: &rusqlite::Row) -> rusqlite::Result<SourceHealth> {
    let source_family: String = row.get("source_type")?;
    let last_fetch_at: Option<String> = row.get("last_fetch_at")?;
    let last_success_at: Option<String> = row.get("last_success_at")?;

    Ok(SourceHealth {
        source_name: row.get("source_name")?,
        source_family: source_family.parse().unwrap_or(SourceFamily::Rss),
        last_fetch_at: last_fetch_at.map(parse_rfc3339),
        last_success_at: last_success_at.map(parse_rfc3339),
        items_fetched: row.get::<_, i64>("items_fetched")? as u64,
        error_count: row.get::<_, i64>("error_count")? as u64,
        last_error: row.get("last_error")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use amonhen_models::RawItem;

    fn sample_item(url: &str) -> EnrichedItem {
        let raw = RawItem::new(SourceFamily::Rss, "bbc-world", url, "content", Utc::now());
        EnrichedItem {
            id: raw.id.clone(),
            source_family: raw.source_family,
            source_name: raw.source_name,
            canonical_url: raw.canonical_url,
            title: Some("A headline".to_string()),
            published_at: raw.published_at,
            ingested_at: raw.ingested_at,
            language: raw.language,
            summary: "summary".to_string(),
            entities: vec![],
            claims: vec![],
            framing: "neutral".to_string(),
            sentiment: 0.1,
            topic_tags: vec!["world".to_string()],
            embedding_id: raw.id.clone(),
            embedding_model: "text-embedding-3-small".to_string(),
            cluster_id: None,
            cluster_label: None,
            enrichment_model: "gpt-4o-mini".to_string(),
            enrichment_cost_usd: 0.001,
            archived: false,
        }
    }

    #[test]
    fn insert_and_round_trip_item() {
        let store = MetaStore::open_in_memory().unwrap();
        let item = sample_item("https://example.com/a");
        store.insert_item(&item).unwrap();

        let fetched = store.get_item(&item.id).unwrap().unwrap();
        assert_eq!(fetched.canonical_url, item.canonical_url);
        assert_eq!(fetched.summary, item.summary);
    }

    #[test]
    fn duplicate_url_is_rejected() {
        let store = MetaStore::open_in_memory().unwrap();
        let item = sample_item("https://example.com/dup");
        store.insert_item(&item).unwrap();

        let mut other = sample_item("https://example.com/dup");
        other.id = uuid::Uuid::new_v4().to_string();
        let err = store.insert_item(&other).unwrap_err();
        assert_eq!(err.kind(), amonhen_core_types::AmErrorKind::DuplicateUrl);
    }

    #[test]
    fn item_url_exists_reports_correctly() {
        let store = MetaStore::open_in_memory().unwrap();
        assert!(!store.item_url_exists("https://example.com/x").unwrap());
        store.insert_item(&sample_item("https://example.com/x")).unwrap();
        assert!(store.item_url_exists("https://example.com/x").unwrap());
    }

    #[test]
    fn archive_older_than_only_touches_matching_rows() {
        let store = MetaStore::open_in_memory().unwrap();
        let old_item = {
            let mut item = sample_item("https://example.com/old");
            item.published_at = Utc::now() - chrono::Duration::days(400);
            item
        };
        let new_item = sample_item("https://example.com/new");
        store.insert_item(&old_item).unwrap();
        store.insert_item(&new_item).unwrap();

        let cutoff = Utc::now() - chrono::Duration::days(365);
        let archived = store.archive_older_than(cutoff).unwrap();
        assert_eq!(archived, 1);
        assert_eq!(store.get_item_count().unwrap(), 1);
    }

    #[test]
    fn cluster_round_trip_and_membership() {
        let store = MetaStore::open_in_memory().unwrap();
        let cluster = NarrativeCluster {
            id: "cl-1".to_string(),
            label: "Flood coverage".to_string(),
            summary: "Multiple outlets covering flooding".to_string(),
            item_count: 2,
            first_seen: Utc::now(),
            last_updated: Utc::now(),
            centroid: vec![0.1, 0.2, 0.3],
            source_distribution: Default::default(),
            sentiment_distribution: SentimentDistribution::default(),
            key_entities: vec!["FEMA".to_string()],
            key_claims: vec!["River crested overnight".to_string()],
            status: ClusterStatus::Emerging,
            parent_id: None,
        };
        store.upsert_cluster(&cluster).unwrap();

        let fetched = store.get_cluster("cl-1").unwrap().unwrap();
        assert_eq!(fetched.label, "Flood coverage");

        store.set_cluster_membership("item-1", "cl-1").unwrap();
        let memberships = store.get_all_memberships().unwrap();
        assert_eq!(memberships.len(), 1);

        store.clear_all_memberships().unwrap();
        assert!(store.get_all_memberships().unwrap().is_empty());
    }

    #[test]
    fn daily_cost_accumulates_same_day_entries() {
        let store = MetaStore::open_in_memory().unwrap();
        let now = Utc::now();
        store
            .append_cost_log(&CostLogEntry {
                item_id: "i1".to_string(),
                model: "gpt-4o-mini".to_string(),
                input_tokens: 100,
                output_tokens: 50,
                cost_usd: 0.01,
                timestamp: now,
            })
            .unwrap();
        store
            .append_cost_log(&CostLogEntry {
                item_id: "i2".to_string(),
                model: "gpt-4o-mini".to_string(),
                input_tokens: 200,
                output_tokens: 80,
                cost_usd: 0.02,
                timestamp: now,
            })
            .unwrap();

        let total = store.daily_cost_usd(now).unwrap();
        assert!((total - 0.03).abs() < 1e-9);
        assert!((store.total_cost_usd().unwrap() - 0.03).abs() < 1e-9);
    }
}
