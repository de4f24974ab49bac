//! Narrative clustering pipeline
//!
//! Grounded on `intelligence/clustering.py::ClusteringPipeline`: pull the
//! rolling window of vectors, run density clustering, build cluster
//! summaries, reconcile identity against the previous active set via
//! Jaccard overlap, and persist.

use std::collections::HashMap;
use std::sync::Arc;

use amonhen_core_types::Result;
use amonhen_models::{bin_sentiment, ClusterStatus, EnrichedItem, NarrativeCluster};
use amonhen_store::MetaStore;
use amonhen_vectorindex::{PointFilter, VectorIndex};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use amonhen_enrich::{EnrichProvider, LlmClient};

use crate::density;

/// Optional LLM-backed labeling seam; without it, clusters fall back to
/// their first representative item's summary.
pub struct ClusterLabeler {
    pub provider: EnrichProvider,
    pub client: Arc<dyn LlmClient>,
}

pub struct Clusterer {
    store: Arc<MetaStore>,
    vectors: Arc<VectorIndex>,
    min_cluster_size: usize,
    min_samples: usize,
    rolling_window_days: i64,
    labeler: Option<ClusterLabeler>,
}

/// A freshly built cluster paired with the member item ids it was built
/// from — needed for membership persistence and identity matching, kept
/// separate from [`NarrativeCluster`] which has no member-id field.
struct BuiltCluster {
    cluster: NarrativeCluster,
    member_ids: Vec<String>,
}

impl Clusterer {
    pub fn new(
        store: Arc<MetaStore>,
        vectors: Arc<VectorIndex>,
        min_cluster_size: usize,
        min_samples: usize,
        rolling_window_days: i64,
        labeler: Option<ClusterLabeler>,
    ) -> Self {
        Self {
            store,
            vectors,
            min_cluster_size,
            min_samples,
            rolling_window_days,
            labeler,
        }
    }

    /// Run one full clustering cycle: cluster -> label -> match -> persist.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<Vec<NarrativeCluster>> {
        let since = now - Duration::days(self.rolling_window_days);
        let window = self.vectors.scroll_all(&PointFilter {
            source_type: None,
            since: Some(since),
        });

        if window.len() < self.min_cluster_size {
            info!(
                window_size = window.len(),
                min_cluster_size = self.min_cluster_size,
                "window too small for clustering, leaving prior state untouched"
            );
            return Ok(Vec::new());
        }

        let ids: Vec<String> = window.iter().map(|(id, _)| id.clone()).collect();
        let vecs: Vec<Vec<f32>> = window.iter().map(|(_, v)| v.clone()).collect();

        let labels = density::cluster(&vecs, self.min_cluster_size, self.min_samples);

        let mut groups: HashMap<i32, Vec<usize>> = HashMap::new();
        for (idx, &label) in labels.iter().enumerate() {
            if label == density::NOISE {
                continue;
            }
            groups.entry(label).or_default().push(idx);
        }

        info!(
            group_count = groups.len(),
            point_count = ids.len(),
            "density clustering complete"
        );

        let mut built = Vec::with_capacity(groups.len());
        for indices in groups.values() {
            if let Some(bc) = self.build_cluster(&ids, &vecs, indices, now).await? {
                built.push(bc);
            }
        }

        let previous = self.store.get_active_clusters()?;
        self.match_clusters(&mut built, &previous)?;

        self.store.clear_all_memberships()?;
        for bc in &built {
            self.store.upsert_cluster(&bc.cluster)?;
            for member_id in &bc.member_ids {
                self.store.set_cluster_membership(member_id, &bc.cluster.id)?;
                self.store
                    .update_item_cluster(member_id, &bc.cluster.id, &bc.cluster.label)?;
            }
        }

        let new_ids: std::collections::HashSet<&str> =
            built.iter().map(|bc| bc.cluster.id.as_str()).collect();
        for prev in &previous {
            if !new_ids.contains(prev.id.as_str()) {
                self.store
                    .update_cluster_status(&prev.id, ClusterStatus::Fading)?;
            }
        }

        info!(cluster_count = built.len(), "persisted clusters");
        Ok(built.into_iter().map(|bc| bc.cluster).collect())
    }

    async fn build_cluster(
        &self,
        ids: &[String],
        vecs: &[Vec<f32>],
        indices: &[usize],
        now: DateTime<Utc>,
    ) -> Result<Option<BuiltCluster>> {
        let mut present: Vec<(EnrichedItem, Vec<f32>)> = Vec::new();
        for &i in indices {
            if let Some(item) = self.store.get_item(&ids[i])? {
                present.push((item, vecs[i].clone()));
            }
        }
        if present.is_empty() {
            return Ok(None);
        }

        let dim = present[0].1.len();
        let mut centroid = vec![0.0f32; dim];
        for (_, v) in &present {
            for (c, x) in centroid.iter_mut().zip(v.iter()) {
                *c += x;
            }
        }
        for c in centroid.iter_mut() {
            *c /= present.len() as f32;
        }

        let mut by_distance: Vec<(usize, f32)> = present
            .iter()
            .enumerate()
            .map(|(i, (_, v))| (i, euclidean_distance(v, &centroid)))
            .collect();
        by_distance.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let representative: Vec<&EnrichedItem> = by_distance
            .iter()
            .take(5)
            .map(|(i, _)| &present[*i].0)
            .collect();

        let (label, summary) = self.label_cluster(&representative).await;

        let mut source_distribution: HashMap<String, usize> = HashMap::new();
        for (item, _) in &present {
            *source_distribution
                .entry(item.source_family.as_str().to_string())
                .or_insert(0) += 1;
        }

        let sentiments: Vec<f64> = present.iter().map(|(item, _)| item.sentiment).collect();
        let sentiment_distribution = bin_sentiment(&sentiments);

        let mut entity_order: Vec<String> = Vec::new();
        let mut entity_counts: HashMap<String, usize> = HashMap::new();
        let mut all_claims: Vec<String> = Vec::new();
        for (item, _) in &present {
            for entity in &item.entities {
                if !entity_counts.contains_key(&entity.name) {
                    entity_order.push(entity.name.clone());
                }
                *entity_counts.entry(entity.name.clone()).or_insert(0) += 1;
            }
            all_claims.extend(item.claims.iter().cloned());
        }
        let mut key_entities = entity_order;
        key_entities.sort_by(|a, b| entity_counts[b].cmp(&entity_counts[a]));
        key_entities.truncate(10);

        let mut seen_claims = std::collections::HashSet::new();
        let key_claims: Vec<String> = all_claims
            .into_iter()
            .filter(|c| seen_claims.insert(c.clone()))
            .take(10)
            .collect();

        let first_seen = present
            .iter()
            .map(|(item, _)| item.published_at)
            .min()
            .unwrap_or(now);

        let member_ids: Vec<String> = present.iter().map(|(item, _)| item.id.clone()).collect();

        let cluster = NarrativeCluster {
            id: uuid::Uuid::new_v4().to_string(),
            label,
            summary,
            item_count: present.len(),
            first_seen,
            last_updated: now,
            centroid,
            source_distribution,
            sentiment_distribution,
            key_entities,
            key_claims,
            status: ClusterStatus::Emerging,
            parent_id: None,
        };

        Ok(Some(BuiltCluster { cluster, member_ids }))
    }

    async fn label_cluster(&self, representative: &[&EnrichedItem]) -> (String, String) {
        let Some(labeler) = &self.labeler else {
            return fallback_label(representative);
        };

        let mut items_text = String::new();
        for (i, item) in representative.iter().take(5).enumerate() {
            items_text.push_str(&format!(
                "\n{}. Summary: {}\n   Framing: {}\n",
                i + 1,
                item.summary,
                item.framing
            ));
        }
        let prompt = format!(
            "Generate a short narrative cluster label (max 10 words) and a 2-sentence \
             summary for this group of related items:\n{items_text}\n\n\
             Respond with JSON: {{\"label\": \"...\", \"summary\": \"...\"}}"
        );

        match labeler
            .provider
            .enrich_text("cluster_labeling", &prompt, labeler.client.as_ref())
            .await
        {
            Ok((result, _cost)) => {
                let label: String = result.summary.chars().take(80).collect();
                (label, result.summary)
            }
            Err(e) => {
                warn!(error = %e, "cluster labeling failed");
                fallback_label(representative)
            }
        }
    }

    fn match_clusters(
        &self,
        built: &mut [BuiltCluster],
        previous: &[NarrativeCluster],
    ) -> Result<()> {
        if previous.is_empty() {
            return Ok(());
        }

        let mut prev_members: HashMap<String, std::collections::HashSet<String>> = HashMap::new();
        for pc in previous {
            let items = self.store.get_items_by_cluster(&pc.id)?;
            prev_members.insert(pc.id.clone(), items.into_iter().map(|i| i.id).collect());
        }

        let mut used_prev: std::collections::HashSet<String> = std::collections::HashSet::new();

        for bc in built.iter_mut() {
            let nc_members: std::collections::HashSet<String> =
                bc.member_ids.iter().cloned().collect();
            if nc_members.is_empty() {
                continue;
            }

            let mut best_overlap = 0.0f64;
            let mut best_prev_id: Option<String> = None;
            for pc in previous {
                if used_prev.contains(&pc.id) {
                    continue;
                }
                let Some(pm) = prev_members.get(&pc.id) else {
                    continue;
                };
                if pm.is_empty() {
                    continue;
                }
                let intersection = nc_members.intersection(pm).count();
                let union = nc_members.union(pm).count();
                let overlap = intersection as f64 / union as f64;
                if overlap > best_overlap {
                    best_overlap = overlap;
                    best_prev_id = Some(pc.id.clone());
                }
            }

            if best_overlap > 0.7 {
                if let Some(prev_id) = best_prev_id {
                    bc.cluster.id = prev_id.clone();
                    bc.cluster.status = ClusterStatus::Active;
                    if let Some(pc) = previous.iter().find(|p| p.id == prev_id) {
                        bc.cluster.first_seen = pc.first_seen;
                    }
                    used_prev.insert(prev_id);
                }
            }
        }
        Ok(())
    }
}

fn fallback_label(representative: &[&EnrichedItem]) -> (String, String) {
    match representative.first() {
        Some(item) => {
            let label: String = item.summary.chars().take(80).collect();
            (label, item.summary.clone())
        }
        None => ("Unlabeled Cluster".to_string(), "No representative items.".to_string()),
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use amonhen_models::{Entity, EntityRole, EntityType, SourceFamily};
    use amonhen_vectorindex::VECTOR_SIZE;
    use std::collections::HashMap as Map;

    fn orthogonal_vector(on_first_half: bool, jitter: f32) -> Vec<f32> {
        let mut v = vec![0.0f32; VECTOR_SIZE];
        let half = VECTOR_SIZE / 2;
        if on_first_half {
            for (i, slot) in v.iter_mut().enumerate().take(half) {
                *slot = 1.0 + jitter * ((i as f32 + 1.0) * 0.0001);
            }
        } else {
            for (i, slot) in v.iter_mut().enumerate().skip(half) {
                *slot = 1.0 + jitter * ((i as f32 + 1.0) * 0.0001);
            }
        }
        v
    }

    fn seed_group(store: &MetaStore, vectors: &VectorIndex, on_first_half: bool, now: DateTime<Utc>) {
        for i in 0..8 {
            let id = uuid::Uuid::new_v4().to_string();
            let item = EnrichedItem {
                id: id.clone(),
                source_family: SourceFamily::Rss,
                source_name: "feed".to_string(),
                canonical_url: format!("https://example.com/{id}"),
                title: Some("title".to_string()),
                published_at: now,
                ingested_at: now,
                language: "en".to_string(),
                summary: "a summary of the story".to_string(),
                entities: vec![Entity {
                    name: "Acme".to_string(),
                    kind: EntityType::Org,
                    role: EntityRole::Subject,
                    aliases: vec![],
                }],
                claims: vec!["a claim".to_string()],
                framing: "neutral framing".to_string(),
                sentiment: 0.1,
                topic_tags: vec![],
                embedding_id: id.clone(),
                embedding_model: "test-model".to_string(),
                cluster_id: None,
                cluster_label: None,
                enrichment_model: "test-model".to_string(),
                enrichment_cost_usd: 0.0,
                archived: false,
            };
            store.insert_item(&item).unwrap();
            let vector = orthogonal_vector(on_first_half, i as f32);
            vectors
                .upsert_item(&id, vector, item.vector_payload())
                .unwrap();
        }
    }

    #[tokio::test]
    async fn two_well_separated_groups_stay_stable_across_reruns() {
        let store = Arc::new(MetaStore::open_in_memory().unwrap());
        let vectors = Arc::new(VectorIndex::new());
        let now = Utc::now();
        seed_group(&store, &vectors, true, now);
        seed_group(&store, &vectors, false, now);

        let clusterer = Clusterer::new(store.clone(), vectors.clone(), 3, 3, 30, None);

        let first_run = clusterer.run(now).await.unwrap();
        assert!(first_run.len() >= 2, "expected at least two clusters, got {}", first_run.len());

        let mut first_ids: Vec<String> = first_run.iter().map(|c| c.id.clone()).collect();
        first_ids.sort();

        let second_run = clusterer.run(now).await.unwrap();
        let mut second_ids: Vec<String> = second_run.iter().map(|c| c.id.clone()).collect();
        second_ids.sort();

        assert_eq!(first_ids, second_ids);
        assert!(second_run.iter().all(|c| c.status == ClusterStatus::Active));
    }

    #[tokio::test]
    async fn window_smaller_than_min_cluster_size_yields_no_clusters() {
        let store = Arc::new(MetaStore::open_in_memory().unwrap());
        let vectors = Arc::new(VectorIndex::new());
        let now = Utc::now();
        seed_group(&store, &vectors, true, now);

        let clusterer = Clusterer::new(store, vectors, 20, 4, 30, None);
        let result = clusterer.run(now).await.unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn key_entities_break_ties_by_first_seen_order() {
        let mut counts: Map<String, usize> = Map::new();
        let order = vec!["b".to_string(), "a".to_string()];
        counts.insert("b".to_string(), 2);
        counts.insert("a".to_string(), 2);
        let mut sorted = order;
        sorted.sort_by(|x, y| counts[y].cmp(&counts[x]));
        assert_eq!(sorted, vec!["b".to_string(), "a".to_string()]);
    }
}
