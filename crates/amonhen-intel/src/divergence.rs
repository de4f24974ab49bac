//! Source divergence detection within narrative clusters
//!
//! Grounded on `intelligence/divergence.py::DivergenceDetector.detect`:
//! for each cluster with at least 3 members spanning at least 2 source
//! families, compare per-family sub-centroids pairwise by cosine
//! distance and emit a record when they diverge past the threshold.

use std::collections::HashMap;

use amonhen_core_types::Result;
use amonhen_models::NarrativeCluster;
use amonhen_store::MetaStore;
use amonhen_vectorindex::{cosine_distance, VectorIndex};

#[derive(Debug, Clone, PartialEq)]
pub struct DivergenceRecord {
    pub cluster_id: String,
    pub cluster_label: String,
    pub source_a: String,
    pub source_b: String,
    pub cosine_distance: f32,
}

impl DivergenceRecord {
    pub fn description(&self) -> String {
        format!(
            "'{}' and '{}' sources diverge on '{}' (distance={:.3})",
            self.source_a, self.source_b, self.cluster_label, self.cosine_distance
        )
    }
}

pub struct DivergenceDetector {
    threshold: f32,
}

impl DivergenceDetector {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn detect(
        &self,
        clusters: &[NarrativeCluster],
        store: &MetaStore,
        vectors: &VectorIndex,
    ) -> Result<Vec<DivergenceRecord>> {
        let mut divergences = Vec::new();

        for cluster in clusters {
            let items = store.get_items_by_cluster(&cluster.id)?;
            if items.len() < 3 {
                continue;
            }

            let mut source_groups: HashMap<String, Vec<String>> = HashMap::new();
            for item in &items {
                source_groups
                    .entry(item.source_family.as_str().to_string())
                    .or_default()
                    .push(item.embedding_id.clone());
            }
            if source_groups.len() < 2 {
                continue;
            }

            let all_ids: Vec<String> = source_groups.values().flatten().cloned().collect();
            let vectors_map = vectors.get_vectors_by_ids(&all_ids);

            let mut sub_centroids: HashMap<String, Vec<f32>> = HashMap::new();
            for (source_family, ids) in &source_groups {
                let vecs: Vec<&Vec<f32>> =
                    ids.iter().filter_map(|id| vectors_map.get(id)).collect();
                if let Some(centroid) = mean_vector(&vecs) {
                    sub_centroids.insert(source_family.clone(), centroid);
                }
            }
            if sub_centroids.len() < 2 {
                continue;
            }

            let sources: Vec<&String> = sub_centroids.keys().collect();
            for i in 0..sources.len() {
                for j in (i + 1)..sources.len() {
                    let sa = sources[i];
                    let sb = sources[j];
                    let va = &sub_centroids[sa];
                    let vb = &sub_centroids[sb];
                    let cos_dist = cosine_distance(va, vb);

                    if cos_dist > self.threshold {
                        divergences.push(DivergenceRecord {
                            cluster_id: cluster.id.clone(),
                            cluster_label: cluster.label.clone(),
                            source_a: sa.clone(),
                            source_b: sb.clone(),
                            cosine_distance: round4(cos_dist),
                        });
                    }
                }
            }
        }

        Ok(divergences)
    }
}

fn mean_vector(vecs: &[&Vec<f32>]) -> Option<Vec<f32>> {
    if vecs.is_empty() {
        return None;
    }
    let dim = vecs[0].len();
    let mut mean = vec![0.0f32; dim];
    for v in vecs {
        for (m, x) in mean.iter_mut().zip(v.iter()) {
            *m += x;
        }
    }
    for m in mean.iter_mut() {
        *m /= vecs.len() as f32;
    }
    Some(mean)
}

fn round4(v: f32) -> f32 {
    (v * 10000.0).round() / 10000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_matches_expected_format() {
        let record = DivergenceRecord {
            cluster_id: "c1".to_string(),
            cluster_label: "Flood Response".to_string(),
            source_a: "rss".to_string(),
            source_b: "bluesky".to_string(),
            cosine_distance: 0.4567,
        };
        assert_eq!(
            record.description(),
            "'rss' and 'bluesky' sources diverge on 'Flood Response' (distance=0.457)"
        );
    }

    #[test]
    fn round4_rounds_to_four_decimals() {
        assert_eq!(round4(0.123456), 0.1235);
    }
}
