//! Density-based clustering over embedding vectors
//!
//! Grounded on the description of `sklearn.cluster.HDBSCAN` usage in
//! `intelligence/clustering.py::ClusteringPipeline.run` (no Rust crate in
//! the pack ships density clustering, so this is a from-scratch
//! implementation of the same core rule: core-distance weighted minimum
//! spanning tree, single-linkage merge, flat extraction at
//! `min_cluster_size`). Operates purely on `&[Vec<f32>]` so it is testable
//! in isolation from the storage layer.

use amonhen_vectorindex::cosine_distance;

/// Label assigned to a point that did not end up in any cluster
pub const NOISE: i32 = -1;

struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
    label: Vec<Option<i32>>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
            label: vec![None; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize, min_cluster_size: usize, next_label: &mut i32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        let merged_size = self.size[big] + self.size[small];

        let label_big = self.label[big];
        let label_small = self.label[small];
        let merged_label = match (label_big, label_small) {
            (Some(l), _) => Some(l),
            (None, Some(l)) => Some(l),
            (None, None) if merged_size >= min_cluster_size => {
                let l = *next_label;
                *next_label += 1;
                Some(l)
            }
            (None, None) => None,
        };

        self.parent[small] = big;
        self.size[big] = merged_size;
        self.label[big] = merged_label;
    }
}

/// A candidate edge in the mutual-reachability minimum spanning tree
struct Edge {
    a: usize,
    b: usize,
    weight: f32,
}

/// Core distance for each point: distance to its `min_samples`-th nearest
/// neighbor, counting the point itself as one of the `min_samples` (the
/// sklearn convention this pipeline follows).
fn core_distances(dist: &[Vec<f32>], min_samples: usize) -> Vec<f32> {
    let n = dist.len();
    let k = min_samples.saturating_sub(2);
    (0..n)
        .map(|i| {
            let mut row: Vec<f32> = (0..n).filter(|&j| j != i).map(|j| dist[i][j]).collect();
            row.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            if row.is_empty() {
                0.0
            } else {
                row[k.min(row.len() - 1)]
            }
        })
        .collect()
}

fn mutual_reachability(dist: &[Vec<f32>], core: &[f32]) -> Vec<Vec<f32>> {
    let n = dist.len();
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| dist[i][j].max(core[i]).max(core[j]))
                .collect()
        })
        .collect()
}

/// Minimum spanning tree over `mrd` via Prim's algorithm, returned as the
/// `n - 1` edges in no particular order.
fn minimum_spanning_tree(mrd: &[Vec<f32>]) -> Vec<Edge> {
    let n = mrd.len();
    if n < 2 {
        return Vec::new();
    }
    let mut in_tree = vec![false; n];
    let mut best_dist = vec![f32::INFINITY; n];
    let mut best_from = vec![0usize; n];
    in_tree[0] = true;
    for j in 1..n {
        best_dist[j] = mrd[0][j];
        best_from[j] = 0;
    }

    let mut edges = Vec::with_capacity(n - 1);
    for _ in 1..n {
        let mut next = None;
        let mut next_dist = f32::INFINITY;
        for j in 0..n {
            if !in_tree[j] && best_dist[j] < next_dist {
                next_dist = best_dist[j];
                next = Some(j);
            }
        }
        let Some(v) = next else { break };
        in_tree[v] = true;
        edges.push(Edge {
            a: best_from[v],
            b: v,
            weight: best_dist[v],
        });
        for j in 0..n {
            if !in_tree[j] && mrd[v][j] < best_dist[j] {
                best_dist[j] = mrd[v][j];
                best_from[j] = v;
            }
        }
    }
    edges
}

/// Cluster `vectors` by cosine-metric density, returning one label per
/// input vector in the same order. `NOISE` (-1) marks points that did not
/// join any cluster of at least `min_cluster_size` members.
pub fn cluster(vectors: &[Vec<f32>], min_cluster_size: usize, min_samples: usize) -> Vec<i32> {
    let n = vectors.len();
    if n == 0 {
        return Vec::new();
    }
    if n < min_cluster_size {
        return vec![NOISE; n];
    }

    let dist: Vec<Vec<f32>> = vectors
        .iter()
        .map(|a| vectors.iter().map(|b| cosine_distance(a, b)).collect())
        .collect();
    let core = core_distances(&dist, min_samples.max(1));
    let mrd = mutual_reachability(&dist, &core);
    let mut edges = minimum_spanning_tree(&mrd);
    edges.sort_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap_or(std::cmp::Ordering::Equal));

    let mut uf = UnionFind::new(n);
    let mut next_label = 0i32;
    for edge in &edges {
        uf.union(edge.a, edge.b, min_cluster_size, &mut next_label);
    }

    (0..n)
        .map(|i| {
            let root = uf.find(i);
            uf.label[root].unwrap_or(NOISE)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIM: usize = 8;

    fn orthogonal_point(on_first_half: bool, jitter: f32) -> Vec<f32> {
        let mut v = vec![0.0f32; DIM];
        let half = DIM / 2;
        if on_first_half {
            for (i, slot) in v.iter_mut().enumerate().take(half) {
                *slot = 1.0 + jitter * ((i as f32 + 1.0) * 0.01);
            }
        } else {
            for (i, slot) in v.iter_mut().enumerate().skip(half) {
                *slot = 1.0 + jitter * ((i as f32 + 1.0) * 0.01);
            }
        }
        v
    }

    #[test]
    fn two_well_separated_groups_form_two_clusters() {
        let mut vectors = Vec::new();
        for i in 0..8 {
            vectors.push(orthogonal_point(true, i as f32));
        }
        for i in 0..8 {
            vectors.push(orthogonal_point(false, i as f32));
        }

        let labels = cluster(&vectors, 3, 3);
        let distinct: std::collections::HashSet<i32> =
            labels.iter().copied().filter(|&l| l != NOISE).collect();
        assert!(distinct.len() >= 2, "expected at least two clusters, got {distinct:?}");

        let first_half_labels: std::collections::HashSet<i32> =
            labels[0..8].iter().copied().collect();
        let second_half_labels: std::collections::HashSet<i32> =
            labels[8..16].iter().copied().collect();
        assert!(first_half_labels.is_disjoint(&second_half_labels) || first_half_labels.contains(&NOISE));
    }

    #[test]
    fn too_few_points_yields_all_noise() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let labels = cluster(&vectors, 5, 4);
        assert!(labels.iter().all(|&l| l == NOISE));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let labels = cluster(&[], 5, 4);
        assert!(labels.is_empty());
    }
}
