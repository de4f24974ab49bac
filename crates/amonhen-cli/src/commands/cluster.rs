//! `amonhen cluster` — run one clustering pass
//!
//! Grounded on `intelligence/clustering.py::ClusteringPipeline.run`, driven
//! here as a single on-demand pass rather than a scheduled loop (no
//! scheduler is in scope for this CLI, per `spec.md` §1). Reopens the
//! vector collection from `settings.vector_index_path` so this pass sees
//! whatever a separate enrichment run already saved there.

use std::sync::Arc;

use amonhen_config::Settings;
use amonhen_enrich::EnrichProvider;
use amonhen_intel::{ClusterLabeler, Clusterer};
use amonhen_store::MetaStore;
use amonhen_vectorindex::VectorIndex;
use anyhow::Result;
use chrono::Utc;
use clap::Args;

use crate::llm_client::NoOpLlmClient;

#[derive(Debug, Args)]
pub struct ClusterArgs {}

pub async fn execute(_args: ClusterArgs, settings: &Settings) -> Result<()> {
    let store = Arc::new(MetaStore::open(&settings.sqlite_path)?);
    let vectors = Arc::new(VectorIndex::open(&settings.vector_index_path)?);

    let labeler = Some(ClusterLabeler {
        provider: EnrichProvider::Remote {
            model: settings.enrichment.model.clone(),
            input_cost_per_token: 0.0,
            output_cost_per_token: 0.0,
        },
        client: Arc::new(NoOpLlmClient),
    });

    let clusterer = Clusterer::new(
        store,
        vectors,
        settings.clustering.min_cluster_size,
        settings.clustering.min_samples,
        settings.clustering.rolling_window_days,
        labeler,
    );

    let clusters = clusterer.run(Utc::now()).await?;
    println!("Built {} cluster(s).", clusters.len());
    for c in &clusters {
        println!("  [{:?}] {} ({} items)", c.status, c.label, c.item_count);
    }

    Ok(())
}
