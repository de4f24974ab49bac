//! `amonhen digest` — run divergence + anomaly detection, generate one digest
//!
//! Grounded on `intelligence/digest.py::DigestGenerator` and
//! `intelligence/divergence.py`/`anomalies.py`. Reopens the vector
//! collection from `settings.vector_index_path` so divergence detection
//! sees whatever a separate enrichment run already saved there.

use std::sync::Arc;

use amonhen_config::Settings;
use amonhen_enrich::EnrichProvider;
use amonhen_intel::{AnomalyDetector, DigestGenerator, DivergenceDetector};
use amonhen_store::MetaStore;
use amonhen_vectorindex::VectorIndex;
use anyhow::Result;
use chrono::Utc;
use clap::Args;

use crate::llm_client::NoOpLlmClient;

#[derive(Debug, Args)]
pub struct DigestArgs {}

pub async fn execute(_args: DigestArgs, settings: &Settings) -> Result<()> {
    let store = Arc::new(MetaStore::open(&settings.sqlite_path)?);
    let vectors = Arc::new(VectorIndex::open(&settings.vector_index_path)?);
    let now = Utc::now();

    let clusters = store.get_active_clusters()?;

    let divergence_detector = DivergenceDetector::new(settings.clustering.divergence_threshold);
    let divergences = divergence_detector.detect(&clusters, &store, &vectors)?;

    let anomaly_detector = AnomalyDetector::new();
    let mut anomalies = anomaly_detector.detect_volume_spikes(&clusters, &store, now)?;
    anomalies.extend(anomaly_detector.detect_sentiment_shifts(&clusters, &store, now)?);
    anomalies.extend(anomaly_detector.detect_entity_surges(&store, now)?);

    let generator = DigestGenerator::new(
        EnrichProvider::Remote {
            model: settings.enrichment.model.clone(),
            input_cost_per_token: 0.0,
            output_cost_per_token: 0.0,
        },
        Arc::new(NoOpLlmClient),
    );

    let digest = generator
        .generate(&clusters, &divergences, &anomalies, &store, now)
        .await?;

    println!("Digest generated: {}", digest.generated_at);
    println!("Clusters: {}  Items: {}", digest.cluster_count, digest.item_count);
    println!();
    println!("{}", digest.content);

    Ok(())
}
