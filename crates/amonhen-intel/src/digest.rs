//! Daily intelligence digest generation
//!
//! Grounded on `intelligence/digest.py::DigestGenerator`: build a textual
//! briefing from the top clusters/divergences/anomalies, run it through
//! the LLM as a synthetic enrichment call, and fall back to a
//! deterministic Markdown digest if that call fails.

use amonhen_core_types::Result;
use amonhen_models::{DailyDigest, NarrativeCluster};
use amonhen_store::MetaStore;
use chrono::{DateTime, Utc};
use tracing::{error, info};

use amonhen_enrich::{EnrichProvider, LlmClient};

use crate::anomalies::AnomalyRecord;
use crate::divergence::DivergenceRecord;

const DIGEST_PROMPT_TEMPLATE: &str = "You are an intelligence analyst. Generate a concise daily intelligence digest based on the following narrative clusters, source divergences, and anomalies.

CLUSTERS:
{clusters_text}

DIVERGENCES:
{divergences_text}

ANOMALIES:
{anomalies_text}

Write a clear, professional intelligence digest that:
1. Highlights the most significant narratives
2. Notes any source disagreements (divergences)
3. Flags anomalies and emerging trends
4. Is structured with clear sections

Keep it under 500 words. Write in professional intelligence briefing style.";

pub struct DigestGenerator {
    provider: EnrichProvider,
    client: std::sync::Arc<dyn LlmClient>,
}

impl DigestGenerator {
    pub fn new(provider: EnrichProvider, client: std::sync::Arc<dyn LlmClient>) -> Self {
        Self { provider, client }
    }

    pub async fn generate(
        &self,
        clusters: &[NarrativeCluster],
        divergences: &[DivergenceRecord],
        anomalies: &[AnomalyRecord],
        store: &MetaStore,
        now: DateTime<Utc>,
    ) -> Result<DailyDigest> {
        let prompt = build_prompt(clusters, divergences, anomalies);

        let content = match self
            .provider
            .enrich_text("digest_generator", &prompt, self.client.as_ref())
            .await
        {
            Ok((result, _cost)) => result.summary,
            Err(e) => {
                error!(error = %e, "digest generation failed, using fallback");
                fallback_digest(clusters, divergences, anomalies, now)
            }
        };

        let total_items: usize = clusters.iter().map(|c| c.item_count).sum();
        let digest = DailyDigest {
            id: uuid::Uuid::new_v4().to_string(),
            generated_at: now,
            content,
            cluster_count: clusters.len(),
            item_count: total_items,
            model: self.provider.model_name().to_string(),
        };

        store.insert_digest(&digest)?;
        info!(
            cluster_count = clusters.len(),
            item_count = total_items,
            "generated digest"
        );
        Ok(digest)
    }
}

fn build_prompt(
    clusters: &[NarrativeCluster],
    divergences: &[DivergenceRecord],
    anomalies: &[AnomalyRecord],
) -> String {
    let mut clusters_text = String::new();
    for c in clusters.iter().take(10) {
        let sources = serde_json::to_string(&c.source_distribution).unwrap_or_default();
        let key_entities = c.key_entities.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
        clusters_text.push_str(&format!(
            "\n- {} ({} items, status={})\n  Summary: {}\n  Sources: {}\n  Key entities: {}\n",
            c.label,
            c.item_count,
            c.status,
            c.summary,
            sources,
            key_entities
        ));
    }
    if clusters_text.is_empty() {
        clusters_text = "No active clusters.".to_string();
    }

    let mut divergences_text = String::new();
    for d in divergences.iter().take(5) {
        divergences_text.push_str(&format!("\n- {}", d.description()));
    }
    if divergences_text.is_empty() {
        divergences_text = "No divergences detected.".to_string();
    }

    let mut anomalies_text = String::new();
    for a in anomalies.iter().take(5) {
        anomalies_text.push_str(&format!("\n- {}", a.description()));
    }
    if anomalies_text.is_empty() {
        anomalies_text = "No anomalies detected.".to_string();
    }

    DIGEST_PROMPT_TEMPLATE
        .replace("{clusters_text}", &clusters_text)
        .replace("{divergences_text}", &divergences_text)
        .replace("{anomalies_text}", &anomalies_text)
}

fn fallback_digest(
    clusters: &[NarrativeCluster],
    divergences: &[DivergenceRecord],
    anomalies: &[AnomalyRecord],
    now: DateTime<Utc>,
) -> String {
    let mut lines = vec![format!("# Intelligence Digest — {}", now.format("%Y-%m-%d"))];
    lines.push(format!("\n## Active Narratives ({} clusters)", clusters.len()));
    for c in clusters.iter().take(10) {
        lines.push(format!("- **{}** ({} items): {}", c.label, c.item_count, c.summary));
    }
    if !divergences.is_empty() {
        lines.push(format!("\n## Source Divergences ({})", divergences.len()));
        for d in divergences.iter().take(5) {
            lines.push(format!("- {}", d.description()));
        }
    }
    if !anomalies.is_empty() {
        lines.push(format!("\n## Anomalies ({})", anomalies.len()));
        for a in anomalies.iter().take(5) {
            lines.push(format!("- {}", a.description()));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_digest_includes_section_headers() {
        let now = DateTime::parse_from_rfc3339("2026-07-31T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let text = fallback_digest(&[], &[], &[], now);
        assert!(text.starts_with("# Intelligence Digest — 2026-07-31"));
        assert!(text.contains("Active Narratives (0 clusters)"));
    }
}
