//! Embedding generation seam
//!
//! Grounded on `enrichment/embeddings.py::EmbeddingService`. Actual model
//! inference (sentence-transformers in the original) is out of scope — this
//! trait is what the Enricher calls through, embedding the concatenated
//! intelligence signal rather than the raw item text.

use amonhen_core_types::Result;
use amonhen_models::EnrichmentResult;
use async_trait::async_trait;

pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Produces a fixed-dimension embedding vector from text
#[async_trait]
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed the intelligence signal: summary + framing + claims joined by
    /// spaces, matching `embed_enrichment` in the original.
    async fn embed_enrichment(&self, result: &EnrichmentResult) -> Result<Vec<f32>> {
        let text = format!(
            "{} {} {}",
            result.summary,
            result.framing,
            result.claims.join(" ")
        );
        self.embed(&text).await
    }
}
